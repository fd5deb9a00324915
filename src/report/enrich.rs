// src/report/enrich.rs

use serde::Serialize;
use serde_json::{Map, Value};

use crate::report::dates::parse_creado_el;
use crate::report::resolve::{
    ATLETA_FIELDS, AREA_FIELDS, CONSULTORIO_FIELDS, Catalogs, PROFESIONAL_RECORD_FIELDS,
    resolve_reference,
};

pub const NO_ESPECIFICADO: &str = "No especificado";
pub const NO_ESPECIFICADA: &str = "No especificada";
const ESTADO_DESCONOCIDO: &str = "Desconocido";

/// One denormalized report row: a copy of the raw appointment plus the
/// resolved display fields. The source record is never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct CitaEnriquecida {
    #[serde(flatten)]
    pub cita: Map<String, Value>,
    pub atleta_nombre: String,
    pub area_nombre: String,
    pub consultorio_nombre: String,
    pub profesional_nombre: String,
    pub profesional_especialidad: String,
    pub fecha_formateada: String,
    pub hora_formateada: String,
}

impl CitaEnriquecida {
    pub fn estado(&self) -> &str {
        self.cita
            .get("estado")
            .and_then(Value::as_str)
            .unwrap_or(ESTADO_DESCONOCIDO)
    }
}

fn text_field<'a>(record: &'a Value, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

fn nombre_completo(record: &Value) -> String {
    format!(
        "{} {} {}",
        text_field(record, "nombre"),
        text_field(record, "apPaterno"),
        text_field(record, "apMaterno"),
    )
    .trim()
    .to_string()
}

/// Joins filtered appointments against the catalog indexes. Output keeps the
/// input's order and cardinality; every unresolved reference degrades to its
/// placeholder instead of dropping or failing the row.
pub fn enrich_citas(citas: &[Value], catalogs: &Catalogs) -> Vec<CitaEnriquecida> {
    citas.iter().map(|cita| enrich_cita(cita, catalogs)).collect()
}

fn enrich_cita(cita: &Value, catalogs: &Catalogs) -> CitaEnriquecida {
    let atleta_id = resolve_reference(cita, ATLETA_FIELDS);
    let atleta_nombre = match atleta_id
        .as_ref()
        .and_then(|id| catalogs.atletas.get(id))
    {
        Some(atleta) => nombre_completo(atleta),
        None => {
            tracing::warn!("no se encontro atleta con id {atleta_id:?}");
            NO_ESPECIFICADO.to_string()
        }
    };

    let area_id = resolve_reference(cita, AREA_FIELDS);
    let area_nombre = match area_id
        .as_ref()
        .and_then(|id| catalogs.areas.get(id))
        .and_then(|area| area.get("nombre"))
        .and_then(Value::as_str)
    {
        Some(nombre) => nombre.to_string(),
        None => {
            tracing::warn!("no se encontro area con id {area_id:?}");
            NO_ESPECIFICADA.to_string()
        }
    };

    let consultorio_id = resolve_reference(cita, CONSULTORIO_FIELDS);
    let consultorio_nombre = match consultorio_id
        .as_ref()
        .and_then(|id| catalogs.consultorios.get(id))
        .and_then(|c| c.get("nombre"))
        .and_then(Value::as_str)
    {
        Some(nombre) => nombre.to_string(),
        None => {
            tracing::warn!("no se encontro consultorio con id {consultorio_id:?}");
            NO_ESPECIFICADO.to_string()
        }
    };

    let profesional_id = resolve_reference(cita, PROFESIONAL_RECORD_FIELDS);
    let (profesional_nombre, profesional_especialidad) = match profesional_id
        .as_ref()
        .and_then(|id| catalogs.profesionales.get(id))
    {
        Some(profesional) => (
            format!(
                "{} {}",
                text_field(profesional, "nombre"),
                text_field(profesional, "apellido"),
            )
            .trim()
            .to_string(),
            profesional
                .get("especialidad")
                .and_then(Value::as_str)
                .unwrap_or(NO_ESPECIFICADA)
                .to_string(),
        ),
        None => {
            tracing::warn!("no se encontro profesional con id {profesional_id:?}");
            (NO_ESPECIFICADO.to_string(), NO_ESPECIFICADA.to_string())
        }
    };

    let (fecha_formateada, hora_formateada) = match cita
        .get("creado_el")
        .and_then(Value::as_str)
        .and_then(parse_creado_el)
    {
        Some(fecha_hora) => (
            fecha_hora.format("%d/%m/%Y").to_string(),
            fecha_hora.format("%H:%M").to_string(),
        ),
        None => {
            tracing::warn!("cita {:?} sin fecha/hora formateable", cita.get("id"));
            (NO_ESPECIFICADA.to_string(), NO_ESPECIFICADA.to_string())
        }
    };

    CitaEnriquecida {
        cita: cita.as_object().cloned().unwrap_or_default(),
        atleta_nombre,
        area_nombre,
        consultorio_nombre,
        profesional_nombre,
        profesional_especialidad,
        fecha_formateada,
        hora_formateada,
    }
}
