// src/report/filter.rs

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::report::dates::parse_creado_el;
use crate::report::resolve::{
    ATLETA_FIELDS, AREA_FIELDS, CONSULTORIO_FIELDS, PROFESIONAL_FILTER_FIELDS, resolve_reference,
};

/// Normalized filter set for a report request. The id filters are already
/// past sentinel screening: `Some` means active.
#[derive(Debug, Clone)]
pub struct ActiveFilters {
    pub desde: NaiveDateTime,
    /// Inclusive, 23:59:59 of the requested end date.
    pub hasta: NaiveDateTime,
    pub atleta_id: Option<String>,
    pub area_id: Option<String>,
    pub consultorio_id: Option<String>,
    pub profesional_id: Option<String>,
}

/// Screens a raw filter parameter against the "no filter" sentinels:
/// absent, null, empty string, or the literal "todos".
pub fn active_filter(value: Option<&Value>) -> Option<String> {
    let value = value?;
    let s = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if s.is_empty() || s == "todos" { None } else { Some(s) }
}

/// Applies the date range plus any active id filters, conjunctively.
///
/// The timestamp comes from `creado_el` under the single fixed layout; an
/// appointment that fails that parse is dropped from the batch, not fatal.
pub fn filter_citas(citas: &[Value], filters: &ActiveFilters) -> Vec<Value> {
    let mut filtradas = Vec::new();

    for cita in citas {
        let creado_el = cita.get("creado_el").and_then(Value::as_str).unwrap_or("");
        let Some(fecha_cita) = parse_creado_el(creado_el) else {
            tracing::warn!(
                "cita {:?} con creado_el no parseable, omitida",
                cita.get("id")
            );
            continue;
        };
        if fecha_cita < filters.desde || fecha_cita > filters.hasta {
            continue;
        }

        let groups: [(&Option<String>, &[&str]); 4] = [
            (&filters.atleta_id, ATLETA_FIELDS),
            (&filters.area_id, AREA_FIELDS),
            (&filters.consultorio_id, CONSULTORIO_FIELDS),
            (&filters.profesional_id, PROFESIONAL_FILTER_FIELDS),
        ];
        let keep = groups.iter().all(|(wanted, fields)| match wanted {
            Some(id) => resolve_reference(cita, fields).as_deref() == Some(id.as_str()),
            None => true,
        });
        if keep {
            filtradas.push(cita.clone());
        }
    }

    filtradas
}
