// src/report/stats.rs
//
// Statistics pipeline over the raw appointment list plus three catalogs.
// Everything is recomputed per request from the injected anchor date, so the
// output is deterministic given identical inputs.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::report::dates::{event_timestamp, parse_flexible};
use crate::report::resolve::id_string;

const MESES_MOSTRAR: u32 = 12;

/* ============================================================
   Payload
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct EstadisticasPayload {
    pub total_citas: usize,
    pub citas_mes_actual: usize,
    pub citas_completadas: usize,
    pub porcentaje_completadas: u32,
    pub estado_distribucion: EstadoDistribucion,
    pub profesionales_data: Vec<ProfesionalTotales>,
    pub monthly_data_by_profesional: Vec<MesProfesionales>,
    pub monthly_data: Vec<MesTotal>,
    pub top_atletas: Vec<AtletaTotales>,
    pub areas_data: Vec<AreaTotales>,
    pub monthly_data_by_area: Vec<MesAreas>,
}

#[derive(Debug, Serialize)]
pub struct EstadoDistribucion {
    #[serde(rename = "Pendiente")]
    pub pendiente: usize,
    #[serde(rename = "Confirmada")]
    pub confirmada: usize,
    #[serde(rename = "Completada")]
    pub completada: usize,
    #[serde(rename = "Cancelada")]
    pub cancelada: usize,
}

#[derive(Debug, Serialize)]
pub struct ProfesionalTotales {
    pub nombre: String,
    pub id: String,
    pub total: usize,
    pub especialidad: String,
}

#[derive(Debug, Serialize)]
pub struct AtletaTotales {
    pub nombre: String,
    pub id: String,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AreaTotales {
    pub nombre: String,
    pub id: String,
    pub total: usize,
    pub pendiente: usize,
    pub confirmada: usize,
    pub completada: usize,
    pub cancelada: usize,
}

#[derive(Debug, Serialize)]
pub struct MesProfesionales {
    pub mes: String,
    pub mes_numero: u32,
    pub ano: i32,
    pub profesionales: Vec<ConteoProfesional>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ConteoProfesional {
    pub profesional_id: Value,
    pub profesional_name: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MesAreas {
    pub mes: String,
    pub mes_numero: u32,
    pub ano: i32,
    pub areas: Vec<ConteoArea>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ConteoArea {
    pub area_id: Value,
    pub area_name: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MesTotal {
    pub mes: String,
    pub total: usize,
}

/* ============================================================
   Helpers
   ============================================================ */

/// (month, year) for `offset` calendar months before the anchor, wrapping
/// December -> January with a year decrement.
fn month_back(mes_actual: u32, ano_actual: i32, offset: u32) -> (u32, i32) {
    let shifted = mes_actual as i32 - offset as i32 - 1;
    let month = shifted.rem_euclid(12) + 1;
    let year = if shifted < 0 { ano_actual - 1 } else { ano_actual };
    (month as u32, year)
}

fn etiqueta_mes(month: u32, year: i32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap()
        .format("%b")
        .to_string()
}

/// Appointments whose (lenient) timestamp lands in the given month.
/// Unparsable records land in no bucket at all.
fn citas_del_mes<'a>(citas: &'a [Value], month: u32, year: i32) -> Vec<&'a Value> {
    citas
        .iter()
        .filter(|c| {
            parse_flexible(event_timestamp(c))
                .is_some_and(|f| f.month() == month && f.year() == year)
        })
        .collect()
}

/// Raw single-field id compare, stringified on both sides. The monthly
/// professional counts go through this, not the general resolver.
fn raw_id_matches(cita: &Value, field: &str, wanted: &str) -> bool {
    cita.get(field).map(id_string).as_deref() == Some(wanted)
}

/// Area id of an appointment for the monthly area counts: `area_id` when
/// non-null, else a non-null `area` (nested object id or scalar).
fn area_id_de_cita(cita: &Value) -> Option<String> {
    match cita.get("area_id") {
        Some(v) if !v.is_null() => return Some(id_string(v)),
        _ => {}
    }
    match cita.get("area") {
        Some(Value::Object(map)) if map.contains_key("id") => Some(id_string(&map["id"])),
        Some(v) if !v.is_null() => Some(id_string(v)),
        _ => None,
    }
}

fn estado_de(cita: &Value) -> String {
    cita.get("estado")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase()
}

fn texto<'a>(record: &'a Value, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

fn nombre_corto(record: &Value) -> String {
    format!("{} {}", texto(record, "nombre"), texto(record, "apPaterno"))
        .trim()
        .to_string()
}

fn catalog_id(record: &Value) -> String {
    id_string(record.get("id").unwrap_or(&Value::Null))
}

/* ============================================================
   Aggregation
   ============================================================ */

pub fn aggregate(
    citas: &[Value],
    profesionales: &[Value],
    atletas: &[Value],
    areas: &[Value],
    hoy: NaiveDate,
) -> EstadisticasPayload {
    let mes_actual = hoy.month();
    let ano_actual = hoy.year();

    let citas_mes_actual = citas_del_mes(citas, mes_actual, ano_actual);
    let total_citas = citas_mes_actual.len();

    // Last 12 months by professional, oldest first.
    let mut monthly_data_by_profesional = Vec::with_capacity(MESES_MOSTRAR as usize);
    for i in 0..MESES_MOSTRAR {
        let offset = MESES_MOSTRAR - i - 1;
        let (month, year) = month_back(mes_actual, ano_actual, offset);
        let citas_mes = citas_del_mes(citas, month, year);

        let conteos = profesionales
            .iter()
            .map(|profesional| {
                let profesional_id = catalog_id(profesional);
                let count = citas_mes
                    .iter()
                    .filter(|c| raw_id_matches(c, "profesional_salud_id", &profesional_id))
                    .count();
                ConteoProfesional {
                    profesional_id: profesional.get("id").cloned().unwrap_or(Value::Null),
                    profesional_name: nombre_corto(profesional),
                    count,
                }
            })
            .collect();

        monthly_data_by_profesional.push(MesProfesionales {
            mes: etiqueta_mes(month, year),
            mes_numero: month,
            ano: year,
            profesionales: conteos,
            total: citas_mes.len(),
        });
    }

    // Current-month totals per professional.
    let profesionales_data = profesionales
        .iter()
        .map(|profesional| {
            let profesional_id = catalog_id(profesional);
            let total = citas_mes_actual
                .iter()
                .filter(|c| raw_id_matches(c, "profesional_salud_id", &profesional_id))
                .count();
            ProfesionalTotales {
                nombre: nombre_corto(profesional),
                id: profesional_id,
                total,
                especialidad: profesional
                    .get("especialidad")
                    .and_then(Value::as_str)
                    .unwrap_or("Sin especialidad")
                    .to_string(),
            }
        })
        .collect();

    // Top 10 athletes, all-time. Stable sort keeps catalog order on ties.
    let mut top_atletas: Vec<AtletaTotales> = atletas
        .iter()
        .map(|atleta| {
            let atleta_id = catalog_id(atleta);
            let total = citas
                .iter()
                .filter(|c| raw_id_matches(c, "atleta_id", &atleta_id))
                .count();
            AtletaTotales {
                nombre: nombre_corto(atleta),
                id: atleta_id,
                total,
            }
        })
        .collect();
    top_atletas.sort_by(|a, b| b.total.cmp(&a.total));
    top_atletas.truncate(10);

    // Current-month totals per area, with per-status sub-counts.
    let areas_data = areas
        .iter()
        .map(|area| {
            let area_id = catalog_id(area);
            let del_area: Vec<&&Value> = citas_mes_actual
                .iter()
                .filter(|c| raw_id_matches(c, "area_id", &area_id))
                .collect();
            let por_estado = |estado: &str| {
                del_area.iter().filter(|c| estado_de(c) == estado).count()
            };
            AreaTotales {
                nombre: area
                    .get("nombre")
                    .and_then(Value::as_str)
                    .unwrap_or("Sin nombre")
                    .to_string(),
                id: area_id,
                total: del_area.len(),
                pendiente: por_estado("pendiente"),
                confirmada: por_estado("confirmada"),
                completada: por_estado("completada"),
                cancelada: por_estado("cancelada"),
            }
        })
        .collect();

    // Last 12 months by area, with reconciliation: appointments whose area
    // reference resolves to no cataloged area are folded into the first area
    // so the sub-counts always sum to the bucket total.
    let mut monthly_data_by_area = Vec::with_capacity(MESES_MOSTRAR as usize);
    for i in 0..MESES_MOSTRAR {
        let offset = MESES_MOSTRAR - i - 1;
        let (month, year) = month_back(mes_actual, ano_actual, offset);
        let citas_mes = citas_del_mes(citas, month, year);

        let mut conteos: Vec<ConteoArea> = areas
            .iter()
            .map(|area| {
                let area_id = catalog_id(area);
                let count = citas_mes
                    .iter()
                    .filter(|c| area_id_de_cita(c).as_deref() == Some(area_id.as_str()))
                    .count();
                ConteoArea {
                    area_id: area.get("id").cloned().unwrap_or(Value::Null),
                    area_name: area
                        .get("nombre")
                        .and_then(Value::as_str)
                        .unwrap_or("Sin nombre")
                        .to_string(),
                    count,
                }
            })
            .collect();

        let sum_counts: usize = conteos.iter().map(|a| a.count).sum();
        let total_citas_mes = citas_mes.len();
        if sum_counts < total_citas_mes {
            if let Some(primera) = conteos.first_mut() {
                primera.count += total_citas_mes - sum_counts;
            }
        }

        monthly_data_by_area.push(MesAreas {
            mes: etiqueta_mes(month, year),
            mes_numero: month,
            ano: year,
            areas: conteos,
            total: total_citas_mes,
        });
    }

    // Status distribution over the current month; only the four recognized
    // labels count, anything else lands in no bucket.
    let por_estado = |estado: &str| {
        citas_mes_actual
            .iter()
            .filter(|c| estado_de(c) == estado)
            .count()
    };
    let estado_distribucion = EstadoDistribucion {
        pendiente: por_estado("pendiente"),
        confirmada: por_estado("confirmada"),
        completada: por_estado("completada"),
        cancelada: por_estado("cancelada"),
    };

    let citas_completadas = estado_distribucion.completada;
    let porcentaje_completadas = if total_citas > 0 {
        ((citas_completadas as f64 / total_citas as f64) * 100.0).round() as u32
    } else {
        0
    };

    let monthly_data = monthly_data_by_profesional
        .iter()
        .map(|m| MesTotal {
            mes: m.mes.clone(),
            total: m.total,
        })
        .collect();

    EstadisticasPayload {
        total_citas,
        citas_mes_actual: citas_mes_actual.len(),
        citas_completadas,
        porcentaje_completadas,
        estado_distribucion,
        profesionales_data,
        monthly_data_by_profesional,
        monthly_data,
        top_atletas,
        areas_data,
        monthly_data_by_area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hoy() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn produces_twelve_buckets_wrapping_the_year_boundary() {
        let enero = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let payload = aggregate(&[], &[], &[], &[], enero);

        assert_eq!(payload.monthly_data_by_profesional.len(), 12);
        assert_eq!(payload.monthly_data_by_area.len(), 12);

        // Oldest bucket is February of the previous year, newest the anchor.
        let primero = &payload.monthly_data_by_profesional[0];
        assert_eq!((primero.mes_numero, primero.ano), (2, 2024));
        let ultimo = &payload.monthly_data_by_profesional[11];
        assert_eq!((ultimo.mes_numero, ultimo.ano), (1, 2025));

        // Monotonically increasing month/year pairs.
        let pares: Vec<(i32, u32)> = payload
            .monthly_data_by_profesional
            .iter()
            .map(|m| (m.ano, m.mes_numero))
            .collect();
        let mut ordenados = pares.clone();
        ordenados.sort();
        assert_eq!(pares, ordenados);
    }

    #[test]
    fn status_distribution_and_completion_percentage() {
        let citas = vec![
            json!({"fecha": "2025-06-01T10:00:00", "estado": "pendiente"}),
            json!({"fecha": "2025-06-02T10:00:00", "estado": "completada"}),
            json!({"fecha": "2025-06-03T10:00:00", "estado": "cancelada"}),
        ];
        let payload = aggregate(&citas, &[], &[], &[], hoy());

        assert_eq!(payload.total_citas, 3);
        assert_eq!(payload.estado_distribucion.pendiente, 1);
        assert_eq!(payload.estado_distribucion.confirmada, 0);
        assert_eq!(payload.estado_distribucion.completada, 1);
        assert_eq!(payload.estado_distribucion.cancelada, 1);
        assert_eq!(payload.citas_completadas, 1);
        assert_eq!(payload.porcentaje_completadas, 33);
    }

    #[test]
    fn unrecognized_status_counts_in_no_bucket() {
        let citas = vec![
            json!({"fecha": "2025-06-01T10:00:00", "estado": "Completada"}),
            json!({"fecha": "2025-06-02T10:00:00", "estado": "reagendada"}),
        ];
        let payload = aggregate(&citas, &[], &[], &[], hoy());
        let d = &payload.estado_distribucion;
        assert_eq!(d.pendiente + d.confirmada + d.completada + d.cancelada, 1);
        assert_eq!(payload.porcentaje_completadas, 50);
    }

    #[test]
    fn completion_percentage_is_zero_on_empty_month() {
        let payload = aggregate(&[], &[], &[], &[], hoy());
        assert_eq!(payload.total_citas, 0);
        assert_eq!(payload.porcentaje_completadas, 0);
    }

    #[test]
    fn unparsable_timestamps_are_excluded_from_every_bucket() {
        let citas = vec![
            json!({"fecha": "garbage", "estado": "completada"}),
            json!({"estado": "completada"}),
            json!({"creado_el": "2025-06-05T08:00:00Z", "estado": "completada"}),
        ];
        let payload = aggregate(&citas, &[], &[], &[], hoy());
        assert_eq!(payload.citas_mes_actual, 1);
    }

    #[test]
    fn monthly_professional_counts_use_the_raw_field_only() {
        let profesionales = vec![json!({"id": 7, "nombre": "Luis", "apPaterno": "Mora"})];
        let citas = vec![
            json!({"fecha": "2025-06-01T10:00:00", "profesional_salud_id": 7}),
            // nested form is deliberately not recognized on this path
            json!({"fecha": "2025-06-02T10:00:00", "profesional_salud": {"id": 7}}),
        ];
        let payload = aggregate(&citas, &profesionales, &[], &[], hoy());
        let actual = &payload.monthly_data_by_profesional[11];
        assert_eq!(actual.profesionales[0].count, 1);
        assert_eq!(actual.profesionales[0].profesional_name, "Luis Mora");
        assert_eq!(actual.total, 2);
    }

    #[test]
    fn area_reconciliation_restores_the_bucket_total() {
        let areas = vec![
            json!({"id": 1, "nombre": "Fisioterapia"}),
            json!({"id": 2, "nombre": "Nutricion"}),
        ];
        let citas = vec![
            json!({"fecha": "2025-06-01T10:00:00", "area_id": 2}),
            json!({"fecha": "2025-06-02T10:00:00", "area": {"id": 1}}),
            // references an area the catalog does not know
            json!({"fecha": "2025-06-03T10:00:00", "area_id": 99}),
            // no area reference at all
            json!({"fecha": "2025-06-04T10:00:00"}),
        ];
        let payload = aggregate(&citas, &[], &[], &areas, hoy());
        let actual = &payload.monthly_data_by_area[11];

        assert_eq!(actual.total, 4);
        let suma: usize = actual.areas.iter().map(|a| a.count).sum();
        assert_eq!(suma, actual.total);
        // shortfall of 2 lands on the first area
        assert_eq!(actual.areas[0].count, 3);
        assert_eq!(actual.areas[1].count, 1);
    }

    #[test]
    fn top_athletes_rank_all_time_with_stable_ties() {
        let atletas: Vec<Value> = (1..=12)
            .map(|id| json!({"id": id, "nombre": format!("A{id}"), "apPaterno": ""}))
            .collect();
        // athlete 3 has two appointments (one outside the current month),
        // everyone else zero.
        let citas = vec![
            json!({"fecha": "2025-06-01T10:00:00", "atleta_id": 3}),
            json!({"fecha": "2024-12-01T10:00:00", "atleta_id": 3}),
        ];
        let payload = aggregate(&citas, &[], &atletas, &[], hoy());

        assert_eq!(payload.top_atletas.len(), 10);
        assert_eq!(payload.top_atletas[0].id, "3");
        assert_eq!(payload.top_atletas[0].total, 2);
        // ties keep catalog order
        assert_eq!(payload.top_atletas[1].id, "1");
        assert_eq!(payload.top_atletas[2].id, "2");
    }

    #[test]
    fn monthly_data_mirrors_professional_bucket_totals() {
        let citas = vec![json!({"fecha": "2025-06-01T10:00:00"})];
        let payload = aggregate(&citas, &[], &[], &[], hoy());
        assert_eq!(payload.monthly_data.len(), 12);
        assert_eq!(payload.monthly_data[11].total, 1);
        assert_eq!(payload.monthly_data[11].mes, "Jun");
    }
}
