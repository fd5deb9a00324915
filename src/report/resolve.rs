// src/report/resolve.rs
//
// Upstream records reference other entities under several alternate field
// names, and the value may be a raw id or a nested object carrying an `id`.
// One ordered-candidate resolver serves both the filter and enrichment paths
// so the two cannot drift.

use std::collections::HashMap;

use serde_json::Value;

pub const ATLETA_FIELDS: &[&str] = &["atleta_id", "atleta", "id_atleta", "paciente_id", "paciente"];
pub const AREA_FIELDS: &[&str] = &["area_id", "area", "id_area"];
pub const CONSULTORIO_FIELDS: &[&str] = &["consultorio_id", "consultorio", "id_consultorio"];
pub const PROFESIONAL_FILTER_FIELDS: &[&str] = &[
    "profesional_id",
    "profesional_salud",
    "profesional_salud_id",
    "profesional",
    "id_profesional",
];
// The enrichment path only ever consults these two.
pub const PROFESIONAL_RECORD_FIELDS: &[&str] = &["profesional_salud", "profesional_salud_id"];

/// Stringified form of an id value, matching how catalog keys are built.
pub fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Walks `candidates` in order and resolves the first *present* field.
///
/// A nested object with an `id` key yields that id; a non-null scalar yields
/// itself; a null value resolves to `None` without consulting the remaining
/// candidates. That last point is intentional, observed upstream behavior.
pub fn resolve_reference(record: &Value, candidates: &[&str]) -> Option<String> {
    for field in candidates {
        let Some(value) = record.get(field) else {
            continue;
        };
        return match value {
            Value::Object(map) if map.contains_key("id") => Some(id_string(&map["id"])),
            Value::Null => None,
            other => Some(id_string(other)),
        };
    }
    None
}

/// id -> record lookup for one catalog. Duplicate ids collapse last-wins,
/// consistent with inserting the source sequence in order.
pub fn build_index(records: &[Value]) -> HashMap<String, Value> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        let Some(id) = record.get("id") else {
            tracing::debug!("registro de catalogo sin id, omitido");
            continue;
        };
        index.insert(id_string(id), record.clone());
    }
    index
}

/// The four catalog indexes a report request works against.
pub struct Catalogs {
    pub atletas: HashMap<String, Value>,
    pub areas: HashMap<String, Value>,
    pub consultorios: HashMap<String, Value>,
    pub profesionales: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_and_nested_forms_resolve_identically() {
        let plano = json!({"area_id": 5});
        let anidado = json!({"area": {"id": 5, "nombre": "Fisioterapia"}});
        assert_eq!(resolve_reference(&plano, AREA_FIELDS), Some("5".into()));
        assert_eq!(resolve_reference(&anidado, AREA_FIELDS), Some("5".into()));
    }

    #[test]
    fn string_ids_are_not_quoted() {
        let cita = json!({"atleta_id": "abc-123"});
        assert_eq!(resolve_reference(&cita, ATLETA_FIELDS), Some("abc-123".into()));
    }

    #[test]
    fn first_present_field_wins_even_when_null() {
        // atleta_id exists but is null; the later paciente_id is never reached.
        let cita = json!({"atleta_id": null, "paciente_id": 9});
        assert_eq!(resolve_reference(&cita, ATLETA_FIELDS), None);
    }

    #[test]
    fn absent_fields_are_skipped() {
        let cita = json!({"paciente": {"id": "7"}});
        assert_eq!(resolve_reference(&cita, ATLETA_FIELDS), Some("7".into()));
        assert_eq!(resolve_reference(&json!({}), ATLETA_FIELDS), None);
    }

    #[test]
    fn index_is_keyed_by_stringified_id_last_wins() {
        let registros = vec![
            json!({"id": 1, "nombre": "primero"}),
            json!({"id": 2, "nombre": "otro"}),
            json!({"id": 1, "nombre": "ultimo"}),
        ];
        let index = build_index(&registros);
        assert_eq!(index.len(), 2);
        assert_eq!(index["1"]["nombre"], "ultimo");
    }

    #[test]
    fn records_without_id_are_skipped() {
        let registros = vec![json!({"nombre": "sin id"}), json!({"id": 3})];
        assert_eq!(build_index(&registros).len(), 1);
    }
}
