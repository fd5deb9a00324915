// src/routes/filtros_routes.rs

use std::collections::HashSet;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use serde_json::Value;

use crate::{error::ApiError, models::AppState, report::resolve::id_string};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/filtros-citas", get(filtros_citas))
}

#[derive(Debug, Serialize)]
pub struct FiltrosResponse {
    pub atletas: Vec<OpcionFiltro>,
    pub areas: Vec<OpcionFiltro>,
    pub consultorios: Vec<OpcionFiltro>,
    #[serde(rename = "Profesionales-Salud")]
    pub profesionales_salud: Vec<OpcionFiltro>,
}

#[derive(Debug, Serialize)]
pub struct OpcionFiltro {
    pub id: Value,
    pub nombre: String,
}

fn texto<'a>(record: &'a Value, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Dedups a catalog by id keeping the *first* occurrence, preserving order.
/// (The report-side catalog index is last-wins; this endpoint predates it and
/// its first-wins behavior is kept as-is.)
fn dedup_primero<F>(registros: &[Value], nombre: F) -> Vec<OpcionFiltro>
where
    F: Fn(&Value) -> String,
{
    let mut vistos = HashSet::new();
    let mut opciones = Vec::new();
    for registro in registros {
        let Some(id) = registro.get("id") else {
            continue;
        };
        if vistos.insert(id_string(id)) {
            opciones.push(OpcionFiltro {
                id: id.clone(),
                nombre: nombre(registro),
            });
        }
    }
    opciones
}

pub async fn filtros_citas(
    State(state): State<AppState>,
) -> Result<Json<FiltrosResponse>, ApiError> {
    let atletas = state.backend.fetch_atletas().await?;
    let areas = state.backend.fetch_areas().await?;
    let consultorios = state.backend.fetch_consultorios().await?;
    let profesionales = state.backend.fetch_profesionales().await?;

    Ok(Json(FiltrosResponse {
        atletas: dedup_primero(&atletas, |a| {
            format!(
                "{} {} {}",
                texto(a, "nombre"),
                texto(a, "apPaterno"),
                texto(a, "apMaterno")
            )
        }),
        areas: dedup_primero(&areas, |a| texto(a, "nombre").to_string()),
        consultorios: dedup_primero(&consultorios, |c| texto(c, "nombre").to_string()),
        profesionales_salud: dedup_primero(&profesionales, |p| {
            format!(
                "{} {} {} - {}",
                texto(p, "nombre"),
                texto(p, "apPaterno"),
                texto(p, "apMaterno"),
                texto(p, "especialidad")
            )
        }),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let registros = vec![
            json!({"id": 1, "nombre": "primero"}),
            json!({"id": 2, "nombre": "segundo"}),
            json!({"id": 1, "nombre": "duplicado"}),
        ];
        let opciones = dedup_primero(&registros, |r| texto(r, "nombre").to_string());
        assert_eq!(opciones.len(), 2);
        assert_eq!(opciones[0].nombre, "primero");
        assert_eq!(opciones[1].nombre, "segundo");
    }

    #[test]
    fn records_without_id_are_dropped() {
        let registros = vec![json!({"nombre": "sin id"})];
        assert!(dedup_primero(&registros, |_| String::new()).is_empty());
    }
}
