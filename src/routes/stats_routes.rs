// src/routes/stats_routes.rs

use axum::{Json, Router, extract::State, routing::get};
use chrono::Local;

use crate::{
    error::ApiError,
    models::AppState,
    report::stats::{EstadisticasPayload, aggregate},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/estadisticas-citas", get(estadisticas_citas))
}

pub async fn estadisticas_citas(
    State(state): State<AppState>,
) -> Result<Json<EstadisticasPayload>, ApiError> {
    let citas = state.backend.fetch_citas().await?;
    let profesionales = state.backend.fetch_profesionales().await?;
    let atletas = state.backend.fetch_atletas().await?;
    let areas = state.backend.fetch_areas().await?;

    let hoy = Local::now().date_naive();
    Ok(Json(aggregate(&citas, &profesionales, &atletas, &areas, hoy)))
}
