// src/routes/reporte_routes.rs

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::ApiError,
    models::AppState,
    report::{
        enrich::enrich_citas,
        filter::{ActiveFilters, active_filter, filter_citas},
        pdf::render_report,
        resolve::{Catalogs, build_index},
    },
};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generar-reporte-pdf", post(generar_reporte_pdf))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReporteRequest {
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    // id filters may arrive as strings or raw numbers
    #[serde(default)]
    pub atleta_id: Option<Value>,
    #[serde(default)]
    pub area_id: Option<Value>,
    #[serde(default)]
    pub consultorio_id: Option<Value>,
    #[serde(default)]
    pub profesional_id: Option<Value>,
}

fn fecha_param(nombre: &str, valor: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(valor.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!("{nombre} debe tener formato YYYY-MM-DD"),
        )
    })
}

pub async fn generar_reporte_pdf(
    State(state): State<AppState>,
    Json(req): Json<ReporteRequest>,
) -> Result<Response, ApiError> {
    // Validation happens before any upstream call.
    let (Some(fecha_inicio), Some(fecha_fin)) =
        (req.fecha_inicio.as_deref(), req.fecha_fin.as_deref())
    else {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "Las fechas de inicio y fin son requeridas".into(),
        ));
    };
    let desde = fecha_param("fecha_inicio", fecha_inicio)?;
    let hasta = fecha_param("fecha_fin", fecha_fin)?;

    let citas = state.backend.fetch_citas().await?;
    tracing::info!("total de citas obtenidas del servicio: {}", citas.len());

    let catalogs = Catalogs {
        atletas: build_index(&state.backend.fetch_atletas().await?),
        areas: build_index(&state.backend.fetch_areas().await?),
        consultorios: build_index(&state.backend.fetch_consultorios().await?),
        profesionales: build_index(&state.backend.fetch_profesionales().await?),
    };

    let filtros = ActiveFilters {
        desde: desde.and_hms_opt(0, 0, 0).unwrap(),
        hasta: hasta.and_hms_opt(23, 59, 59).unwrap(),
        atleta_id: active_filter(req.atleta_id.as_ref()),
        area_id: active_filter(req.area_id.as_ref()),
        consultorio_id: active_filter(req.consultorio_id.as_ref()),
        profesional_id: active_filter(req.profesional_id.as_ref()),
    };

    let filtradas = filter_citas(&citas, &filtros);
    tracing::info!("citas después de filtrar: {}", filtradas.len());

    let enriquecidas = enrich_citas(&filtradas, &catalogs);

    let pdf = render_report(&enriquecidas, desde, hasta, Local::now().naive_local())
        .map_err(|e| ApiError::Internal(format!("error al generar el PDF: {e}")))?;

    let filename = format!("reporte_citas_{fecha_inicio}_{fecha_fin}.pdf");
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, pdf).into_response())
}
