use crate::models::AppState;
use axum::Router;

pub mod filtros_routes;
pub mod reporte_routes;
pub mod stats_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(stats_routes::router())
        .merge(filtros_routes::router())
        .merge(reporte_routes::router())
        .with_state(state)
}
