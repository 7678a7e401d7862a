//! Liveness check
//!
//! `GET /health` answers without touching the document store, so it stays
//! cheap for load balancers. It also reports how many push-channel slots are
//! taken, which is the first thing to check when players see "server full".

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Admitted SSE clients right now
    pub live_connections: usize,
    pub max_connections: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        live_connections: state.limiter.active(),
        max_connections: state.limiter.max(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
