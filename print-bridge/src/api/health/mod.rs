//! `GET /health`: the bridge is up, plus a count of what it is configured for

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::ApiResponse;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always "ok" when the handler answers
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    stations: usize,
    printers: usize,
}

async fn health(State(state): State<ServerState>) -> Json<ApiResponse<HealthResponse>> {
    let settings = state.settings.snapshot();
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        stations: settings.stations.len(),
        printers: settings.printers.len(),
    }))
}
