//! HTTP API
//!
//! # Modules
//!
//! - [`health`] - liveness
//! - [`status`] - printer reachability and address probes
//! - [`printers`] - per-station test print, single-station print, printer config
//! - [`jobs`] - full order print jobs
//! - [`zones`] - table zone lookup
//! - [`settings`] - restaurant settings document
//!
//! Static paths (`/health`, `/status`, `/settings`, ...) take precedence over
//! the `/{station}` routes, so those words cannot be used as station ids.

pub mod health;
pub mod jobs;
pub mod printers;
pub mod settings;
pub mod status;
pub mod zones;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::printing::{PrintOutcome, PrintResult};
use shared::{AppError, ErrorCode};

pub use crate::utils::{ApiResponse, AppResult};

/// All routes, no middleware, no state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(status::router())
        .merge(jobs::router())
        .merge(zones::router())
        .merge(settings::router())
        // Catch-all station routes last
        .merge(printers::router())
}

/// Router with middleware and state, used by the server and by tests
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Turn a failed station result into an error response, keeping the result
/// itself in `details`
pub(crate) fn print_outcome(result: PrintResult) -> AppResult<PrintResult> {
    let err = match result.outcome {
        PrintOutcome::Success => return Ok(result),
        PrintOutcome::Unreachable => AppError::printer_unreachable(&result.station_id),
        PrintOutcome::RetryExhausted => {
            AppError::print_failed(result.error.clone().unwrap_or_default())
        }
        PrintOutcome::ConfigError => AppError::with_message(
            ErrorCode::PrinterConfigMissing,
            result.error.clone().unwrap_or_default(),
        ),
        PrintOutcome::Abandoned => AppError::new(ErrorCode::PrintCancelled),
    };
    Err(err.with_detail(
        "result",
        serde_json::to_value(&result).unwrap_or_default(),
    ))
}
