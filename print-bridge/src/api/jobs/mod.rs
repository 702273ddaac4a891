//! Print job API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /jobs | POST | Route an order and print every station bucket |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::PrintRequest;

pub fn router() -> Router<ServerState> {
    Router::new().route("/jobs", post(handler::create))
}
