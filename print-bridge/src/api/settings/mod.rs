//! Settings API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /settings | GET | Current settings document |
//! | /settings | PUT | Replace the document (persisted, address cache cleared) |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/settings", get(handler::get).put(handler::replace))
}
