//! Zone lookup API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /zones/{table} | GET | Zone and packet number of a table |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/zones/{table}", get(handler::lookup))
}
