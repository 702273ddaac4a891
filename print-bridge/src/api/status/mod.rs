//! Printer status API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /status | GET | Reachability of every configured printer |
//! | /status/{host} | GET | Candidate diagnosis for a station id, or an ad-hoc host probe |
//! | /probe | POST | Probe one explicit address (`tcp://`, `\\host\SHARE`, `printer:NAME`) |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/status", get(handler::overview))
        .route("/status/{host}", get(handler::host))
        .route("/probe", post(handler::probe))
}
