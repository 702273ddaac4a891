//! Shared types for the Masa print bridge
//!
//! Domain models consumed by the print engine (stations, printer configs,
//! menu items, orders, floor zones) and the unified error/response types
//! used at the HTTP boundary.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
