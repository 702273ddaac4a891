//! [`AppError`] and the response envelope every endpoint answers with

use super::codes::ErrorCode;
use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Error crossing the HTTP boundary
///
/// `details` is a free-form JSON object (station id, probe attempts,
/// the failed print result) that ends up verbatim in the response body.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Map<String, Value>>,
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> http::StatusCode {
        self.code.http_status()
    }

    fn for_station(code: ErrorCode, station_id: impl Into<String>, what: &str) -> Self {
        let id = station_id.into();
        Self::with_message(code, format!("{what} for station '{id}'")).with_detail("stationId", id)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConfigError, msg)
    }

    pub fn station_not_found(station_id: impl Into<String>) -> Self {
        let id = station_id.into();
        Self::with_message(ErrorCode::StationNotFound, format!("Station '{id}' not found"))
            .with_detail("stationId", id)
    }

    pub fn printer_config_missing(station_id: impl Into<String>) -> Self {
        Self::for_station(ErrorCode::PrinterConfigMissing, station_id, "No printer configured")
    }

    pub fn printer_unreachable(station_id: impl Into<String>) -> Self {
        Self::for_station(ErrorCode::PrinterNotAvailable, station_id, "Printer unreachable")
    }

    pub fn zone_not_found(table_number: u32) -> Self {
        Self::with_message(
            ErrorCode::ZoneNotFound,
            format!("Table {table_number} is not covered by any zone"),
        )
        .with_detail("tableNumber", table_number)
    }

    pub fn print_failed(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PrintFailed, msg)
    }
}

/// `{ "code": 0, "message": "OK", "data": ... }` on success,
/// `{ "code": n, "message": ..., "details": {...} }` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_message("OK", data)
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            message: message.into(),
            data: Some(data),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success.code()
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if self.code.category().is_system() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, message = %self.message, "Request rejected");
        }
        (status, Json(ApiResponse::<()>::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_default_message_follows_code() {
        let err = AppError::new(ErrorCode::ZoneNotFound);
        assert_eq!(err.message, "No zone covers this table number");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::validation("port out of range")
            .with_detail("field", "port")
            .with_detail("value", 70000);

        let details = err.details.unwrap();
        assert_eq!(details["field"], "port");
        assert_eq!(details["value"], 70000);
    }

    #[test]
    fn test_station_errors_carry_station_id() {
        let err = AppError::station_not_found("bar");
        assert_eq!(err.to_string(), "Station 'bar' not found");
        assert_eq!(err.details.as_ref().unwrap()["stationId"], "bar");

        let err = AppError::printer_unreachable("grill");
        assert_eq!(err.message, "Printer unreachable for station 'grill'");
        assert_eq!(err.http_status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::zone_not_found(250);
        assert_eq!(err.details.as_ref().unwrap()["tableNumber"], 250);
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_envelope() {
        let body: ApiResponse<()> = AppError::printer_config_missing("soguk").into();
        assert_eq!(body.code, 6512);
        assert!(!body.is_success());

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["details"]["stationId"], "soguk");
    }

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success("hello")).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "OK");
        assert_eq!(json["data"], "hello");
        assert!(json.get("details").is_none());
    }
}
