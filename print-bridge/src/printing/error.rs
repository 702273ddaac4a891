//! Print engine errors

use shared::{AppError, ErrorCode};
use thiserror::Error;

use super::dispatcher::DispatchState;
use super::types::ProbeAttempt;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Missing or unusable printer configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Table {0} is not covered by any zone")]
    ZoneNotFound(u32),

    #[error("Printer for station '{station_id}' unreachable ({} candidates tried)", .attempts.len())]
    PrinterUnreachable {
        station_id: String,
        attempts: Vec<ProbeAttempt>,
    },

    /// One transmission attempt failed
    #[error("Transmission to {address} failed: {source}")]
    Transmission {
        address: String,
        #[source]
        source: masa_printer::PrintError,
    },

    #[error("Station '{station_id}' failed after {attempts} attempts: {last}")]
    RetryExhausted {
        station_id: String,
        attempts: u32,
        last: String,
    },

    #[error(transparent)]
    State(#[from] InvalidTransition),
}

/// Dispatch state machine was asked for an impossible step
#[derive(Debug, Error)]
#[error("Invalid dispatch transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: DispatchState,
    pub to: DispatchState,
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        let message = err.to_string();
        match err {
            DispatchError::Config(msg) => AppError::config(msg),
            DispatchError::ZoneNotFound(table) => AppError::zone_not_found(table),
            DispatchError::PrinterUnreachable {
                station_id,
                attempts,
            } => AppError::printer_unreachable(station_id).with_detail(
                "attempts",
                serde_json::to_value(&attempts).unwrap_or_default(),
            ),
            DispatchError::Transmission { address, .. } => {
                AppError::with_message(ErrorCode::NetworkError, message)
                    .with_detail("address", address)
            }
            DispatchError::RetryExhausted {
                station_id,
                attempts,
                ..
            } => AppError::print_failed(message)
                .with_detail("stationId", station_id)
                .with_detail("attempts", attempts),
            DispatchError::State(_) => AppError::internal(message),
        }
    }
}
