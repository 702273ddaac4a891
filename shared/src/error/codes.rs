//! Numeric error codes shared with the dashboard
//!
//! | Range | Domain |
//! |-------|--------|
//! | 0xxx | request validation |
//! | 4xxx | orders |
//! | 6xxx | stations and printer configuration |
//! | 7xxx | tables and zones |
//! | 9xxx | transport, printing, storage |

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    ValidationFailed = 2,
    NotFound = 3,
    InvalidRequest = 5,
    ValueOutOfRange = 8,

    /// Nothing in the order is routed to the requested station
    OrderEmpty = 4007,

    StationNotFound = 6511,
    PrinterConfigMissing = 6512,
    PrinterDisabled = 6513,

    ZoneNotFound = 7101,

    InternalError = 9001,
    /// A single transmission failed
    NetworkError = 9003,
    ConfigError = 9005,
    /// No address candidate answered
    PrinterNotAvailable = 9201,
    /// Retries exhausted
    PrintFailed = 9202,
    PrintCancelled = 9203,
    StorageFailed = 9401,
}

impl ErrorCode {
    const ALL: [ErrorCode; 17] = [
        ErrorCode::Success,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::InvalidRequest,
        ErrorCode::ValueOutOfRange,
        ErrorCode::OrderEmpty,
        ErrorCode::StationNotFound,
        ErrorCode::PrinterConfigMissing,
        ErrorCode::PrinterDisabled,
        ErrorCode::ZoneNotFound,
        ErrorCode::InternalError,
        ErrorCode::NetworkError,
        ErrorCode::ConfigError,
        ErrorCode::PrinterNotAvailable,
        ErrorCode::PrintFailed,
        ErrorCode::PrintCancelled,
        ErrorCode::StorageFailed,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default English message, used when no specific one is given
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "OK",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::OrderEmpty => "Order has no items for this station",
            ErrorCode::StationNotFound => "Station not found",
            ErrorCode::PrinterConfigMissing => "Station has no printer configured",
            ErrorCode::PrinterDisabled => "Station printer is disabled",
            ErrorCode::ZoneNotFound => "No zone covers this table number",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::NetworkError => "Printer connection failed",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::PrinterNotAvailable => "Printer is not reachable",
            ErrorCode::PrintFailed => "Print operation failed",
            ErrorCode::PrintCancelled => "Print job was cancelled",
            ErrorCode::StorageFailed => "Settings storage failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number that is not one of the [`ErrorCode`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}
