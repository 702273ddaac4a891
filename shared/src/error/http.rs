//! HTTP status per error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::ValidationFailed | Self::InvalidRequest | Self::ValueOutOfRange => {
                StatusCode::BAD_REQUEST
            }

            Self::NotFound
            | Self::StationNotFound
            | Self::PrinterConfigMissing
            | Self::ZoneNotFound => StatusCode::NOT_FOUND,

            Self::PrinterDisabled => StatusCode::CONFLICT,
            Self::OrderEmpty => StatusCode::UNPROCESSABLE_ENTITY,

            // Transient, the dashboard may retry
            Self::NetworkError | Self::PrinterNotAvailable | Self::PrintCancelled => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // Printer accepted a connection but the job never went through
            Self::PrintFailed => StatusCode::BAD_GATEWAY,

            Self::InternalError | Self::ConfigError | Self::StorageFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::ZoneNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ErrorCode::PrinterNotAvailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ErrorCode::PrintFailed.http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ErrorCode::StorageFailed.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
