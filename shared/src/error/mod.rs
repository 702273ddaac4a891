//! Error codes and the JSON envelope shared by the bridge and its clients
//!
//! Codes are grouped by thousands: 0xxx request, 4xxx order, 6xxx station,
//! 7xxx table, 9xxx system. See [`ErrorCode`] for the full list.
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::printer_unreachable("grill").with_detail("attempts", 4);
//! assert_eq!(err.code, ErrorCode::PrinterNotAvailable);
//!
//! let body: ApiResponse<()> = err.into();
//! assert_eq!(body.code, 9201);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
