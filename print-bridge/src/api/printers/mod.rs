//! Station printer API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /{station}/test | POST | Calibration ticket (optional font and size name) |
//! | /{station}/print | POST | Route an order, print only this station's bucket |
//! | /{station}/image | POST | Print a base64 PNG/JPEG as a raster |
//! | /{station} | PUT | Create or replace the station's printer config |
//! | /{station} | DELETE | Remove the station's printer config |

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{post, put},
};

use crate::core::ServerState;

/// Base64 images are much larger than order payloads
const IMAGE_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/{station}/test", post(handler::test_print))
        .route("/{station}/print", post(handler::print_station))
        .route(
            "/{station}/image",
            post(handler::print_image).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
        .route(
            "/{station}",
            put(handler::upsert_printer).delete(handler::delete_printer),
        )
}
