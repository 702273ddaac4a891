//! Settings API Handlers

use axum::{Json, extract::State};
use shared::models::RestaurantSettings;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult};

/// GET /settings
pub async fn get(State(state): State<ServerState>) -> Json<ApiResponse<RestaurantSettings>> {
    Json(ApiResponse::success(state.settings.snapshot().as_ref().clone()))
}

/// PUT /settings
pub async fn replace(
    State(state): State<ServerState>,
    Json(mut payload): Json<RestaurantSettings>,
) -> AppResult<Json<ApiResponse<RestaurantSettings>>> {
    validate(&mut payload)?;

    let saved = state.settings.replace(payload)?;
    state.dispatcher.resolver().invalidate_all();
    tracing::info!(
        stations = saved.stations.len(),
        printers = saved.printers.len(),
        floors = saved.drink_station_routing.floors.len(),
        "Settings replaced"
    );

    Ok(Json(ApiResponse::success(saved.as_ref().clone())))
}

/// Reject inverted zone ranges; printer entries take their id from the map key
fn validate(settings: &mut RestaurantSettings) -> AppResult<()> {
    for zone in &settings.drink_station_routing.floors {
        if zone.start_table > zone.end_table {
            return Err(AppError::validation(format!(
                "Zone '{}' starts after it ends ({} > {})",
                zone.name, zone.start_table, zone.end_table
            ))
            .with_detail("zone", zone.name.clone()));
        }
    }

    for (station_id, printer) in settings.printers.iter_mut() {
        if printer.station_id != *station_id {
            printer.station_id = station_id.clone();
        }
    }
    Ok(())
}
