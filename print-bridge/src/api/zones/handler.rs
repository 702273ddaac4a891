//! Zone API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::printing::{ZoneAssignment, zone};
use crate::utils::{ApiResponse, AppError, AppResult};

/// GET /zones/{table}
pub async fn lookup(
    State(state): State<ServerState>,
    Path(table): Path<u32>,
) -> AppResult<Json<ApiResponse<ZoneAssignment>>> {
    let settings = state.settings.snapshot();
    let floors = &settings.drink_station_routing.floors;
    if floors.is_empty() {
        return Err(AppError::config("No floor zones configured"));
    }

    let assignment = zone::resolve(table, floors)?;
    Ok(Json(ApiResponse::success(assignment)))
}
