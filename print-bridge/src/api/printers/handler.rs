//! Station Printer Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use masa_printer::{DOTS_PER_COLUMN, Raster};
use serde::{Deserialize, Serialize};
use shared::models::{DEFAULT_STATION_ID, PrinterConfig, PrinterConfigInput, RestaurantSettings};
use shared::{AppError, ErrorCode};

use crate::api::jobs::PrintRequest;
use crate::api::print_outcome;
use crate::core::ServerState;
use crate::printing::{
    FontConfig, PrintResult, RoutingWarning, code_page_for, encode_escpos, encode_image, plan_job,
    router,
};
use crate::utils::{ApiResponse, AppResult};

const DEFAULT_SIZE_NAME: &str = "Varsayilan";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPrintRequest {
    #[serde(default)]
    pub font: Option<FontConfig>,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImagePrintRequest {
    /// Base64 image, bare or as a `data:image/png;base64,...` URL
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationPrintResponse {
    pub result: PrintResult,
    pub warnings: Vec<RoutingWarning>,
}

/// Label of a station, `GENEL` for the default bucket
fn station_label(station_id: &str, settings: &RestaurantSettings) -> AppResult<String> {
    match settings.station(station_id) {
        Some(station) => Ok(station.label()),
        None if station_id == DEFAULT_STATION_ID => Ok(DEFAULT_STATION_ID.to_uppercase()),
        None => Err(AppError::station_not_found(station_id)),
    }
}

/// Enabled printer of a station, or why there is none
fn usable_printer<'a>(
    station_id: &str,
    settings: &'a RestaurantSettings,
) -> AppResult<&'a PrinterConfig> {
    if let Some(printer) = router::printer_for(station_id, settings) {
        return Ok(printer);
    }
    match settings.printer(station_id) {
        Some(_) => Err(AppError::with_message(
            ErrorCode::PrinterDisabled,
            format!("Printer of station '{}' is disabled", station_id),
        )
        .with_detail("stationId", station_id)),
        None => Err(AppError::printer_config_missing(station_id)),
    }
}

/// POST /{station}/test
pub async fn test_print(
    State(state): State<ServerState>,
    Path(station_id): Path<String>,
    body: Option<Json<TestPrintRequest>>,
) -> AppResult<Json<ApiResponse<PrintResult>>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let settings = state.settings.snapshot();
    let label = station_label(&station_id, &settings)?;
    let printer = usable_printer(&station_id, &settings)?;

    let dispatcher = &state.dispatcher;
    let resolved = dispatcher
        .resolver()
        .resolve(&printer.station_id, printer, &settings)
        .await?;

    let font = request.font.unwrap_or_default();
    let size_name = request.size.as_deref().unwrap_or(DEFAULT_SIZE_NAME);
    let composer = dispatcher.composer();
    let ticket = composer.calibration(&label, font, size_name, printer.language, Utc::now());
    let data = encode_escpos(&ticket, composer.width(), code_page_for(printer.language));

    let result = dispatcher
        .dispatch(&station_id, &resolved, &data, &state.shutdown)
        .await;
    let result = print_outcome(result)?;
    Ok(Json(ApiResponse::success_with_message(
        format!("{} printed", size_name),
        result,
    )))
}

/// Base64 (or data URL) to a bitmap at most `max_dots` wide
fn decode_image(payload: &str, max_dots: u32) -> AppResult<Raster> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::validation(format!("Image is not valid base64: {}", e)))?;
    Raster::decode(&bytes, max_dots).map_err(|e| AppError::validation(e.to_string()))
}

/// POST /{station}/image
pub async fn print_image(
    State(state): State<ServerState>,
    Path(station_id): Path<String>,
    Json(payload): Json<ImagePrintRequest>,
) -> AppResult<Json<ApiResponse<PrintResult>>> {
    if payload.image.trim().is_empty() {
        return Err(AppError::validation("No image provided").with_detail("field", "image"));
    }
    let settings = state.settings.snapshot();
    station_label(&station_id, &settings)?;
    let printer = usable_printer(&station_id, &settings)?;

    let dispatcher = &state.dispatcher;
    let width = dispatcher.composer().width();
    let max_dots = width as u32 * DOTS_PER_COLUMN;
    let raster = tokio::task::spawn_blocking(move || decode_image(&payload.image, max_dots))
        .await
        .map_err(|e| AppError::internal(format!("Image decoding did not finish: {}", e)))??;

    let resolved = dispatcher
        .resolver()
        .resolve(&printer.station_id, printer, &settings)
        .await?;
    let data = encode_image(&raster, width, code_page_for(printer.language));
    tracing::info!(
        station_id = %station_id,
        width = raster.width(),
        height = raster.height(),
        "Printing image"
    );

    let result = dispatcher
        .dispatch(&station_id, &resolved, &data, &state.shutdown)
        .await;
    let result = print_outcome(result)?;
    Ok(Json(ApiResponse::success_with_message("Image printed", result)))
}

/// POST /{station}/print
pub async fn print_station(
    State(state): State<ServerState>,
    Path(station_id): Path<String>,
    Json(payload): Json<PrintRequest>,
) -> AppResult<Json<ApiResponse<StationPrintResponse>>> {
    let (order, menu, font) = payload.validate()?;
    let settings = state.settings.snapshot();
    station_label(&station_id, &settings)?;

    let plan = plan_job(&order, &settings, &menu);
    let Some(bucket) = plan.routing.bucket(&station_id) else {
        return Err(AppError::new(ErrorCode::OrderEmpty)
            .with_detail("stationId", station_id)
            .with_detail("orderId", order.id));
    };

    let result = state
        .dispatcher
        .dispatch_station(bucket, &settings, &plan.ctx, font, &state.shutdown)
        .await;
    let result = print_outcome(result)?;

    Ok(Json(ApiResponse::success(StationPrintResponse {
        result,
        warnings: plan.routing.warnings,
    })))
}

/// PUT /{station}
pub async fn upsert_printer(
    State(state): State<ServerState>,
    Path(station_id): Path<String>,
    Json(payload): Json<PrinterConfigInput>,
) -> AppResult<Json<ApiResponse<PrinterConfig>>> {
    station_label(&station_id, &state.settings.snapshot())?;

    let config = payload.into_config(&station_id);
    state.settings.upsert_printer(config.clone())?;
    state.dispatcher.resolver().invalidate(&station_id);

    tracing::info!(
        station_id = %station_id,
        ip = %config.ip,
        port = config.effective_port(),
        enabled = config.enabled,
        "Printer config saved"
    );
    Ok(Json(ApiResponse::success(config)))
}

/// DELETE /{station}
pub async fn delete_printer(
    State(state): State<ServerState>,
    Path(station_id): Path<String>,
) -> AppResult<Json<ApiResponse<PrinterConfig>>> {
    let removed = state
        .settings
        .remove_printer(&station_id)?
        .ok_or_else(|| AppError::printer_config_missing(&station_id))?;
    state.dispatcher.resolver().invalidate(&station_id);

    tracing::info!(station_id = %station_id, "Printer config removed");
    Ok(Json(ApiResponse::success(removed)))
}
