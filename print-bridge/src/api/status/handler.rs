//! Printer Status Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use futures::future::join_all;
use masa_printer::PrinterAddress;
use serde::{Deserialize, Serialize};
use shared::models::{PrinterConfig, RestaurantSettings};

use crate::core::ServerState;
use crate::printing::{DispatchError, PrinterAddressResolver, ProbeAttempt};
use crate::utils::{ApiResponse, AppError, AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationStatus {
    pub station_id: String,
    pub label: String,
    pub enabled: bool,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub probes: Vec<ProbeAttempt>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOverview {
    pub online: usize,
    pub stations: Vec<StationStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub station_id: String,
    pub reachable: bool,
    pub attempts: Vec<ProbeAttempt>,
}

#[derive(Debug, Deserialize)]
pub struct ProbeRequest {
    pub address: String,
}

/// Re-resolve one printer from scratch
async fn check(
    resolver: &PrinterAddressResolver,
    printer: &PrinterConfig,
    settings: &RestaurantSettings,
) -> StationStatus {
    let station_id = printer.station_id.clone();
    let label = settings
        .station(&station_id)
        .map(|s| s.label())
        .unwrap_or_else(|| station_id.to_uppercase());

    let mut status = StationStatus {
        station_id,
        label,
        enabled: printer.enabled,
        reachable: false,
        address: None,
        error: None,
        probes: Vec::new(),
    };
    if !printer.enabled {
        return status;
    }

    resolver.invalidate(&status.station_id);
    match resolver.resolve(&status.station_id, printer, settings).await {
        Ok(resolved) => {
            status.reachable = true;
            status.address = Some(resolved.address.to_string());
        }
        Err(err) => {
            status.error = Some(err.to_string());
            if let DispatchError::PrinterUnreachable { attempts, .. } = err {
                status.probes = attempts;
            }
        }
    }
    status
}

/// GET /status
pub async fn overview(State(state): State<ServerState>) -> Json<ApiResponse<StatusOverview>> {
    let settings = state.settings.snapshot();
    let resolver = state.dispatcher.resolver();

    let stations = join_all(
        settings
            .printers
            .values()
            .map(|printer| check(resolver, printer, &settings)),
    )
    .await;
    let online = stations.iter().filter(|s| s.reachable).count();

    Json(ApiResponse::success(StatusOverview { online, stations }))
}

/// GET /status/{host}
///
/// A configured station id gets every candidate probed; anything else is
/// read as an address (`192.168.1.40`, `192.168.1.40:9101`, `printer:BAR`).
pub async fn host(
    State(state): State<ServerState>,
    Path(host): Path<String>,
) -> AppResult<Json<ApiResponse<Diagnosis>>> {
    let settings = state.settings.snapshot();
    let resolver = state.dispatcher.resolver();

    let diagnosis = match settings.printer(&host) {
        Some(printer) => {
            let attempts = resolver.diagnose(printer, &settings).await;
            Diagnosis {
                station_id: host,
                reachable: attempts.iter().any(|a| a.ok),
                attempts,
            }
        }
        None => {
            let address = parse_address(&host)?;
            let attempt = resolver.probe_one(&address).await;
            Diagnosis {
                station_id: host,
                reachable: attempt.ok,
                attempts: vec![attempt],
            }
        }
    };

    Ok(Json(ApiResponse::success(diagnosis)))
}

/// POST /probe
pub async fn probe(
    State(state): State<ServerState>,
    Json(payload): Json<ProbeRequest>,
) -> AppResult<Json<ApiResponse<ProbeAttempt>>> {
    let address = parse_address(&payload.address)?;
    let attempt = state.dispatcher.resolver().probe_one(&address).await;
    Ok(Json(ApiResponse::success(attempt)))
}

fn parse_address(input: &str) -> AppResult<PrinterAddress> {
    PrinterAddress::parse(input).map_err(|e| {
        AppError::validation(format!("Invalid printer address '{}': {}", input, e))
            .with_detail("address", input)
    })
}
