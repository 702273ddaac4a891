//! Print Job Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::ErrorCode;
use shared::models::{MenuItem, Order};

use crate::core::ServerState;
use crate::printing::{FontConfig, JobReport, JobStatus, MenuIndex, index_menu};
use crate::utils::{ApiResponse, AppError, AppResult};

/// Order plus the menu items it references
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    pub order: Order,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub font: Option<FontConfig>,
}

impl PrintRequest {
    /// Reject orders that cannot produce a ticket, then index the menu
    pub(crate) fn validate(self) -> AppResult<(Order, MenuIndex, FontConfig)> {
        if self.order.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).with_detail("orderId", self.order.id));
        }
        if let Some(item) = self.order.items.iter().find(|i| i.quantity == 0) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Quantity of '{}' must be at least 1", item.menu_item_id),
            )
            .with_detail("menuItemId", item.menu_item_id.clone()));
        }
        Ok((self.order, index_menu(self.menu_items), self.font.unwrap_or_default()))
    }
}

/// POST /jobs
///
/// Always answers 200 with the report; per-station failures are in
/// `results`.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PrintRequest>,
) -> AppResult<Json<ApiResponse<JobReport>>> {
    let (order, menu, font) = payload.validate()?;
    let settings = state.settings.snapshot();

    let report = state
        .dispatcher
        .dispatch_job(&order, settings, &menu, font, &state.shutdown)
        .await;

    let message = match report.status {
        JobStatus::Completed => "Printed",
        JobStatus::PartiallyFailed => "Some stations failed",
        JobStatus::Failed => "All stations failed",
        JobStatus::Empty => "Nothing to print",
    };
    Ok(Json(ApiResponse::success_with_message(message, report)))
}
