//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single line of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub variation_selections: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl OrderItem {
    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}

/// Placed order, never mutated by printing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub table_number: u32,
    pub items: Vec<OrderItem>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
