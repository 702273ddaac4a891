//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item as seen by the print engine (read-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Target station id, absent means the default bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitchen_station: Option<String>,
    #[serde(default)]
    pub variants: Vec<String>,
    /// Translated name printed under the main name (e.g. Chinese)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_name: Option<String>,
}
