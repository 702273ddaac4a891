//! Floor Zone Model

use serde::{Deserialize, Serialize};

/// Contiguous table range (floor, terrace, takeaway packets...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorZone {
    pub name: String,
    pub start_table: u32,
    pub end_table: u32,
    #[serde(default)]
    pub is_takeaway: bool,
    /// Station receiving drink items for tables in this zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drink_station: Option<String>,
}

impl FloorZone {
    /// Inclusive on both ends
    pub fn contains(&self, table_number: u32) -> bool {
        self.start_table <= table_number && table_number <= self.end_table
    }
}

/// Drink re-targeting rules (`drinkStationRouting` in the settings document)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkStationRouting {
    /// Items targeting this station are moved to the zone's drink station
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_station: Option<String>,
    #[serde(default)]
    pub floors: Vec<FloorZone>,
}
