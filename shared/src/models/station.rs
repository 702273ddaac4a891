//! Station Model

use serde::{Deserialize, Serialize};

/// Reserved id of the catch-all bucket for items without a usable station
pub const DEFAULT_STATION_ID: &str = "genel";

/// Kitchen or bar station (grill, cold kitchen, bar, dessert...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    /// Label printed in the ticket header, e.g. `IZGARA`
    #[serde(default)]
    pub display_label: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub color: String,
    /// Ticket sequencing, lower prints first
    #[serde(default)]
    pub order: i32,
}

impl Station {
    /// Header label, falling back to the uppercased name
    pub fn label(&self) -> String {
        if self.display_label.trim().is_empty() {
            self.name.to_uppercase()
        } else {
            self.display_label.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_falls_back_to_name() {
        let mut station: Station =
            serde_json::from_str(r#"{"id":"grill","name":"Izgara"}"#).unwrap();
        assert_eq!(station.label(), "IZGARA");
        assert_eq!(station.order, 0);

        station.display_label = "MANGAL".into();
        assert_eq!(station.label(), "MANGAL");
    }
}
