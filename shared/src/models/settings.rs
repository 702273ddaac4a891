//! Restaurant Settings Model

use super::{DrinkStationRouting, PrinterConfig, Station};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the print engine reads about a restaurant
///
/// Handed out as an immutable snapshot per request; mutation produces a new
/// snapshot through the settings store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSettings {
    #[serde(default)]
    pub stations: Vec<Station>,
    /// Keyed by station id
    #[serde(default)]
    pub printers: BTreeMap<String, PrinterConfig>,
    #[serde(default)]
    pub drink_station_routing: DrinkStationRouting,
    /// Fallback station for unresolved zones and the default bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_station: Option<String>,
    /// LAN address of the host sharing the printers, used for UNC candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ip_hint: Option<String>,
}

impl RestaurantSettings {
    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn printer(&self, station_id: &str) -> Option<&PrinterConfig> {
        self.printers.get(station_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_settings_document() {
        let json = r#"{
            "stations": [
                {"id": "grill", "name": "Izgara", "displayLabel": "IZGARA", "order": 1},
                {"id": "bar", "name": "Bar", "order": 2}
            ],
            "printers": {
                "grill": {"stationId": "grill", "ip": "192.168.1.40"},
                "bar": {"stationId": "bar", "enabled": false}
            },
            "drinkStationRouting": {
                "sourceStation": "bar",
                "floors": [{"name": "Zemin", "startTable": 1, "endTable": 10}]
            },
            "defaultStation": "grill"
        }"#;
        let settings: RestaurantSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.station("grill").unwrap().label(), "IZGARA");
        assert!(settings.printer("grill").unwrap().enabled);
        assert!(!settings.printer("bar").unwrap().enabled);
        assert!(settings.printer("tatli").is_none());
        assert_eq!(settings.drink_station_routing.floors.len(), 1);
        assert!(settings.host_ip_hint.is_none());
    }

    #[test]
    fn test_empty_document() {
        let settings: RestaurantSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.stations.is_empty());
        assert!(settings.printers.is_empty());
    }
}
