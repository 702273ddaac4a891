//! Station routing
//!
//! Groups the items of an order into one bucket per station. Items without
//! a usable station go to the reserved default bucket, so nothing is ever
//! dropped.

use std::collections::HashMap;

use serde::Serialize;
use shared::models::{DEFAULT_STATION_ID, Order, OrderItem, PrinterConfig, RestaurantSettings};
use tracing::{debug, warn};

use super::types::{MenuIndex, RoutingWarning, StationBucket, TicketItem, WarningKind};
use super::zone::ZoneContext;

const DEFAULT_LABEL: &str = "GENEL";

/// Buckets in print order plus the warnings raised while routing
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRouting {
    pub buckets: Vec<StationBucket>,
    pub warnings: Vec<RoutingWarning>,
}

impl StationRouting {
    pub fn item_count(&self) -> usize {
        self.buckets.iter().map(|b| b.items.len()).sum()
    }

    pub fn bucket(&self, station_id: &str) -> Option<&StationBucket> {
        self.buckets.iter().find(|b| b.station_id == station_id)
    }
}

/// Route every item of `order` to a station bucket
///
/// Buckets come out sorted by the station's configured `order`, the default
/// bucket last.
pub fn route(
    order: &Order,
    settings: &RestaurantSettings,
    menu: &MenuIndex,
    zone: ZoneContext<'_>,
) -> StationRouting {
    let mut warnings = Vec::new();
    let mut buckets: Vec<StationBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    if let ZoneContext::Unresolved = zone {
        warnings.push(RoutingWarning {
            kind: WarningKind::ZoneNotFound,
            message: format!(
                "Table {} is outside every zone, drink items use the default station",
                order.table_number
            ),
            menu_item_id: None,
            station_id: settings.default_station.clone(),
        });
    }

    for item in &order.items {
        let ticket_item = to_ticket_item(item, menu);
        let requested = match menu.get(&item.menu_item_id) {
            Some(menu_item) => menu_item
                .kitchen_station
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| retarget_drink(s, settings, zone)),
            None => {
                warnings.push(RoutingWarning {
                    kind: WarningKind::UnknownMenuItem,
                    message: format!("Menu item '{}' not found", item.menu_item_id),
                    menu_item_id: Some(item.menu_item_id.clone()),
                    station_id: None,
                });
                None
            }
        };

        let station_id = match requested {
            Some(station_id) => match check_station(&station_id, settings) {
                Ok(()) => station_id,
                Err(kind) => {
                    warnings.push(RoutingWarning {
                        kind,
                        message: warning_message(kind, &station_id),
                        menu_item_id: Some(item.menu_item_id.clone()),
                        station_id: Some(station_id),
                    });
                    DEFAULT_STATION_ID.to_string()
                }
            },
            None => {
                if menu.contains_key(&item.menu_item_id) {
                    warnings.push(RoutingWarning {
                        kind: WarningKind::NoStation,
                        message: format!("Menu item '{}' has no kitchen station", ticket_item.name),
                        menu_item_id: Some(item.menu_item_id.clone()),
                        station_id: None,
                    });
                }
                DEFAULT_STATION_ID.to_string()
            }
        };

        let slot = *index.entry(station_id.clone()).or_insert_with(|| {
            buckets.push(new_bucket(&station_id, settings));
            buckets.len() - 1
        });
        buckets[slot].items.push(ticket_item);
    }

    buckets.sort_by_key(|b| b.sort_key);

    for w in &warnings {
        warn!(kind = ?w.kind, order_id = %order.id, "{}", w.message);
    }
    debug!(
        order_id = %order.id,
        buckets = buckets.len(),
        items = order.items.len(),
        "Order routed"
    );

    StationRouting { buckets, warnings }
}

/// Printer serving the default bucket
///
/// `printers["genel"]` when enabled, otherwise the default station's printer.
pub fn default_printer(settings: &RestaurantSettings) -> Option<&PrinterConfig> {
    settings
        .printer(DEFAULT_STATION_ID)
        .filter(|p| p.enabled)
        .or_else(|| {
            settings
                .default_station
                .as_deref()
                .and_then(|id| settings.printer(id))
                .filter(|p| p.enabled)
        })
}

/// Printer serving a bucket, if any
pub fn printer_for<'a>(station_id: &str, settings: &'a RestaurantSettings) -> Option<&'a PrinterConfig> {
    if station_id == DEFAULT_STATION_ID {
        default_printer(settings)
    } else {
        settings.printer(station_id).filter(|p| p.enabled)
    }
}

/// Drink items follow the zone's drink station
fn retarget_drink(station_id: &str, settings: &RestaurantSettings, zone: ZoneContext<'_>) -> String {
    let routing = &settings.drink_station_routing;
    if routing.source_station.as_deref() != Some(station_id) {
        return station_id.to_string();
    }
    let target = match zone {
        ZoneContext::Resolved(assignment) => assignment.zone.drink_station.as_deref(),
        ZoneContext::Unresolved => settings.default_station.as_deref(),
        ZoneContext::NotConfigured => None,
    };
    target.unwrap_or(station_id).to_string()
}

fn check_station(station_id: &str, settings: &RestaurantSettings) -> Result<(), WarningKind> {
    if settings.station(station_id).is_none() {
        return Err(WarningKind::UnknownStation);
    }
    match settings.printer(station_id) {
        None => Err(WarningKind::MissingPrinter),
        Some(p) if !p.enabled => Err(WarningKind::PrinterDisabled),
        Some(_) => Ok(()),
    }
}

fn warning_message(kind: WarningKind, station_id: &str) -> String {
    match kind {
        WarningKind::UnknownStation => format!("Station '{}' is not configured", station_id),
        WarningKind::MissingPrinter => format!("Station '{}' has no printer", station_id),
        WarningKind::PrinterDisabled => format!("Printer of station '{}' is disabled", station_id),
        _ => format!("Station '{}' cannot print", station_id),
    }
}

fn new_bucket(station_id: &str, settings: &RestaurantSettings) -> StationBucket {
    let is_default = station_id == DEFAULT_STATION_ID;
    let station = settings.station(station_id);
    StationBucket {
        station_id: station_id.to_string(),
        label: station
            .map(|s| s.label())
            .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        items: Vec::new(),
        sort_key: (is_default, station.map_or(i32::MAX, |s| s.order)),
    }
}

fn to_ticket_item(item: &OrderItem, menu: &MenuIndex) -> TicketItem {
    let menu_item = menu.get(&item.menu_item_id);
    TicketItem {
        menu_item_id: item.menu_item_id.clone(),
        quantity: item.quantity,
        name: menu_item
            .map(|m| m.name.clone())
            .unwrap_or_else(|| item.menu_item_id.clone()),
        secondary_name: menu_item
            .and_then(|m| m.secondary_name.clone())
            .filter(|s| !s.trim().is_empty()),
        variations: item.variation_selections.clone(),
        notes: item.has_notes().then(|| item.notes.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printing::types::index_menu;
    use crate::printing::zone::{self, ZoneAssignment};
    use chrono::Utc;
    use shared::models::{DrinkStationRouting, FloorZone, MenuItem, PrinterLanguage, Station};

    fn station(id: &str, order: i32) -> Station {
        Station {
            id: id.into(),
            name: id.into(),
            display_label: id.to_uppercase(),
            emoji: String::new(),
            color: String::new(),
            order,
        }
    }

    fn printer(id: &str, enabled: bool) -> PrinterConfig {
        PrinterConfig {
            station_id: id.into(),
            ip: "10.0.0.1".into(),
            port: 9100,
            share_name: None,
            enabled,
            language: PrinterLanguage::Tr,
        }
    }

    fn menu_item(id: &str, station: Option<&str>) -> MenuItem {
        MenuItem {
            id: id.into(),
            name: id.into(),
            kitchen_station: station.map(Into::into),
            variants: vec![],
            secondary_name: None,
        }
    }

    fn order(items: &[&str]) -> Order {
        Order {
            id: "order-1".into(),
            table_number: 7,
            items: items
                .iter()
                .map(|id| OrderItem {
                    menu_item_id: (*id).into(),
                    quantity: 1,
                    variation_selections: vec![],
                    notes: String::new(),
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    fn settings() -> RestaurantSettings {
        let mut s = RestaurantSettings {
            stations: vec![station("tatli", 3), station("grill", 1), station("bar", 2)],
            ..Default::default()
        };
        s.printers.insert("grill".into(), printer("grill", true));
        s.printers.insert("tatli".into(), printer("tatli", true));
        s.printers.insert("bar".into(), printer("bar", false));
        s
    }

    fn menu() -> MenuIndex {
        index_menu([
            menu_item("adana", Some("grill")),
            menu_item("kunefe", Some("tatli")),
            menu_item("ayran", Some("bar")),
            menu_item("pide", Some("firin")),
            menu_item("ekmek", None),
        ])
    }

    #[test]
    fn test_groups_and_orders_by_station_order() {
        let routing = route(
            &order(&["kunefe", "adana", "adana"]),
            &settings(),
            &menu(),
            ZoneContext::NotConfigured,
        );
        let ids: Vec<_> = routing.buckets.iter().map(|b| b.station_id.as_str()).collect();
        assert_eq!(ids, ["grill", "tatli"]);
        assert_eq!(routing.bucket("grill").unwrap().items.len(), 2);
        assert_eq!(routing.bucket("grill").unwrap().label, "GRILL");
        assert!(routing.warnings.is_empty());
    }

    #[test]
    fn test_unusable_stations_fall_back_to_default_last() {
        let routing = route(
            &order(&["pide", "ayran", "ekmek", "mystery", "adana"]),
            &settings(),
            &menu(),
            ZoneContext::NotConfigured,
        );

        let ids: Vec<_> = routing.buckets.iter().map(|b| b.station_id.as_str()).collect();
        assert_eq!(ids, ["grill", "genel"]);
        assert_eq!(routing.bucket("genel").unwrap().items.len(), 4);
        assert!(routing.bucket("genel").unwrap().is_default());

        let kinds: Vec<_> = routing.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            [
                WarningKind::UnknownStation,
                WarningKind::PrinterDisabled,
                WarningKind::NoStation,
                WarningKind::UnknownMenuItem,
            ]
        );
    }

    #[test]
    fn test_missing_printer_goes_to_default() {
        let mut s = settings();
        s.printers.remove("tatli");
        let routing = route(&order(&["kunefe"]), &s, &menu(), ZoneContext::NotConfigured);
        assert_eq!(routing.buckets[0].station_id, "genel");
        assert_eq!(routing.warnings[0].kind, WarningKind::MissingPrinter);
    }

    #[test]
    fn test_no_item_is_dropped() {
        let items = ["adana", "pide", "kunefe", "ekmek", "x", "ayran", "adana"];
        let routing = route(&order(&items), &settings(), &menu(), ZoneContext::NotConfigured);
        assert_eq!(routing.item_count(), items.len());
    }

    #[test]
    fn test_drink_items_follow_zone_drink_station() {
        let mut s = settings();
        s.stations.push(station("teras-bar", 4));
        s.printers.insert("teras-bar".into(), printer("teras-bar", true));
        s.drink_station_routing = DrinkStationRouting {
            source_station: Some("bar".into()),
            floors: vec![FloorZone {
                name: "Teras".into(),
                start_table: 1,
                end_table: 10,
                is_takeaway: false,
                drink_station: Some("teras-bar".into()),
            }],
        };

        let assignment: ZoneAssignment = zone::resolve(7, &s.drink_station_routing.floors).unwrap();
        let routing = route(
            &order(&["ayran", "adana"]),
            &s,
            &menu(),
            ZoneContext::Resolved(&assignment),
        );
        assert_eq!(routing.bucket("teras-bar").unwrap().items[0].menu_item_id, "ayran");
        assert!(routing.warnings.is_empty());
    }

    #[test]
    fn test_unresolved_zone_uses_default_station_for_drinks() {
        let mut s = settings();
        s.default_station = Some("grill".into());
        s.drink_station_routing.source_station = Some("bar".into());

        let routing = route(&order(&["ayran"]), &s, &menu(), ZoneContext::Unresolved);
        assert_eq!(routing.buckets[0].station_id, "grill");
        assert_eq!(routing.warnings[0].kind, WarningKind::ZoneNotFound);
    }

    #[test]
    fn test_default_printer_fallback() {
        let mut s = settings();
        assert!(default_printer(&s).is_none());

        s.default_station = Some("grill".into());
        assert_eq!(default_printer(&s).unwrap().station_id, "grill");

        s.printers.insert("genel".into(), printer("genel", true));
        assert_eq!(default_printer(&s).unwrap().station_id, "genel");
    }
}
