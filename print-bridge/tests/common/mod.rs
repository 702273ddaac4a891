//! In-memory printers for integration tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use masa_printer::{PrintError, PrinterAddress};
use parking_lot::Mutex;
use print_bridge::printing::PrinterLink;
use shared::models::{
    MenuItem, Order, OrderItem, PrinterConfig, PrinterLanguage, RestaurantSettings, Station,
};

/// Printer link where each address is online, flaky (probe ok, send fails)
/// or absent
#[derive(Default)]
pub struct MockLink {
    online: Mutex<HashSet<String>>,
    flaky: Mutex<HashSet<String>>,
    send_delay: Mutex<Duration>,
    probes: Mutex<Vec<String>>,
    sends: Mutex<Vec<String>>,
    /// Bytes per address in arrival order, written in small chunks
    received: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockLink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn online(&self, address: &str) {
        self.online.lock().insert(address.to_string());
    }

    pub fn offline(&self, address: &str) {
        self.online.lock().remove(address);
    }

    pub fn flaky(&self, address: &str) {
        self.flaky.lock().insert(address.to_string());
    }

    pub fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock() = delay;
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().clone()
    }

    pub fn send_count(&self, address: &str) -> usize {
        self.sends.lock().iter().filter(|a| *a == address).count()
    }

    pub fn received(&self, address: &str) -> Vec<u8> {
        self.received.lock().get(address).cloned().unwrap_or_default()
    }

    fn answers(&self, address: &str) -> bool {
        self.online.lock().contains(address) || self.flaky.lock().contains(address)
    }
}

#[async_trait]
impl PrinterLink for MockLink {
    async fn probe(&self, address: &PrinterAddress, _timeout: Duration) -> Result<(), PrintError> {
        let key = address.to_string();
        self.probes.lock().push(key.clone());
        if self.answers(&key) {
            Ok(())
        } else {
            Err(PrintError::Connection(format!("{} refused", key)))
        }
    }

    async fn send(&self, address: &PrinterAddress, data: &[u8]) -> Result<(), PrintError> {
        let key = address.to_string();
        self.sends.lock().push(key.clone());

        if !self.online.lock().contains(&key) {
            return Err(PrintError::Connection(format!("{} refused", key)));
        }

        let delay = *self.send_delay.lock();
        for chunk in data.chunks(16) {
            self.received
                .lock()
                .entry(key.clone())
                .or_default()
                .extend_from_slice(chunk);
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }
}

pub fn station(id: &str, label: &str, order: i32) -> Station {
    Station {
        id: id.into(),
        name: label.into(),
        display_label: label.into(),
        emoji: String::new(),
        color: String::new(),
        order,
    }
}

pub fn printer(station_id: &str, ip: &str, port: u16) -> PrinterConfig {
    PrinterConfig {
        station_id: station_id.into(),
        ip: ip.into(),
        port,
        share_name: None,
        enabled: true,
        language: PrinterLanguage::Tr,
    }
}

/// Grill, dessert and bar stations with printers on 10.0.0.{1,2,3}
pub fn settings() -> RestaurantSettings {
    let mut settings = RestaurantSettings {
        stations: vec![
            station("grill", "IZGARA", 1),
            station("tatli", "TATLI", 2),
            station("bar", "BAR", 3),
        ],
        ..Default::default()
    };
    for (id, ip) in [("grill", "10.0.0.1"), ("tatli", "10.0.0.2"), ("bar", "10.0.0.3")] {
        settings.printers.insert(id.into(), printer(id, ip, 9100));
    }
    settings
}

pub fn menu() -> Vec<MenuItem> {
    let item = |id: &str, name: &str, station: Option<&str>| MenuItem {
        id: id.into(),
        name: name.into(),
        kitchen_station: station.map(Into::into),
        variants: vec![],
        secondary_name: None,
    };
    vec![
        item("adana", "Adana Kebap", Some("grill")),
        item("kunefe", "Künefe", Some("tatli")),
        item("ayran", "Ayran", Some("bar")),
        item("pide", "Kaşarlı Pide", Some("firin")),
    ]
}

pub fn order(id: &str, table: u32, items: &[&str]) -> Order {
    Order {
        id: id.into(),
        table_number: table,
        items: items
            .iter()
            .map(|menu_item_id| OrderItem {
                menu_item_id: (*menu_item_id).into(),
                quantity: 1,
                variation_selections: vec![],
                notes: String::new(),
            })
            .collect(),
        created_at: Utc::now(),
    }
}
