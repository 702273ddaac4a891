//! Print engine types
//!
//! Everything here is derived per order and thrown away after the job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{MenuItem, Order};
use std::collections::HashMap;
use std::fmt;

use super::zone::ZoneAssignment;

/// Emphasis applied to the table line, station label and item lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontConfig {
    pub bold: bool,
    pub double_height: bool,
    pub double_width: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            bold: true,
            double_height: true,
            double_width: false,
        }
    }
}

/// What the ticket header calls the order's table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "number", rename_all = "lowercase")]
pub enum TableRef {
    Table(u32),
    /// Takeaway packet number
    Packet(u64),
}

impl TableRef {
    pub fn for_order(table_number: u32, zone: Option<&ZoneAssignment>) -> Self {
        match zone.and_then(|z| z.packet_number) {
            Some(packet) => TableRef::Packet(packet),
            None => TableRef::Table(table_number),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRef::Table(n) => write!(f, "MASA {}", n),
            TableRef::Packet(n) => write!(f, "PAKET {}", n),
        }
    }
}

/// Header data shared by every ticket of one order
#[derive(Debug, Clone)]
pub struct TicketContext {
    pub table_ref: TableRef,
    pub order_ref: String,
    pub timestamp: DateTime<Utc>,
}

impl TicketContext {
    pub fn for_order(order: &Order, zone: Option<&ZoneAssignment>) -> Self {
        Self {
            table_ref: TableRef::for_order(order.table_number, zone),
            order_ref: shared::util::short_ref(&order.id).to_string(),
            timestamp: order.created_at,
        }
    }
}

/// One order line, resolved against the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketItem {
    pub menu_item_id: String,
    pub quantity: u32,
    pub name: String,
    pub secondary_name: Option<String>,
    pub variations: Vec<String>,
    pub notes: Option<String>,
}

/// Items routed to one station
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationBucket {
    pub station_id: String,
    pub label: String,
    pub items: Vec<TicketItem>,
    #[serde(skip)]
    pub(crate) sort_key: (bool, i32),
}

impl StationBucket {
    pub fn is_default(&self) -> bool {
        self.sort_key.0
    }
}

/// Why an item ended up in the default bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    NoStation,
    UnknownStation,
    MissingPrinter,
    PrinterDisabled,
    UnknownMenuItem,
    ZoneNotFound,
}

/// Non-fatal routing problem, reported with the job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingWarning {
    pub kind: WarningKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
}

// ========== Ticket ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    TableRef,
    StationLabel,
    Timestamp,
    OrderRef,
    Divider,
    Item,
    SecondaryName,
    Variation,
    Note,
    Footer,
    Info,
    /// Paper feed and cut, always the last line
    Cut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub align: Align,
    pub bold: bool,
    pub double_height: bool,
    pub double_width: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketLine {
    pub kind: LineKind,
    pub text: String,
    pub style: LineStyle,
}

/// Structured ticket, serialized to ESC/POS by [`super::encode_escpos`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub lines: Vec<TicketLine>,
    /// Lines fed before the cut
    pub feed_lines: u8,
}

impl Ticket {
    pub fn lines_of(&self, kind: LineKind) -> impl Iterator<Item = &TicketLine> {
        self.lines.iter().filter(move |l| l.kind == kind)
    }
}

// ========== Results ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintOutcome {
    Success,
    /// No address candidate answered
    Unreachable,
    /// Address resolved but every transmission attempt failed
    RetryExhausted,
    /// No usable printer configured
    ConfigError,
    /// Cancelled before a transmission attempt started
    Abandoned,
}

/// Per-station outcome
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintResult {
    pub station_id: String,
    pub outcome: PrintOutcome,
    pub latency_ms: u64,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-candidate probe results when resolution failed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub probes: Vec<ProbeAttempt>,
}

impl PrintResult {
    pub fn is_success(&self) -> bool {
        self.outcome == PrintOutcome::Success
    }

    pub(crate) fn failed(
        station_id: impl Into<String>,
        outcome: PrintOutcome,
        error: impl Into<String>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            outcome,
            latency_ms: 0,
            attempts: 0,
            address: None,
            error: Some(error.into()),
            probes: Vec::new(),
        }
    }
}

/// Single address probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeAttempt {
    pub address: String,
    pub kind: &'static str,
    pub ok: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    PartiallyFailed,
    Failed,
    /// Nothing to print
    Empty,
}

impl JobStatus {
    pub fn from_results(results: &[PrintResult]) -> Self {
        let ok = results.iter().filter(|r| r.is_success()).count();
        match (ok, results.len()) {
            (_, 0) => JobStatus::Empty,
            (ok, total) if ok == total => JobStatus::Completed,
            (0, _) => JobStatus::Failed,
            _ => JobStatus::PartiallyFailed,
        }
    }
}

/// Aggregated outcome of one order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub order_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZoneAssignment>,
    pub results: Vec<PrintResult>,
    pub warnings: Vec<RoutingWarning>,
}

/// Menu lookup by item id
pub type MenuIndex = HashMap<String, MenuItem>;

pub fn index_menu(items: impl IntoIterator<Item = MenuItem>) -> MenuIndex {
    items.into_iter().map(|m| (m.id.clone(), m)).collect()
}
