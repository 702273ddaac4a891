//! Printer Config Model

use serde::{Deserialize, Serialize};

/// Raw TCP port used by ESC/POS network printers
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

/// Ticket language, which also selects the printer code page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterLanguage {
    /// Turkish, CP857
    #[default]
    Tr,
    /// Chinese, GBK
    Zh,
}

/// Printer attached to a station (at most one per station)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfig {
    pub station_id: String,
    /// May be empty when the printer is only reachable through a share
    #[serde(default)]
    pub ip: String,
    /// 0 means [`DEFAULT_PRINTER_PORT`]
    #[serde(default)]
    pub port: u16,
    /// Windows share name, defaults to the uppercased station id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub language: PrinterLanguage,
}

fn default_enabled() -> bool {
    true
}

impl PrinterConfig {
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PRINTER_PORT
        } else {
            self.port
        }
    }

    pub fn effective_share(&self) -> String {
        match self.share_name.as_deref().map(str::trim) {
            Some(share) if !share.is_empty() => share.to_string(),
            _ => self.station_id.to_uppercase(),
        }
    }

    pub fn has_ip(&self) -> bool {
        !self.ip.trim().is_empty()
    }
}

/// Printer config payload for `PUT /{station}` (station id comes from the path)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfigInput {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: u16,
    pub share_name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub language: PrinterLanguage,
}

impl PrinterConfigInput {
    pub fn into_config(self, station_id: impl Into<String>) -> PrinterConfig {
        PrinterConfig {
            station_id: station_id.into(),
            ip: self.ip.trim().to_string(),
            port: self.port,
            share_name: self.share_name.filter(|s| !s.trim().is_empty()),
            enabled: self.enabled,
            language: self.language,
        }
    }
}
