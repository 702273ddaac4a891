//! Data models
//!
//! Shared between the print bridge and the dashboard (via API).
//! Wire format is camelCase JSON, matching the settings documents the
//! dashboard already stores.

pub mod floor_zone;
pub mod menu_item;
pub mod order;
pub mod printer_config;
pub mod settings;
pub mod station;

// Re-exports
pub use floor_zone::*;
pub use menu_item::*;
pub use order::*;
pub use printer_config::*;
pub use settings::*;
pub use station::*;
