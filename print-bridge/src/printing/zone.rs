//! Table zone resolution
//!
//! Zones are contiguous table ranges. The first configured zone containing
//! the table wins, so overlapping ranges resolve by configuration order.

use serde::Serialize;
use shared::models::FloorZone;

use super::error::DispatchError;

/// Zone a table belongs to, plus its packet number for takeaway zones
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAssignment {
    pub zone: FloorZone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet_number: Option<u64>,
}

/// Zone lookup outcome as seen by the station router
#[derive(Debug, Clone, Copy)]
pub enum ZoneContext<'a> {
    /// No floors configured, zone-based routing is off
    NotConfigured,
    Resolved(&'a ZoneAssignment),
    /// Floors exist but none covers the table
    Unresolved,
}

impl<'a> ZoneContext<'a> {
    pub fn assignment(&self) -> Option<&'a ZoneAssignment> {
        match self {
            ZoneContext::Resolved(z) => Some(z),
            _ => None,
        }
    }
}

/// Resolve `table_number` against `floors` in configured order
pub fn resolve(table_number: u32, floors: &[FloorZone]) -> Result<ZoneAssignment, DispatchError> {
    let zone = floors
        .iter()
        .find(|z| z.contains(table_number))
        .ok_or(DispatchError::ZoneNotFound(table_number))?;

    // start <= table holds via `contains`; u64 so the last u32 table still counts
    let packet_number = zone
        .is_takeaway
        .then(|| u64::from(table_number - zone.start_table) + 1);

    Ok(ZoneAssignment {
        zone: zone.clone(),
        packet_number,
    })
}
