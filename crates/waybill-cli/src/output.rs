// crates/waybill-cli/src/output.rs
//
// Output formatting utilities for the Waybill CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

use waybill_core::leg::Leg;
use waybill_core::shipment::Shipment;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// One row of the `leg list` table.
#[derive(Tabled)]
pub struct LegRow {
    pub id: String,
    pub label: String,
    pub order: i64,
    pub origin: String,
    pub destination: String,
    pub carrier: String,
    pub status: String,
}

impl From<&Leg> for LegRow {
    fn from(leg: &Leg) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        LegRow {
            id: leg.id.to_string(),
            label: text(&leg.leg_id),
            order: leg.leg_order,
            origin: text(&leg.origin),
            destination: text(&leg.destination),
            carrier: text(&leg.carrier),
            status: leg.status.to_string(),
        }
    }
}

/// One row of the `shipment list` table.
#[derive(Tabled)]
pub struct ShipmentRow {
    pub id: String,
    pub status: String,
    pub legs: usize,
    pub reference: String,
}

impl From<&Shipment> for ShipmentRow {
    fn from(shipment: &Shipment) -> Self {
        ShipmentRow {
            id: shipment.id.to_string(),
            status: shipment.shipment_status.to_string(),
            legs: shipment.leg_refs.len(),
            reference: shipment
                .reference_code
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}
