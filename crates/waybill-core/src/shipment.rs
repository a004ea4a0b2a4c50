// crates/waybill-core/src/shipment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::leg::Leg;

/// Aggregate shipment status, derived purely from the statuses of the
/// shipment's ordered legs. Written only by the status deriver — clients
/// never set it directly.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShipmentStatus {
    /// No legs, or the itinerary has not started.
    #[default]
    Pending,
    /// At least one leg is moving, or the itinerary is partway through.
    InTransit,
    /// Every leg has arrived or completed.
    Arrived,
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Arrived => "arrived",
        })
    }
}

/// The aggregate itinerary: an ordered sequence of legs plus derived status.
///
/// Legs are stored in two overlapping representations: the standalone `legs`
/// collection (ground truth, found via `Leg::shipment_id`) and the legacy
/// embedded `legs` array on this document. `leg_refs` is the shipment's
/// authoritative ordered view of its itinerary; as a set it must equal the
/// ids of the standalone legs that back-reference this shipment. That
/// invariant is not continuously enforced — the reconciliation service
/// restores it on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique identifier (UUID v7 for time-ordering).
    pub id: Uuid,
    /// Ordered leg ids — the shipment's view of its itinerary.
    #[serde(rename = "legRefs", default)]
    pub leg_refs: Vec<Uuid>,
    /// Derived aggregate status. Mutated only by the status deriver.
    #[serde(rename = "shipmentStatus", default)]
    pub shipment_status: ShipmentStatus,
    /// Independent order-workflow status, opaque to this engine.
    #[serde(rename = "orderStatus", default)]
    pub order_status: Option<String>,
    /// Shared external reference code (e.g. a booking or MAWB number) that
    /// legs may also carry. Used by diagnostics as a secondary discovery key.
    #[serde(rename = "referenceCode", default)]
    pub reference_code: Option<String>,
    /// Legacy embedded leg array. Read by fallback reads and diagnostics;
    /// rebuilt as a cached projection of ground truth by `repair`. New code
    /// never writes it independently.
    #[serde(default)]
    pub legs: Option<Vec<Leg>>,
    /// Creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Create a new shipment with no legs, status `Pending`.
    pub fn new() -> Self {
        let now = Utc::now();
        Shipment {
            id: Uuid::now_v7(),
            leg_refs: Vec::new(),
            shipment_status: ShipmentStatus::Pending,
            order_status: None,
            reference_code: None,
            legs: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for Shipment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_shipment_is_pending_and_empty() {
        let shipment = Shipment::new();
        assert_eq!(shipment.shipment_status, ShipmentStatus::Pending);
        assert!(shipment.leg_refs.is_empty());
        assert!(shipment.legs.is_none());
    }

    #[test]
    fn serialized_field_names_match_wire_shape() {
        let shipment = Shipment::new();
        let value = serde_json::to_value(&shipment).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["legRefs", "shipmentStatus", "orderStatus", "referenceCode", "legs"] {
            assert!(obj.contains_key(key), "missing wire field {key}");
        }
    }
}
