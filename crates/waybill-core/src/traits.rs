// crates/waybill-core/src/traits.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TrackingError;
use crate::leg::Leg;
use crate::shipment::Shipment;

/// Trait for the `shipments` document collection.
///
/// Implemented by waybill-store (RocksDB and in-memory backends). The store
/// is non-transactional: callers performing coupled shipment/leg writes get
/// no atomicity guarantee and rely on the reconciliation service as the
/// backstop.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Save a shipment. Overwrites if the id already exists.
    async fn save_shipment(&self, shipment: &Shipment) -> Result<(), TrackingError>;

    /// Retrieve a shipment by id.
    async fn get_shipment(&self, id: &Uuid) -> Result<Option<Shipment>, TrackingError>;

    /// List all shipments.
    async fn list_shipments(&self) -> Result<Vec<Shipment>, TrackingError>;

    /// Delete a shipment by id. Deleting a missing shipment is a no-op.
    async fn delete_shipment(&self, id: &Uuid) -> Result<(), TrackingError>;
}

/// Trait for the standalone `legs` document collection — the engine's ground
/// truth for which legs belong to a shipment.
#[async_trait]
pub trait LegStore: Send + Sync {
    /// Save a leg. Overwrites if the id already exists.
    async fn save_leg(&self, leg: &Leg) -> Result<(), TrackingError>;

    /// Retrieve a leg by id.
    async fn get_leg(&self, id: &Uuid) -> Result<Option<Leg>, TrackingError>;

    /// List all legs whose `shipmentId` back-reference matches, in no
    /// particular order (callers sort with `order_legs`).
    async fn list_legs_by_shipment(&self, shipment_id: &Uuid) -> Result<Vec<Leg>, TrackingError>;

    /// List all legs carrying the given external reference code as their
    /// tracking or MAWB number.
    async fn list_legs_by_reference(&self, code: &str) -> Result<Vec<Leg>, TrackingError>;

    /// Delete a leg by id. Deleting a missing leg is a no-op.
    async fn delete_leg(&self, id: &Uuid) -> Result<(), TrackingError>;
}
