// crates/waybill-store/src/memory.rs
//
// In-memory document store implementing the `ShipmentStore` and `LegStore`
// traits. Backs engine tests and CLI dry runs; query-by-field reads are
// linear scans, which is fine at those scales.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use waybill_core::error::TrackingError;
use waybill_core::leg::Leg;
use waybill_core::shipment::Shipment;
use waybill_core::traits::{LegStore, ShipmentStore};

/// In-memory store: one `HashMap` table per collection.
#[derive(Debug)]
pub struct MemoryStore {
    shipments: RwLock<HashMap<Uuid, Shipment>>,
    legs: RwLock<HashMap<Uuid, Leg>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            shipments: RwLock::new(HashMap::new()),
            legs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of legs currently stored.
    pub fn leg_count(&self) -> usize {
        self.legs.read().expect("RwLock poisoned").len()
    }

    /// Number of shipments currently stored.
    pub fn shipment_count(&self) -> usize {
        self.shipments.read().expect("RwLock poisoned").len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShipmentStore for MemoryStore {
    async fn save_shipment(&self, shipment: &Shipment) -> Result<(), TrackingError> {
        self.shipments
            .write()
            .expect("RwLock poisoned")
            .insert(shipment.id, shipment.clone());
        Ok(())
    }

    async fn get_shipment(&self, id: &Uuid) -> Result<Option<Shipment>, TrackingError> {
        Ok(self.shipments.read().expect("RwLock poisoned").get(id).cloned())
    }

    async fn list_shipments(&self) -> Result<Vec<Shipment>, TrackingError> {
        Ok(self
            .shipments
            .read()
            .expect("RwLock poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn delete_shipment(&self, id: &Uuid) -> Result<(), TrackingError> {
        self.shipments.write().expect("RwLock poisoned").remove(id);
        Ok(())
    }
}

#[async_trait]
impl LegStore for MemoryStore {
    async fn save_leg(&self, leg: &Leg) -> Result<(), TrackingError> {
        self.legs
            .write()
            .expect("RwLock poisoned")
            .insert(leg.id, leg.clone());
        Ok(())
    }

    async fn get_leg(&self, id: &Uuid) -> Result<Option<Leg>, TrackingError> {
        Ok(self.legs.read().expect("RwLock poisoned").get(id).cloned())
    }

    async fn list_legs_by_shipment(&self, shipment_id: &Uuid) -> Result<Vec<Leg>, TrackingError> {
        Ok(self
            .legs
            .read()
            .expect("RwLock poisoned")
            .values()
            .filter(|leg| leg.shipment_id == *shipment_id)
            .cloned()
            .collect())
    }

    async fn list_legs_by_reference(&self, code: &str) -> Result<Vec<Leg>, TrackingError> {
        Ok(self
            .legs
            .read()
            .expect("RwLock poisoned")
            .values()
            .filter(|leg| {
                leg.tracking_number.as_deref() == Some(code)
                    || leg.mawb_number.as_deref() == Some(code)
            })
            .cloned()
            .collect())
    }

    async fn delete_leg(&self, id: &Uuid) -> Result<(), TrackingError> {
        self.legs.write().expect("RwLock poisoned").remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_get_round_trip() {
        let store = MemoryStore::new();
        let shipment = Shipment::new();
        store.save_shipment(&shipment).await.unwrap();

        let mut leg = Leg::new(shipment.id);
        leg.tracking_number = Some("176-00000017".to_string());
        store.save_leg(&leg).await.unwrap();

        let loaded = store.get_leg(&leg.id).await.unwrap().unwrap();
        assert_eq!(loaded.shipment_id, shipment.id);
        assert!(store.get_shipment(&shipment.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn query_by_shipment_filters_other_shipments() {
        let store = MemoryStore::new();
        let a = Shipment::new();
        let b = Shipment::new();
        store.save_leg(&Leg::new(a.id)).await.unwrap();
        store.save_leg(&Leg::new(a.id)).await.unwrap();
        store.save_leg(&Leg::new(b.id)).await.unwrap();

        assert_eq!(store.list_legs_by_shipment(&a.id).await.unwrap().len(), 2);
        assert_eq!(store.list_legs_by_shipment(&b.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn query_by_reference_matches_both_alias_fields() {
        let store = MemoryStore::new();
        let shipment = Shipment::new();

        let mut tracked = Leg::new(shipment.id);
        tracked.tracking_number = Some("REF-9".to_string());
        store.save_leg(&tracked).await.unwrap();

        let mut mawb = Leg::new(shipment.id);
        mawb.mawb_number = Some("REF-9".to_string());
        store.save_leg(&mawb).await.unwrap();

        assert_eq!(store.list_legs_by_reference("REF-9").await.unwrap().len(), 2);
        assert!(store.list_legs_by_reference("REF-0").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let leg = Leg::new(Uuid::now_v7());
        store.save_leg(&leg).await.unwrap();
        store.delete_leg(&leg.id).await.unwrap();
        store.delete_leg(&leg.id).await.unwrap();
        assert!(store.get_leg(&leg.id).await.unwrap().is_none());
    }
}
