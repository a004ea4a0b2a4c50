// crates/waybill-store/src/rocks.rs
//
// RocksDB-backed document store for the `shipments` and `legs` collections.
//
// Key format:
//   - Primary:   `shipment:{uuid}` -> JSON-serialized Shipment
//                `leg:{uuid}`      -> JSON-serialized Leg
//   - Secondary: `shipleg:{shipment_uuid}:{leg_uuid}` -> empty (index only)
//                `legref:{code}:{leg_uuid}`           -> empty (index only)
//
// The `shipleg` index serves the query-by-back-reference read; the `legref`
// index serves secondary discovery by external reference code. Index entries
// are maintained on every save/delete, including removal of stale entries
// when a leg's `shipmentId` or reference codes change.

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options};
use uuid::Uuid;

use waybill_core::error::TrackingError;
use waybill_core::leg::Leg;
use waybill_core::shipment::Shipment;
use waybill_core::traits::{LegStore, ShipmentStore};

/// RocksDB wrapper implementing `ShipmentStore` and `LegStore`.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, TrackingError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| TrackingError::Storage(format!("failed to open RocksDB at {}: {}", path, e)))?;

        Ok(Self { db })
    }

    /// Primary key for a shipment: `shipment:{uuid}`.
    fn shipment_key(id: &Uuid) -> Vec<u8> {
        format!("shipment:{}", id).into_bytes()
    }

    /// Primary key for a leg: `leg:{uuid}`.
    fn leg_key(id: &Uuid) -> Vec<u8> {
        format!("leg:{}", id).into_bytes()
    }

    /// Back-reference index key: `shipleg:{shipment_uuid}:{leg_uuid}`.
    fn shipleg_key(shipment_id: &Uuid, leg_id: &Uuid) -> Vec<u8> {
        format!("shipleg:{}:{}", shipment_id, leg_id).into_bytes()
    }

    /// External-reference index key: `legref:{code}:{leg_uuid}`.
    fn legref_key(code: &str, leg_id: &Uuid) -> Vec<u8> {
        format!("legref:{}:{}", code, leg_id).into_bytes()
    }

    /// Put raw bytes, mapping errors to TrackingError::Storage.
    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), TrackingError> {
        self.db
            .put(key, value)
            .map_err(|e| TrackingError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Get raw bytes, mapping errors to TrackingError::Storage.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, TrackingError> {
        self.db
            .get(key)
            .map_err(|e| TrackingError::Storage(format!("RocksDB get failed: {}", e)))
    }

    /// Delete a key, mapping errors to TrackingError::Storage.
    fn delete_raw(&self, key: &[u8]) -> Result<(), TrackingError> {
        self.db
            .delete(key)
            .map_err(|e| TrackingError::Storage(format!("RocksDB delete failed: {}", e)))
    }

    /// Collect the leg ids under an index prefix (`shipleg:…:` / `legref:…:`).
    fn ids_under_prefix(&self, prefix: &str) -> Result<Vec<Uuid>, TrackingError> {
        let prefix = prefix.as_bytes();
        let mut ids = Vec::new();

        let iter = self.db.prefix_iterator(prefix);
        for item in iter {
            let (key, _value) =
                item.map_err(|e| TrackingError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(prefix) {
                break;
            }

            // Extract the UUID from the key suffix (bytes after the prefix).
            let uuid_bytes = &key[prefix.len()..];
            let uuid_str = std::str::from_utf8(uuid_bytes).unwrap_or("");
            if let Ok(id) = Uuid::parse_str(uuid_str) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    /// Public accessor: get a leg synchronously. Useful for internal callers
    /// that already hold a reference outside the async trait.
    pub fn get_leg_sync(&self, id: &Uuid) -> Result<Option<Leg>, TrackingError> {
        match self.get_raw(&Self::leg_key(id))? {
            Some(bytes) => {
                let leg: Leg = serde_json::from_slice(&bytes)?;
                Ok(Some(leg))
            }
            None => Ok(None),
        }
    }

    /// Public accessor: get a shipment synchronously.
    pub fn get_shipment_sync(&self, id: &Uuid) -> Result<Option<Shipment>, TrackingError> {
        match self.get_raw(&Self::shipment_key(id))? {
            Some(bytes) => {
                let shipment: Shipment = serde_json::from_slice(&bytes)?;
                Ok(Some(shipment))
            }
            None => Ok(None),
        }
    }

    /// Remove the secondary index entries for an existing version of a leg.
    fn remove_leg_indexes(&self, leg: &Leg) -> Result<(), TrackingError> {
        self.delete_raw(&Self::shipleg_key(&leg.shipment_id, &leg.id))?;
        for code in leg.reference_codes() {
            self.delete_raw(&Self::legref_key(&code, &leg.id))?;
        }
        Ok(())
    }

    /// Low-level: store a leg with its primary key and secondary index
    /// entries, clearing stale index entries when the back-reference or
    /// reference codes changed.
    fn save_leg_sync(&self, leg: &Leg) -> Result<(), TrackingError> {
        if let Some(existing) = self.get_leg_sync(&leg.id)? {
            if existing.shipment_id != leg.shipment_id
                || existing.reference_codes() != leg.reference_codes()
            {
                self.remove_leg_indexes(&existing)?;
            }
        }

        let json = serde_json::to_vec(leg)?;
        self.put_raw(&Self::leg_key(&leg.id), &json)?;
        // Index entries carry empty values — existence is the signal.
        self.put_raw(&Self::shipleg_key(&leg.shipment_id, &leg.id), &[])?;
        for code in leg.reference_codes() {
            self.put_raw(&Self::legref_key(&code, &leg.id), &[])?;
        }
        Ok(())
    }
}

#[async_trait]
impl ShipmentStore for RocksStore {
    async fn save_shipment(&self, shipment: &Shipment) -> Result<(), TrackingError> {
        let json = serde_json::to_vec(shipment)?;
        self.put_raw(&Self::shipment_key(&shipment.id), &json)
    }

    async fn get_shipment(&self, id: &Uuid) -> Result<Option<Shipment>, TrackingError> {
        self.get_shipment_sync(id)
    }

    async fn list_shipments(&self) -> Result<Vec<Shipment>, TrackingError> {
        let prefix = b"shipment:";
        let mut shipments = Vec::new();

        let iter = self.db.prefix_iterator(prefix);
        for item in iter {
            let (key, value) =
                item.map_err(|e| TrackingError::Storage(format!("RocksDB iteration error: {}", e)))?;
            if !key.starts_with(prefix) {
                break;
            }
            let shipment: Shipment = serde_json::from_slice(&value)?;
            shipments.push(shipment);
        }

        Ok(shipments)
    }

    async fn delete_shipment(&self, id: &Uuid) -> Result<(), TrackingError> {
        self.delete_raw(&Self::shipment_key(id))
    }
}

#[async_trait]
impl LegStore for RocksStore {
    async fn save_leg(&self, leg: &Leg) -> Result<(), TrackingError> {
        self.save_leg_sync(leg)
    }

    async fn get_leg(&self, id: &Uuid) -> Result<Option<Leg>, TrackingError> {
        self.get_leg_sync(id)
    }

    async fn list_legs_by_shipment(&self, shipment_id: &Uuid) -> Result<Vec<Leg>, TrackingError> {
        let ids = self.ids_under_prefix(&format!("shipleg:{}:", shipment_id))?;
        let mut legs = Vec::new();
        for id in ids {
            if let Some(leg) = self.get_leg_sync(&id)? {
                legs.push(leg);
            }
        }
        Ok(legs)
    }

    async fn list_legs_by_reference(&self, code: &str) -> Result<Vec<Leg>, TrackingError> {
        let ids = self.ids_under_prefix(&format!("legref:{}:", code))?;
        let mut legs = Vec::new();
        for id in ids {
            if let Some(leg) = self.get_leg_sync(&id)? {
                legs.push(leg);
            }
        }
        Ok(legs)
    }

    async fn delete_leg(&self, id: &Uuid) -> Result<(), TrackingError> {
        // Remove the index entries first, if the leg exists.
        if let Some(existing) = self.get_leg_sync(id)? {
            self.remove_leg_indexes(&existing)?;
        }
        self.delete_raw(&Self::leg_key(id))
    }
}
