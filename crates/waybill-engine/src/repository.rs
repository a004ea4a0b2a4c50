// crates/waybill-engine/src/repository.rs
//
// The leg repository: the unified write/read surface over the two leg
// storage representations. Writes go to the standalone `legs` collection
// (ground truth) and to the owning shipment's `legRefs`; reads fall back
// from the standalone collection to the legacy embedded array, but never
// fabricate placeholder data on a miss.
//
// The coupled leg/`legRefs` writes in `create` and `delete` are not atomic;
// a crash between them leaves the shipment invariant violated. That is an
// accepted steady state — the reconciliation service restores the pair.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use waybill_core::changelog::{diff_fields, ChangeLogEntry, StatusHistoryEntry};
use waybill_core::error::TrackingError;
use waybill_core::leg::{Leg, LegPatch};
use waybill_core::normalize::{ensure_leg_label, normalize, normalize_patch};
use waybill_core::shipment::Shipment;
use waybill_core::status::{derive_status, order_legs};
use waybill_core::traits::{LegStore, ShipmentStore};

/// Repository over the `shipments` and `legs` collections.
pub struct LegRepository<S> {
    store: Arc<S>,
}

impl<S> LegRepository<S>
where
    S: ShipmentStore + LegStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Return the ordered legs of a shipment.
    ///
    /// Sources, in fallback order: the standalone collection queried by
    /// back-reference, then the shipment's `legRefs` resolved individually
    /// (catches legs whose back-reference drifted), then the legacy embedded
    /// array. Every returned leg is normalized. If no source has data the
    /// result is empty — a read never synthesizes legs.
    pub async fn list_for_shipment(&self, shipment_id: &Uuid) -> Result<Vec<Leg>, TrackingError> {
        let mut legs = self.store.list_legs_by_shipment(shipment_id).await?;
        if !legs.is_empty() {
            order_legs(&mut legs);
            legs.iter_mut().for_each(normalize);
            return Ok(legs);
        }

        let shipment = self
            .store
            .get_shipment(shipment_id)
            .await?
            .ok_or(TrackingError::ShipmentNotFound(*shipment_id))?;

        // Drift case: refs that still resolve even though the back-reference
        // query found nothing.
        let mut resolved = Vec::new();
        for leg_ref in &shipment.leg_refs {
            if let Some(leg) = self.store.get_leg(leg_ref).await? {
                resolved.push(leg);
            }
        }
        if !resolved.is_empty() {
            warn!(shipment_id = %shipment_id, "serving legs via legRefs; back-reference index is drifted");
            order_legs(&mut resolved);
            resolved.iter_mut().for_each(normalize);
            return Ok(resolved);
        }

        if let Some(mut embedded) = shipment.legs.clone() {
            if !embedded.is_empty() {
                debug!(shipment_id = %shipment_id, "serving legacy embedded legs");
                order_legs(&mut embedded);
                embedded.iter_mut().for_each(normalize);
                return Ok(embedded);
            }
        }

        Ok(Vec::new())
    }

    /// Create a leg for a shipment.
    ///
    /// Validates that the shipment exists and that origin/destination are
    /// present (on either side of their alias pairs), normalizes the fields,
    /// assigns `legOrder` (caller-supplied or appended at the end) and a
    /// collision-free display label, persists the leg, appends its id to the
    /// shipment's `legRefs`, and re-derives the shipment status.
    pub async fn create(
        &self,
        shipment_id: &Uuid,
        mut fields: LegPatch,
        actor: &str,
    ) -> Result<Leg, TrackingError> {
        let mut shipment = self
            .store
            .get_shipment(shipment_id)
            .await?
            .ok_or(TrackingError::ShipmentNotFound(*shipment_id))?;

        let siblings = self.store.list_legs_by_shipment(shipment_id).await?;

        let mut leg = Leg::new(*shipment_id);
        normalize_patch(&mut fields);
        fields.apply(&mut leg);
        normalize(&mut leg);

        if leg.origin.as_deref().unwrap_or("").is_empty() {
            return Err(TrackingError::Validation("origin is required".to_string()));
        }
        if leg.destination.as_deref().unwrap_or("").is_empty() {
            return Err(TrackingError::Validation("destination is required".to_string()));
        }

        if fields.leg_order.is_none() {
            leg.leg_order = siblings.iter().map(|l| l.leg_order).max().unwrap_or(0) + 1;
        }

        let taken: Vec<String> = siblings.iter().filter_map(|l| l.leg_id.clone()).collect();
        ensure_leg_label(&mut leg, &taken);

        // Seed the initial status-history entry for a non-default status.
        if let Some(entry) = leg.status_history.first_mut() {
            entry.status = leg.status;
        }
        leg.change_log
            .push(ChangeLogEntry::new(actor, "create", Default::default()));

        self.store.save_leg(&leg).await?;

        shipment.leg_refs.push(leg.id);
        self.rederive(&mut shipment).await?;

        debug!(shipment_id = %shipment_id, leg_id = %leg.id, "created leg");
        Ok(leg)
    }

    /// Apply a field patch to a leg.
    ///
    /// Normalizes the patch, appends to `statusHistory` when the status
    /// changes, records the field-level diff on the change log, persists the
    /// leg, and re-derives the owning shipment's status.
    pub async fn update(
        &self,
        leg_id: &Uuid,
        mut patch: LegPatch,
        actor: &str,
    ) -> Result<Leg, TrackingError> {
        let before = self
            .store
            .get_leg(leg_id)
            .await?
            .ok_or(TrackingError::LegNotFound(*leg_id))?;

        let mut leg = before.clone();
        normalize_patch(&mut patch);
        patch.apply(&mut leg);
        normalize(&mut leg);

        if leg.status != before.status {
            leg.status_history.push(StatusHistoryEntry {
                status: leg.status,
                timestamp: Utc::now(),
            });
        }

        let diffs = diff_fields(&before, &leg);
        if !diffs.is_empty() {
            leg.change_log.push(ChangeLogEntry::new(actor, "update", diffs));
            leg.updated_at = Utc::now();
        }

        self.store.save_leg(&leg).await?;

        match self.store.get_shipment(&leg.shipment_id).await? {
            Some(mut shipment) => self.rederive(&mut shipment).await?,
            // Orphaned leg: drift the reconciliation service will surface.
            None => warn!(leg_id = %leg_id, shipment_id = %leg.shipment_id,
                "owning shipment missing; skipping status derivation"),
        }

        Ok(leg)
    }

    /// Delete a leg and pull its id out of the owning shipment's `legRefs`.
    pub async fn delete(&self, leg_id: &Uuid) -> Result<(), TrackingError> {
        let leg = self
            .store
            .get_leg(leg_id)
            .await?
            .ok_or(TrackingError::LegNotFound(*leg_id))?;

        self.store.delete_leg(leg_id).await?;

        match self.store.get_shipment(&leg.shipment_id).await? {
            Some(mut shipment) => {
                shipment.leg_refs.retain(|r| r != leg_id);
                self.rederive(&mut shipment).await?;
            }
            None => warn!(leg_id = %leg_id, shipment_id = %leg.shipment_id,
                "owning shipment missing; leg removed without legRefs update"),
        }

        Ok(())
    }

    /// Re-run the status deriver for a shipment against ground truth and
    /// persist the result together with any pending shipment mutations.
    async fn rederive(&self, shipment: &mut Shipment) -> Result<(), TrackingError> {
        let mut legs = self.store.list_legs_by_shipment(&shipment.id).await?;
        order_legs(&mut legs);
        let derivation = derive_status(&legs);
        shipment.shipment_status = derivation.status;
        shipment.updated_at = Utc::now();
        self.store.save_shipment(shipment).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_core::leg::LegStatus;
    use waybill_core::shipment::{Shipment, ShipmentStatus};
    use waybill_store::MemoryStore;

    fn repo() -> (Arc<MemoryStore>, LegRepository<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), LegRepository::new(store))
    }

    async fn seed_shipment(store: &MemoryStore) -> Shipment {
        let shipment = Shipment::new();
        store.save_shipment(&shipment).await.unwrap();
        shipment
    }

    fn draft(origin: &str, destination: &str) -> LegPatch {
        LegPatch {
            origin: Some(origin.to_string()),
            destination: Some(destination.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_fails_for_missing_shipment() {
        let (_store, repo) = repo();
        let err = repo
            .create(&Uuid::now_v7(), draft("SFO", "NRT"), "tester")
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::ShipmentNotFound(_)));
    }

    #[tokio::test]
    async fn create_requires_origin_and_destination() {
        let (store, repo) = repo();
        let shipment = seed_shipment(&store).await;

        let err = repo
            .create(&shipment.id, LegPatch::default(), "tester")
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::Validation(_)));

        // Alias-only fields satisfy the requirement.
        let patch = LegPatch {
            from: Some("SFO".to_string()),
            to: Some("NRT".to_string()),
            ..Default::default()
        };
        let leg = repo.create(&shipment.id, patch, "tester").await.unwrap();
        assert_eq!(leg.origin.as_deref(), Some("SFO"));
        assert_eq!(leg.destination.as_deref(), Some("NRT"));
    }

    #[tokio::test]
    async fn create_appends_ref_and_assigns_order() {
        let (store, repo) = repo();
        let shipment = seed_shipment(&store).await;

        let first = repo.create(&shipment.id, draft("SFO", "HKG"), "tester").await.unwrap();
        let second = repo.create(&shipment.id, draft("HKG", "AMS"), "tester").await.unwrap();
        assert_eq!(first.leg_order, 1);
        assert_eq!(second.leg_order, 2);
        assert!(first.leg_id.is_some());
        assert_ne!(first.leg_id, second.leg_id);

        let stored = store.get_shipment(&shipment.id).await.unwrap().unwrap();
        assert_eq!(stored.leg_refs, vec![first.id, second.id]);
        assert_eq!(stored.shipment_status, ShipmentStatus::Pending);
    }

    #[tokio::test]
    async fn caller_supplied_order_is_respected() {
        let (store, repo) = repo();
        let shipment = seed_shipment(&store).await;
        let patch = LegPatch {
            leg_order: Some(7),
            ..draft("SFO", "HKG")
        };
        let leg = repo.create(&shipment.id, patch, "tester").await.unwrap();
        assert_eq!(leg.leg_order, 7);
    }

    #[tokio::test]
    async fn update_missing_leg_is_not_found() {
        let (_store, repo) = repo();
        let err = repo
            .update(&Uuid::now_v7(), LegPatch::default(), "tester")
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::LegNotFound(_)));
    }

    #[tokio::test]
    async fn update_records_history_diff_and_rederives() {
        let (store, repo) = repo();
        let shipment = seed_shipment(&store).await;
        let leg = repo.create(&shipment.id, draft("SFO", "HKG"), "tester").await.unwrap();
        let log_len = leg.change_log.len();

        let patch = LegPatch {
            status: Some(LegStatus::InTransit),
            ..Default::default()
        };
        let updated = repo.update(&leg.id, patch, "ops@example").await.unwrap();

        assert_eq!(updated.status, LegStatus::InTransit);
        assert_eq!(updated.status_history.last().unwrap().status, LegStatus::InTransit);
        assert_eq!(updated.change_log.len(), log_len + 1);
        let entry = updated.change_log.last().unwrap();
        assert_eq!(entry.actor, "ops@example");
        assert_eq!(entry.field_diffs["status"].new.as_deref(), Some("in_transit"));

        let stored = store.get_shipment(&shipment.id).await.unwrap().unwrap();
        assert_eq!(stored.shipment_status, ShipmentStatus::InTransit);
    }

    #[tokio::test]
    async fn noop_update_leaves_audit_trail_alone() {
        let (store, repo) = repo();
        let shipment = seed_shipment(&store).await;
        let leg = repo.create(&shipment.id, draft("SFO", "HKG"), "tester").await.unwrap();

        let updated = repo.update(&leg.id, LegPatch::default(), "tester").await.unwrap();
        assert_eq!(updated.change_log.len(), leg.change_log.len());
        assert_eq!(updated.status_history.len(), leg.status_history.len());
    }

    #[tokio::test]
    async fn delete_removes_leg_and_ref() {
        let (store, repo) = repo();
        let shipment = seed_shipment(&store).await;
        let keep = repo.create(&shipment.id, draft("SFO", "HKG"), "tester").await.unwrap();
        let gone = repo.create(&shipment.id, draft("HKG", "AMS"), "tester").await.unwrap();

        repo.delete(&gone.id).await.unwrap();

        let stored = store.get_shipment(&shipment.id).await.unwrap().unwrap();
        assert_eq!(stored.leg_refs, vec![keep.id]);
        let legs = repo.list_for_shipment(&shipment.id).await.unwrap();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].id, keep.id);

        let err = repo.delete(&gone.id).await.unwrap_err();
        assert!(matches!(err, TrackingError::LegNotFound(_)));
    }

    #[tokio::test]
    async fn list_falls_back_to_embedded_legs() {
        let (store, repo) = repo();
        let mut shipment = Shipment::new();
        let mut embedded = Leg::new(shipment.id);
        embedded.leg_order = 1;
        embedded.from = Some("SIN".to_string());
        shipment.legs = Some(vec![embedded]);
        store.save_shipment(&shipment).await.unwrap();

        let legs = repo.list_for_shipment(&shipment.id).await.unwrap();
        assert_eq!(legs.len(), 1);
        // Fallback reads are normalized on the way out.
        assert_eq!(legs[0].origin.as_deref(), Some("SIN"));
    }

    #[tokio::test]
    async fn read_miss_returns_empty_without_fabricating() {
        let (store, repo) = repo();
        let shipment = seed_shipment(&store).await;

        let legs = repo.list_for_shipment(&shipment.id).await.unwrap();
        assert!(legs.is_empty());
        assert_eq!(store.leg_count(), 0);
        let stored = store.get_shipment(&shipment.id).await.unwrap().unwrap();
        assert!(stored.legs.is_none());
    }

    #[tokio::test]
    async fn list_for_unknown_shipment_is_not_found() {
        let (_store, repo) = repo();
        let err = repo.list_for_shipment(&Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, TrackingError::ShipmentNotFound(_)));
    }

    #[tokio::test]
    async fn list_resolves_drifted_refs() {
        let (store, repo) = repo();
        let mut shipment = Shipment::new();

        // A leg whose back-reference points elsewhere but is still listed
        // in this shipment's refs.
        let stray = Leg::new(Uuid::now_v7());
        store.save_leg(&stray).await.unwrap();
        shipment.leg_refs.push(stray.id);
        store.save_shipment(&shipment).await.unwrap();

        let legs = repo.list_for_shipment(&shipment.id).await.unwrap();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].id, stray.id);
    }
}
