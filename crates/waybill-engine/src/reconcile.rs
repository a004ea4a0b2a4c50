// crates/waybill-engine/src/reconcile.rs
//
// The reconciliation service: detects and repairs divergence between a
// shipment's `legRefs` view and the standalone leg collection.
//
// The standalone collection (found by `shipmentId` back-reference) is the
// sole ground truth. `diagnose` reports every discovery path without
// mutating anything; `repair` rewrites `legRefs` from ground truth, rebuilds
// the legacy embedded array as a cached projection, and re-derives status.
// Repair is idempotent and exposed as a first-class operation — it is the
// backstop for the engine's non-atomic coupled writes.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use waybill_core::error::TrackingError;
use waybill_core::shipment::ShipmentStatus;
use waybill_core::status::{derive_status, order_legs};
use waybill_core::traits::{LegStore, ShipmentStore};

/// Non-mutating drift report for one shipment: the legs each discovery
/// method found, the deduplicated union, and whether `legRefs` has drifted
/// from ground truth.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    #[serde(rename = "shipmentId")]
    pub shipment_id: Uuid,
    /// Legs found by `shipmentId` back-reference (ground truth), in
    /// itinerary order.
    #[serde(rename = "byBackReference")]
    pub by_back_reference: Vec<Uuid>,
    /// Legs found by resolving the shipment's `legRefs`.
    #[serde(rename = "byLegRefs")]
    pub by_leg_refs: Vec<Uuid>,
    /// `legRefs` entries that resolve to no leg record.
    #[serde(rename = "missingRefs")]
    pub missing_refs: Vec<Uuid>,
    /// Legs embedded directly in the shipment document.
    pub embedded: Vec<Uuid>,
    /// Legs discovered via the shipment's external reference code.
    #[serde(rename = "byReferenceCode")]
    pub by_reference_code: Vec<Uuid>,
    /// Deduplicated union of every discovery method, in discovery order.
    pub union: Vec<Uuid>,
    /// Whether `legRefs` (as a set) differs from the back-reference set.
    pub drifted: bool,
}

impl DiagnosisReport {
    /// The drift described as a `TrackingError::Inconsistent`, if any.
    ///
    /// Diagnostics never raise this as a failure; callers that want an error
    /// value (e.g. to log or surface) build one here.
    pub fn inconsistency(&self) -> Option<TrackingError> {
        if !self.drifted {
            return None;
        }
        Some(TrackingError::Inconsistent {
            shipment_id: self.shipment_id,
            detail: format!(
                "legRefs holds {} entries ({} unresolvable); ground truth has {} legs",
                self.by_leg_refs.len() + self.missing_refs.len(),
                self.missing_refs.len(),
                self.by_back_reference.len()
            ),
        })
    }
}

/// Result of a repair run.
#[derive(Debug, Clone, Serialize)]
pub struct RepairOutcome {
    #[serde(rename = "shipmentId")]
    pub shipment_id: Uuid,
    /// Leg ids added to `legRefs`.
    pub added: Vec<Uuid>,
    /// Leg ids removed from `legRefs` (stale or foreign references).
    pub removed: Vec<Uuid>,
    /// The rewritten `legRefs`, in itinerary order.
    #[serde(rename = "legRefs")]
    pub leg_refs: Vec<Uuid>,
    /// The re-derived shipment status.
    pub status: ShipmentStatus,
    /// Whether the repair changed anything.
    pub changed: bool,
}

/// Reconciliation service over the `shipments` and `legs` collections.
pub struct ReconciliationService<S> {
    store: Arc<S>,
}

impl<S> ReconciliationService<S>
where
    S: ShipmentStore + LegStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Gather every leg discoverable for a shipment, per method, without
    /// mutating anything. Unresolvable `legRefs` are reported as missing
    /// rather than aborting the diagnosis.
    pub async fn diagnose(&self, shipment_id: &Uuid) -> Result<DiagnosisReport, TrackingError> {
        let shipment = self
            .store
            .get_shipment(shipment_id)
            .await?
            .ok_or(TrackingError::ShipmentNotFound(*shipment_id))?;

        let mut ground_truth = self.store.list_legs_by_shipment(shipment_id).await?;
        order_legs(&mut ground_truth);
        let by_back_reference: Vec<Uuid> = ground_truth.iter().map(|leg| leg.id).collect();

        let mut by_leg_refs = Vec::new();
        let mut missing_refs = Vec::new();
        for leg_ref in &shipment.leg_refs {
            match self.store.get_leg(leg_ref).await? {
                Some(leg) => by_leg_refs.push(leg.id),
                None => missing_refs.push(*leg_ref),
            }
        }

        let embedded: Vec<Uuid> = shipment
            .legs
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|leg| leg.id)
            .collect();

        let mut by_reference_code = Vec::new();
        if let Some(code) = shipment.reference_code.as_deref() {
            for leg in self.store.list_legs_by_reference(code).await? {
                by_reference_code.push(leg.id);
            }
        }

        let mut union = Vec::new();
        for id in by_back_reference
            .iter()
            .chain(&by_leg_refs)
            .chain(&embedded)
            .chain(&by_reference_code)
        {
            if !union.contains(id) {
                union.push(*id);
            }
        }

        let drifted = !same_set(&shipment.leg_refs, &by_back_reference);
        debug!(shipment_id = %shipment_id, drifted, union = union.len(), "diagnosis complete");

        Ok(DiagnosisReport {
            shipment_id: *shipment_id,
            by_back_reference,
            by_leg_refs,
            missing_refs,
            embedded,
            by_reference_code,
            union,
            drifted,
        })
    }

    /// Rewrite the shipment's `legRefs` as exactly the ids of the legs whose
    /// back-reference matches, rebuild the embedded array as a projection of
    /// the same ground truth, and re-derive the status.
    ///
    /// Idempotent: repeated calls with no intervening writes change nothing.
    pub async fn repair(&self, shipment_id: &Uuid) -> Result<RepairOutcome, TrackingError> {
        let mut shipment = self
            .store
            .get_shipment(shipment_id)
            .await?
            .ok_or(TrackingError::ShipmentNotFound(*shipment_id))?;

        let mut ground_truth = self.store.list_legs_by_shipment(shipment_id).await?;
        order_legs(&mut ground_truth);
        let truth_ids: Vec<Uuid> = ground_truth.iter().map(|leg| leg.id).collect();

        let added: Vec<Uuid> = truth_ids
            .iter()
            .filter(|id| !shipment.leg_refs.contains(id))
            .copied()
            .collect();
        let removed: Vec<Uuid> = shipment
            .leg_refs
            .iter()
            .filter(|id| !truth_ids.contains(id))
            .copied()
            .collect();

        let derivation = derive_status(&ground_truth);
        let changed = shipment.leg_refs != truth_ids
            || shipment.shipment_status != derivation.status
            || embedded_ids(&shipment) != truth_ids;

        if changed {
            shipment.leg_refs = truth_ids.clone();
            shipment.shipment_status = derivation.status;
            // Embedded array becomes a read-only cached projection.
            shipment.legs = if ground_truth.is_empty() {
                None
            } else {
                Some(ground_truth)
            };
            shipment.updated_at = Utc::now();
            self.store.save_shipment(&shipment).await?;
            info!(shipment_id = %shipment_id, added = added.len(), removed = removed.len(),
                status = %derivation.status, "repaired shipment leg references");
        } else {
            debug!(shipment_id = %shipment_id, "repair found nothing to do");
        }

        Ok(RepairOutcome {
            shipment_id: *shipment_id,
            added,
            removed,
            leg_refs: truth_ids,
            status: derivation.status,
            changed,
        })
    }
}

/// Whether two id sequences hold the same ids, ignoring order and duplicates.
fn same_set(a: &[Uuid], b: &[Uuid]) -> bool {
    a.iter().all(|id| b.contains(id)) && b.iter().all(|id| a.contains(id))
}

fn embedded_ids(shipment: &waybill_core::shipment::Shipment) -> Vec<Uuid> {
    shipment
        .legs
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(|leg| leg.id)
        .collect()
}
