// crates/waybill-core/src/status.rs
//
// The status deriver: a pure function computing a shipment's aggregate
// status from its ordered legs. The result overwrites the shipment's
// `shipmentStatus` — clients never write that field directly, and the
// derivation is re-run after every status-affecting leg change.

use uuid::Uuid;

use crate::leg::{Leg, LegStatus};
use crate::shipment::ShipmentStatus;

/// Result of a status derivation: the aggregate status plus the "active"
/// leg representing the shipment's current progress (used for display, e.g.
/// route annotation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDerivation {
    pub status: ShipmentStatus,
    pub active_leg: Option<Uuid>,
}

/// Sort legs into itinerary order: ascending `legOrder`, ties broken by
/// insertion order (stable sort).
pub fn order_legs(legs: &mut [Leg]) {
    legs.sort_by_key(|leg| leg.leg_order);
}

/// Derive the aggregate shipment status from its legs, which must already be
/// in itinerary order (see [`order_legs`]).
///
/// Priority rules:
/// 1. No legs: `Pending`.
/// 2. Any leg `InTransit`: `InTransit`; the earliest-ordered `InTransit`
///    leg is the active leg (tie-break when several qualify).
/// 3. Every leg `Arrived`/`Completed`: `Arrived`; the last leg is active.
/// 4. First leg `Pending` (and no leg in transit): `Pending` — the itinerary
///    has not started even if later legs carry progress.
/// 5. Otherwise the shipment is partway through: `InTransit`, with the
///    active leg found by scanning backward for the first non-`Pending` leg.
pub fn derive_status(legs: &[Leg]) -> StatusDerivation {
    if legs.is_empty() {
        return StatusDerivation {
            status: ShipmentStatus::Pending,
            active_leg: None,
        };
    }

    if let Some(moving) = legs.iter().find(|leg| leg.status == LegStatus::InTransit) {
        return StatusDerivation {
            status: ShipmentStatus::InTransit,
            active_leg: Some(moving.id),
        };
    }

    if legs.iter().all(|leg| leg.status.is_done()) {
        return StatusDerivation {
            status: ShipmentStatus::Arrived,
            active_leg: legs.last().map(|leg| leg.id),
        };
    }

    // Backward scan: the last leg that shows any progress is the active one.
    let active_leg = legs
        .iter()
        .rev()
        .find(|leg| leg.status != LegStatus::Pending)
        .map(|leg| leg.id);

    let status = if legs[0].status == LegStatus::Pending {
        ShipmentStatus::Pending
    } else {
        ShipmentStatus::InTransit
    };

    StatusDerivation { status, active_leg }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legs_with(statuses: &[LegStatus]) -> Vec<Leg> {
        let shipment_id = Uuid::now_v7();
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut leg = Leg::new(shipment_id);
                leg.leg_order = (i + 1) as i64;
                leg.status = *status;
                leg
            })
            .collect()
    }

    #[test]
    fn empty_itinerary_is_pending() {
        let derivation = derive_status(&[]);
        assert_eq!(derivation.status, ShipmentStatus::Pending);
        assert_eq!(derivation.active_leg, None);
    }

    #[test]
    fn all_arrived_or_completed_is_arrived() {
        let legs = legs_with(&[LegStatus::Arrived, LegStatus::Arrived, LegStatus::Completed]);
        let derivation = derive_status(&legs);
        assert_eq!(derivation.status, ShipmentStatus::Arrived);
        assert_eq!(derivation.active_leg, Some(legs[2].id));
    }

    #[test]
    fn first_leg_pending_keeps_shipment_pending() {
        let legs = legs_with(&[LegStatus::Pending, LegStatus::Arrived, LegStatus::Arrived]);
        let derivation = derive_status(&legs);
        assert_eq!(derivation.status, ShipmentStatus::Pending);
    }

    #[test]
    fn mid_itinerary_in_transit_leg_wins() {
        let legs = legs_with(&[LegStatus::Arrived, LegStatus::InTransit, LegStatus::Pending]);
        let derivation = derive_status(&legs);
        assert_eq!(derivation.status, ShipmentStatus::InTransit);
        assert_eq!(derivation.active_leg, Some(legs[1].id));
    }

    #[test]
    fn earliest_in_transit_leg_breaks_ties() {
        let legs = legs_with(&[LegStatus::Arrived, LegStatus::InTransit, LegStatus::InTransit]);
        let derivation = derive_status(&legs);
        assert_eq!(derivation.status, ShipmentStatus::InTransit);
        assert_eq!(derivation.active_leg, Some(legs[1].id));
    }

    #[test]
    fn started_but_unfinished_itinerary_is_in_transit() {
        // First leg done, rest pending: the journey is between legs.
        let legs = legs_with(&[LegStatus::Arrived, LegStatus::Pending, LegStatus::Pending]);
        let derivation = derive_status(&legs);
        assert_eq!(derivation.status, ShipmentStatus::InTransit);
        assert_eq!(derivation.active_leg, Some(legs[0].id));
    }

    #[test]
    fn all_pending_is_pending_with_no_active_leg() {
        let legs = legs_with(&[LegStatus::Pending, LegStatus::Pending]);
        let derivation = derive_status(&legs);
        assert_eq!(derivation.status, ShipmentStatus::Pending);
        assert_eq!(derivation.active_leg, None);
    }

    #[test]
    fn order_legs_is_stable_on_ties() {
        let shipment_id = Uuid::now_v7();
        let mut a = Leg::new(shipment_id);
        a.leg_order = 1;
        let mut b = Leg::new(shipment_id);
        b.leg_order = 1;
        let mut c = Leg::new(shipment_id);
        c.leg_order = 0;
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);

        let mut legs = vec![a, b, c];
        order_legs(&mut legs);
        let ids: Vec<Uuid> = legs.iter().map(|leg| leg.id).collect();
        assert_eq!(ids, vec![c_id, a_id, b_id]);
    }
}
