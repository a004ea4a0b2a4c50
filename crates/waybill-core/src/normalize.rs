// crates/waybill-core/src/normalize.rs
//
// The field normalizer: a pure, idempotent, infallible function that
// reconciles every legacy/alias field group on a leg to a single consistent
// value. Invoked explicitly at the write boundary (and on fallback reads of
// legacy documents) — never as an implicit persistence hook.
//
// Rule: the first non-empty value in canonical -> alias order wins and is
// propagated to every other member of the group. Groups that are empty on
// every side stay empty.

use rand::Rng;

use crate::leg::{Leg, LegPatch};

/// Reconcile one alias group in place: the first occupied slot (in the given
/// order) wins and overwrites every other slot.
fn reconcile<T: Clone>(slots: &mut [&mut Option<T>], occupied: impl Fn(&T) -> bool) {
    let winner = slots
        .iter()
        .find_map(|slot| slot.as_ref().filter(|v| occupied(v)).cloned());
    if let Some(winner) = winner {
        for slot in slots.iter_mut() {
            **slot = Some(winner.clone());
        }
    }
}

fn text_occupied(s: &String) -> bool {
    !s.is_empty()
}

/// Normalize all alias groups on a leg.
///
/// Idempotent: `normalize(normalize(leg)) == normalize(leg)`. Never fails;
/// fields empty on every side of a group remain empty. Does not assign
/// `legId` — that needs the sibling legs' labels, see [`ensure_leg_label`].
pub fn normalize(leg: &mut Leg) {
    reconcile(&mut [&mut leg.origin, &mut leg.from], text_occupied);
    reconcile(&mut [&mut leg.destination, &mut leg.to], text_occupied);
    reconcile(
        &mut [&mut leg.tracking_number, &mut leg.mawb_number],
        text_occupied,
    );
    reconcile(
        &mut [
            &mut leg.departure_at,
            &mut leg.departure_date,
            &mut leg.departure_time,
        ],
        |_| true,
    );
    reconcile(
        &mut [&mut leg.arrival_at, &mut leg.arrival_date, &mut leg.arrival_time],
        |_| true,
    );
}

/// Normalize alias groups inside a patch before it is applied.
///
/// A patch that touches only one member of a group (e.g. sets `from` but not
/// `origin`) is expanded so the whole group carries the patched value;
/// without this, the stale canonical value on the leg would win the
/// subsequent normalize pass and silently discard the patch's intent.
pub fn normalize_patch(patch: &mut LegPatch) {
    reconcile(&mut [&mut patch.origin, &mut patch.from], text_occupied);
    reconcile(&mut [&mut patch.destination, &mut patch.to], text_occupied);
    reconcile(
        &mut [&mut patch.tracking_number, &mut patch.mawb_number],
        text_occupied,
    );
    reconcile(
        &mut [
            &mut patch.departure_at,
            &mut patch.departure_date,
            &mut patch.departure_time,
        ],
        |_| true,
    );
    reconcile(
        &mut [
            &mut patch.arrival_at,
            &mut patch.arrival_date,
            &mut patch.arrival_time,
        ],
        |_| true,
    );
}

/// Upper bound (exclusive) of the random label range; keeps labels at the
/// historical four-digit width.
const LABEL_RANGE: u32 = 10_000;

/// Attempts before giving up on random draws and switching to sequential
/// assignment.
const LABEL_ATTEMPTS: u32 = 32;

/// Assign a display label (`LEG-xxxx`) if the leg does not already carry one.
///
/// `taken` holds the labels of the owning shipment's existing legs; the
/// generated label is guaranteed not to collide with any of them. Random
/// draws are retried a bounded number of times, after which assignment falls
/// back to the first free label above the random range, so the function
/// terminates even for pathologically full shipments.
pub fn ensure_leg_label(leg: &mut Leg, taken: &[String]) {
    if leg.leg_id.as_deref().is_some_and(|label| !label.is_empty()) {
        return;
    }

    let mut rng = rand::thread_rng();
    for _ in 0..LABEL_ATTEMPTS {
        let candidate = format!("LEG-{:04}", rng.gen_range(0..LABEL_RANGE));
        if !taken.iter().any(|t| t == &candidate) {
            leg.leg_id = Some(candidate);
            return;
        }
    }

    // Sequential fallback outside the random range.
    let mut n = LABEL_RANGE;
    loop {
        let candidate = format!("LEG-{}", n);
        if !taken.iter().any(|t| t == &candidate) {
            leg.leg_id = Some(candidate);
            return;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn leg() -> Leg {
        Leg::new(Uuid::now_v7())
    }

    #[test]
    fn canonical_value_wins_and_fills_alias() {
        let mut l = leg();
        l.origin = Some("SFO".to_string());
        normalize(&mut l);
        assert_eq!(l.origin.as_deref(), Some("SFO"));
        assert_eq!(l.from.as_deref(), Some("SFO"));
    }

    #[test]
    fn alias_value_fills_empty_canonical() {
        let mut l = leg();
        l.to = Some("NRT".to_string());
        l.mawb_number = Some("176-12345675".to_string());
        normalize(&mut l);
        assert_eq!(l.destination.as_deref(), Some("NRT"));
        assert_eq!(l.tracking_number.as_deref(), Some("176-12345675"));
    }

    #[test]
    fn canonical_overrides_conflicting_alias() {
        let mut l = leg();
        l.origin = Some("SFO".to_string());
        l.from = Some("OAK".to_string());
        normalize(&mut l);
        // First non-empty in canonical -> alias order wins.
        assert_eq!(l.from.as_deref(), Some("SFO"));
    }

    #[test]
    fn timestamp_triple_reconciles_to_one_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let mut l = leg();
        l.departure_time = Some(instant);
        normalize(&mut l);
        assert_eq!(l.departure_at, Some(instant));
        assert_eq!(l.departure_date, Some(instant));
        assert_eq!(l.departure_time, Some(instant));
    }

    #[test]
    fn empty_groups_stay_empty() {
        let mut l = leg();
        normalize(&mut l);
        assert_eq!(l.origin, None);
        assert_eq!(l.from, None);
        assert_eq!(l.arrival_at, None);
    }

    #[test]
    fn empty_string_does_not_win() {
        let mut l = leg();
        l.origin = Some(String::new());
        l.from = Some("HKG".to_string());
        normalize(&mut l);
        assert_eq!(l.origin.as_deref(), Some("HKG"));
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut l = leg();
        l.from = Some("AMS".to_string());
        l.destination = Some("JFK".to_string());
        l.arrival_date = Some(Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap());

        let mut once = l.clone();
        normalize(&mut once);
        let mut twice = once.clone();
        normalize(&mut twice);

        assert_eq!(serde_json::to_value(&once).unwrap(), serde_json::to_value(&twice).unwrap());
    }

    #[test]
    fn alias_consistency_after_normalize() {
        let mut l = leg();
        l.from = Some("AMS".to_string());
        l.destination = Some("JFK".to_string());
        normalize(&mut l);
        assert_eq!(l.origin, l.from);
        assert_eq!(l.destination, l.to);
        assert!(l.origin.is_some());
        assert!(l.to.is_some());
    }

    #[test]
    fn patch_alias_expands_to_whole_group() {
        let mut patch = LegPatch {
            from: Some("LAX".to_string()),
            ..Default::default()
        };
        normalize_patch(&mut patch);
        assert_eq!(patch.origin.as_deref(), Some("LAX"));
        assert_eq!(patch.from.as_deref(), Some("LAX"));
    }

    #[test]
    fn label_assigned_when_absent() {
        let mut l = leg();
        ensure_leg_label(&mut l, &[]);
        let label = l.leg_id.clone().unwrap();
        assert!(label.starts_with("LEG-"));
    }

    #[test]
    fn existing_label_is_kept() {
        let mut l = leg();
        l.leg_id = Some("LEG-0001".to_string());
        ensure_leg_label(&mut l, &[]);
        assert_eq!(l.leg_id.as_deref(), Some("LEG-0001"));
    }

    #[test]
    fn label_never_collides_with_siblings() {
        // Exhaust the entire random range so the sequential fallback kicks in.
        let taken: Vec<String> = (0..LABEL_RANGE).map(|n| format!("LEG-{:04}", n)).collect();
        let mut l = leg();
        ensure_leg_label(&mut l, &taken);
        let label = l.leg_id.clone().unwrap();
        assert!(!taken.contains(&label));
    }
}
