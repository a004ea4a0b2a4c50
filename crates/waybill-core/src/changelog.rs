// crates/waybill-core/src/changelog.rs
//
// Append-only audit record types for legs, plus the pure field-diff
// computation the repository feeds into them. Entries are never rewritten
// once appended; under concurrent last-write-wins updates the log preserves
// both intents even though only the last field value survives on the leg.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::leg::{Leg, LegStatus};

/// One status transition, appended whenever a leg's status changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusHistoryEntry {
    pub status: LegStatus,
    pub timestamp: DateTime<Utc>,
}

/// Old/new value pair for a single tracked field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDiff {
    pub old: Option<String>,
    pub new: Option<String>,
}

/// One audit entry on a leg's change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    /// Field name -> old/new values. BTreeMap for stable serialization order.
    #[serde(rename = "fieldDiffs")]
    pub field_diffs: BTreeMap<String, FieldDiff>,
}

impl ChangeLogEntry {
    /// Build an entry timestamped now.
    pub fn new(actor: &str, action: &str, field_diffs: BTreeMap<String, FieldDiff>) -> Self {
        ChangeLogEntry {
            timestamp: Utc::now(),
            actor: actor.to_string(),
            action: action.to_string(),
            field_diffs,
        }
    }
}

/// Snapshot of a leg's tracked fields as display strings, keyed by wire name.
///
/// Only fields a client can mutate are tracked; the append-only collections
/// and bookkeeping timestamps are excluded.
fn tracked_fields(leg: &Leg) -> BTreeMap<&'static str, Option<String>> {
    let ts = |t: &Option<DateTime<Utc>>| t.map(|t| t.to_rfc3339());
    let mut fields = BTreeMap::new();
    fields.insert("legOrder", Some(leg.leg_order.to_string()));
    fields.insert("legId", leg.leg_id.clone());
    fields.insert("origin", leg.origin.clone());
    fields.insert("from", leg.from.clone());
    fields.insert("destination", leg.destination.clone());
    fields.insert("to", leg.to.clone());
    fields.insert("departureAt", ts(&leg.departure_at));
    fields.insert("departureDate", ts(&leg.departure_date));
    fields.insert("departureTime", ts(&leg.departure_time));
    fields.insert("arrivalAt", ts(&leg.arrival_at));
    fields.insert("arrivalDate", ts(&leg.arrival_date));
    fields.insert("arrivalTime", ts(&leg.arrival_time));
    fields.insert("trackingNumber", leg.tracking_number.clone());
    fields.insert("mawbNumber", leg.mawb_number.clone());
    fields.insert("carrier", leg.carrier.clone());
    fields.insert("status", Some(leg.status.tag().to_string()));
    fields
}

/// Compute the field-level diff between two versions of a leg.
///
/// Returns one `FieldDiff` per tracked field whose value changed; an empty
/// map means the update was a no-op as far as the audit trail is concerned.
pub fn diff_fields(before: &Leg, after: &Leg) -> BTreeMap<String, FieldDiff> {
    let old_fields = tracked_fields(before);
    let new_fields = tracked_fields(after);
    let mut diffs = BTreeMap::new();
    for (name, old) in old_fields {
        let new = new_fields.get(name).cloned().flatten();
        if old != new {
            diffs.insert(name.to_string(), FieldDiff { old, new });
        }
    }
    diffs
}
