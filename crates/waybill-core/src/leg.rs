// crates/waybill-core/src/leg.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::changelog::{ChangeLogEntry, StatusHistoryEntry};

/// Lifecycle states of a single transport leg.
///
///   Pending --> Planned --> Departed --> InTransit --> Arrived --> Completed
///                  |                         |
///                  v                         v
///               Cancelled                 Delayed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LegStatus {
    /// Not yet planned — the leg exists only as an itinerary placeholder.
    Pending,
    /// Scheduled with a carrier, not yet departed.
    Planned,
    /// Actively moving between origin and destination.
    InTransit,
    /// Left the origin; not yet confirmed moving.
    Departed,
    /// Reached the destination.
    Arrived,
    /// Arrived and all handling finished.
    Completed,
    /// Behind schedule.
    Delayed,
    /// Will not run.
    Cancelled,
}

impl LegStatus {
    /// Stable lowercase tag for this status, used in index keys and CLI args.
    pub fn tag(&self) -> &'static str {
        match self {
            LegStatus::Pending => "pending",
            LegStatus::Planned => "planned",
            LegStatus::InTransit => "in_transit",
            LegStatus::Departed => "departed",
            LegStatus::Arrived => "arrived",
            LegStatus::Completed => "completed",
            LegStatus::Delayed => "delayed",
            LegStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status from its lowercase tag. Accepts `-` as well as `_`.
    pub fn parse(s: &str) -> Option<LegStatus> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Some(LegStatus::Pending),
            "planned" => Some(LegStatus::Planned),
            "in_transit" | "intransit" => Some(LegStatus::InTransit),
            "departed" => Some(LegStatus::Departed),
            "arrived" => Some(LegStatus::Arrived),
            "completed" => Some(LegStatus::Completed),
            "delayed" => Some(LegStatus::Delayed),
            "cancelled" => Some(LegStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether this status counts as terminal progress for status derivation.
    pub fn is_done(&self) -> bool {
        matches!(self, LegStatus::Arrived | LegStatus::Completed)
    }
}

impl std::fmt::Display for LegStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One transport segment of a shipment's itinerary.
///
/// The record carries both the canonical field names and their historical
/// aliases (`from`/`to`, `departureDate`/`departureTime`, `mawbNumber`, …)
/// because persisted documents written by older versions of the system use
/// either scheme. The field normalizer keeps every alias group mutually
/// consistent; the serialized shape preserves all names field-for-field so
/// documents written under either scheme stay readable and writable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leg {
    /// Unique identifier (UUID v7 for time-ordering).
    pub id: Uuid,
    /// Back-reference to the owning Shipment. Exclusive ownership: a leg
    /// belongs to exactly one shipment.
    #[serde(rename = "shipmentId")]
    pub shipment_id: Uuid,
    /// Position in the itinerary. Ties are tolerated and broken by
    /// insertion order.
    #[serde(rename = "legOrder")]
    pub leg_order: i64,
    /// Human-readable display label (e.g. "LEG-4821"). Unique only within
    /// the owning shipment; `id` is the real primary key.
    #[serde(rename = "legId", default)]
    pub leg_id: Option<String>,

    /// Canonical origin location.
    #[serde(default)]
    pub origin: Option<String>,
    /// Legacy alias for `origin`.
    #[serde(default)]
    pub from: Option<String>,
    /// Canonical destination location.
    #[serde(default)]
    pub destination: Option<String>,
    /// Legacy alias for `destination`.
    #[serde(default)]
    pub to: Option<String>,

    /// Canonical departure instant.
    #[serde(rename = "departureAt", default)]
    pub departure_at: Option<DateTime<Utc>>,
    /// Legacy alias for `departureAt`.
    #[serde(rename = "departureDate", default)]
    pub departure_date: Option<DateTime<Utc>>,
    /// Legacy alias for `departureAt`.
    #[serde(rename = "departureTime", default)]
    pub departure_time: Option<DateTime<Utc>>,
    /// Canonical arrival instant.
    #[serde(rename = "arrivalAt", default)]
    pub arrival_at: Option<DateTime<Utc>>,
    /// Legacy alias for `arrivalAt`.
    #[serde(rename = "arrivalDate", default)]
    pub arrival_date: Option<DateTime<Utc>>,
    /// Legacy alias for `arrivalAt`.
    #[serde(rename = "arrivalTime", default)]
    pub arrival_time: Option<DateTime<Utc>>,

    /// Canonical tracking identifier.
    #[serde(rename = "trackingNumber", default)]
    pub tracking_number: Option<String>,
    /// Legacy alias for `trackingNumber` (air waybill number).
    #[serde(rename = "mawbNumber", default)]
    pub mawb_number: Option<String>,

    /// Free-text carrier identifier.
    #[serde(default)]
    pub carrier: Option<String>,

    /// Current lifecycle status.
    pub status: LegStatus,
    /// Append-only record of status transitions, one entry per transition.
    #[serde(rename = "statusHistory", default)]
    pub status_history: Vec<StatusHistoryEntry>,
    /// Append-only audit trail of field-level mutations.
    #[serde(rename = "changeLog", default)]
    pub change_log: Vec<ChangeLogEntry>,

    /// Creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Leg {
    /// Create a new empty leg owned by the given shipment, status `Pending`,
    /// with the initial status-history entry seeded.
    pub fn new(shipment_id: Uuid) -> Self {
        let now = Utc::now();
        Leg {
            id: Uuid::now_v7(),
            shipment_id,
            leg_order: 0,
            leg_id: None,
            origin: None,
            from: None,
            destination: None,
            to: None,
            departure_at: None,
            departure_date: None,
            departure_time: None,
            arrival_at: None,
            arrival_date: None,
            arrival_time: None,
            tracking_number: None,
            mawb_number: None,
            carrier: None,
            status: LegStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: LegStatus::Pending,
                timestamp: now,
            }],
            change_log: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The set of external reference codes this leg is discoverable by
    /// (deduplicated tracking/MAWB numbers). Used for secondary indexing.
    pub fn reference_codes(&self) -> Vec<String> {
        let mut codes = Vec::new();
        for code in [&self.tracking_number, &self.mawb_number].into_iter().flatten() {
            if !code.is_empty() && !codes.contains(code) {
                codes.push(code.clone());
            }
        }
        codes
    }
}

/// A partial set of leg fields, used both as the payload of `create`
/// ("legFields") and as the patch applied by `update`.
///
/// `None` means "leave the current value alone"; a patch cannot clear a
/// field, matching the update semantics of the historical REST surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegPatch {
    #[serde(rename = "legOrder", default)]
    pub leg_order: Option<i64>,
    #[serde(rename = "legId", default)]
    pub leg_id: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(rename = "departureAt", default)]
    pub departure_at: Option<DateTime<Utc>>,
    #[serde(rename = "departureDate", default)]
    pub departure_date: Option<DateTime<Utc>>,
    #[serde(rename = "departureTime", default)]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(rename = "arrivalAt", default)]
    pub arrival_at: Option<DateTime<Utc>>,
    #[serde(rename = "arrivalDate", default)]
    pub arrival_date: Option<DateTime<Utc>>,
    #[serde(rename = "arrivalTime", default)]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(rename = "trackingNumber", default)]
    pub tracking_number: Option<String>,
    #[serde(rename = "mawbNumber", default)]
    pub mawb_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub status: Option<LegStatus>,
}

impl LegPatch {
    /// Apply this patch onto a leg.
    ///
    /// Callers must run `normalize_patch` first so that alias groups inside
    /// the patch are internally consistent: when the patch touches any member
    /// of an alias group, the whole group on the leg is replaced (otherwise a
    /// stale canonical value would win over a patched alias during the
    /// subsequent normalize pass).
    pub fn apply(&self, leg: &mut Leg) {
        if let Some(order) = self.leg_order {
            leg.leg_order = order;
        }
        if self.leg_id.is_some() {
            leg.leg_id = self.leg_id.clone();
        }
        if self.origin.is_some() || self.from.is_some() {
            leg.origin = self.origin.clone();
            leg.from = self.from.clone();
        }
        if self.destination.is_some() || self.to.is_some() {
            leg.destination = self.destination.clone();
            leg.to = self.to.clone();
        }
        if self.departure_at.is_some() || self.departure_date.is_some() || self.departure_time.is_some() {
            leg.departure_at = self.departure_at;
            leg.departure_date = self.departure_date;
            leg.departure_time = self.departure_time;
        }
        if self.arrival_at.is_some() || self.arrival_date.is_some() || self.arrival_time.is_some() {
            leg.arrival_at = self.arrival_at;
            leg.arrival_date = self.arrival_date;
            leg.arrival_time = self.arrival_time;
        }
        if self.tracking_number.is_some() || self.mawb_number.is_some() {
            leg.tracking_number = self.tracking_number.clone();
            leg.mawb_number = self.mawb_number.clone();
        }
        if self.carrier.is_some() {
            leg.carrier = self.carrier.clone();
        }
        if let Some(status) = self.status {
            leg.status = status;
        }
    }
}
