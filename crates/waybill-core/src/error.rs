// crates/waybill-core/src/error.rs

use thiserror::Error;
use uuid::Uuid;

/// Engine-wide error types for the Waybill tracking engine.
///
/// Propagation policy: mutating operations (`create`, `update`, `delete`)
/// surface every kind to the caller without local recovery — no retries and
/// no fabricated fallback data. `Inconsistent` is only ever produced by
/// diagnostics to describe detected drift; mutating operations never raise it.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The referenced Shipment does not exist.
    #[error("shipment not found: {0}")]
    ShipmentNotFound(Uuid),

    /// The referenced Leg does not exist.
    #[error("leg not found: {0}")]
    LegNotFound(Uuid),

    /// Required fields missing or malformed (e.g. origin/destination).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The document store collaborator failed or timed out.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// Drift detected between the two leg storage representations.
    /// Descriptive only — reported by `diagnose`, never raised fatally.
    #[error("inconsistent shipment {shipment_id}: {detail}")]
    Inconsistent { shipment_id: Uuid, detail: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TrackingError {
    fn from(e: serde_json::Error) -> Self {
        TrackingError::Serialization(e.to_string())
    }
}
