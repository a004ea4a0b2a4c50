// crates/waybill-core/src/lib.rs
//
// waybill-core: Core types, errors, storage traits, and pure functions for
// the Waybill shipment-tracking engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the canonical data structures (Shipment, Leg, change-log
// records), the engine-wide error type, the storage trait seams, and the
// two pure functions at the heart of the engine: the field normalizer and
// the status deriver.

pub mod changelog;
pub mod error;
pub mod leg;
pub mod normalize;
pub mod shipment;
pub mod status;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use waybill_core::Leg;`

// Leg types
pub use leg::{Leg, LegPatch, LegStatus};

// Shipment types
pub use shipment::{Shipment, ShipmentStatus};

// Change-log types
pub use changelog::{ChangeLogEntry, FieldDiff, StatusHistoryEntry};

// Pure functions
pub use normalize::{ensure_leg_label, normalize, normalize_patch};
pub use status::{derive_status, order_legs, StatusDerivation};

// Error type
pub use error::TrackingError;

// Traits
pub use traits::{LegStore, ShipmentStore};
