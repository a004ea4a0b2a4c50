// crates/waybill-engine/src/lib.rs
//
// waybill-engine: Leg repository, change-log recorder, and reconciliation
// service for the Waybill shipment-tracking engine.
//
// Every service here is a thin struct over the waybill-core storage traits;
// each public operation executes synchronously within the caller's request
// context against a shared, non-transactional document store. There is no
// leg- or shipment-level locking: concurrent updates race last-write-wins,
// with the change log preserving both intents as separate entries.

pub mod reconcile;
pub mod recorder;
pub mod repository;

// Re-export key types for ergonomic access from downstream crates.
pub use reconcile::{DiagnosisReport, ReconciliationService, RepairOutcome};
pub use recorder::ChangeLogRecorder;
pub use repository::LegRepository;
