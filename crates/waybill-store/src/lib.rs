// crates/waybill-store/src/lib.rs
//
// waybill-store: Document-store backends for the Waybill engine.
//
// Provides a RocksDB-backed store for the `shipments` and `legs` collections
// (with secondary key indexes for query-by-field reads) and an in-memory
// store used by engine tests and CLI dry runs.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryStore;
pub use rocks::RocksStore;
