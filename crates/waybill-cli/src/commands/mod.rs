// crates/waybill-cli/src/commands/mod.rs

pub mod leg;
pub mod log;
pub mod reconcile;
pub mod shipment;

use std::sync::Arc;

use waybill_store::RocksStore;

use crate::output::OutputFormat;

/// Shared context handed to every subcommand: the opened store, the actor
/// recorded on audit entries, and the selected output format.
pub struct CliContext {
    pub store: Arc<RocksStore>,
    pub actor: String,
    pub format: OutputFormat,
}
