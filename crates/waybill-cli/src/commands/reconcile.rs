// crates/waybill-cli/src/commands/reconcile.rs
//
// `waybill reconcile {diagnose, repair}` — drift inspection and repair.

use clap::Subcommand;
use uuid::Uuid;

use waybill_engine::ReconciliationService;

use super::CliContext;
use crate::output::{format_json, OutputFormat};

/// Reconciliation subcommands.
#[derive(Debug, Subcommand)]
pub enum ReconcileCmd {
    /// Report every leg discoverable for a shipment, per method, without
    /// changing anything.
    Diagnose {
        /// The UUID of the shipment.
        #[arg(long)]
        shipment: Uuid,
    },
    /// Rewrite the shipment's legRefs from ground truth and re-derive status.
    Repair {
        /// The UUID of the shipment.
        #[arg(long)]
        shipment: Uuid,
    },
}

/// Run the reconcile subcommand.
pub async fn run(cmd: &ReconcileCmd, ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    let service = ReconciliationService::new(ctx.store.clone());

    match cmd {
        ReconcileCmd::Diagnose { shipment } => {
            let report = service.diagnose(shipment).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&report)),
                OutputFormat::Table => {
                    println!("Shipment {}", report.shipment_id);
                    println!("  by back-reference: {}", report.by_back_reference.len());
                    println!("  by legRefs:        {}", report.by_leg_refs.len());
                    println!("  missing refs:      {}", report.missing_refs.len());
                    println!("  embedded:          {}", report.embedded.len());
                    println!("  by reference code: {}", report.by_reference_code.len());
                    println!("  union:             {}", report.union.len());
                    match report.inconsistency() {
                        Some(drift) => println!("  DRIFTED: {}", drift),
                        None => println!("  consistent"),
                    }
                }
            }
        }
        ReconcileCmd::Repair { shipment } => {
            let outcome = service.repair(shipment).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&outcome)),
                OutputFormat::Table => {
                    if outcome.changed {
                        println!(
                            "Repaired shipment {}: +{} -{} refs, status {}",
                            outcome.shipment_id,
                            outcome.added.len(),
                            outcome.removed.len(),
                            outcome.status
                        );
                    } else {
                        println!("Shipment {} already consistent", outcome.shipment_id);
                    }
                }
            }
        }
    }

    Ok(())
}
