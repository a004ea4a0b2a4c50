// crates/waybill-cli/src/commands/shipment.rs
//
// `waybill shipment {create, get, list}` — shipment management commands.

use clap::Subcommand;
use uuid::Uuid;

use waybill_core::shipment::Shipment;
use waybill_core::traits::ShipmentStore;
use waybill_engine::LegRepository;

use super::CliContext;
use crate::output::{format_json, format_table, LegRow, OutputFormat, ShipmentRow};

/// Shipment management subcommands.
#[derive(Debug, Subcommand)]
pub enum ShipmentCmd {
    /// Create a new empty shipment.
    Create {
        /// External reference code shared with this shipment's legs.
        #[arg(long)]
        reference: Option<String>,
        /// Initial order-workflow status (opaque to the engine).
        #[arg(long)]
        order_status: Option<String>,
    },
    /// Show one shipment and its ordered legs.
    Get {
        /// The UUID of the shipment.
        #[arg(long)]
        id: Uuid,
    },
    /// List all shipments.
    List,
}

/// Run the shipment subcommand.
pub async fn run(cmd: &ShipmentCmd, ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ShipmentCmd::Create { reference, order_status } => {
            let mut shipment = Shipment::new();
            shipment.reference_code = reference.clone();
            shipment.order_status = order_status.clone();
            ctx.store.save_shipment(&shipment).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&shipment)),
                OutputFormat::Table => println!("Created shipment {}", shipment.id),
            }
        }
        ShipmentCmd::Get { id } => {
            let shipment = ctx
                .store
                .get_shipment(id)
                .await?
                .ok_or_else(|| format!("shipment not found: {}", id))?;
            let repo = LegRepository::new(ctx.store.clone());
            let legs = repo.list_for_shipment(id).await?;

            match ctx.format {
                OutputFormat::Json => {
                    println!("{}", format_json(&serde_json::json!({
                        "shipment": shipment,
                        "legs": legs,
                    })));
                }
                OutputFormat::Table => {
                    println!("Shipment {}", shipment.id);
                    println!("  status:    {}", shipment.shipment_status);
                    println!("  legRefs:   {}", shipment.leg_refs.len());
                    if let Some(code) = &shipment.reference_code {
                        println!("  reference: {}", code);
                    }
                    println!();
                    let rows: Vec<LegRow> = legs.iter().map(LegRow::from).collect();
                    println!("{}", format_table(&rows));
                }
            }
        }
        ShipmentCmd::List => {
            let shipments = ctx.store.list_shipments().await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&shipments)),
                OutputFormat::Table => {
                    let rows: Vec<ShipmentRow> = shipments.iter().map(ShipmentRow::from).collect();
                    println!("{}", format_table(&rows));
                }
            }
        }
    }

    Ok(())
}
