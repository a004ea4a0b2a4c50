// crates/waybill-cli/src/commands/leg.rs
//
// `waybill leg {add, update, delete, list}` — leg management commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use uuid::Uuid;

use waybill_core::leg::{LegPatch, LegStatus};
use waybill_engine::LegRepository;

use super::CliContext;
use crate::output::{format_json, format_table, LegRow, OutputFormat};

/// Field flags shared by `add` and `update`.
#[derive(Debug, Args)]
pub struct LegFields {
    /// Canonical origin location.
    #[arg(long)]
    pub origin: Option<String>,
    /// Legacy alias for --origin.
    #[arg(long)]
    pub from: Option<String>,
    /// Canonical destination location.
    #[arg(long)]
    pub destination: Option<String>,
    /// Legacy alias for --destination.
    #[arg(long)]
    pub to: Option<String>,
    /// Carrier identifier.
    #[arg(long)]
    pub carrier: Option<String>,
    /// Position in the itinerary.
    #[arg(long)]
    pub order: Option<i64>,
    /// Leg status tag (pending, planned, in_transit, departed, arrived,
    /// completed, delayed, cancelled).
    #[arg(long)]
    pub status: Option<String>,
    /// Tracking number.
    #[arg(long)]
    pub tracking_number: Option<String>,
    /// Departure instant, RFC 3339 (e.g. 2024-03-01T08:30:00Z).
    #[arg(long)]
    pub departure: Option<String>,
    /// Arrival instant, RFC 3339.
    #[arg(long)]
    pub arrival: Option<String>,
}

impl LegFields {
    fn to_patch(&self) -> Result<LegPatch, Box<dyn std::error::Error>> {
        let status = match &self.status {
            Some(tag) => Some(
                LegStatus::parse(tag).ok_or_else(|| format!("unknown leg status: {}", tag))?,
            ),
            None => None,
        };
        Ok(LegPatch {
            leg_order: self.order,
            origin: self.origin.clone(),
            from: self.from.clone(),
            destination: self.destination.clone(),
            to: self.to.clone(),
            carrier: self.carrier.clone(),
            status,
            tracking_number: self.tracking_number.clone(),
            departure_at: parse_instant(self.departure.as_deref())?,
            arrival_at: parse_instant(self.arrival.as_deref())?,
            ..Default::default()
        })
    }
}

fn parse_instant(s: Option<&str>) -> Result<Option<DateTime<Utc>>, Box<dyn std::error::Error>> {
    match s {
        Some(s) => {
            let parsed = DateTime::parse_from_rfc3339(s)
                .map_err(|e| format!("invalid RFC 3339 timestamp {:?}: {}", s, e))?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

/// Leg management subcommands.
#[derive(Debug, Subcommand)]
pub enum LegCmd {
    /// Add a leg to a shipment.
    Add {
        /// The UUID of the owning shipment.
        #[arg(long)]
        shipment: Uuid,
        #[command(flatten)]
        fields: LegFields,
    },
    /// Update fields on an existing leg.
    Update {
        /// The UUID of the leg.
        #[arg(long)]
        id: Uuid,
        #[command(flatten)]
        fields: LegFields,
    },
    /// Delete a leg (and pull it out of the shipment's legRefs).
    Delete {
        /// The UUID of the leg.
        #[arg(long)]
        id: Uuid,
    },
    /// List a shipment's ordered legs.
    List {
        /// The UUID of the shipment.
        #[arg(long)]
        shipment: Uuid,
    },
}

/// Run the leg subcommand.
pub async fn run(cmd: &LegCmd, ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    let repo = LegRepository::new(ctx.store.clone());

    match cmd {
        LegCmd::Add { shipment, fields } => {
            let leg = repo.create(shipment, fields.to_patch()?, &ctx.actor).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&leg)),
                OutputFormat::Table => println!(
                    "Created leg {} ({}) on shipment {}",
                    leg.id,
                    leg.leg_id.as_deref().unwrap_or("-"),
                    shipment
                ),
            }
        }
        LegCmd::Update { id, fields } => {
            let leg = repo.update(id, fields.to_patch()?, &ctx.actor).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&leg)),
                OutputFormat::Table => {
                    println!("Updated leg {} -> status {}", leg.id, leg.status)
                }
            }
        }
        LegCmd::Delete { id } => {
            repo.delete(id).await?;
            println!("Deleted leg {}", id);
        }
        LegCmd::List { shipment } => {
            let legs = repo.list_for_shipment(shipment).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&legs)),
                OutputFormat::Table => {
                    let rows: Vec<LegRow> = legs.iter().map(LegRow::from).collect();
                    println!("{}", format_table(&rows));
                }
            }
        }
    }

    Ok(())
}
