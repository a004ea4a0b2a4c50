// crates/waybill-cli/src/main.rs
//
// Binary entrypoint for the Waybill CLI.
//
// Initializes tracing, parses CLI arguments, loads configuration, opens the
// local document store, and dispatches to the subcommands. There is no
// server process: the CLI operates directly on the RocksDB store.

mod commands;
mod config;
mod output;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use commands::leg::LegCmd;
use commands::log::LogCmd;
use commands::reconcile::ReconcileCmd;
use commands::shipment::ShipmentCmd;
use commands::CliContext;
use config::{expand_tilde, CliConfig};
use output::OutputFormat;
use waybill_store::RocksStore;

/// Waybill CLI — shipment-leg tracking, audit, and reconciliation tools.
#[derive(Parser, Debug)]
#[command(
    name = "waybill",
    version = "0.1.0",
    about = "Waybill shipment-tracking engine CLI"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.waybill/config.toml")]
    config: String,

    /// Emit JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Shipment management: create, get, list.
    #[command(subcommand)]
    Shipment(ShipmentCmd),

    /// Leg management: add, update, delete, list.
    #[command(subcommand)]
    Leg(LegCmd),

    /// Audit trails: change log and status history.
    #[command(subcommand)]
    Log(LogCmd),

    /// Drift diagnosis and repair between the leg representations.
    #[command(subcommand)]
    Reconcile(ReconcileCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Config file is optional; fall back to defaults when absent.
    let config_path = expand_tilde(&cli.config);
    let config = CliConfig::load(&config_path).unwrap_or_default();

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let data_dir = expand_tilde(&config.data_dir);
    let store = Arc::new(RocksStore::open(&data_dir)?);

    let ctx = CliContext {
        store,
        actor: config.actor.clone(),
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        },
    };

    match &cli.command {
        Commands::Shipment(cmd) => commands::shipment::run(cmd, &ctx).await?,
        Commands::Leg(cmd) => commands::leg::run(cmd, &ctx).await?,
        Commands::Log(cmd) => commands::log::run(cmd, &ctx).await?,
        Commands::Reconcile(cmd) => commands::reconcile::run(cmd, &ctx).await?,
    }

    Ok(())
}
