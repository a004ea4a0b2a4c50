// crates/waybill-cli/src/commands/log.rs
//
// `waybill log {changes, history}` — audit trail inspection commands.

use clap::Subcommand;
use tabled::Tabled;
use uuid::Uuid;

use waybill_engine::ChangeLogRecorder;

use super::CliContext;
use crate::output::{format_json, format_table, OutputFormat};

/// Audit trail subcommands.
#[derive(Debug, Subcommand)]
pub enum LogCmd {
    /// Show a leg's full change log.
    Changes {
        /// The UUID of the leg.
        #[arg(long)]
        leg: Uuid,
    },
    /// Show a leg's status-transition history.
    History {
        /// The UUID of the leg.
        #[arg(long)]
        leg: Uuid,
    },
}

#[derive(Tabled)]
struct ChangeRow {
    timestamp: String,
    actor: String,
    action: String,
    fields: String,
}

#[derive(Tabled)]
struct HistoryRow {
    timestamp: String,
    status: String,
}

/// Run the log subcommand.
pub async fn run(cmd: &LogCmd, ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = ChangeLogRecorder::new(ctx.store.clone());

    match cmd {
        LogCmd::Changes { leg } => {
            let log = recorder.change_log(leg).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&log)),
                OutputFormat::Table => {
                    let rows: Vec<ChangeRow> = log
                        .iter()
                        .map(|entry| ChangeRow {
                            timestamp: entry.timestamp.to_rfc3339(),
                            actor: entry.actor.clone(),
                            action: entry.action.clone(),
                            fields: entry
                                .field_diffs
                                .keys()
                                .cloned()
                                .collect::<Vec<_>>()
                                .join(", "),
                        })
                        .collect();
                    println!("{}", format_table(&rows));
                }
            }
        }
        LogCmd::History { leg } => {
            let history = recorder.status_history(leg).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&history)),
                OutputFormat::Table => {
                    let rows: Vec<HistoryRow> = history
                        .iter()
                        .map(|entry| HistoryRow {
                            timestamp: entry.timestamp.to_rfc3339(),
                            status: entry.status.to_string(),
                        })
                        .collect();
                    println!("{}", format_table(&rows));
                }
            }
        }
    }

    Ok(())
}
