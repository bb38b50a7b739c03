//! Logs command - inspect the local event log

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use eznews_core::services::{EntryPoint, LoggingService};

use super::get_app_dir;
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only failures
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-event totals and database location
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old entries
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30", conflicts_with = "all")]
        older_than_days: i64,
        /// Delete every entry
        #[arg(long)]
        all: bool,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    LoggingService::new(&get_app_dir()?, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    let service = open_log()?;

    match command {
        LogsCommands::List { limit, errors, json } => {
            let entries = if errors { service.get_errors(limit)? } else { service.get_recent(limit)? };

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            if entries.is_empty() {
                output::info("No log entries found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Entry", "Event", "Where", "Status", "Error"]);
            for entry in entries {
                let location = entry.page.clone().or(entry.command.clone()).unwrap_or_default();
                let status = entry.status.map(|s| s.to_string()).unwrap_or_default();
                let error = entry.error_message.map(|m| m.red().to_string()).unwrap_or_default();
                table.add_row(vec![
                    format_timestamp(entry.timestamp),
                    entry.entry_point,
                    entry.event,
                    location,
                    status,
                    error,
                ]);
            }
            println!("{}", table);
        }
        LogsCommands::Stats { json } => {
            let total = service.count()?;
            let counts = service.stats()?;
            let db_path = service.db_path().to_path_buf();
            let size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "total_entries": total,
                        "events": counts,
                        "database_path": db_path.to_string_lossy(),
                        "database_size_bytes": size_bytes,
                    }))?
                );
                return Ok(());
            }

            println!("{}", "Log Statistics".bold());
            println!("  Total entries: {}", total);
            println!("  Database: {} ({} bytes)", db_path.display(), size_bytes);
            if !counts.is_empty() {
                let mut table = output::create_table();
                table.set_header(vec!["Event", "Count", "Errors"]);
                for c in counts {
                    table.add_row(vec![c.event, c.count.to_string(), c.errors.to_string()]);
                }
                println!("{}", table);
            }
        }
        LogsCommands::Clear { older_than_days, all, force } => {
            let prompt = if all {
                "Delete all log entries?".to_string()
            } else {
                format!("Delete log entries older than {} days?", older_than_days)
            };
            if !force && !Confirm::new().with_prompt(prompt).default(false).interact()? {
                println!("Cancelled.");
                return Ok(());
            }

            let deleted = if all {
                service.clear()?
            } else {
                let cutoff = Utc::now() - Duration::days(older_than_days);
                service.delete_before(cutoff.timestamp_millis())?
            };
            output::success(&format!("Deleted {} log entries", deleted));
        }
    }

    Ok(())
}
