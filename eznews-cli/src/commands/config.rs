//! Config command - show and change client settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use eznews_core::config::Config;

use super::get_app_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Point the client at another API
    SetUrl {
        /// API root, e.g. https://eznews.example/api
        url: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let app_dir = get_app_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&app_dir)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "app_dir": app_dir.to_string_lossy(),
                        "api_url": config.api_url,
                        "timeout_secs": config.timeout.as_secs(),
                        "page_size": config.page_size,
                        "search_debounce_ms": config.search_debounce.as_millis() as u64,
                    }))?
                );
                return Ok(());
            }

            println!("{}", "Configuration".bold());
            let mut table = output::create_table();
            table.add_row(vec!["App directory".to_string(), app_dir.display().to_string()]);
            table.add_row(vec!["API URL".to_string(), config.api_url.clone()]);
            table.add_row(vec!["Timeout".to_string(), format!("{}s", config.timeout.as_secs())]);
            table.add_row(vec!["Page size".to_string(), config.page_size.to_string()]);
            table.add_row(vec![
                "Search debounce".to_string(),
                format!("{}ms", config.search_debounce.as_millis()),
            ]);
            println!("{}", table);
        }
        ConfigCommands::SetUrl { url } => {
            let mut config = Config::load(&app_dir)?;
            config.set_api_url(&url)?;
            config.save(&app_dir)?;
            output::success(&format!("API URL set to {}", config.api_url));
        }
    }

    Ok(())
}
