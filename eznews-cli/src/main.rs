//! EzNews CLI - read the news in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{admin, auth, bookmarks, browse, config, logs, news, password, profile};
use eznews_core::services::{EntryPoint, LogEvent};

/// EzNews - read the news in your terminal
#[derive(Parser)]
#[command(name = "ezn", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to your account
    Login {
        /// Account email (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create a new account
    Register,

    /// Log out and forget the saved session
    Logout,

    /// Recover a forgotten password
    Password {
        #[command(subcommand)]
        command: password::PasswordCommands,
    },

    /// Show who is logged in
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read news
    News {
        #[command(subcommand)]
        command: news::NewsCommands,
    },

    /// Manage bookmarks
    Bookmarks {
        #[command(subcommand)]
        command: bookmarks::BookmarksCommands,
    },

    /// View and edit your profile
    Profile {
        #[command(subcommand)]
        command: profile::ProfileCommands,
    },

    /// Dashboard and article management (admins only)
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },

    /// Browse news interactively
    Browse,

    /// Inspect the local event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Show or change client settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Register => "register",
            Commands::Logout => "logout",
            Commands::Password { .. } => "password",
            Commands::Whoami { .. } => "whoami",
            Commands::News { .. } => "news",
            Commands::Bookmarks { .. } => "bookmarks",
            Commands::Profile { .. } => "profile",
            Commands::Admin { .. } => "admin",
            Commands::Browse => "browse",
            Commands::Logs { .. } => "logs",
            Commands::Config { .. } => "config",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            output::error(&format!("Failed to start runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(run(cli));

    // The logs command manages the log itself
    let logger = (name != "logs").then(|| commands::get_logger(EntryPoint::Cli)).flatten();
    match result {
        Ok(()) => {
            commands::log_event(&logger, LogEvent::new("command_executed").with_command(name));
            ExitCode::SUCCESS
        }
        Err(e) => {
            let event = match e.downcast_ref::<eznews_core::Error>() {
                Some(core) => LogEvent::new("command_failed").with_command(name).with_error(core),
                None => LogEvent::new("command_failed").with_command(name).with_message(e.to_string()),
            };
            commands::log_event(&logger, event);
            output::report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email } => auth::login(email).await,
        Commands::Register => auth::register().await,
        Commands::Logout => auth::logout(),
        Commands::Password { command } => password::run(command).await,
        Commands::Whoami { json } => auth::whoami(json),
        Commands::News { command } => news::run(command).await,
        Commands::Bookmarks { command } => bookmarks::run(command).await,
        Commands::Profile { command } => profile::run(command).await,
        Commands::Admin { command } => admin::run(command).await,
        Commands::Browse => browse::run().await,
        Commands::Logs { command } => logs::run(command),
        Commands::Config { command } => config::run(command),
    }
}
