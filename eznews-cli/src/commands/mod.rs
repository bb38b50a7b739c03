//! CLI command implementations

pub mod admin;
pub mod auth;
pub mod bookmarks;
pub mod browse;
pub mod config;
pub mod logs;
pub mod news;
pub mod password;
pub mod profile;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use eznews_core::services::{EntryPoint, GuardDecision, LogEvent, LoggingService, Route};
use eznews_core::NewsContext;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger(entry_point: EntryPoint) -> Option<LoggingService> {
    let app_dir = get_app_dir().ok()?;
    LoggingService::new(&app_dir, entry_point, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

pub fn get_app_dir() -> Result<PathBuf> {
    eznews_core::config::app_dir()
}

/// Build the client context and restore the saved session
pub fn get_context() -> Result<NewsContext> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;

    NewsContext::new(&app_dir).context("Failed to initialize client")
}

/// Stop unless the current session may open `path`
pub fn require_access(ctx: &NewsContext, path: &str) -> Result<()> {
    match ctx.guard(path) {
        GuardDecision::Render => Ok(()),
        GuardDecision::Redirect(Route::Login) => {
            bail!("You need to log in first. Run 'ezn login'.")
        }
        GuardDecision::Redirect(Route::Home) => bail!("Admin access required"),
        GuardDecision::Placeholder => bail!("Session is still loading, try again"),
    }
}

/// Await `future` behind a spinner; the spinner is hidden for JSON output
pub async fn with_spinner<F, T>(message: &str, quiet: bool, future: F) -> T
where
    F: Future<Output = T>,
{
    if quiet {
        return future.await;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let output = future.await;
    spinner.finish_and_clear();
    output
}
