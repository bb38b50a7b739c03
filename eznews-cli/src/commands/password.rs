//! Password recovery

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Input, Password};

use eznews_core::domain::PasswordResetForm;
use eznews_core::services::{EntryPoint, LogEvent};

use super::{get_context, get_logger, log_event, with_spinner};
use crate::output;

#[derive(Subcommand)]
pub enum PasswordCommands {
    /// Request a password reset token
    Forgot {
        /// Account email (prompted if omitted)
        email: Option<String>,
    },
    /// Set a new password using a reset token
    Reset {
        /// Reset token (prompted if omitted)
        #[arg(long)]
        token: Option<String>,
    },
}

pub async fn run(command: PasswordCommands) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger(EntryPoint::Cli);

    match command {
        PasswordCommands::Forgot { email } => {
            let email = match email {
                Some(e) => e,
                None => Input::new().with_prompt("Email").interact_text()?,
            };
            let ticket = with_spinner("Sending request...", false, ctx.session.forgot_password(&email))
                .await
                .inspect_err(|e| {
                    log_event(&logger, LogEvent::new("password_forgot_failed").with_page("/forgot-password").with_error(e))
                })?;
            log_event(&logger, LogEvent::new("password_forgot_requested").with_page("/forgot-password"));

            output::success(&ticket.message);
            // Only development servers hand the token back directly
            if let Some(token) = ticket.reset_token {
                println!("Reset token: {}", token.bold());
                println!("{}", format!("Run 'ezn password reset --token {}'", token).dimmed());
            }
        }
        PasswordCommands::Reset { token } => {
            let token = match token {
                Some(t) => t,
                None => Input::new().with_prompt("Reset token").interact_text()?,
            };
            let new_password = Password::new()
                .with_prompt("New password (min. 8 characters)")
                .interact()?;
            let confirm_password = Password::new().with_prompt("Confirm new password").interact()?;
            let form = PasswordResetForm {
                token,
                new_password,
                confirm_password,
            };

            let message = with_spinner("Resetting password...", false, ctx.session.reset_password(&form))
                .await
                .inspect_err(|e| {
                    log_event(&logger, LogEvent::new("password_reset_failed").with_page("/reset-password").with_error(e))
                })?;
            log_event(&logger, LogEvent::new("password_reset_succeeded").with_page("/reset-password"));
            output::success(&message);
            output::info("Log in with 'ezn login'.");
        }
    }
    Ok(())
}
