//! Profile command - view and edit your account

use anyhow::{bail, Result};
use clap::Subcommand;
use dialoguer::Password;

use eznews_core::domain::{PasswordChangeForm, ProfileForm};
use eznews_core::services::{EntryPoint, LogEvent};

use super::{get_context, get_logger, log_event, require_access, with_spinner};
use crate::output;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show your profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change your name or email
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change your password
    Password,
}

pub async fn run(command: ProfileCommands) -> Result<()> {
    let ctx = get_context()?;
    require_access(&ctx, "/profile")?;
    let logger = get_logger(EntryPoint::Cli);

    let result = match command {
        ProfileCommands::Show { json } => {
            let identity = with_spinner("Loading profile...", json, ctx.profile.profile()).await;
            identity.and_then(|identity| {
                if json {
                    println!("{}", serde_json::to_string_pretty(&identity)?);
                } else {
                    println!("{}", output::identity_table(&identity));
                }
                Ok(())
            })
        }
        ProfileCommands::Update { full_name, email } => {
            if full_name.is_none() && email.is_none() {
                bail!("Nothing to update. Pass --full-name and/or --email.");
            }
            let form = ProfileForm { full_name, email };
            with_spinner("Saving profile...", false, ctx.profile.update_profile(&form))
                .await
                .map(|identity| {
                    output::success("Profile updated.");
                    println!("{}", output::identity_table(&identity));
                })
        }
        ProfileCommands::Password => {
            let form = PasswordChangeForm {
                current_password: Password::new().with_prompt("Current password").interact()?,
                new_password: Password::new().with_prompt("New password").interact()?,
                confirm_password: Password::new().with_prompt("Confirm new password").interact()?,
            };
            with_spinner("Changing password...", false, ctx.profile.change_password(&form))
                .await
                .map(|message| output::success(&message))
        }
    };

    if let Err(e) = &result {
        log_event(&logger, LogEvent::new("profile_failed").with_page("/profile").with_error(e));
    }
    Ok(result?)
}
