//! Login, registration and logout

use std::env;

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Input, Password};

use eznews_core::domain::RegistrationForm;
use eznews_core::services::{EntryPoint, LogEvent};

use super::{get_context, get_logger, log_event, with_spinner};
use crate::output;

/// Password from EZNEWS_PASSWORD, or prompt
fn password_or_prompt(prompt: &str) -> Result<String> {
    if let Ok(p) = env::var("EZNEWS_PASSWORD") {
        return Ok(p);
    }
    Ok(Password::new().with_prompt(prompt).interact()?)
}

pub async fn login(email: Option<String>) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger(EntryPoint::Cli);

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = password_or_prompt("Password")?;

    match with_spinner("Logging in...", false, ctx.session.login(&email, &password)).await {
        Ok(identity) => {
            log_event(&logger, LogEvent::new("login_succeeded").with_page("/login"));
            output::success(&format!("Welcome back, {}!", identity.full_name));
            Ok(())
        }
        Err(e) => {
            log_event(&logger, LogEvent::new("login_failed").with_page("/login").with_error(&e));
            Err(e.into())
        }
    }
}

pub async fn register() -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger(EntryPoint::Cli);

    let full_name: String = Input::new().with_prompt("Full name").interact_text()?;
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new()
        .with_prompt("Password (min. 8 characters)")
        .interact()?;
    let confirm_password = Password::new().with_prompt("Confirm password").interact()?;

    let form = RegistrationForm {
        full_name,
        email,
        password,
        confirm_password,
    };

    match with_spinner("Creating account...", false, ctx.session.register(&form)).await {
        Ok(identity) => {
            log_event(&logger, LogEvent::new("registration_succeeded").with_page("/register"));
            output::success(&format!("Account created. Logged in as {}.", identity.email));
            Ok(())
        }
        Err(e) => {
            log_event(&logger, LogEvent::new("registration_failed").with_page("/register").with_error(&e));
            Err(e.into())
        }
    }
}

pub fn logout() -> Result<()> {
    let ctx = get_context()?;
    let was_logged_in = ctx.session.is_authenticated();
    if !ctx.session.logout() {
        let path = ctx.app_dir.join(eznews_core::config::SESSION_FILE);
        log_event(
            &get_logger(EntryPoint::Cli),
            LogEvent::new("logout_storage_failed").with_message(path.display().to_string()),
        );
        bail!(
            "Logged out of this run, but the saved session could not be removed. Delete {} by hand.",
            path.display()
        );
    }

    if was_logged_in {
        output::success("Logged out.");
    } else {
        output::info("Not logged in.");
    }
    Ok(())
}

pub fn whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let identity = ctx.session.identity();

    if json {
        println!("{}", serde_json::to_string_pretty(&identity)?);
        return Ok(());
    }

    match identity {
        Some(identity) => {
            println!("{}", "Logged in".bold());
            println!("{}", output::identity_table(&identity));
        }
        None => output::info("Not logged in. Run 'ezn login'."),
    }
    Ok(())
}
