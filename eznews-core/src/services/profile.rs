//! Profile service - view and edit the logged-in user's profile

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::domain::result::{Error, Result};
use crate::domain::{Identity, IdentityPatch, PasswordChangeForm, ProfileForm};
use crate::ports::Method;
use crate::services::api::{server_message, ApiClient};
use crate::services::session::SessionStore;

#[derive(Deserialize)]
struct ProfileUpdated {
    user: Identity,
}

pub struct ProfileService {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl ProfileService {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    fn checked<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.session.invalidate_if_unauthorized(e);
        }
        result
    }

    fn require_session(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Unauthorized("Please log in first".to_string()))
        }
    }

    pub async fn profile(&self) -> Result<Identity> {
        self.require_session()?;
        self.checked(self.api.get("/users/profile", Vec::new()).await)
    }

    /// Save profile edits and fold the server's copy into the session
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<Identity> {
        form.validate()?;
        self.require_session()?;

        let body = json!({
            "full_name": form.full_name.as_deref().map(str::trim),
            "email": form.email.as_deref().map(str::trim),
        });
        // Drop unset fields so the server keeps them
        let body = match body {
            serde_json::Value::Object(map) => {
                serde_json::Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
            }
            other => other,
        };

        let updated: ProfileUpdated = self.checked(self.api.put("/users/profile", body).await)?;
        self.session.update_identity(IdentityPatch::from(&updated.user))
    }

    /// Change the password; returns the server's confirmation message
    pub async fn change_password(&self, form: &PasswordChangeForm) -> Result<String> {
        form.validate()?;
        self.require_session()?;

        let response = self.checked(
            self.api
                .request(
                    Method::Put,
                    "/users/password",
                    Vec::new(),
                    Some(json!({
                        "old_password": form.current_password,
                        "new_password": form.new_password,
                        "confirm_new_password": form.confirm_password,
                    })),
                )
                .await,
        )?;
        Ok(server_message(&response.data).unwrap_or_else(|| "Password changed".to_string()))
    }
}
