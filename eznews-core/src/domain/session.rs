//! Session domain model

use serde::{Deserialize, Serialize};

use super::user::Identity;

/// Credential and identity of the logged-in user.
///
/// The two only ever exist together; an unauthenticated client has no
/// `Session` at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

/// Point-in-time view of the session store, used by route guards and views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    /// True until the persisted session has been restored
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_admin)
    }
}

/// Login/registration response body: `{access_token, user}`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: Identity,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.access_token,
            identity: response.user,
        }
    }
}

/// Answer to a password reset request.
///
/// Development servers hand the reset token back directly instead of
/// emailing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetTicket {
    pub message: String,
    #[serde(default)]
    pub reset_token: Option<String>,
}
