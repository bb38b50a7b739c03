//! User identity domain model

use serde::{Deserialize, Serialize};

/// Role assigned by the server. Anything unrecognised is treated as a plain user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    #[serde(other)]
    Unknown,
}

/// The authenticated user, as returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Identity {
    pub fn new(id: i64, full_name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email: email.into(),
            role,
            avatar_url: None,
            created_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Apply a partial update; fields left as `None` keep their value
    pub fn merge(&mut self, patch: IdentityPatch) {
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(avatar_url) = patch.avatar_url {
            self.avatar_url = Some(avatar_url);
        }
    }
}

/// Partial identity update (profile edits)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<&Identity> for IdentityPatch {
    fn from(identity: &Identity) -> Self {
        Self {
            full_name: Some(identity.full_name.clone()),
            email: Some(identity.email.clone()),
            avatar_url: identity.avatar_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        let admin: Identity = serde_json::from_str(
            r#"{"id": 1, "full_name": "Admin", "email": "admin@eznews.id", "role": "admin"}"#,
        )
        .unwrap();
        assert!(admin.is_admin());

        let editor: Identity = serde_json::from_str(
            r#"{"id": 2, "full_name": "Editor", "email": "ed@eznews.id", "role": "editor", "avatar_url": null}"#,
        )
        .unwrap();
        assert_eq!(editor.role, Role::Unknown);
        assert!(!editor.is_admin());
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut identity = Identity::new(7, "Siti Rahma", "siti@example.com", Role::User);
        identity.merge(IdentityPatch {
            full_name: Some("Siti R.".into()),
            ..Default::default()
        });

        assert_eq!(identity.full_name, "Siti R.");
        assert_eq!(identity.email, "siti@example.com");
        assert_eq!(identity.role, Role::User);
    }
}
