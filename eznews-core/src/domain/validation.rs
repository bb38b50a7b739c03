//! Client-side field rules for the auth and profile forms
//!
//! These run before any request is made. Each form reports every failing
//! field at once so the UI can show the messages next to the inputs.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use super::article::{ArticleSummary, CategoryId};
use super::result::{FieldErrors, Result};

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MIN_TITLE_CHARS: usize = 5;
pub const MIN_CONTENT_CHARS: usize = 50;
pub const MIN_AUTHOR_CHARS: usize = 2;

/// Special characters accepted by the strong-password rule
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email.trim()))
}

fn check_full_name(errors: &mut FieldErrors, full_name: &str) {
    if full_name.trim().chars().count() < MIN_NAME_CHARS {
        errors.add("full_name", "Full name must be at least 2 characters");
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email) {
        errors.add("email", "Invalid email format");
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()
    }
}

/// Registration form; serialized as the `/auth/register` request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        check_full_name(&mut errors, &self.full_name);
        check_email(&mut errors, &self.email);
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add("password", "Password must be at least 8 characters");
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
        errors.into_result()
    }
}

/// Profile edit form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if let Some(full_name) = &self.full_name {
            check_full_name(&mut errors, full_name);
        }
        if let Some(email) = &self.email {
            check_email(&mut errors, email);
        }
        if self.full_name.is_none() && self.email.is_none() {
            errors.add("full_name", "Nothing to update");
        }
        errors.into_result()
    }
}

/// Password change form
#[derive(Debug, Clone, Default)]
pub struct PasswordChangeForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChangeForm {
    /// Per-field checks; at most one message per field, strongest rule first
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();

        if self.current_password.is_empty() {
            errors.add("current_password", "Current password is required");
        }

        let new = &self.new_password;
        if new.is_empty() {
            errors.add("new_password", "New password is required");
        } else if new.chars().count() < MIN_PASSWORD_CHARS {
            errors.add("new_password", "Password must be at least 8 characters");
        } else if !new.chars().any(|c| c.is_ascii_lowercase()) {
            errors.add("new_password", "Password must contain a lowercase letter");
        } else if !new.chars().any(|c| c.is_ascii_uppercase()) {
            errors.add("new_password", "Password must contain an uppercase letter");
        } else if !new.chars().any(|c| c.is_ascii_digit()) {
            errors.add("new_password", "Password must contain a digit");
        } else if !new.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
            errors.add(
                "new_password",
                format!("Password must contain a special character ({})", PASSWORD_SPECIALS),
            );
        }

        if self.confirm_password.is_empty() {
            errors.add("confirm_password", "Password confirmation is required");
        } else if self.new_password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }

        errors.into_result()
    }
}

/// Email for a password reset request
pub fn validate_recovery_email(email: &str) -> Result<()> {
    let mut errors = FieldErrors::default();
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else {
        check_email(&mut errors, email);
    }
    errors.into_result()
}

/// Second step of password recovery: the emailed token plus a new password
#[derive(Debug, Clone, Default)]
pub struct PasswordResetForm {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordResetForm {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if self.token.trim().is_empty() {
            errors.add("token", "Reset token is required");
        }
        if self.new_password.is_empty() {
            errors.add("new_password", "New password is required");
        } else if self.new_password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add("new_password", "Password must be at least 8 characters");
        }
        if self.new_password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
        errors.into_result()
    }
}

/// Article create/edit form of the admin area
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub category_id: Option<CategoryId>,
    pub author_name: String,
    /// `Some("")` clears the field, `None` leaves it out of the request
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    /// `None` publishes at submit time
    pub published_date: Option<DateTime<Utc>>,
    pub tag_ids: Vec<i64>,
}

impl ArticleDraft {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if self.title.trim().chars().count() < MIN_TITLE_CHARS {
            errors.add("title", "Title must be at least 5 characters");
        }
        if self.content.trim().chars().count() < MIN_CONTENT_CHARS {
            errors.add("content", "Content must be at least 50 characters");
        }
        if self.category_id.is_none() {
            errors.add("category_id", "Category is required");
        }
        if self.author_name.trim().chars().count() < MIN_AUTHOR_CHARS {
            errors.add("author_name", "Author name is required");
        }
        errors.into_result()
    }

    /// Request body for `POST /articles` and `PUT /articles/{id}`
    pub fn to_payload(&self, now: DateTime<Utc>) -> JsonValue {
        let published = self.published_date.unwrap_or(now);
        let mut body = json!({
            "title": self.title.trim(),
            "content": self.content.trim(),
            "category_id": self.category_id,
            "author_name": self.author_name.trim(),
            "published_date": published.to_rfc3339_opts(SecondsFormat::Millis, true),
            "tag_ids": self.tag_ids,
        });
        for (key, value) in [("image_url", &self.image_url), ("source_url", &self.source_url)] {
            if let Some(value) = value {
                let value = value.trim();
                body[key] = if value.is_empty() { JsonValue::Null } else { json!(value) };
            }
        }
        body
    }
}

impl From<&ArticleSummary> for ArticleDraft {
    /// Start an edit from an article detail response
    fn from(article: &ArticleSummary) -> Self {
        Self {
            title: article.title.clone(),
            content: article.content.clone().unwrap_or_default(),
            category_id: article.category.as_ref().map(|c| c.id),
            author_name: article.author_name.clone().unwrap_or_default(),
            image_url: article.image_url.clone(),
            source_url: article.source_url.clone(),
            published_date: article.published_at(),
            tag_ids: article.tags.iter().map(|t| t.id).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::Error;

    fn field_errors(result: Result<()>) -> FieldErrors {
        match result {
            Err(Error::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert!(LoginForm::new("a@b.co", "secret").validate().is_ok());

        let errors = field_errors(LoginForm::new(" ", "").validate());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_registration_rules() {
        let form = RegistrationForm {
            full_name: "A".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            confirm_password: "different".into(),
        };
        let errors = field_errors(form.validate());
        assert!(errors.get("full_name").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));

        let ok = RegistrationForm {
            full_name: "Dewi Lestari".into(),
            email: "dewi@example.com".into(),
            password: "rahasia123".into(),
            confirm_password: "rahasia123".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_password_change_strength_order() {
        let mut form = PasswordChangeForm {
            current_password: "old".into(),
            new_password: "alllowercase1".into(),
            confirm_password: "alllowercase1".into(),
        };
        let errors = field_errors(form.validate());
        assert_eq!(errors.get("new_password"), Some("Password must contain an uppercase letter"));
        assert_eq!(errors.len(), 1);

        form.new_password = "Strong1!".into();
        form.confirm_password = "Strong1!".into();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_password_change_confirmation_mismatch() {
        let form = PasswordChangeForm {
            current_password: String::new(),
            new_password: "Strong1!".into(),
            confirm_password: "Strong1?".into(),
        };
        let errors = field_errors(form.validate());
        assert_eq!(errors.get("current_password"), Some("Current password is required"));
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));
        assert!(errors.get("new_password").is_none());
    }

    #[test]
    fn test_profile_form_requires_a_change() {
        assert!(ProfileForm::default().validate().is_err());
        let form = ProfileForm {
            full_name: Some("Rudi".into()),
            email: None,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_password_reset_rules() {
        let errors = field_errors(PasswordResetForm::default().validate());
        assert_eq!(errors.get("token"), Some("Reset token is required"));
        assert_eq!(errors.get("new_password"), Some("New password is required"));

        let form = PasswordResetForm {
            token: "abc".into(),
            new_password: "short".into(),
            confirm_password: "shorter".into(),
        };
        let errors = field_errors(form.validate());
        assert_eq!(errors.get("new_password"), Some("Password must be at least 8 characters"));
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));

        assert!(validate_recovery_email("dewi@example.com").is_ok());
        assert!(validate_recovery_email("  ").is_err());
    }

    #[test]
    fn test_article_draft_rules_and_payload() {
        let errors = field_errors(ArticleDraft::default().validate());
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("category_id"), Some("Category is required"));

        let draft = ArticleDraft {
            title: "  Banjir di Jakarta  ".into(),
            content: "Hujan deras sejak pagi membuat sejumlah ruas jalan tergenang air.".into(),
            category_id: Some(2),
            author_name: "Redaksi".into(),
            image_url: Some(String::new()),
            source_url: None,
            published_date: None,
            tag_ids: vec![1, 3],
        };
        assert!(draft.validate().is_ok());

        let now = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 5, 1, 8, 0, 0).unwrap();
        let body = draft.to_payload(now);
        assert_eq!(body["title"], "Banjir di Jakarta");
        assert_eq!(body["published_date"], "2024-05-01T08:00:00.000Z");
        assert_eq!(body["tag_ids"], json!([1, 3]));
        assert!(body["image_url"].is_null());
        assert!(body.get("source_url").is_none());
    }
}
