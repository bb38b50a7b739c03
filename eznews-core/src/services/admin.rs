//! Admin article management
//!
//! Listing, create, edit and delete of articles plus the tag catalog for the
//! article form. Every call first runs the admin route guard against the
//! current session, so a non-admin never reaches the network.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::domain::result::{Error, Result};
use crate::domain::{ArticleDraft, ArticlePage, ArticleSummary, Tag};
use crate::ports::Method;
use crate::services::api::{server_message, ApiClient};
use crate::services::guard::{GuardDecision, RouteGuard};
use crate::services::session::SessionStore;

const ARTICLES_PATH: &str = "/articles";

#[derive(Deserialize)]
struct TagsBody {
    tags: Vec<Tag>,
}

#[derive(Deserialize)]
struct SavedArticleBody {
    article: ArticleSummary,
}

pub struct AdminArticleService {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl AdminArticleService {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    fn require_admin(&self) -> Result<()> {
        let snapshot = self.session.snapshot();
        match RouteGuard::Admin.evaluate(&snapshot) {
            GuardDecision::Render => Ok(()),
            _ if !snapshot.is_authenticated() => {
                Err(Error::Unauthorized("Please log in as an administrator".to_string()))
            }
            _ => Err(Error::Api {
                status: 403,
                message: "Admin access required".to_string(),
            }),
        }
    }

    fn checked<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.session.invalidate_if_unauthorized(e);
        }
        result
    }

    /// One page of the article table, newest first
    pub async fn list(&self, page: u32, page_size: u32, search: &str) -> Result<ArticlePage> {
        self.require_admin()?;
        if page == 0 {
            return Err(Error::validation("page", "Page numbers start at 1"));
        }
        let params = vec![
            ("page".to_string(), page.to_string()),
            ("limit".to_string(), page_size.to_string()),
            ("search".to_string(), search.trim().to_string()),
        ];
        self.checked(self.api.get(ARTICLES_PATH, params).await)
    }

    /// Tags offered by the article form
    pub async fn tags(&self) -> Result<Vec<Tag>> {
        self.require_admin()?;
        let body: TagsBody = self.checked(self.api.get("/tags", Vec::new()).await)?;
        Ok(body.tags)
    }

    pub async fn create(&self, draft: &ArticleDraft) -> Result<ArticleSummary> {
        self.require_admin()?;
        draft.validate()?;
        let body: SavedArticleBody =
            self.checked(self.api.post(ARTICLES_PATH, draft.to_payload(Utc::now())).await)?;
        Ok(body.article)
    }

    pub async fn update(&self, id: i64, draft: &ArticleDraft) -> Result<ArticleSummary> {
        self.require_admin()?;
        draft.validate()?;
        let path = format!("{}/{}", ARTICLES_PATH, id);
        let body: SavedArticleBody = self.checked(self.api.put(&path, draft.to_payload(Utc::now())).await)?;
        Ok(body.article)
    }

    /// Delete an article; returns the server's confirmation
    pub async fn delete(&self, id: i64) -> Result<String> {
        self.require_admin()?;
        let path = format!("{}/{}", ARTICLES_PATH, id);
        let response = self.checked(self.api.request(Method::Delete, &path, Vec::new(), None).await)?;
        Ok(server_message(&response.data).unwrap_or_else(|| "Article deleted".to_string()))
    }
}
