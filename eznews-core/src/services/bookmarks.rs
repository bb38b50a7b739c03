//! Bookmark service
//!
//! Bookmarking is add-only from an article: the article payload's
//! `is_bookmarked` flag decides whether a request is needed at all. Removal
//! happens from the bookmark list. Any 401 drops the session.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::domain::result::{Error, Result};
use crate::domain::{ArticleSummary, Bookmark};
use crate::ports::Method;
use crate::services::api::ApiClient;
use crate::services::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddBookmarkOutcome {
    Added,
    AlreadyBookmarked,
}

#[derive(Deserialize)]
struct BookmarksBody {
    bookmarks: Vec<Bookmark>,
}

pub struct BookmarkService {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl BookmarkService {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    fn require_session(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Unauthorized("Please log in to use bookmarks".to_string()))
        }
    }

    fn checked<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.session.invalidate_if_unauthorized(e);
        }
        result
    }

    /// Saved articles, newest first
    pub async fn list(&self) -> Result<Vec<Bookmark>> {
        self.require_session()?;
        let body: BookmarksBody = self.checked(self.api.get("/bookmarks", Vec::new()).await)?;
        Ok(body.bookmarks)
    }

    pub async fn add(&self, article: &ArticleSummary) -> Result<AddBookmarkOutcome> {
        self.require_session()?;
        if article.is_bookmarked {
            return Ok(AddBookmarkOutcome::AlreadyBookmarked);
        }

        let response = self.checked(
            self.api
                .request(
                    Method::Post,
                    "/bookmarks",
                    Vec::new(),
                    Some(json!({"article_id": article.id})),
                )
                .await,
        )?;

        // 201 with the new bookmark, or 200 when the server already had it
        if response.data.get("bookmark").is_some() {
            Ok(AddBookmarkOutcome::Added)
        } else {
            Ok(AddBookmarkOutcome::AlreadyBookmarked)
        }
    }

    pub async fn remove(&self, article_id: i64) -> Result<()> {
        self.require_session()?;
        self.checked(self.api.delete(&format!("/bookmarks/{}", article_id)).await)
    }
}
