//! List query controller - search, category filter and pagination state for
//! the article listing, and the fetch lifecycle around it.
//!
//! Setters only touch local state. `fetch()` issues a request tagged with a
//! sequence number; only the response to the most recently issued request
//! is allowed to change what is displayed.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::result::{Error, Result};
use crate::domain::{ArticlePage, ArticleSummary, CategoryId, PageWindow};
use crate::services::api::ApiClient;
use crate::services::search::SearchTarget;

pub const DEFAULT_PAGE_SIZE: u32 = 9;

const ARTICLES_PATH: &str = "/articles";
const EVENT_CAPACITY: usize = 64;

/// The parameters of a listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search_term: String,
    pub category_filter: Option<CategoryId>,
    pub page: u32,
    pub page_size: u32,
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            search_term: String::new(),
            category_filter: None,
            page: 1,
            page_size,
        }
    }

    /// Query string for `GET /articles`
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.page_size.to_string()),
            ("search".to_string(), self.search_term.clone()),
        ];
        if let Some(category) = self.category_filter {
            params.push(("category_id".to_string(), category.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Result of one `fetch()` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response became the visible listing
    Applied,
    /// The request failed; previous items stay visible
    Failed(String),
    /// A newer request was issued before this one completed
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    StateChanged,
}

/// What a listing view renders
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub query: ListQuery,
    pub items: Vec<ArticleSummary>,
    /// `None` until a page has been loaded
    pub total_pages: Option<u32>,
    pub total: Option<u64>,
    pub status: ListStatus,
    pub error: Option<String>,
}

impl ListSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct ControllerState {
    query: ListQuery,
    items: Vec<ArticleSummary>,
    total_pages: Option<u32>,
    total: Option<u64>,
    status: ListStatus,
    error: Option<String>,
    next_seq: u64,
    latest_issued: u64,
    /// Query changed since the last issued fetch
    dirty: bool,
}

pub struct ListQueryController {
    api: ApiClient,
    state: Mutex<ControllerState>,
    events: broadcast::Sender<ListEvent>,
}

impl ListQueryController {
    pub fn new(api: ApiClient, page_size: u32) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            state: Mutex::new(ControllerState {
                query: ListQuery::new(page_size.max(1)),
                items: Vec::new(),
                total_pages: None,
                total: None,
                status: ListStatus::Idle,
                error: None,
                next_seq: 0,
                latest_issued: 0,
                dirty: true,
            }),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let _ = self.events.send(ListEvent::StateChanged);
    }

    /// Change the search term; a different term goes back to page 1
    pub fn set_search_term(&self, term: &str) {
        let changed = {
            let mut state = self.lock();
            if state.query.search_term == term {
                false
            } else {
                state.query.search_term = term.to_string();
                state.query.page = 1;
                state.dirty = true;
                true
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Change the category filter; a different filter goes back to page 1
    pub fn set_category_filter(&self, category: Option<CategoryId>) {
        let changed = {
            let mut state = self.lock();
            if state.query.category_filter == category {
                false
            } else {
                state.query.category_filter = category;
                state.query.page = 1;
                state.dirty = true;
                true
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Move to page `page` (1-based)
    pub fn set_page(&self, page: u32) -> Result<()> {
        let changed = {
            let mut state = self.lock();
            if page == 0 {
                return Err(Error::validation("page", "Page numbers start at 1"));
            }
            if let Some(total) = state.total_pages {
                if page > total.max(1) {
                    return Err(Error::validation(
                        "page",
                        format!("Page {} is past the last page ({})", page, total.max(1)),
                    ));
                }
            }
            if state.query.page == page {
                false
            } else {
                state.query.page = page;
                state.dirty = true;
                true
            }
        };
        if changed {
            self.notify();
        }
        Ok(())
    }

    pub fn first_page(&self) -> u32 {
        self.move_to(|_, _| 1)
    }

    pub fn prev_page(&self) -> u32 {
        self.move_to(|page, _| page.saturating_sub(1).max(1))
    }

    pub fn next_page(&self) -> u32 {
        self.move_to(|page, total| match total {
            Some(total) => (page + 1).min(total.max(1)),
            None => page + 1,
        })
    }

    pub fn last_page(&self) -> u32 {
        self.move_to(|page, total| total.map(|t| t.max(1)).unwrap_or(page))
    }

    /// Apply a clamped page move and return the resulting page
    fn move_to<F>(&self, target: F) -> u32
    where
        F: FnOnce(u32, Option<u32>) -> u32,
    {
        let page = {
            let state = self.lock();
            target(state.query.page, state.total_pages)
        };
        // Clamped above, so this cannot be out of range
        let _ = self.set_page(page);
        self.lock().query.page
    }

    /// Issue a listing request for the current query.
    ///
    /// Never returns an error: a failure is recorded in the state and the
    /// previous items stay visible.
    pub async fn fetch(&self) -> FetchOutcome {
        let (seq, query) = {
            let mut state = self.lock();
            state.next_seq += 1;
            state.latest_issued = state.next_seq;
            state.dirty = false;
            state.status = ListStatus::Loading;
            (state.next_seq, state.query.clone())
        };
        self.notify();

        let result: Result<ArticlePage> = self.api.get(ARTICLES_PATH, query.to_params()).await;

        let outcome = {
            let mut state = self.lock();
            if seq != state.latest_issued {
                return FetchOutcome::Superseded;
            }
            match result {
                Ok(page) => {
                    // The listing shrank under us; pull the page back in range
                    let last = page.total_pages.max(1);
                    if state.query.page > last {
                        state.query.page = last;
                        state.dirty = true;
                    }
                    state.items = page.items;
                    state.total_pages = Some(page.total_pages);
                    state.total = page.total;
                    state.status = ListStatus::Loaded;
                    state.error = None;
                    FetchOutcome::Applied
                }
                Err(e) => {
                    let message = e.to_string();
                    state.status = ListStatus::Error;
                    state.error = Some(message.clone());
                    FetchOutcome::Failed(message)
                }
            }
        };
        self.notify();
        outcome
    }

    /// Fetch once for the latest state, if it changed since the last fetch
    pub async fn refresh(&self) -> Option<FetchOutcome> {
        if self.lock().dirty {
            Some(self.fetch().await)
        } else {
            None
        }
    }

    pub fn query(&self) -> ListQuery {
        self.lock().query.clone()
    }

    pub fn status(&self) -> ListStatus {
        self.lock().status
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.lock();
        ListSnapshot {
            query: state.query.clone(),
            items: state.items.clone(),
            total_pages: state.total_pages,
            total: state.total,
            status: state.status,
            error: state.error.clone(),
        }
    }

    /// Pagination strip for the current page, if there is more than one page
    pub fn page_window(&self) -> Option<PageWindow> {
        let state = self.lock();
        PageWindow::new(state.query.page, state.total_pages.unwrap_or(0))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl SearchTarget for ListQueryController {
    async fn commit_search(&self, term: String) {
        self.set_search_term(&term);
        self.refresh().await;
    }
}
