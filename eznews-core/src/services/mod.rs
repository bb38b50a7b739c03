//! Service layer - client state and use cases
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one feature area of the news client.

mod admin;
pub mod api;
mod bookmarks;
mod catalog;
pub mod guard;
pub mod listing;
pub mod logging;
mod profile;
pub mod search;
pub mod session;

pub use admin::AdminArticleService;
pub use api::{ApiClient, TokenSource};
pub use bookmarks::{AddBookmarkOutcome, BookmarkService};
pub use catalog::CatalogService;
pub use guard::{GuardDecision, Route, RouteGuard};
pub use listing::{FetchOutcome, ListEvent, ListQuery, ListQueryController, ListSnapshot, ListStatus};
pub use logging::{EntryPoint, EventCount, LogEntry, LogEvent, LoggingService};
pub use profile::ProfileService;
pub use search::{DebouncedSearch, SearchTarget};
pub use session::{SessionEvent, SessionStore};
