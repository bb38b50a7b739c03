//! EzNews Core - client-side state for the EzNews news portal
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Articles, identities, sessions, pagination, form rules
//! - **ports**: Traits for the HTTP transport and persisted key/value storage
//! - **services**: Session store, route guards, list query controller,
//!   debounced search, catalog, bookmarks, profile, admin articles, event log
//! - **adapters**: reqwest transport, file and in-memory storage

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::file_store::FileStore;
use adapters::http::ReqwestTransport;
use config::{Config, SESSION_FILE};
use ports::{HttpTransport, KeyValueStore};
use services::*;

pub use domain::result::{Error, FieldErrors};
pub use domain::{ArticleSummary, Category, Identity, PageWindow, Session, SessionSnapshot};

/// Main context for EzNews client operations
///
/// Owns the one session store of the running client and the services that
/// share it.
pub struct NewsContext {
    pub config: Config,
    pub app_dir: PathBuf,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub listing: Arc<ListQueryController>,
    pub catalog: CatalogService,
    pub bookmarks: BookmarkService,
    pub profile: ProfileService,
    pub admin: AdminArticleService,
}

impl NewsContext {
    /// Build a context for `app_dir` using the reqwest transport and the
    /// session file, and restore the persisted session
    pub fn new(app_dir: &Path) -> Result<Self> {
        let config = Config::load(app_dir)?;
        let transport = Arc::new(ReqwestTransport::new(&config.api_url, config.timeout)?);
        let storage = Arc::new(FileStore::new(app_dir.join(SESSION_FILE)));
        Ok(Self::with_parts(config, app_dir.to_path_buf(), transport, storage))
    }

    /// Build a context from explicit collaborators
    pub fn with_parts(
        config: Config,
        app_dir: PathBuf,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(storage, Arc::clone(&transport)));
        session.restore();

        let api = ApiClient::new(transport, session.clone());
        let listing = Arc::new(ListQueryController::new(api.clone(), config.page_size));

        Self {
            catalog: CatalogService::new(api.clone()),
            bookmarks: BookmarkService::new(api.clone(), session.clone()),
            profile: ProfileService::new(api.clone(), session.clone()),
            admin: AdminArticleService::new(api.clone(), session.clone()),
            config,
            app_dir,
            session,
            api,
            listing,
        }
    }

    /// Debounced search input feeding this context's listing
    pub fn search_input(&self) -> DebouncedSearch {
        DebouncedSearch::new(self.listing.clone(), self.config.search_debounce)
    }

    /// Guard decision for `path` with the current session
    pub fn guard(&self, path: &str) -> GuardDecision {
        match RouteGuard::for_path(path) {
            Some(guard) => guard.evaluate(&self.session.snapshot()),
            None => GuardDecision::Render,
        }
    }
}
