//! Debounced search input
//!
//! Keystrokes arm a timer; only text that stays unchanged for the whole
//! debounce window is committed to the listing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Receives committed search terms
#[async_trait]
pub trait SearchTarget: Send + Sync {
    async fn commit_search(&self, term: String);
}

pub struct DebouncedSearch {
    window: Duration,
    target: Arc<dyn SearchTarget>,
    pending: Mutex<Option<JoinHandle<()>>>,
    /// Bumped by every input, clear and cancel; a commit only runs if it
    /// still carries the latest value
    generation: Arc<AtomicU64>,
}

impl DebouncedSearch {
    pub fn new(target: Arc<dyn SearchTarget>, window: Duration) -> Self {
        Self {
            window,
            target,
            pending: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a keystroke. Must be called from within a tokio runtime.
    pub fn input(&self, text: &str) {
        let target = Arc::clone(&self.target);
        let window = self.window;
        let term = text.to_string();
        let generation = Arc::clone(&self.generation);
        let armed = self.bump();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Detached so that a later keystroke aborting this timer cannot
            // cancel the fetch
            tokio::spawn(async move {
                if generation.load(Ordering::SeqCst) == armed {
                    target.commit_search(term).await;
                }
            });
        });

        if let Some(previous) = self.pending().replace(timer) {
            previous.abort();
        }
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Drop any armed timer and commit the empty term right away
    pub async fn clear(&self) {
        self.cancel();
        self.target.commit_search(String::new()).await;
    }

    /// Drop any armed timer, and any fired commit that has not started yet
    pub fn cancel(&self) {
        self.bump();
        if let Some(previous) = self.pending().take() {
            previous.abort();
        }
    }

    /// True while a timer is armed and has not fired yet
    pub fn is_pending(&self) -> bool {
        self.pending().as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.cancel();
    }
}
