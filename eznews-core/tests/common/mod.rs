//! Shared fixtures for the integration tests
//!
//! Two in-process transports stand in for the news API:
//! - `ScriptedTransport` answers immediately from per-route queues
//! - `GatedTransport` holds every request until the test releases it, so
//!   tests can choose the order in which responses arrive

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tokio::sync::oneshot;

use eznews_core::adapters::memory_store::MemoryStore;
use eznews_core::config::Config;
use eznews_core::domain::result::{Error, Result};
use eznews_core::ports::{HttpRequest, HttpResponse, HttpTransport, Method};
use eznews_core::NewsContext;

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(&'static str, String), VecDeque<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for `method path`. The last queued response for a
    /// route is repeated once the queue runs down to it.
    pub fn on(&self, method: Method, path: &str, status: u16, body: JsonValue) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method.as_str(), path.to_string()))
            .or_default()
            .push_back(HttpResponse::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let key = (request.method.as_str(), request.path.clone());
        self.requests.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| HttpResponse::new(404, json!({"error": "No such route"}))))
    }
}

type Pending = (HttpRequest, Option<oneshot::Sender<Result<HttpResponse>>>);

/// Holds each request until `release`/`fail` is called for its index
#[derive(Default)]
pub struct GatedTransport {
    pending: Mutex<Vec<Pending>>,
}

impl GatedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn issued(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.pending.lock().unwrap()[index].0.clone()
    }

    /// Yield until at least `count` requests have been sent
    pub async fn wait_for(&self, count: usize) {
        while self.issued() < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn release(&self, index: usize, response: HttpResponse) {
        self.complete(index, Ok(response));
    }

    /// Answer request `index` with a network failure
    pub fn fail(&self, index: usize, message: &str) {
        self.complete(index, Err(Error::Network(message.to_string())));
    }

    fn complete(&self, index: usize, result: Result<HttpResponse>) {
        let sender = self.pending.lock().unwrap()[index]
            .1
            .take()
            .expect("request already completed");
        let _ = sender.send(result);
    }
}

#[async_trait]
impl HttpTransport for GatedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push((request, Some(tx)));
        rx.await
            .unwrap_or_else(|_| Err(Error::Network("request dropped".to_string())))
    }
}

pub fn article_json(id: i64, title: &str) -> JsonValue {
    json!({
        "id": id,
        "title": title,
        "content": format!("<p>Isi berita {}</p>", title),
        "image_url": null,
        "category": {"id": 1, "name": "Nasional", "slug": "nasional"},
        "author_name": "Redaksi",
        "published_date": "2024-05-01T08:00:00",
        "tags": [],
        "is_bookmarked": false
    })
}

pub fn page_json(ids: &[i64], pages: u32) -> JsonValue {
    let items: Vec<JsonValue> = ids
        .iter()
        .map(|id| article_json(*id, &format!("Berita {}", id)))
        .collect();
    json!({"items": items, "pages": pages, "total": ids.len()})
}

pub fn auth_json(role: &str) -> JsonValue {
    json!({
        "message": "Login successful",
        "access_token": format!("token-{}", role),
        "user": {
            "id": 42,
            "full_name": "Dewi Lestari",
            "email": "dewi@example.com",
            "role": role,
            "created_at": "2024-01-15T10:00:00"
        }
    })
}

/// Context wired to a scripted transport and in-memory storage
pub fn scripted_context(transport: Arc<ScriptedTransport>) -> (NewsContext, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let context = NewsContext::with_parts(
        Config::default(),
        std::env::temp_dir(),
        transport,
        storage.clone(),
    );
    (context, storage)
}
