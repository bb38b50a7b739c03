//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core depends
//! only on these traits, not on concrete implementations.

mod storage;
mod transport;

pub use storage::KeyValueStore;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
