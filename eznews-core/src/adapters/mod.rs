//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for HttpTransport
//! - JSON file on disk for KeyValueStore (persisted session)
//! - In-memory KeyValueStore for tests and ephemeral sessions

pub mod file_store;
pub mod http;
pub mod memory_store;

#[cfg(test)]
pub mod mock_server;
