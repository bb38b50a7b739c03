//! Persisted key/value storage port
//!
//! Mirrors the browser's local storage: string keys, string values,
//! synchronous access, one writer.

use crate::domain::result::{Error, Result};

pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;

    /// Write several entries as one unit.
    ///
    /// The default writes them one at a time; adapters that can make the
    /// write atomic should override it.
    fn set_items(&self, items: &[(&str, &str)]) -> Result<()> {
        for (key, value) in items {
            self.set_item(key, value)?;
        }
        Ok(())
    }

    /// Remove several entries as one unit
    fn remove_items(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }

    /// Drop the whole backing store, for when a normal write keeps failing.
    ///
    /// Unsupported by default.
    fn discard(&self) -> Result<()> {
        Err(Error::storage("This store cannot be discarded"))
    }
}
