//! File-backed key/value store
//!
//! All entries live in one JSON object on disk. Every write rewrites the
//! whole file through a temp file + rename while holding an exclusive lock
//! on a sibling `.lock` file, so a batch of entries lands together or not
//! at all.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| Error::storage(format!("Corrupt store {:?}: {}", self.path, e)))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|e| Error::storage(format!("Failed to write {:?}: {}", self.path, e)))?;
        Ok(())
    }

    /// Run a read-modify-write cycle under the store lock
    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        if let Some(dir) = self.lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let lock_file: File = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        lock_file.lock_exclusive()?;

        // A corrupt file is replaced rather than blocking every later write
        let mut entries = self.read_all().unwrap_or_default();
        apply(&mut entries);
        let result = self.write_all(&entries);

        let _ = lock_file.unlock();
        result
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.set_items(&[(key, value)])
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.remove_items(&[key])
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<()> {
        self.update(|entries| {
            for (key, value) in items {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_items(&self, keys: &[&str]) -> Result<()> {
        self.update(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }

    /// Delete the file itself. Needs no temp file, so it can succeed where
    /// a rewrite cannot (e.g. a full disk).
    fn discard(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get_item("token").unwrap(), None);
    }

    #[test]
    fn test_batch_write_and_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("session.json"));

        store.set_items(&[("token", "abc"), ("user", r#"{"id":1}"#)]).unwrap();
        assert_eq!(store.get_item("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(store.get_item("user").unwrap().as_deref(), Some(r#"{"id":1}"#));

        // A second handle on the same file sees the same entries
        let reopened = FileStore::new(store.path().to_path_buf());
        assert_eq!(reopened.get_item("token").unwrap().as_deref(), Some("abc"));

        store.remove_items(&["token", "user"]).unwrap();
        assert_eq!(reopened.get_item("token").unwrap(), None);
        assert_eq!(reopened.get_item("user").unwrap(), None);
    }

    #[test]
    fn test_unrelated_keys_survive() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        store.set_item("theme", "dark").unwrap();
        store.set_items(&[("token", "abc"), ("user", "{}")]).unwrap();
        store.remove_items(&["token", "user"]).unwrap();

        assert_eq!(store.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_discard_removes_the_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        store.set_items(&[("token", "abc"), ("user", "{}")]).unwrap();
        store.discard().unwrap();

        assert!(!store.path().exists());
        assert_eq!(store.get_item("token").unwrap(), None);
        // Nothing left to delete is fine
        store.discard().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error_then_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get_item("token"), Err(Error::Storage(_))));

        store.remove_items(&["token", "user"]).unwrap();
        assert_eq!(store.get_item("token").unwrap(), None);
    }
}
