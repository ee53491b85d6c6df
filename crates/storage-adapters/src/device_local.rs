//! # Local Device Storage
//!
//! Filesystem implementation of `DeviceStore`: one JSON blob per key under a
//! configured directory, fronted by an in-memory read cache. The key prefix
//! namespaces our blobs the way the browser build prefixed its localStorage
//! entries.

use std::path::PathBuf;

use dashmap::DashMap;
use domains::{AppError, DeviceStore, Result};

const KEY_PREFIX: &str = "meme_bazaar_";

pub struct LocalDeviceStore {
    root: PathBuf,
    cache: DashMap<String, String>,
}

impl LocalDeviceStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|err| AppError::Storage(format!("create {}: {err}", root.display())))?;
        Ok(Self {
            root,
            cache: DashMap::new(),
        })
    }

    /// Keys may carry separator characters (`draft:u1:post:42`); anything
    /// unsafe in a filename is folded to `-`.
    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.root.join(format!("{KEY_PREFIX}{safe}.json"))
    }
}

impl DeviceStore for LocalDeviceStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        if let Some(hit) = self.cache.get(key) {
            return Some(hit.clone());
        }
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => {
                self.cache.insert(key.to_string(), raw.clone());
                Some(raw)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                // An unreadable blob is treated as absent.
                tracing::warn!(key, %err, "device storage read failed");
                None
            }
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path_for(key), value)
            .map_err(|err| AppError::Storage(format!("write {key}: {err}")))?;
        self.cache.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.cache.remove(key);
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Storage(format!("remove {key}: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::DeviceStoreExt;

    #[test]
    fn round_trips_raw_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDeviceStore::new(dir.path()).unwrap();

        assert!(store.get_raw("preferences").is_none());
        store.set_raw("preferences", r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(store.get_raw("preferences").unwrap(), r#"{"theme":"dark"}"#);

        store.remove("preferences").unwrap();
        assert!(store.get_raw("preferences").is_none());
        // Removing an absent key is not an error.
        store.remove("preferences").unwrap();
    }

    #[test]
    fn blobs_survive_a_new_store_over_the_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalDeviceStore::new(dir.path()).unwrap();
            store.set_raw("token", "fake-jwt-token-u1").unwrap();
        }
        let store = LocalDeviceStore::new(dir.path()).unwrap();
        assert_eq!(store.get_raw("token").unwrap(), "fake-jwt-token-u1");
    }

    #[test]
    fn separator_heavy_keys_map_to_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDeviceStore::new(dir.path()).unwrap();
        store.set_raw("draft:u1:post:42", "a").unwrap();
        store.set_raw("draft:u1:new", "b").unwrap();
        assert_eq!(store.get_raw("draft:u1:post:42").unwrap(), "a");
        assert_eq!(store.get_raw("draft:u1:new").unwrap(), "b");
    }

    #[test]
    fn unparseable_blob_reads_as_absent_via_ext() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDeviceStore::new(dir.path()).unwrap();
        store.set_raw("preferences", "{broken").unwrap();
        assert!(store.get_json::<domains::Preferences>("preferences").is_none());
    }
}
