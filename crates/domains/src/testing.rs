//! Test doubles shared across crates.
//!
//! The mockall-generated `MockPostBackend`, `MockAuthBackend` and
//! `MockDeviceStore` live next to their traits in [`crate::ports`]; this
//! module adds the pieces mocks are awkward for.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::Result;
use crate::ports::DeviceStore;

/// In-memory [`DeviceStore`] with a write counter, for asserting how many
/// times a debounced save actually fired.
#[derive(Default)]
pub struct MemoryDeviceStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a blob, e.g. a persisted session or a stale draft.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Number of `set_raw` calls observed since construction.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DeviceStore for MemoryDeviceStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .remove(key);
        Ok(())
    }
}
