//! # Preferences Store
//!
//! Per-device saved/liked post-id sets plus the theme. Every mutation
//! persists first and only then notifies, so readers never observe a state
//! the device has not accepted.

use std::sync::Arc;

use domains::{DeviceStore, DeviceStoreExt, Preferences, Result, Theme};

use crate::store::Store;

const PREFS_KEY: &str = "preferences";

#[derive(Clone)]
pub struct PreferencesStore {
    device: Arc<dyn DeviceStore>,
    prefs: Store<Preferences>,
}

impl PreferencesStore {
    pub fn new(device: Arc<dyn DeviceStore>) -> Self {
        let prefs = device.get_json::<Preferences>(PREFS_KEY).unwrap_or_default();
        Self {
            device,
            prefs: Store::new(prefs),
        }
    }

    pub fn store(&self) -> &Store<Preferences> {
        &self.prefs
    }

    pub fn get(&self) -> Preferences {
        self.prefs.get()
    }

    /// Toggle a post in the saved set. Returns whether the post is saved
    /// after the toggle.
    pub fn toggle_saved(&self, post_id: &str) -> Result<bool> {
        let mut prefs = self.prefs.get();
        let now_saved = if prefs.is_saved(post_id) {
            prefs.saved_posts.retain(|id| id != post_id);
            false
        } else {
            prefs.saved_posts.push(post_id.to_string());
            true
        };
        self.persist(prefs)?;
        Ok(now_saved)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        let mut prefs = self.prefs.get();
        prefs.theme = theme;
        self.persist(prefs)
    }

    /// Maintain the liked-post fast-lookup set. Driven by the post store's
    /// like toggle; idempotent in both directions.
    pub(crate) fn set_liked(&self, post_id: &str, liked: bool) -> Result<()> {
        let mut prefs = self.prefs.get();
        let already = prefs.is_liked(post_id);
        match (already, liked) {
            (false, true) => prefs.liked_posts.push(post_id.to_string()),
            (true, false) => prefs.liked_posts.retain(|id| id != post_id),
            _ => return Ok(()),
        }
        self.persist(prefs)
    }

    /// Restore a snapshot verbatim, used when an optimistic mutation is
    /// rolled back.
    pub(crate) fn replace(&self, snapshot: Preferences) -> Result<()> {
        self.persist(snapshot)
    }

    fn persist(&self, prefs: Preferences) -> Result<()> {
        self.device.set_json(PREFS_KEY, &prefs)?;
        self.prefs.set(prefs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::testing::MemoryDeviceStore;

    #[test]
    fn toggle_saved_is_an_involution() {
        let store = PreferencesStore::new(Arc::new(MemoryDeviceStore::new()));
        assert!(store.toggle_saved("7").unwrap());
        assert!(store.get().is_saved("7"));
        assert!(!store.toggle_saved("7").unwrap());
        assert!(!store.get().is_saved("7"));
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let device = Arc::new(MemoryDeviceStore::new().with_entry(PREFS_KEY, "][nonsense"));
        let store = PreferencesStore::new(device);
        assert_eq!(store.get(), Preferences::default());
        assert_eq!(store.get().theme, Theme::Light);
    }

    #[test]
    fn mutations_are_persisted() {
        let device = Arc::new(MemoryDeviceStore::new());
        let store = PreferencesStore::new(device.clone());
        store.toggle_saved("3").unwrap();
        store.set_theme(Theme::Dark).unwrap();

        // A second store over the same device sees the persisted state.
        let rehydrated = PreferencesStore::new(device);
        assert!(rehydrated.get().is_saved("3"));
        assert_eq!(rehydrated.get().theme, Theme::Dark);
    }
}
