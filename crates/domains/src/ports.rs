//! # Core Ports
//!
//! Any adapter must implement these traits to be wired into the binary.
//! The stores in `services` only ever talk to these contracts, never to a
//! concrete backend.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{AuthResponse, Comment, Credentials, Flag, Post, Registration};

/// Persistence contract for the post collection.
///
/// The remote store cannot patch individual array elements, so the
/// `replace_*` operations take the complete post-local view of the mutated
/// field, never a delta.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostBackend: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<Post>>;

    async fn create_post(&self, post: &Post) -> Result<()>;
    async fn update_post(&self, post: &Post) -> Result<()>;
    /// Hard delete. Owner-only; the caller checks the precondition.
    async fn delete_post(&self, id: &str) -> Result<()>;

    // Single-field replacements (full-array semantics)
    async fn replace_likes(&self, id: &str, likes: &[String]) -> Result<()>;
    async fn replace_flags(&self, id: &str, flags: &[Flag], flagged: bool) -> Result<()>;
    async fn replace_comments(&self, id: &str, comments: &[Comment]) -> Result<()>;
    async fn set_deleted(&self, id: &str, deleted: bool) -> Result<()>;
}

/// Identity contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;
    async fn register(&self, registration: &Registration) -> Result<AuthResponse>;
}

/// Device-scoped key-value storage, the synchronous localStorage shape:
/// string keys, string blobs, no TTL.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait DeviceStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Option<String>;
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed helpers over [`DeviceStore`]. A blob that fails to parse is logged
/// and treated as absent, never fatal.
pub trait DeviceStoreExt: DeviceStore {
    fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, %err, "discarding unreadable device blob");
                None
            }
        }
    }

    fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|err| AppError::Storage(err.to_string()))?;
        self.set_raw(key, &raw)
    }
}

impl<S: DeviceStore + ?Sized> DeviceStoreExt for S {}
