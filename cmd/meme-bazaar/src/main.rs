//! # Meme-Bazaar Binary
//!
//! The entry point that assembles the client core from its adapters: device
//! storage, post/auth backends (remote or offline per configuration), the
//! stores and the derived feed.

use std::sync::Arc;

use anyhow::Context;
use configs::AppConfig;
use domains::{AuthBackend, DeviceStore, PostBackend};
use services::{FeedViewModel, PostStore, PreferencesStore, SessionStore};
use storage_adapters::{HttpPostBackend, LocalDeviceStore, LocalPostBackend};
use auth_adapters::{HttpAuthBackend, LocalAuthBackend};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    // 1. Device key-value storage
    let device: Arc<dyn DeviceStore> = Arc::new(
        LocalDeviceStore::new(&config.storage.data_dir)
            .context("failed to open device storage")?,
    );

    // 2. Auth backend and session, remote or offline
    let auth_backend: Arc<dyn AuthBackend> = if config.backend.offline {
        tracing::info!("running against device-local backends");
        Arc::new(LocalAuthBackend::new(Arc::clone(&device)))
    } else {
        tracing::info!(base_url = %config.backend.base_url, "running against the remote collection");
        Arc::new(HttpAuthBackend::new(&config.backend.base_url))
    };
    let session = SessionStore::new(Arc::clone(&device), auth_backend);

    match session.current_user() {
        Some(user) => tracing::info!(username = %user.username, "restored session"),
        None => tracing::info!("no session on this device"),
    }

    // 3. Post backend; a restored session's token rides along on remote calls
    let post_backend: Arc<dyn PostBackend> = if config.backend.offline {
        Arc::new(LocalPostBackend::new(Arc::clone(&device)))
    } else {
        let backend = HttpPostBackend::new(&config.backend.base_url);
        backend.set_token(session.token());
        Arc::new(backend)
    };

    let preferences = PreferencesStore::new(Arc::clone(&device));
    let posts = PostStore::new(post_backend, preferences.clone());

    // 4. Initial reconciliation; a failed read keeps the (empty) prior list.
    if let Err(err) = posts.load().await {
        tracing::warn!(%err, "initial post load failed");
    }

    // 5. Derived feed
    let feed = FeedViewModel::new(&posts, &preferences);
    tracing::info!(posts = feed.posts().len(), "feed ready");
    for post in feed.posts() {
        tracing::info!(
            id = %post.id,
            title = post.title.as_deref().unwrap_or("Untitled"),
            mood = %post.mood,
            team = %post.team,
            likes = post.likes.len(),
            "post"
        );
    }

    Ok(())
}
