//! meme-bazaar/crates/configs/src/lib.rs
//!
//! Layered configuration: built-in defaults, an optional `meme-bazaar.toml`
//! next to the binary, then `MEME_BAZAAR__`-prefixed environment overrides
//! (e.g. `MEME_BAZAAR__BACKEND__OFFLINE=true`).

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub backend: BackendSettings,
    pub storage: StorageSettings,
    pub composer: ComposerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the post/auth collection.
    pub base_url: String,
    /// When set, the device-local backends replace the remote ones.
    pub offline: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the device key-value blobs.
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComposerSettings {
    /// Autosave quiet period in milliseconds.
    pub autosave_debounce_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, SettingsError> {
        // A .env next to the binary feeds the environment source below.
        dotenvy::dotenv().ok();
        let settings = config::Config::builder()
            .set_default("backend.base_url", "http://localhost:3000")?
            .set_default("backend.offline", false)?
            .set_default("storage.data_dir", "./data/device")?
            .set_default("composer.autosave_debounce_ms", 1000_i64)?
            .add_source(config::File::with_name("meme-bazaar").required(false))
            .add_source(config::Environment::with_prefix("MEME_BAZAAR").separator("__"))
            .build()?;
        let loaded: Self = settings.try_deserialize()?;
        tracing::debug!(?loaded, "configuration loaded");
        Ok(loaded)
    }
}
