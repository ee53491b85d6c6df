//! meme-bazaar/crates/auth-adapters/src/lib.rs
//!
//! `AuthBackend` implementations: the remote json-server auth flow with its
//! plaintext fallback, and the offline device identity.

pub mod http;
pub mod local;

pub use http::HttpAuthBackend;
pub use local::LocalAuthBackend;
