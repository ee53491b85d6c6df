//! meme-bazaar/crates/domains/src/lib.rs
//!
//! The central domain entities and port definitions for Meme-Bazaar.

pub mod error;
pub mod models;
pub mod ports;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
