//! meme-bazaar/crates/storage-adapters/src/lib.rs
//!
//! Persistence adapters: local device key-value storage plus the two
//! `PostBackend` implementations (offline device-backed, remote REST).

pub mod device_local;
pub mod posts_http;
pub mod posts_local;

pub use device_local::LocalDeviceStore;
pub use posts_http::HttpPostBackend;
pub use posts_local::LocalPostBackend;
