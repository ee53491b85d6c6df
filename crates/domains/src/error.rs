//! # AppError
//!
//! Centralized error handling for the Meme-Bazaar ecosystem.
//! Maps domain-specific failures to actionable error types.
//!
//! Nothing here is fatal to the process: every failure degrades to a
//! narrower but consistent state at the call site.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post, User, draft slot)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., empty post body, blank flag reason)
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure (invalid credentials, missing session)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure (non-owner delete, non-admin moderation)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists (e.g., duplicate registration email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Remote collection failure. Writes that hit this are surfaced to the
    /// caller rather than silently dropped; reads leave prior state intact.
    #[error("backend error: {0}")]
    Backend(String),

    /// Device key-value storage failure on write. Reads never produce this:
    /// unreadable blobs are treated as absent.
    #[error("device storage error: {0}")]
    Storage(String),
}

/// A specialized Result type for Meme-Bazaar logic.
pub type Result<T> = std::result::Result<T, AppError>;
