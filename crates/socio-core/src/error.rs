// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Socio webhook pipeline.

use thiserror::Error;

/// The primary error type used across all Socio adapter traits and pipeline stages.
///
/// A missing invoice is not an error: archive lookups return `Ok(None)`.
/// Failed deliveries are reported through [`SendOutcome`](crate::types::SendOutcome)
/// rather than through this type.
#[derive(Debug, Error)]
pub enum SocioError {
    /// Configuration errors (missing secret, invalid TOML, bad header value).
    #[error("configuration error: {0}")]
    Config(String),

    /// Inbound payload rejected before processing (bad signature, malformed JSON).
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging transport errors (request construction, media upload, delivery).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion service errors (API failure, empty reply, bad response body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invoice archive errors (unreadable directory, download failure).
    #[error("archive error: {message}")]
    Archive {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
