// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Slidesmith deck generator.

use thiserror::Error;

/// The primary error type used across all Slidesmith crates.
///
/// Everything below the orchestrator boundary is expressed in these
/// categories before it reaches the chat host; raw transport or filesystem
/// errors never leak to the end user uncategorized.
#[derive(Debug, Error)]
pub enum SlidesmithError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Session store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No language model handle was supplied with the request.
    ///
    /// This is the one fatal, non-retryable precondition: nothing is
    /// assembled and no model call is made.
    #[error("no language model is available for this request")]
    MissingModel,

    /// The transport refused the request on permission grounds.
    #[error("model access denied: {0}")]
    PermissionDenied(String),

    /// The transport blocked the request by content policy.
    #[error("request blocked by provider policy: {0}")]
    Blocked(String),

    /// The requested model is not supported by the transport.
    ///
    /// The orchestrator retries once against the configured fallback model
    /// before surfacing this as a transport error.
    #[error("model not supported: {model}")]
    ModelNotSupported { model: String },

    /// Any other model transport failure.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller's cancellation signal fired. A neutral outcome, not a failure.
    #[error("operation cancelled")]
    Cancelled,

    /// Materializing the deck into its rendering sandbox failed.
    ///
    /// Distinct from generation failure: the document was valid, only
    /// saving/previewing it went wrong.
    #[error("workspace error: {message}")]
    Workspace {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SlidesmithError {
    /// True for outcomes the host should present as "cancelled", not as errors.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SlidesmithError::Cancelled)
    }
}
