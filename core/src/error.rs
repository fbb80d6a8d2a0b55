//! Error taxonomy shared by every service crate.
//!
//! This is the seven-kind taxonomy from the system design: each variant
//! maps to exactly one HTTP status in `studyforge-api`'s error translation
//! layer. Service crates return this type directly (or a local error that
//! converts into it) rather than inventing their own status-coded errors.

use thiserror::Error;

/// The error taxonomy used across the ingestion, generation, and quiz
/// cores. Exactly one variant per HTTP status the API surface exposes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Client supplied malformed, missing, or out-of-range data.
    #[error("{0}")]
    BadInput(String),

    /// A referenced document/quiz/session identifier does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Concurrent modification of the same session was rejected.
    #[error("{0}")]
    Conflict(String),

    /// An external call (embedder, completer, vector store) exceeded its
    /// deadline or was cancelled.
    #[error("upstream timed out: {0}")]
    UpstreamTimeout(String),

    /// An external call returned a non-retryable error.
    #[error("upstream error: {0}")]
    Upstream(#[source] anyhow::Error),

    /// Model output failed schema validation twice in a row.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Invariant violation or uncaught failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias used throughout the service crates.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Short machine-stable kind name, useful for logging/metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BadInput(_) => "bad_input",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::UpstreamTimeout(_) => "upstream_timeout",
            Self::Upstream(_) => "upstream_error",
            Self::Generation(_) => "generation_error",
            Self::Internal(_) => "internal_error",
        }
    }
}
