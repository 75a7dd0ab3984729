//! Error types for feed sources.

use thiserror::Error;

use super::types::FeedCategory;

/// Why a single fetch attempt failed.
///
/// Every variant is transient from the scheduler's point of view: the feed is
/// retried with backoff and the cached snapshot is left in place.
#[derive(Debug, Clone, Error)]
pub enum FetchFailure {
    /// Transport-level failure (DNS, connect, TLS, read).
    #[error("network error: {0}")]
    Network(String),

    /// Response received but could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// Upstream answered with an error status.
    #[error("upstream error: {status} - {message}")]
    Upstream { status: u16, message: String },

    /// Fetch did not complete within its deadline.
    #[error("fetch timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Source returned a payload for another category.
    #[error("payload category mismatch: expected {expected}, got {actual}")]
    CategoryMismatch {
        expected: FeedCategory,
        actual: FeedCategory,
    },
}

impl FetchFailure {
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network(reason.into())
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse(reason.into())
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Parse(_) | Self::CategoryMismatch { .. } => "parse",
            Self::Upstream { .. } => "upstream",
            Self::Timeout { .. } => "timeout",
        }
    }
}
