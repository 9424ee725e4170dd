//! Error types for policy construction.

use thiserror::Error;

/// Errors raised while building a backoff policy or jitter function.
///
/// Construction fails fast: every variant is produced synchronously by the
/// constructor that received the bad parameter. Evaluating an already built
/// policy never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackoffError {
    /// A construction parameter is out of range.
    #[error("invalid backoff configuration: {0}")]
    InvalidConfiguration(String),
}

impl BackoffError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        #[cfg(feature = "tracing")]
        tracing::warn!(%reason, "rejected backoff configuration");
        Self::InvalidConfiguration(reason)
    }
}

/// Result alias for fallible construction.
pub type Result<T> = std::result::Result<T, BackoffError>;
