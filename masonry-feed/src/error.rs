//! Error types surfaced by the feed engine.

use thiserror::Error;

/// Failure reported by a search provider.
///
/// Fetch errors are recoverable: the feed records the message, keeps the
/// items it already has, and retries on the next trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The provider answered with a failure.
    #[error("api error ({status}): {message}")]
    Api {
        /// Provider status code.
        status: u16,
        /// Provider-supplied description.
        message: String,
    },
}

impl FetchError {
    /// Convenience constructor for transport failures.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Convenience constructor for provider-side failures.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        format!("Error fetching items: {self}")
    }
}

/// Rejected [`crate::FeedConfig`] values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Column width must be finite and strictly positive.
    #[error("column width must be finite and positive, got {0}")]
    InvalidColumnWidth(f64),
    /// Gap must be finite and non-negative.
    #[error("gap must be finite and non-negative, got {0}")]
    InvalidGap(f64),
    /// At least one item per page is required.
    #[error("page size must be at least 1")]
    ZeroPageSize,
    /// Near-bottom threshold must be finite and non-negative.
    #[error("near-bottom threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),
    /// Window buffer must be finite and non-negative.
    #[error("window buffer must be finite and non-negative, got {0}")]
    InvalidBuffer(f64),
    /// The scroll throttle interval must be non-zero.
    #[error("scroll throttle interval must be non-zero")]
    ZeroThrottle,
}
