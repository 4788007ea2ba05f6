//! Upstream trait and error definitions.

use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single upstream attempt.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// The call did not finish within its deadline.
    #[error("upstream timeout after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS or protocol failure.
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// The upstream answered 2xx but the body is not usable JSON.
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    /// The client could not be constructed.
    #[error("upstream client error: {0}")]
    Client(String),
}

impl UpstreamError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, UpstreamError::Malformed(_))
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status(_) => "status",
            UpstreamError::Malformed(_) => "malformed",
            UpstreamError::Client(_) => "client",
        }
    }
}

/// Result type for upstream calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// A source of live catalog data.
pub trait CatalogUpstream: Send + Sync {
    /// Fetch the single record for `id`.
    fn get_product(&self, id: &str) -> impl Future<Output = UpstreamResult<Value>> + Send;

    /// Fetch one page of the product list.
    fn get_page(&self, page: u32) -> impl Future<Output = UpstreamResult<Value>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Status(503);
        assert_eq!(err.to_string(), "upstream returned status 503");

        let err = UpstreamError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "upstream timeout after 5s");
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_is_malformed() {
        assert!(UpstreamError::Malformed("empty".into()).is_malformed());
        assert!(!UpstreamError::Transport("reset".into()).is_malformed());
    }
}
