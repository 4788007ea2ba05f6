//! Errors surfaced to callers of the fetcher.

use std::time::Duration;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Why live data could not be served.
#[derive(Debug, Clone)]
pub enum UnavailableReason {
    /// The breaker is open; the window ends after `retry_after`.
    CircuitOpen { retry_after: Option<Duration> },
    /// The upstream attempt failed.
    UpstreamFailed(UpstreamError),
}

/// Errors returned by `ResilientFetcher`.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Live data is unavailable and degraded mode is off. Retryable later.
    #[error("Product API temporarily unavailable")]
    UpstreamUnavailable { reason: UnavailableReason },
}

impl FetchError {
    pub fn circuit_open(retry_after: Option<Duration>) -> Self {
        FetchError::UpstreamUnavailable {
            reason: UnavailableReason::CircuitOpen { retry_after },
        }
    }

    pub fn upstream_failed(error: UpstreamError) -> Self {
        FetchError::UpstreamUnavailable {
            reason: UnavailableReason::UpstreamFailed(error),
        }
    }

    pub fn reason(&self) -> &UnavailableReason {
        match self {
            FetchError::UpstreamUnavailable { reason } => reason,
        }
    }

    /// How long callers should wait before retrying, when known.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::UpstreamUnavailable {
                reason: UnavailableReason::CircuitOpen { retry_after },
            } => *retry_after,
            FetchError::UpstreamUnavailable { .. } => None,
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(
            self,
            FetchError::UpstreamUnavailable {
                reason: UnavailableReason::CircuitOpen { .. }
            }
        )
    }
}

/// Result type for fetcher operations.
pub type FetchResult<T> = Result<T, FetchError>;
