//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Report an elapsed deadline as its own error kind
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - The wrapped future is dropped on expiry; callers cannot cancel earlier

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::upstream::{UpstreamError, UpstreamResult};

/// Run an upstream call, failing with [`UpstreamError::Timeout`] once `limit` elapses.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> UpstreamResult<T>
where
    F: Future<Output = UpstreamResult<T>>,
{
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout(limit)),
    }
}
