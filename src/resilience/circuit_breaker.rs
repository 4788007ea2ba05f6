//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: upstream assumed down, requests fail fast
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= threshold
//! Open → Closed-eligible: now >= open_until (next call may try upstream)
//! any → Closed: a single success resets the failure count and the window
//! ```
//!
//! # Design Decisions
//! - One breaker per upstream dependency (not per request)
//! - No dedicated half-open probe. Once the window elapses every caller may
//!   try upstream; a failure re-opens immediately because the failure count
//!   was never reset
//! - Threshold crossing is a warning, not an error

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
}

/// Mutable breaker state. Both fields change together under one lock.
#[derive(Debug, Clone, Default)]
pub struct BreakerState {
    pub consecutive_failures: u32,
    pub open_until: Option<Instant>,
}

/// Point-in-time view of the breaker, for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    /// Remaining open window in seconds, when open.
    pub retry_after_secs: Option<u64>,
    pub failure_threshold: u32,
    pub open_duration_secs: u64,
}

/// Failure-counting circuit breaker with a timed open window.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    failure_threshold: u32,
    open_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            failure_threshold: failure_threshold.max(1),
            open_duration,
        }
    }

    pub fn from_config(config: &BreakerConfig) -> Self {
        Self::new(config.failure_threshold, config.open_duration())
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True while the open window has not elapsed. Refreshes the open gauge.
    pub fn is_open(&self) -> bool {
        let now = Instant::now();
        let open = self.lock().open_until.is_some_and(|until| now < until);
        metrics::record_breaker_open(open);
        open
    }

    /// Remaining open window, if the circuit is currently open.
    pub fn retry_after(&self) -> Option<Duration> {
        let now = Instant::now();
        self.lock()
            .open_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }

    /// Count a failed upstream attempt, opening the circuit at the threshold.
    pub fn record_failure(&self) {
        let (failures, opened) = {
            let mut state = self.lock();
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
            let opened = state.consecutive_failures >= self.failure_threshold;
            if opened {
                state.open_until = Some(Instant::now() + self.open_duration);
            }
            (state.consecutive_failures, opened)
        };

        metrics::record_breaker_failures(failures);
        if opened {
            metrics::record_breaker_open(true);
            tracing::warn!(
                consecutive_failures = failures,
                open_secs = self.open_duration.as_secs(),
                "Circuit opened due to repeated failures"
            );
        } else {
            tracing::debug!(consecutive_failures = failures, "Upstream failure recorded");
        }
    }

    /// Count a successful upstream attempt. Resets both fields.
    pub fn record_success(&self) {
        let was_tripped = {
            let mut state = self.lock();
            let was_tripped = state.open_until.is_some();
            *state = BreakerState::default();
            was_tripped
        };

        metrics::record_breaker_failures(0);
        if was_tripped {
            metrics::record_breaker_open(false);
            tracing::info!("Circuit closed after successful upstream call");
        }
    }

    /// Return to the initial closed state.
    pub fn reset(&self) {
        *self.lock() = BreakerState::default();
        metrics::record_breaker_failures(0);
        metrics::record_breaker_open(false);
    }

    /// Copy of the raw state.
    pub fn state(&self) -> BreakerState {
        self.lock().clone()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let retry_after = self.retry_after();
        BreakerSnapshot {
            state: if retry_after.is_some() {
                CircuitState::Open
            } else {
                CircuitState::Closed
            },
            consecutive_failures: self.consecutive_failures(),
            // Round up so a sub-second remainder still reads as open
            retry_after_secs: retry_after.map(|d| d.as_secs() + u64::from(d.subsec_nanos() > 0)),
            failure_threshold: self.failure_threshold,
            open_duration_secs: self.open_duration.as_secs(),
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::from_config(&BreakerConfig::default())
    }
}
