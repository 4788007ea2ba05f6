//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to upstream:
//!     → circuit_breaker.rs (fail fast while the circuit is open)
//!     → timeouts.rs (bound the call with a deadline)
//!     → circuit_breaker.rs (record success or failure)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries: a failed call is reported once and counted once
//! - Circuit breaker prevents hammering an upstream that is down

pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{BreakerSnapshot, BreakerState, CircuitBreaker, CircuitState};
pub use timeouts::with_timeout;
