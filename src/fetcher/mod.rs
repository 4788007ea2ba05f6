//! Resilient access to the upstream catalog.
//!
//! # Data Flow
//! ```text
//! fetch_by_id(id) / fetch_page(n)
//!     → circuit open?   → degraded mode ? fallback : UpstreamUnavailable
//!     → cache hit?      → cached value (no upstream call, breaker untouched)
//!     → upstream call (bounded by timeout)
//!         ok + well-formed   → cache write, record_success, live value
//!         ok + malformed     → by id: absent, breaker untouched
//!                              page:  treated like a transport failure
//!         transport failure  → record_failure, then fallback or UpstreamUnavailable
//! ```
//!
//! # Design Decisions
//! - Cache, breaker and dataset are constructed by the caller and injected
//! - No lock spans a whole fetch; concurrent callers may race to upstream
//! - Raw transport errors never reach callers

pub mod error;
pub mod policy;
pub mod resilient;

pub use error::{FetchError, FetchResult, UnavailableReason};
pub use policy::DegradedMode;
pub use resilient::{CatalogEntry, FetchSettings, FetcherStatus, ResilientFetcher};
