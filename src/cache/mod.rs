//! Read-through cache subsystem.
//!
//! # Data Flow
//! ```text
//! fetcher (successful upstream fetch)
//!     → ttl.rs set(key, value, ttl)
//!
//! fetcher (before upstream call)
//!     → ttl.rs get(key)
//!     → expired entry? evict and report a miss
//! ```
//!
//! # Design Decisions
//! - Expiry is lazy: entries leave only on an expired read or an explicit clear
//! - No capacity bound and no LRU. The key space is one key per product id
//!   or page number, which is assumed to stay small
//! - Each map entry update is atomic; no lock spans a whole fetch

pub mod ttl;

pub use ttl::{CacheEntry, TtlCache};
