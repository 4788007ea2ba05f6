//! Product records and the static fallback dataset.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     bundled JSON file
//!     → dataset.rs load (never fatal; empty on failure)
//!     → Arc<FallbackDataset> (immutable) handed to the fetcher
//!
//! Degraded mode:
//!     fetcher → find_by_id / all
//! ```

pub mod dataset;
pub mod product;

pub use dataset::FallbackDataset;
pub use product::{InvalidRecord, Product};
