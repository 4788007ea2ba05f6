//! Upstream catalog dependency.
//!
//! # Data Flow
//! ```text
//! fetcher
//!     → types.rs CatalogUpstream (trait seam; scripted in tests)
//!     → client.rs HttpCatalogClient
//!         GET {base}/{id}/        → JSON object
//!         GET {base}/?page={n}    → JSON array
//! ```
//!
//! # Design Decisions
//! - The upstream returns raw JSON; shape checks belong to the fetcher,
//!   which decides what a malformed payload means for each operation
//! - Non-2xx responses (404 included) are transport failures
//! - Trust-all TLS is opt-in only

pub mod client;
pub mod types;

pub use client::HttpCatalogClient;
pub use types::{CatalogUpstream, UpstreamError, UpstreamResult};

#[cfg(test)]
pub(crate) mod testing;
