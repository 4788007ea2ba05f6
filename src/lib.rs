//! Resilient access layer for an upstream product catalog.

pub mod admin;
pub mod cache;
pub mod config;
pub mod fallback;
pub mod fetcher;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use config::schema::CatalogConfig;
pub use fallback::{FallbackDataset, Product};
pub use fetcher::{FetchError, ResilientFetcher};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
