//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID generated and echoed back)
//!     → products.rs (GET /products/{id}, GET /products?page=n)
//!         → ResilientFetcher
//!     → admin (status, reset)
//! ```
//!
//! # Design Decisions
//! - Handlers are generic over the upstream so tests can drive them in memory
//! - `UpstreamUnavailable` maps to 502 with Retry-After when the window is known

pub mod products;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
