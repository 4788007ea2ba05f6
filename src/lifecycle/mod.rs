//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Load fallback dataset → Build upstream client → Wire fetcher
//!
//! Reload (startup.rs):
//!     Validated config from watcher → swap snapshot → apply degraded-mode flag
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server drains → background tasks exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - A broken fallback dataset never blocks startup
//! - An unusable upstream URL does, since nothing could ever succeed

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{apply_reload, build_fetcher, CatalogFetcher, StartupError};
