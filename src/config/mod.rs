//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + environment
//!     → loader.rs (parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → CatalogConfig (validated, immutable)
//!     → shared via ArcSwap with the HTTP layer
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<CatalogConfig>
//!     → degraded-mode flag applied to the running fetcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Only the degraded-mode flag takes effect without a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_with_env, ConfigError};
pub use schema::{
    BreakerConfig, CacheConfig, CatalogConfig, FallbackConfig, ListenerConfig,
    ObservabilityConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
