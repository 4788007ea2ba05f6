//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the catalog service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// HTTP listener for collaborators.
    pub listener: ListenerConfig,

    /// Upstream catalog endpoint.
    pub upstream: UpstreamConfig,

    /// Read-through cache settings.
    pub cache: CacheConfig,

    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Fallback dataset and degraded-mode policy.
    pub fallback: FallbackConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Whole-request timeout for incoming requests in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl ListenerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Upstream catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL; products live at `{base}/{id}/`, pages at `{base}/?page={n}`.
    pub base_url: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Skip TLS certificate validation.
    /// Security-relevant: only for upstreams with self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/products".to_string(),
            timeout_secs: 5,
            accept_invalid_certs: false,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cached record or page in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 60 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,

    /// How long the circuit stays open, in seconds.
    pub open_duration_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_duration_secs: 30,
        }
    }
}

impl BreakerConfig {
    pub fn open_duration(&self) -> Duration {
        Duration::from_secs(self.open_duration_secs)
    }
}

/// Fallback dataset configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FallbackConfig {
    /// JSON file with the static product list.
    pub dataset_path: PathBuf,

    /// Serve fallback data instead of failing when upstream is unavailable.
    pub degraded_mode: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/mock-products.json"),
            degraded_mode: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
