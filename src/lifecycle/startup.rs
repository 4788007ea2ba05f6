//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the fetcher and its collaborators from configuration
//! - Apply hot-reloaded configuration to the running fetcher

use arc_swap::ArcSwap;
use std::sync::Arc;
use thiserror::Error;

use crate::cache::TtlCache;
use crate::config::CatalogConfig;
use crate::fallback::FallbackDataset;
use crate::fetcher::{DegradedMode, FetchSettings, ResilientFetcher};
use crate::resilience::CircuitBreaker;
use crate::upstream::{CatalogUpstream, HttpCatalogClient, UpstreamError};

/// The fetcher as wired for production.
pub type CatalogFetcher = ResilientFetcher<HttpCatalogClient>;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Upstream client: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Wire cache, breaker, fallback dataset and upstream client into a fetcher.
pub fn build_fetcher(config: &CatalogConfig) -> Result<CatalogFetcher, StartupError> {
    let upstream = HttpCatalogClient::new(&config.upstream)?;
    let fallback = FallbackDataset::load(&config.fallback.dataset_path);
    if fallback.is_empty() {
        tracing::warn!("Fallback dataset is empty; degraded mode will serve no products");
    }

    tracing::info!(
        base_url = %upstream.base_url(),
        degraded_mode = config.fallback.degraded_mode,
        failure_threshold = config.breaker.failure_threshold,
        open_secs = config.breaker.open_duration_secs,
        ttl_secs = config.cache.ttl_secs,
        "Catalog fetcher ready"
    );

    Ok(ResilientFetcher::new(
        upstream,
        TtlCache::new(),
        Arc::new(CircuitBreaker::from_config(&config.breaker)),
        Arc::new(fallback),
        Arc::new(DegradedMode::new(config.fallback.degraded_mode)),
        FetchSettings::from_config(config),
    ))
}

/// Accept a reloaded configuration.
///
/// The degraded-mode flag applies to the next fetch; other sections are
/// recorded but only take effect after a restart.
pub fn apply_reload<U: CatalogUpstream>(
    current: &ArcSwap<CatalogConfig>,
    fetcher: &ResilientFetcher<U>,
    new_config: CatalogConfig,
) {
    let old = current.load_full();

    let degraded = new_config.fallback.degraded_mode;
    if fetcher.degraded_mode().set(degraded) != degraded {
        tracing::info!(degraded_mode = degraded, "Degraded mode updated");
    }

    let mut needs_restart = Vec::new();
    if old.listener != new_config.listener {
        needs_restart.push("listener");
    }
    if old.upstream != new_config.upstream {
        needs_restart.push("upstream");
    }
    if old.cache != new_config.cache {
        needs_restart.push("cache");
    }
    if old.breaker != new_config.breaker {
        needs_restart.push("breaker");
    }
    if old.fallback.dataset_path != new_config.fallback.dataset_path {
        needs_restart.push("fallback.dataset_path");
    }
    if old.observability != new_config.observability {
        needs_restart.push("observability");
    }
    if !needs_restart.is_empty() {
        tracing::info!(sections = ?needs_restart, "Changed settings take effect after restart");
    }

    current.store(Arc::new(new_config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::testing::ScriptedUpstream;

    #[test]
    fn test_build_fetcher_with_missing_dataset() {
        let mut config = CatalogConfig::default();
        config.fallback.dataset_path = "/definitely/not/here.json".into();

        let fetcher = build_fetcher(&config).unwrap();
        let status = fetcher.status();
        assert_eq!(status.fallback_records, 0);
        assert!(status.degraded_mode);
    }

    #[test]
    fn test_build_fetcher_rejects_bad_url() {
        let mut config = CatalogConfig::default();
        config.upstream.base_url = "nope".to_string();
        assert!(matches!(build_fetcher(&config), Err(StartupError::Upstream(_))));
    }

    #[test]
    fn test_apply_reload_flips_degraded_mode() {
        let config = CatalogConfig::default();
        let current = ArcSwap::from_pointee(config.clone());
        let fetcher = ResilientFetcher::new(
            ScriptedUpstream::new(),
            TtlCache::new(),
            Arc::new(CircuitBreaker::default()),
            Arc::new(FallbackDataset::empty()),
            Arc::new(DegradedMode::new(true)),
            FetchSettings::default(),
        );

        let mut new_config = config;
        new_config.fallback.degraded_mode = false;
        new_config.breaker.failure_threshold = 10;
        apply_reload(&current, &fetcher, new_config);

        assert!(!fetcher.degraded_mode().is_enabled());
        assert_eq!(current.load().breaker.failure_threshold, 10);
        // Breaker settings need a restart
        assert_eq!(fetcher.breaker().failure_threshold(), 3);
    }
}
