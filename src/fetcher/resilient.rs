//! Read-through cache + circuit breaker + fallback around the upstream catalog.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::config::CatalogConfig;
use crate::fallback::{FallbackDataset, Product};
use crate::fetcher::error::{FetchError, FetchResult, UnavailableReason};
use crate::fetcher::policy::DegradedMode;
use crate::observability::metrics;
use crate::resilience::{with_timeout, BreakerSnapshot, CircuitBreaker};
use crate::upstream::{CatalogUpstream, UpstreamError};

/// A value stored in the shared catalog cache.
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    Product(Product),
    Page(Vec<Product>),
}

/// Tunables read by the fetcher on every call.
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    /// Lifetime of a cached record or page.
    pub cache_ttl: Duration,
    /// Deadline for one upstream call.
    pub call_timeout: Duration,
}

impl FetchSettings {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            cache_ttl: config.cache.ttl(),
            call_timeout: config.upstream.timeout(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

/// Point-in-time view of the fetcher, for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct FetcherStatus {
    pub degraded_mode: bool,
    pub breaker: BreakerSnapshot,
    pub cache_entries: usize,
    pub fallback_records: usize,
}

pub fn product_key(id: &str) -> String {
    format!("product:{}", id)
}

pub fn page_key(page: u32) -> String {
    format!("page:{}", page)
}

/// Shields callers from an unreliable upstream catalog.
pub struct ResilientFetcher<U> {
    upstream: U,
    cache: TtlCache<String, CatalogEntry>,
    breaker: Arc<CircuitBreaker>,
    fallback: Arc<FallbackDataset>,
    degraded_mode: Arc<DegradedMode>,
    settings: FetchSettings,
}

impl<U: CatalogUpstream> ResilientFetcher<U> {
    pub fn new(
        upstream: U,
        cache: TtlCache<String, CatalogEntry>,
        breaker: Arc<CircuitBreaker>,
        fallback: Arc<FallbackDataset>,
        degraded_mode: Arc<DegradedMode>,
        settings: FetchSettings,
    ) -> Self {
        Self {
            upstream,
            cache,
            breaker,
            fallback,
            degraded_mode,
            settings,
        }
    }

    /// Fetch one product.
    ///
    /// `Ok(None)` means not found: either the upstream answered with a
    /// record lacking an id, or the fallback dataset has no such product.
    pub async fn fetch_by_id(&self, id: &str) -> FetchResult<Option<Product>> {
        let degraded = self.degraded_mode.is_enabled();

        if self.breaker.is_open() {
            tracing::warn!(product_id = %id, "Circuit open, skipping upstream call");
            return self.product_fallback(id, degraded, self.circuit_open_reason());
        }

        let key = product_key(id);
        if let Some(CatalogEntry::Product(product)) = self.cached(&key) {
            return Ok(Some(product));
        }

        let outcome = with_timeout(self.settings.call_timeout, self.upstream.get_product(id)).await;
        let value = match outcome {
            Ok(value) => value,
            Err(e) if e.is_malformed() => {
                metrics::record_upstream_call("product", "malformed");
                tracing::warn!(product_id = %id, error = %e, "Product not found or invalid");
                return Ok(None);
            }
            Err(e) => {
                self.record_transport_failure("product", &e);
                return self.product_fallback(id, degraded, UnavailableReason::UpstreamFailed(e));
            }
        };

        match Product::try_from(value) {
            Ok(product) => {
                metrics::record_upstream_call("product", "success");
                self.store(key, CatalogEntry::Product(product.clone()));
                self.breaker.record_success();
                Ok(Some(product))
            }
            Err(e) => {
                metrics::record_upstream_call("product", "malformed");
                tracing::warn!(product_id = %id, error = %e, "Product not found or invalid");
                Ok(None)
            }
        }
    }

    /// Fetch one page of the product list.
    ///
    /// A response that is not a JSON array counts as an upstream failure.
    pub async fn fetch_page(&self, page: u32) -> FetchResult<Vec<Product>> {
        let degraded = self.degraded_mode.is_enabled();

        if self.breaker.is_open() {
            tracing::warn!(page, "Circuit open, skipping upstream call");
            return self.page_fallback(page, degraded, self.circuit_open_reason());
        }

        let key = page_key(page);
        if let Some(CatalogEntry::Page(products)) = self.cached(&key) {
            return Ok(products);
        }

        let outcome = with_timeout(self.settings.call_timeout, self.upstream.get_page(page))
            .await
            .and_then(parse_page);

        match outcome {
            Ok(products) => {
                metrics::record_upstream_call("page", "success");
                self.store(key, CatalogEntry::Page(products.clone()));
                self.breaker.record_success();
                Ok(products)
            }
            Err(e) => {
                self.record_transport_failure("page", &e);
                self.page_fallback(page, degraded, UnavailableReason::UpstreamFailed(e))
            }
        }
    }

    /// Clear the cache and close the breaker.
    pub fn reset_state(&self) {
        self.cache.clear();
        self.breaker.reset();
        metrics::record_cache_size(0);
        tracing::info!("Fetcher state reset");
    }

    pub fn status(&self) -> FetcherStatus {
        FetcherStatus {
            degraded_mode: self.degraded_mode.is_enabled(),
            breaker: self.breaker.snapshot(),
            cache_entries: self.cache.len(),
            fallback_records: self.fallback.len(),
        }
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    pub fn cache(&self) -> &TtlCache<String, CatalogEntry> {
        &self.cache
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn degraded_mode(&self) -> &DegradedMode {
        &self.degraded_mode
    }

    fn cached(&self, key: &str) -> Option<CatalogEntry> {
        let hit = self.cache.get(key);
        metrics::record_cache_lookup(hit.is_some());
        if hit.is_none() {
            // A miss may have evicted an expired entry
            metrics::record_cache_size(self.cache.len());
        }
        hit
    }

    fn store(&self, key: String, entry: CatalogEntry) {
        self.cache.set(key, entry, self.settings.cache_ttl);
        metrics::record_cache_size(self.cache.len());
    }

    fn circuit_open_reason(&self) -> UnavailableReason {
        UnavailableReason::CircuitOpen {
            retry_after: self.breaker.retry_after(),
        }
    }

    fn record_transport_failure(&self, operation: &'static str, error: &UpstreamError) {
        metrics::record_upstream_call(operation, error.kind());
        tracing::debug!(operation, error = %error, "Upstream call failed");
        self.breaker.record_failure();
    }

    fn product_fallback(
        &self,
        id: &str,
        degraded: bool,
        reason: UnavailableReason,
    ) -> FetchResult<Option<Product>> {
        if !degraded {
            return Err(FetchError::UpstreamUnavailable { reason });
        }
        tracing::warn!(product_id = %id, "Using fallback product for id {}", id);
        metrics::record_fallback_served("product");
        Ok(self.fallback.find_by_id(id).cloned())
    }

    fn page_fallback(
        &self,
        page: u32,
        degraded: bool,
        reason: UnavailableReason,
    ) -> FetchResult<Vec<Product>> {
        if !degraded {
            return Err(FetchError::UpstreamUnavailable { reason });
        }
        tracing::warn!(page, "Using fallback product list for page {}", page);
        metrics::record_fallback_served("page");
        Ok(self.fallback.all().to_vec())
    }
}

/// A page must be a JSON array; entries without a usable id are dropped.
fn parse_page(value: Value) -> Result<Vec<Product>, UpstreamError> {
    let entries = match value {
        Value::Array(entries) => entries,
        _ => {
            return Err(UpstreamError::Malformed(
                "product list is not a JSON array".to_string(),
            ))
        }
    };

    let mut products = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match Product::try_from(entry) {
            Ok(product) => products.push(product),
            Err(e) => tracing::debug!(index, error = %e, "Skipping invalid product in page"),
        }
    }
    Ok(products)
}
