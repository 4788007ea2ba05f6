//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve on a listener until shutdown is broadcast

use arc_swap::ArcSwap;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::{CatalogConfig, ListenerConfig};
use crate::fetcher::ResilientFetcher;
use crate::http::products::{get_product, list_products};
use crate::http::request::MakeRequestUuid;
use crate::upstream::CatalogUpstream;

/// Application state injected into handlers.
pub struct AppState<U> {
    pub fetcher: Arc<ResilientFetcher<U>>,
    /// Current configuration; swapped on reload.
    pub config: Arc<ArcSwap<CatalogConfig>>,
}

impl<U> AppState<U> {
    pub fn new(fetcher: Arc<ResilientFetcher<U>>, config: Arc<ArcSwap<CatalogConfig>>) -> Self {
        Self { fetcher, config }
    }
}

impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            config: self.config.clone(),
        }
    }
}

/// HTTP server exposing the fetcher.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around `state`.
    pub fn new<U: CatalogUpstream + 'static>(state: AppState<U>, listener: &ListenerConfig) -> Self {
        Self {
            router: build_router(state, listener),
        }
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router<U: CatalogUpstream + 'static>(
    state: AppState<U>,
    listener: &ListenerConfig,
) -> Router {
    Router::new()
        .route("/products", get(list_products::<U>))
        .route("/products/{id}", get(get_product::<U>))
        .route("/health", get(|| async { "ok" }))
        .merge(setup_admin_router::<U>())
        .with_state(state)
        .layer(TimeoutLayer::new(listener.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
