//! Product lookup handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::fetcher::FetchError;
use crate::http::server::AppState;
use crate::upstream::CatalogUpstream;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// `GET /products/{id}`
pub async fn get_product<U: CatalogUpstream + 'static>(
    State(state): State<AppState<U>>,
    Path(id): Path<String>,
) -> Response {
    match state.fetcher.fetch_by_id(&id).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Product not found" })),
        )
            .into_response(),
        Err(e) => unavailable(e),
    }
}

/// `GET /products?page=N`, page defaults to 1.
pub async fn list_products<U: CatalogUpstream + 'static>(
    State(state): State<AppState<U>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let page = query.page.unwrap_or(1);
    match state.fetcher.fetch_page(page).await {
        Ok(products) => Json(products).into_response(),
        Err(e) => unavailable(e),
    }
}

fn unavailable(error: FetchError) -> Response {
    tracing::warn!(error = %error, circuit_open = error.is_circuit_open(), "Serving 502");
    let mut response = (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "message": error.to_string() })),
    )
        .into_response();

    if let Some(retry_after) = error.retry_after() {
        // Round up so clients never retry inside the window
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_swap::ArcSwap;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::cache::TtlCache;
    use crate::config::CatalogConfig;
    use crate::fallback::{FallbackDataset, Product};
    use crate::fetcher::{DegradedMode, FetchSettings, ResilientFetcher};
    use crate::http::server::build_router;
    use crate::resilience::CircuitBreaker;
    use crate::upstream::testing::ScriptedUpstream;
    use crate::upstream::UpstreamError;

    fn app(degraded: bool) -> (Router, Arc<ResilientFetcher<ScriptedUpstream>>) {
        let fetcher = Arc::new(ResilientFetcher::new(
            ScriptedUpstream::new(),
            TtlCache::new(),
            Arc::new(CircuitBreaker::new(3, Duration::from_secs(30))),
            Arc::new(FallbackDataset::from_records(vec![
                Product::new("fb-1").with_field("title", "Fallback One"),
            ])),
            Arc::new(DegradedMode::new(degraded)),
            FetchSettings::default(),
        ));
        let config = CatalogConfig::default();
        let state = AppState::new(fetcher.clone(), Arc::new(ArcSwap::from_pointee(config.clone())));
        (build_router(state, &config.listener), fetcher)
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_get_product() {
        let (router, fetcher) = app(false);
        fetcher
            .upstream()
            .respond(json!({"id": "1", "title": "P", "price": 10}));

        let (status, headers, body) = get(&router, "/products/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": "1", "title": "P", "price": 10}));
        assert!(headers.contains_key(crate::http::X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_missing_product_is_404() {
        let (router, fetcher) = app(false);
        fetcher.upstream().respond(json!({}));

        let (status, _, body) = get(&router, "/products/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_open_circuit_is_502_with_retry_after() {
        let (router, fetcher) = app(false);
        fetcher
            .upstream()
            .fail(UpstreamError::Transport("connection refused".into()));

        for _ in 0..3 {
            let (status, headers, _) = get(&router, "/products/1").await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert!(!headers.contains_key(header::RETRY_AFTER));
        }

        let (status, headers, body) = get(&router, "/products/1").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "Product API temporarily unavailable");
        let retry_after: u64 = headers[header::RETRY_AFTER].to_str().unwrap().parse().unwrap();
        assert!(retry_after > 0 && retry_after <= 30);
    }

    #[tokio::test]
    async fn test_list_products_defaults_to_page_one() {
        let (router, fetcher) = app(true);
        fetcher.upstream().respond(json!([{"id": "1"}, {"id": "2"}]));

        let (status, _, body) = get(&router, "/products").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(2));
        assert!(fetcher.cache().contains_key("page:1"));

        let (status, _, _) = get(&router, "/products?page=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_products_fallback() {
        let (router, fetcher) = app(true);
        fetcher.upstream().fail(UpstreamError::Status(500));

        let (status, _, body) = get(&router, "/products?page=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": "fb-1", "title": "Fallback One"}]));
    }

    #[tokio::test]
    async fn test_admin_status_and_reset() {
        let (router, fetcher) = app(true);
        fetcher
            .upstream()
            .fail(UpstreamError::Transport("down".into()));
        for _ in 0..3 {
            get(&router, "/products/fb-1").await;
        }

        let (status, _, body) = get(&router, "/admin/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "circuit_open");
        assert_eq!(body["degraded_mode"], true);
        assert_eq!(body["breaker"]["state"], "open");
        assert_eq!(body["breaker"]["consecutive_failures"], 3);
        assert_eq!(body["fallback_records"], 1);

        let response = router
            .clone()
            .oneshot(Request::post("/admin/reset").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!fetcher.breaker().is_open());

        let (_, _, body) = get(&router, "/admin/status").await;
        assert_eq!(body["status"], "operational");
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
