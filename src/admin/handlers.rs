use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::fetcher::FetcherStatus;
use crate::http::server::AppState;
use crate::resilience::CircuitState;
use crate::upstream::CatalogUpstream;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    /// "operational", or "circuit_open" while the breaker rejects upstream calls.
    pub status: &'static str,
    pub upstream: String,
    #[serde(flatten)]
    pub fetcher: FetcherStatus,
}

pub async fn get_status<U: CatalogUpstream + 'static>(
    State(state): State<AppState<U>>,
) -> Json<SystemStatus> {
    let fetcher = state.fetcher.status();
    let config = state.config.load();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: match fetcher.breaker.state {
            CircuitState::Closed => "operational",
            CircuitState::Open => "circuit_open",
        },
        upstream: config.upstream.base_url.clone(),
        fetcher,
    })
}

pub async fn reset_state<U: CatalogUpstream + 'static>(
    State(state): State<AppState<U>>,
) -> StatusCode {
    state.fetcher.reset_state();
    StatusCode::NO_CONTENT
}
