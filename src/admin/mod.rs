//! Admin endpoints: fetcher status and state reset.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use self::handlers::{get_status, reset_state};
use crate::http::server::AppState;
use crate::upstream::CatalogUpstream;

pub fn setup_admin_router<U: CatalogUpstream + 'static>() -> Router<AppState<U>> {
    Router::new()
        .route("/admin/status", get(get_status::<U>))
        .route("/admin/reset", post(reset_state::<U>))
}
