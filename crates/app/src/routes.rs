//! Error endpoint
//!
//! `GET` returns the recorded errors newest first, `DELETE` clears them.
//! Served under `/api/errors` and the shorter `/errors`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use paramsync_infra::{ErrorEntry, ErrorLog};
use tracing::info;

/// Canonical error endpoint path
pub const ERRORS_PATH: &str = "/api/errors";
/// Shorter alias of [`ERRORS_PATH`]
pub const ERRORS_ALIAS_PATH: &str = "/errors";

/// Router serving the error log held in `errors`.
pub fn router(errors: Arc<ErrorLog>) -> Router {
    Router::new()
        .route(ERRORS_PATH, get(list_errors).delete(clear_errors))
        .route(ERRORS_ALIAS_PATH, get(list_errors).delete(clear_errors))
        .with_state(errors)
}

async fn list_errors(State(errors): State<Arc<ErrorLog>>) -> Json<Vec<ErrorEntry>> {
    Json(errors.entries())
}

async fn clear_errors(State(errors): State<Arc<ErrorLog>>) -> StatusCode {
    let cleared = errors.len();
    errors.clear();
    info!(cleared, "Error log cleared");
    StatusCode::NO_CONTENT
}
