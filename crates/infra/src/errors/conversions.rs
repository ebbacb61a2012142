//! Conversions from external infrastructure errors into error details.
//!
//! `SyncError` variants carry operation context (service, entity, parameter)
//! that a bare `reqwest::Error` does not know about, so these helpers produce
//! the `details` string and the caller picks the variant.

use reqwest::{Error as HttpError, StatusCode};
use tokio_postgres::Error as PgError;

/// Upper bound on response body text copied into an error.
const MAX_BODY_CHARS: usize = 512;

/// Describe a transport-level HTTP failure (no response received).
pub fn describe_transport(err: &HttpError) -> String {
    if err.is_timeout() {
        return format!("request timed out: {err}");
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return format!("connection failure: {err}");
    }

    if err.is_decode() {
        return format!("could not decode response: {err}");
    }

    format!("transport error: {err}")
}

/// Describe a non-success response by status and (truncated) body.
pub fn describe_status(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let body = body.trim();

    if body.is_empty() {
        return format!("status {} {reason}", status.as_u16());
    }

    let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
    let ellipsis = if body.chars().count() > MAX_BODY_CHARS { "..." } else { "" };
    format!("status {} {reason}: {truncated}{ellipsis}", status.as_u16())
}

/// Describe a PostgreSQL failure, preferring the server's message and SQLSTATE.
pub fn describe_pg(err: &PgError) -> String {
    match err.as_db_error() {
        Some(db) => format!("{} (SQLSTATE {})", db.message(), db.code().code()),
        None if err.is_closed() => "connection closed".to_string(),
        None => err.to_string(),
    }
}
