//! Destination API client
//!
//! Pushes changed parameter values to the REST control system and checks its
//! reachability for the health gate.
//!
//! # Architecture
//!
//! - Requests go through [`crate::http::HttpClient`]
//! - A bearer token is fetched from the injected provider on every attempt
//! - `429 Too Many Requests` is retried with exponential backoff; every other
//!   failure is surfaced immediately

pub mod client;
mod endpoints;

pub use client::DestinationClient;
pub use endpoints::Endpoints;
