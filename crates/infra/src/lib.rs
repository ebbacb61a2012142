//! # paramsync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - PostgreSQL row source
//! - Client-credentials token cache and destination API client
//! - Interval scheduler with an in-flight gate
//! - In-memory error log
//! - Configuration loading from the environment or files
//!
//! ## Architecture
//! - Implements traits defined in `paramsync-core`
//! - Contains all "impure" code (network, database, clocks)

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error_log;
pub mod errors;
pub mod http;
pub mod scheduling;

// Re-export commonly used items
pub use api::DestinationClient;
pub use auth::TokenCache;
pub use database::{PgConnectionManager, PgParameterSource};
pub use error_log::{ErrorEntry, ErrorLog};
pub use http::{HttpClient, RetryPolicy};
pub use scheduling::{SchedulerError, SyncScheduler, SyncSchedulerConfig};
