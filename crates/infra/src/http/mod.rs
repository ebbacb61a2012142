//! Outbound HTTP plumbing shared by the token cache and the destination client

pub mod client;
pub mod retry;

pub use client::{HttpClient, HttpClientBuilder};
pub use retry::RetryPolicy;
