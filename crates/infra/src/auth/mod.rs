//! Client-credentials authentication for the destination API

pub mod token_cache;

pub use token_cache::TokenCache;
