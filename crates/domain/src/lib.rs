//! # paramsync Domain
//!
//! Domain types shared by every paramsync crate.
//!
//! This crate contains:
//! - Parameter readings, change keys and update payloads
//! - The typed error taxonomy and Result alias
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other paramsync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use types::*;
