//! Change detection and synchronization
//!
//! One cycle is: health gate, fetch the newest rows, diff against the
//! previous-value cache, push changed values downstream, advance the cache.

pub mod change_cache;
pub mod health;
pub mod ports;
pub mod report;
pub mod service;
