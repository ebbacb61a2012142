//! Shared test helpers for `paramsync-core` integration tests.
//!
//! In-memory doubles for every port the sync service depends on, so cycle
//! tests can focus on behaviour instead of transport plumbing.

pub mod ports;
