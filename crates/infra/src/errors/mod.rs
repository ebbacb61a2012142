//! Mapping of third-party failures onto [`paramsync_domain::SyncError`] details

mod conversions;

pub use conversions::{describe_pg, describe_status, describe_transport};
