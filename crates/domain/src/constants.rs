//! Application constants
//!
//! Centralized location for the domain-level defaults used throughout the
//! application. Every value here can be overridden through configuration
//! unless noted otherwise.

// Token handling
/// Tokens are treated as expired this many seconds before their real expiry.
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;
/// Upper bound on an advertised token lifetime, so expiry arithmetic on
/// `Instant` cannot overflow.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = i32::MAX as u64;
/// Scope requested with client credentials
pub const DEFAULT_AUTH_SCOPE: &str = "modular-web-api";

// Update retry policy
/// Retries after the first attempt when rate limited
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Backoff base; retry `k` waits `base * 2^k`
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
/// Pause before each downstream update
pub const DEFAULT_UPDATE_THROTTLE_MS: u64 = 50;

// Polling
/// Time between cycle starts
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 60_000;
/// Rows read per cycle
pub const DEFAULT_FETCH_LIMIT: u32 = 20;

// Destination resource layout
/// Destination resource collection
pub const DEFAULT_COLLECTION_PATH: &str = "/api/crushers";
/// Prefix joined to the entity id in parameter paths
pub const DEFAULT_ENTITY_PREFIX: &str = "BIN";
/// Interface segment in parameter paths
pub const DEFAULT_INTERFACE: &str = "CITEC";

// Process surface
/// Error endpoint port
pub const DEFAULT_HTTP_PORT: u16 = 3000;
/// PostgreSQL port
pub const DEFAULT_DB_PORT: u16 = 5432;
/// Zone used for cycle timestamps in logs
pub const DEFAULT_DISPLAY_TIMEZONE: &str = "Australia/Brisbane";
/// Entries kept by the in-memory error log
pub const ERROR_LOG_CAPACITY: usize = 100;
/// Outbound HTTP request timeout
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
