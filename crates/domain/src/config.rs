//! Configuration management

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTH_SCOPE, DEFAULT_COLLECTION_PATH, DEFAULT_DB_PORT, DEFAULT_DISPLAY_TIMEZONE,
    DEFAULT_ENTITY_PREFIX, DEFAULT_FETCH_LIMIT, DEFAULT_HTTP_PORT, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_INTERFACE, DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_UPDATE_THROTTLE_MS,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Source database
    pub database: DatabaseConfig,
    /// Token endpoint
    pub auth: AuthConfig,
    /// Destination API
    pub api: ApiConfig,
    /// Polling and pacing
    #[serde(default)]
    pub sync: SyncConfig,
    /// Error endpoint
    #[serde(default)]
    pub server: ServerConfig,
}

/// Source database configuration
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Server host name or address
    pub host: String,
    /// Server port
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Login role
    pub user: String,
    /// Login password; never serialized or logged
    #[serde(skip_serializing)]
    pub password: String,
    /// Database name
    pub database: String,
    /// Source table, optionally schema-qualified
    pub table: String,
    /// Rows read per cycle
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
}

/// Client-credentials settings for the authorization endpoint
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token endpoint URL
    pub token_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret; never serialized or logged
    #[serde(skip_serializing)]
    pub client_secret: String,
    /// Scope requested with the token
    #[serde(default = "default_scope")]
    pub scope: String,
}

/// Destination API layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and optional path prefix
    pub base_url: String,
    /// Value of the `api-version` query parameter
    pub version: String,
    /// Resource collection, e.g. `/api/crushers`
    #[serde(default = "default_collection_path")]
    pub collection_path: String,
    /// Joined to the entity id, e.g. `BIN` + `7`
    #[serde(default = "default_entity_prefix")]
    pub entity_prefix: String,
    /// Interface segment of the parameter path
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Per-request timeout, seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Polling and delivery pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Time between cycle starts, ms
    pub poll_interval_ms: u64,
    /// Retries after the first attempt on `429`
    pub max_retries: u32,
    /// Backoff base, ms
    pub retry_base_delay_ms: u64,
    /// Pause before each update, ms
    pub throttle_ms: u64,
    /// IANA zone for cycle timestamps in logs
    pub display_timezone: String,
}

/// Error endpoint listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port
    pub port: u16,
}

impl SyncConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Backoff base as a [`Duration`].
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Update throttle as a [`Duration`].
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            throttle_ms: DEFAULT_UPDATE_THROTTLE_MS,
            display_timezone: DEFAULT_DISPLAY_TIMEZONE.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_HTTP_PORT }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("fetch_limit", &self.fetch_limit)
            .finish()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

fn default_db_port() -> u16 {
    DEFAULT_DB_PORT
}

fn default_fetch_limit() -> u32 {
    DEFAULT_FETCH_LIMIT
}

fn default_scope() -> String {
    DEFAULT_AUTH_SCOPE.to_string()
}

fn default_collection_path() -> String {
    DEFAULT_COLLECTION_PATH.to_string()
}

fn default_entity_prefix() -> String {
    DEFAULT_ENTITY_PREFIX.to_string()
}

fn default_interface() -> String {
    DEFAULT_INTERFACE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
