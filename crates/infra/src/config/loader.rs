//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If every required environment variable is set, the environment is the
//!    only source; invalid values are errors, not a reason to fall back
//! 2. Otherwise, loads the file named by `PARAMSYNC_CONFIG`, or the first of
//!    `./paramsync.toml` / `./paramsync.json`
//! 3. Supports JSON and TOML formats
//! 4. Validates the result (URLs, table name, time zone, intervals)
//!
//! ## Environment Variables
//! Required: `DB_SERVER`, `DB_USER`, `DB_PASSWORD`, `DB_DATABASE`, `DB_TABLE`,
//! `DESTINATION_AUTH_URL`, `CLIENT_ID`, `CLIENT_SECRET`,
//! `DESTINATION_API_URL`, `API_VERSION`.
//!
//! Optional: `DB_PORT`, `AUTH_SCOPE`, `API_COLLECTION_PATH`,
//! `API_ENTITY_PREFIX`, `API_INTERFACE`, `API_ACCEPT_INVALID_CERTS`,
//! `API_TIMEOUT_SECS`, `PORT`, `UPDATE_INTERVAL`, `FETCH_LIMIT`, `RETRY_MAX`,
//! `RETRY_BASE_DELAY_MS`, `UPDATE_THROTTLE_MS`, `DISPLAY_TIMEZONE`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use paramsync_core::SyncCycleConfig;
use paramsync_domain::{
    ApiConfig, AuthConfig, Config, DatabaseConfig, Result, ServerConfig, SyncConfig, SyncError,
    DEFAULT_AUTH_SCOPE, DEFAULT_COLLECTION_PATH, DEFAULT_DB_PORT, DEFAULT_DISPLAY_TIMEZONE,
    DEFAULT_ENTITY_PREFIX, DEFAULT_FETCH_LIMIT, DEFAULT_HTTP_PORT, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_INTERFACE, DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_UPDATE_THROTTLE_MS,
};
use url::Url;

use crate::database::validate_table_name;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "PARAMSYNC_CONFIG";

/// Variables without a default
pub const REQUIRED_VARS: [&str; 10] = [
    "DB_SERVER",
    "DB_USER",
    "DB_PASSWORD",
    "DB_DATABASE",
    "DB_TABLE",
    "DESTINATION_AUTH_URL",
    "CLIENT_ID",
    "CLIENT_SECRET",
    "DESTINATION_API_URL",
    "API_VERSION",
];

const FILE_CANDIDATES: [&str; 2] = ["paramsync.toml", "paramsync.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `SyncError::Config` if:
/// - The environment is complete but a value is invalid
/// - The environment is incomplete and no usable config file exists
/// - The loaded configuration fails validation
pub fn load() -> Result<Config> {
    let lookup = |key: &str| std::env::var(key).ok();
    let missing = missing_required(&lookup);

    if missing.is_empty() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!(missing = ?missing, "Environment incomplete, trying config file");

    let explicit = lookup(CONFIG_PATH_VAR).filter(|p| !p.trim().is_empty()).map(PathBuf::from);
    if explicit.is_none() && find_config_file().is_none() {
        return Err(SyncError::Config(format!(
            "Missing required environment variables: {}; no config file found",
            missing.join(", ")
        )));
    }

    load_from_file(explicit)
}

/// Load configuration from the process environment.
///
/// # Errors
/// Returns `SyncError::Config` if required variables are missing or any
/// value is invalid.
pub fn load_from_env() -> Result<Config> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Build configuration from an arbitrary key lookup.
///
/// Blank values count as unset.
///
/// # Errors
/// Returns `SyncError::Config` if required keys are missing or any value is
/// invalid.
pub fn load_from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let env = Env { lookup: &lookup };

    let missing = missing_required(&lookup);
    if !missing.is_empty() {
        return Err(SyncError::Config(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    let config = Config {
        database: DatabaseConfig {
            host: env.required("DB_SERVER")?,
            port: env.parsed("DB_PORT", DEFAULT_DB_PORT)?,
            user: env.required("DB_USER")?,
            password: env.required("DB_PASSWORD")?,
            database: env.required("DB_DATABASE")?,
            table: env.required("DB_TABLE")?,
            fetch_limit: env.parsed("FETCH_LIMIT", DEFAULT_FETCH_LIMIT)?,
        },
        auth: AuthConfig {
            token_url: env.required("DESTINATION_AUTH_URL")?,
            client_id: env.required("CLIENT_ID")?,
            client_secret: env.required("CLIENT_SECRET")?,
            scope: env.or("AUTH_SCOPE", DEFAULT_AUTH_SCOPE),
        },
        api: ApiConfig {
            base_url: env.required("DESTINATION_API_URL")?,
            version: env.required("API_VERSION")?,
            collection_path: env.or("API_COLLECTION_PATH", DEFAULT_COLLECTION_PATH),
            entity_prefix: env.or("API_ENTITY_PREFIX", DEFAULT_ENTITY_PREFIX),
            interface: env.or("API_INTERFACE", DEFAULT_INTERFACE),
            accept_invalid_certs: env.flag("API_ACCEPT_INVALID_CERTS", false)?,
            timeout_secs: env.parsed("API_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        },
        sync: SyncConfig {
            poll_interval_ms: env.parsed("UPDATE_INTERVAL", DEFAULT_POLL_INTERVAL_MS)?,
            max_retries: env.parsed("RETRY_MAX", DEFAULT_MAX_RETRIES)?,
            retry_base_delay_ms: env.parsed("RETRY_BASE_DELAY_MS", DEFAULT_RETRY_BASE_DELAY_MS)?,
            throttle_ms: env.parsed("UPDATE_THROTTLE_MS", DEFAULT_UPDATE_THROTTLE_MS)?,
            display_timezone: env.or("DISPLAY_TIMEZONE", DEFAULT_DISPLAY_TIMEZONE),
        },
        server: ServerConfig { port: env.parsed("PORT", DEFAULT_HTTP_PORT)? },
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the working directory for
/// `paramsync.toml` then `paramsync.json`.
///
/// # Errors
/// Returns `SyncError::Config` if the file is missing, unreadable, malformed,
/// or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SyncError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            SyncError::Config("No config file found in the working directory".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SyncError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// First existing candidate file in the working directory.
pub fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    FILE_CANDIDATES.iter().map(|name| cwd.join(name)).find(|candidate| candidate.is_file())
}

/// Check cross-field and format constraints.
///
/// # Errors
/// Returns `SyncError::Config` describing the first violation.
pub fn validate(config: &Config) -> Result<()> {
    validate_url("DESTINATION_AUTH_URL", &config.auth.token_url)?;
    validate_url("DESTINATION_API_URL", &config.api.base_url)?;
    validate_table_name(&config.database.table)?;
    SyncCycleConfig::from_config(&config.sync)?;

    if config.sync.poll_interval_ms == 0 {
        return Err(SyncError::Config("UPDATE_INTERVAL must be greater than zero".into()));
    }
    if config.database.fetch_limit == 0 {
        return Err(SyncError::Config("FETCH_LIMIT must be greater than zero".into()));
    }
    if config.api.version.trim().is_empty() {
        return Err(SyncError::Config("API_VERSION must not be empty".into()));
    }
    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn missing_required<F>(lookup: &F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_VARS
        .iter()
        .copied()
        .filter(|key| lookup(key).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| SyncError::Config(format!("{name} is not a valid URL ({value}): {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SyncError::Config(format!("{name} must use http or https, got {other}"))),
    }
}

struct Env<'a, F> {
    lookup: &'a F,
}

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.get(key).ok_or_else(|| SyncError::Config(format!("{key} is required")))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<T>()
                .map_err(|e| SyncError::Config(format!("Invalid value for {key} ({raw}): {e}"))),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
            Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
            Some(v) => Err(SyncError::Config(format!("Invalid boolean for {key}: {v}"))),
        }
    }
}
