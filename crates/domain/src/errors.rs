//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for paramsync
///
/// Every failure that crosses a component boundary is one of these variants.
/// The sync cycle decides per kind whether to skip a row, abort the cycle, or
/// (for configuration errors at startup) stop the process.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A service could not be reached
    #[error("Failed to connect to {service}: {details}")]
    Connection {
        /// Human-readable service name
        service: String,
        /// Underlying failure
        details: String,
    },

    /// A query against the source database failed
    #[error("Database {operation} failed: {details}")]
    Database {
        /// What was being done, e.g. `fetch latest values`
        operation: String,
        /// Underlying failure
        details: String,
    },

    /// The token endpoint refused or returned garbage
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The destination rejected an update
    #[error(
        "API {operation} failed for entity {entity_id}, parameter {parameter_name}: {details}"
    )]
    Api {
        /// Request kind, e.g. `update`
        operation: String,
        /// Target entity id
        entity_id: i64,
        /// Target parameter name
        parameter_name: String,
        /// Status and body, or the transport failure
        details: String,
    },

    /// A pre-cycle health check failed
    #[error("Health check failed for {service}: {details}")]
    HealthCheck {
        /// Human-readable service name
        service: String,
        /// Underlying failure
        details: String,
    },
}

/// Stable, loggable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// [`SyncError::Config`]
    Config,
    /// [`SyncError::Connection`]
    Connection,
    /// [`SyncError::Database`]
    Database,
    /// [`SyncError::Authentication`]
    Authentication,
    /// [`SyncError::Api`]
    Api,
    /// [`SyncError::HealthCheck`]
    HealthCheck,
}

impl ErrorKind {
    /// Label suitable for log fields and the error endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Connection => "connection",
            Self::Database => "database",
            Self::Authentication => "authentication",
            Self::Api => "api",
            Self::HealthCheck => "health_check",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncError {
    /// Get the category for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Database { .. } => ErrorKind::Database,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Api { .. } => ErrorKind::Api,
            Self::HealthCheck { .. } => ErrorKind::HealthCheck,
        }
    }

    /// Connection failure for `service`.
    pub fn connection(service: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Connection { service: service.into(), details: details.into() }
    }

    /// Database failure during `operation`.
    pub fn database(operation: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Database { operation: operation.into(), details: details.into() }
    }

    /// Health-check failure for `service`.
    pub fn health_check(service: impl Into<String>, details: impl Into<String>) -> Self {
        Self::HealthCheck { service: service.into(), details: details.into() }
    }

    /// API failure for one parameter update.
    pub fn api(
        operation: impl Into<String>,
        entity_id: i64,
        parameter_name: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::Api {
            operation: operation.into(),
            entity_id,
            parameter_name: parameter_name.into(),
            details: details.into(),
        }
    }

    /// Re-wrap any non health-check error as a health-check failure for
    /// `service`. Health-check errors pass through untouched.
    pub fn into_health_check(self, service: &str) -> Self {
        match self {
            Self::HealthCheck { .. } => self,
            other => Self::health_check(service, other.to_string()),
        }
    }
}

/// Result type alias for paramsync operations
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(SyncError::Config("x".into()).kind(), ErrorKind::Config);
        assert_eq!(SyncError::connection("db", "refused").kind(), ErrorKind::Connection);
        assert_eq!(SyncError::database("query", "boom").kind(), ErrorKind::Database);
        assert_eq!(SyncError::Authentication("401".into()).kind(), ErrorKind::Authentication);
        assert_eq!(SyncError::api("update", 1, "X", "500").kind(), ErrorKind::Api);
        assert_eq!(SyncError::health_check("api", "503").kind(), ErrorKind::HealthCheck);
    }

    #[test]
    fn test_messages_carry_context() {
        let err = SyncError::api("update", 4, "Gap", "status 500: oops");
        assert_eq!(
            err.to_string(),
            "API update failed for entity 4, parameter Gap: status 500: oops"
        );

        let err = SyncError::health_check("source database", "expected 1 row, got 0");
        assert_eq!(
            err.to_string(),
            "Health check failed for source database: expected 1 row, got 0"
        );
    }

    #[test]
    fn test_into_health_check_wraps_other_kinds() {
        let auth = SyncError::Authentication("status 401".into());
        let wrapped = auth.into_health_check("destination API");
        assert_eq!(wrapped.kind(), ErrorKind::HealthCheck);
        assert!(wrapped.to_string().contains("Authentication failed: status 401"));

        let original = SyncError::health_check("source database", "down");
        assert_eq!(original.clone().into_health_check("other"), original);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::HealthCheck.to_string(), "health_check");
        assert_eq!(serde_json::to_string(&ErrorKind::Api).unwrap(), "\"api\"");
    }
}
