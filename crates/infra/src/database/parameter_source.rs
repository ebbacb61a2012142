use std::sync::Arc;

use async_trait::async_trait;
use paramsync_core::ParameterSource;
use paramsync_domain::{DatabaseConfig, ParameterReading, Result, SyncError};
use tokio_postgres::Row;
use tracing::{debug, instrument};

use super::manager::PgConnectionManager;
use super::query::latest_readings_sql;
use crate::errors::describe_pg;

/// Reads the newest parameter rows from a PostgreSQL table.
pub struct PgParameterSource {
    connections: Arc<PgConnectionManager>,
    query: String,
    fetch_limit: i64,
}

impl PgParameterSource {
    /// # Errors
    ///
    /// `SyncError::Config` if the configured table name is not a plain
    /// identifier.
    pub fn new(connections: Arc<PgConnectionManager>, database: &DatabaseConfig) -> Result<Self> {
        Ok(Self {
            connections,
            query: latest_readings_sql(&database.table)?,
            fetch_limit: i64::from(database.fetch_limit),
        })
    }
}

#[async_trait]
impl ParameterSource for PgParameterSource {
    #[instrument(skip(self), fields(limit = self.fetch_limit))]
    async fn fetch_latest(&self) -> Result<Vec<ParameterReading>> {
        let client = self.connections.client().await?;
        let rows = client
            .query(self.query.as_str(), &[&self.fetch_limit])
            .await
            .map_err(|err| SyncError::database("fetch latest values", describe_pg(&err)))?;

        debug!(rows = rows.len(), "Fetched rows from source table");
        rows.iter().map(reading_from_row).collect()
    }

    async fn ping(&self) -> Result<()> {
        let client = self.connections.client().await?;
        let rows = client
            .query("SELECT 1", &[])
            .await
            .map_err(|err| SyncError::database("ping", describe_pg(&err)))?;

        expect_single_row(rows.len())
    }
}

/// A healthy `SELECT 1` answers with exactly one row.
fn expect_single_row(count: usize) -> Result<()> {
    if count == 1 {
        Ok(())
    } else {
        Err(SyncError::database("ping", format!("expected 1 row, got {count}")))
    }
}

fn reading_from_row(row: &Row) -> Result<ParameterReading> {
    let decode = |err: tokio_postgres::Error| SyncError::database("decode row", describe_pg(&err));

    Ok(ParameterReading::new(
        row.try_get::<_, i64>(0).map_err(decode)?,
        row.try_get::<_, String>(1).map_err(decode)?,
        row.try_get::<_, Option<f64>>(2).map_err(decode)?,
        row.try_get::<_, i64>(3).map_err(decode)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(table: &str) -> DatabaseConfig {
        DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            user: "sync".into(),
            password: "secret".into(),
            database: "plant".into(),
            table: table.into(),
            fetch_limit: 50,
        }
    }

    #[test]
    fn rejects_unsafe_table_name_at_construction() {
        let config = database("readings; DROP TABLE readings");
        let manager = Arc::new(PgConnectionManager::new(&config));

        let err = PgParameterSource::new(manager, &config).err().unwrap();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn ping_requires_exactly_one_row() {
        assert!(expect_single_row(1).is_ok());

        for count in [0, 2] {
            let err = expect_single_row(count).unwrap_err();
            assert_eq!(err.kind(), paramsync_domain::ErrorKind::Database);
            assert!(err.to_string().contains(&format!("expected 1 row, got {count}")));
        }
    }

    #[test]
    fn uses_configured_limit() {
        let config = database("plant.readings");
        let manager = Arc::new(PgConnectionManager::new(&config));

        let source = PgParameterSource::new(manager, &config).unwrap();
        assert_eq!(source.fetch_limit, 50);
        assert!(source.query.contains("FROM plant.readings"));
    }
}
