//! Lazily created PostgreSQL connection

use std::sync::Arc;
use std::time::Duration;

use paramsync_domain::{DatabaseConfig, Result, SyncError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config as PgConfig, NoTls};
use tracing::{debug, info, warn};

use crate::errors::describe_pg;

const SERVICE: &str = "source database";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

struct Live {
    client: Arc<Client>,
    driver: JoinHandle<()>,
}

/// Owns at most one connection to the source database.
///
/// Nothing is opened until the first query. A connection that the server
/// closed is replaced on the next call; [`close`](Self::close) releases it
/// for good (a later call reconnects).
pub struct PgConnectionManager {
    config: PgConfig,
    live: Mutex<Option<Live>>,
}

impl PgConnectionManager {
    /// Prepare connection settings; nothing is opened yet.
    pub fn new(database: &DatabaseConfig) -> Self {
        let mut config = PgConfig::new();
        config
            .host(&database.host)
            .port(database.port)
            .user(&database.user)
            .password(&database.password)
            .dbname(&database.database)
            .application_name("paramsync")
            .connect_timeout(CONNECT_TIMEOUT);

        Self { config, live: Mutex::new(None) }
    }

    /// Shared handle to an open connection, connecting if needed.
    ///
    /// # Errors
    ///
    /// `SyncError::Connection` if the server cannot be reached or rejects
    /// the credentials.
    pub async fn client(&self) -> Result<Arc<Client>> {
        let mut live = self.live.lock().await;

        if let Some(current) = live.as_ref() {
            if !current.client.is_closed() {
                return Ok(Arc::clone(&current.client));
            }
            warn!("Database connection closed; reconnecting");
        }

        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|err| SyncError::connection(SERVICE, describe_pg(&err)))?;

        let driver = tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!(error = %describe_pg(&err), "Database connection terminated");
            }
        });

        info!(hosts = ?self.config.get_hosts(), "Connected to source database");
        let client = Arc::new(client);
        if let Some(stale) = live.replace(Live { client: Arc::clone(&client), driver }) {
            stale.driver.abort();
        }
        Ok(client)
    }

    /// `true` if an open connection is held.
    pub async fn is_connected(&self) -> bool {
        self.live.lock().await.as_ref().is_some_and(|live| !live.client.is_closed())
    }

    /// Release the connection. Idempotent.
    pub async fn close(&self) {
        if let Some(Live { client, driver }) = self.live.lock().await.take() {
            drop(client);
            // the driver finishes once the last client handle is gone
            if tokio::time::timeout(Duration::from_secs(5), driver).await.is_err() {
                warn!("Database connection did not shut down in time");
            }
            info!("Database connection closed");
        } else {
            debug!("No database connection to close");
        }
    }
}
