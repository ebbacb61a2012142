//! Integration tests for the PostgreSQL parameter source
//!
//! These need a reachable PostgreSQL server and are ignored by default.
//! Connection settings come from the standard `PGHOST`, `PGPORT`, `PGUSER`,
//! `PGPASSWORD` and `PGDATABASE` variables (defaults: a local `postgres`
//! superuser). Run with:
//!
//! ```text
//! cargo test -p paramsync-infra --test postgres_source_integration -- --ignored
//! ```
//!
//! Each test creates its own table and drops it afterwards.

use std::sync::Arc;

use paramsync_core::ParameterSource;
use paramsync_domain::{DatabaseConfig, ErrorKind, ParameterReading};
use paramsync_infra::{PgConnectionManager, PgParameterSource};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn database(table: &str, fetch_limit: u32) -> DatabaseConfig {
    DatabaseConfig {
        host: env_or("PGHOST", "localhost"),
        port: env_or("PGPORT", "5432").parse().expect("PGPORT must be a port number"),
        user: env_or("PGUSER", "postgres"),
        password: env_or("PGPASSWORD", "postgres"),
        database: env_or("PGDATABASE", "postgres"),
        table: table.to_string(),
        fetch_limit,
    }
}

fn table_name(test: &str) -> String {
    format!("paramsync_{test}_{}", std::process::id())
}

/// Create `table` with the source layout and run `inserts` against it.
async fn seed(manager: &PgConnectionManager, table: &str, inserts: &str) {
    let client = manager.client().await.expect("connect to test database");
    client
        .batch_execute(&format!(
            r#"DROP TABLE IF EXISTS {table};
               CREATE TABLE {table} (
                   "Id" serial PRIMARY KEY,
                   "CrusherInterfaceId" integer NOT NULL,
                   "ParameterName" text,
                   "Value" real,
                   "ValueLastUpdate" bigint NOT NULL
               );
               {inserts}"#
        ))
        .await
        .expect("seed test table");
}

async fn drop_table(manager: &PgConnectionManager, table: &str) {
    let client = manager.client().await.expect("connect to test database");
    client.batch_execute(&format!("DROP TABLE IF EXISTS {table}")).await.expect("drop test table");
    manager.close().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server (PG* env vars)"]
async fn fetches_newest_rows_first_and_decodes_null_values() {
    let table = table_name("fetch");
    let config = database(&table, 2);
    let manager = Arc::new(PgConnectionManager::new(&config));

    seed(
        &manager,
        &table,
        &format!(
            r#"INSERT INTO {table} ("CrusherInterfaceId", "ParameterName", "Value", "ValueLastUpdate")
               VALUES (1, 'FeedRate', 10.5, 1700000000),
                      (2, 'Gap', NULL, 1700000060),
                      (3, 'Css', 42, 1700000120);"#
        ),
    )
    .await;

    let source = PgParameterSource::new(Arc::clone(&manager), &config).unwrap();
    let rows = source.fetch_latest().await.unwrap();

    assert_eq!(
        rows,
        vec![
            ParameterReading::new(3, "Css", Some(42.0), 1_700_000_120),
            ParameterReading::new(2, "Gap", None, 1_700_000_060),
        ]
    );

    drop_table(&manager, &table).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server (PG* env vars)"]
async fn undecodable_row_is_a_database_error() {
    let table = table_name("decode");
    let config = database(&table, 10);
    let manager = Arc::new(PgConnectionManager::new(&config));

    seed(
        &manager,
        &table,
        &format!(
            r#"INSERT INTO {table} ("CrusherInterfaceId", "ParameterName", "Value", "ValueLastUpdate")
               VALUES (1, NULL, 1, 1700000000);"#
        ),
    )
    .await;

    let source = PgParameterSource::new(Arc::clone(&manager), &config).unwrap();
    let err = source.fetch_latest().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Database);
    assert!(err.to_string().contains("decode row"));

    drop_table(&manager, &table).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server (PG* env vars)"]
async fn ping_succeeds_and_missing_table_fails_fetch() {
    let config = database(&table_name("missing"), 10);
    let manager = Arc::new(PgConnectionManager::new(&config));
    let source = PgParameterSource::new(Arc::clone(&manager), &config).unwrap();

    source.ping().await.unwrap();

    let err = source.fetch_latest().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Database);

    manager.close().await;
}
