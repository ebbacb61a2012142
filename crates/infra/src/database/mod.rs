//! PostgreSQL source of parameter readings

pub mod manager;
pub mod parameter_source;
mod query;

pub use manager::PgConnectionManager;
pub use parameter_source::PgParameterSource;
pub use query::{latest_readings_sql, validate_table_name};
