//! SQL for the readings table

use std::sync::OnceLock;

use paramsync_domain::{Result, SyncError};
use regex::Regex;

/// `table` or `schema.table`, unquoted identifiers only.
const TABLE_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$";

#[allow(clippy::expect_used)]
fn table_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(TABLE_NAME_PATTERN).expect("TABLE_NAME_PATTERN should compile - this is a bug")
    })
}

/// The table name is interpolated into SQL, so it must be a plain identifier.
pub fn validate_table_name(table: &str) -> Result<()> {
    if table_name_regex().is_match(table) {
        Ok(())
    } else {
        Err(SyncError::Config(format!(
            "Invalid table name {table:?}: expected identifier or schema.identifier"
        )))
    }
}

/// Newest `$1` rows, most recent first.
pub fn latest_readings_sql(table: &str) -> Result<String> {
    validate_table_name(table)?;
    Ok(format!(
        r#"SELECT "CrusherInterfaceId"::bigint, "ParameterName", "Value"::double precision, "ValueLastUpdate"::bigint FROM {table} ORDER BY "Id" DESC LIMIT $1"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_schema_qualified_names() {
        for name in ["crusher_parameters", "plant.CrusherParameters", "_t1", "s_1.t_2"] {
            assert!(validate_table_name(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_anything_that_could_inject_sql() {
        for name in [
            "",
            "1table",
            "a.b.c",
            "params; DROP TABLE x",
            "\"quoted\"",
            "t -- comment",
            "schema.",
        ] {
            let err = validate_table_name(name).unwrap_err();
            assert!(matches!(err, SyncError::Config(_)), "{name} should be rejected");
        }
    }

    #[test]
    fn query_orders_newest_first_with_limit_parameter() {
        let sql = latest_readings_sql("plant.readings").unwrap();

        assert!(sql.contains("FROM plant.readings"));
        assert!(sql.ends_with(r#"ORDER BY "Id" DESC LIMIT $1"#));
        assert!(sql.contains(r#""Value"::double precision"#));
    }
}
