//! SQL DDL for record tables.

/// Record table layout:
/// - `s_no` INTEGER PRIMARY KEY AUTOINCREMENT, so deleted ids are never handed out again
/// - the three caller-supplied text columns, all NOT NULL
///
/// `{table}` is replaced with an already-quoted identifier.
pub const SQLITE_RECORD_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS {table} (
    s_no INTEGER PRIMARY KEY AUTOINCREMENT,
    lp_no TEXT NOT NULL,
    items TEXT NOT NULL,
    issue_voucher_number TEXT NOT NULL
)
"#;

pub fn record_table_ddl(quoted_table: &str) -> String {
    SQLITE_RECORD_TABLE.replace("{table}", quoted_table)
}
