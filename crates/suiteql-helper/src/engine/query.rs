//! SQL text builders for the paging engine.
//!
//! Every wrapper nests the caller's query verbatim followed by a newline, so a
//! trailing `--` comment in the inner query cannot swallow the closing paren.
//! Row bounds only ever arrive as typed integers through [`RowWindow`].

use crate::engine::limits::RowWindow;

/// Lower-cased name of the ordinal column the query tool shows to users.
pub const ROW_NUMBER_COLUMN: &str = "rownumber";

/// Ordinal column for walks whose callers strip it again, so a user column
/// called `rownumber` passes through untouched.
pub const INTERNAL_ROW_NUMBER_COLUMN: &str = "suiteql_helper_rownum";

/// Lower-cased name of the column produced by [`count_sql`].
pub const TOTAL_COUNT_COLUMN: &str = "totalrecordcount";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    /// The platform dialect, with an Oracle-style `ROWNUM` pseudo-column.
    /// Reported by executors backed by the hosted query service.
    SuiteQl,
    /// Window-function ordinal, for hosts backed by SQLite.
    Sqlite,
}

impl SqlDialect {
    fn ordinal_expr(self) -> &'static str {
        match self {
            SqlDialect::SuiteQl => "ROWNUM",
            SqlDialect::Sqlite => "ROW_NUMBER() OVER ()",
        }
    }
}

/// Restricts `sql` to the ordinal rows in `window`, exposing the ordinal as
/// the column `ordinal_column`.
pub fn windowed_sql(dialect: SqlDialect, sql: &str, window: RowWindow, ordinal_column: &str) -> String {
    format!(
        "SELECT * FROM ( SELECT {ordinal} AS {col}, * FROM ( {sql}\n ) ) WHERE ( {col} BETWEEN {begin} AND {end} )",
        ordinal = dialect.ordinal_expr(),
        col = ordinal_column.to_uppercase(),
        begin = window.begin(),
        end = window.end(),
    )
}

pub fn count_sql(sql: &str) -> String {
    format!("SELECT COUNT(*) AS TotalRecordCount FROM ( {sql}\n )")
}

/// Page `page_index` (0-based) of `page_size` rows, for hosts paging with LIMIT/OFFSET.
pub fn limit_offset_sql(sql: &str, page_size: usize, page_index: usize) -> String {
    let offset = page_size as u64 * page_index as u64;
    format!("SELECT * FROM ( {sql}\n ) LIMIT {page_size} OFFSET {offset}")
}
