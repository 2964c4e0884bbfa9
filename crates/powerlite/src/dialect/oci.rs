//! Oracle.

use super::{Dialect, DialectKind, exists_delete, quote_literal};
use crate::params::Limit;

#[derive(Debug, Clone, Copy, Default)]
pub struct Oracle;

impl Dialect for Oracle {
    fn kind(&self) -> DialectKind {
        DialectKind::Oracle
    }

    /// `FETCH NEXT count ROWS ONLY`, preceded by `OFFSET offset ROWS`.
    fn limit_clause(&self, limit: &Limit) -> String {
        match limit {
            Limit::Count(count) => format!(" FETCH NEXT {count} ROWS ONLY"),
            Limit::Range { offset, count } => {
                format!(" OFFSET {offset} ROWS FETCH NEXT {count} ROWS ONLY")
            }
        }
    }

    fn columns_sql(&self, table: &str) -> String {
        format!(
            "SELECT * FROM USER_TAB_COLUMNS WHERE TABLE_NAME = {} ORDER BY COLUMN_ID",
            quote_literal(&table.to_uppercase())
        )
    }

    fn column_name_field(&self) -> &'static str {
        "COLUMN_NAME"
    }

    fn tables_sql(&self) -> &'static str {
        "SELECT * FROM user_tables ORDER BY table_name"
    }

    fn delete_sql(&self, table: &str, where_sql: &str) -> String {
        exists_delete(table, where_sql, "rowid")
    }

    fn session_setup(&self) -> &'static [&'static str] {
        &["ALTER SESSION SET NLS_DATE_FORMAT = 'YYYY-MM-DD'"]
    }
}
