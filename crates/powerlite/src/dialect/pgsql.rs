//! PostgreSQL.

use super::{Dialect, DialectKind, JoinKind, JoinedTable, quote_literal, row_id_delete, where_as_and};
use crate::params::Limit;

#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    /// `LIMIT count` or `LIMIT count OFFSET offset`.
    fn limit_clause(&self, limit: &Limit) -> String {
        match limit {
            Limit::Count(count) => format!(" LIMIT {count}"),
            Limit::Range { offset, count } => format!(" LIMIT {count} OFFSET {offset}"),
        }
    }

    fn columns_sql(&self, table: &str) -> String {
        format!(
            "SELECT * FROM INFORMATION_SCHEMA.COLUMNS WHERE table_name = {} ORDER BY ordinal_position",
            quote_literal(table)
        )
    }

    fn column_name_field(&self) -> &'static str {
        "column_name"
    }

    fn tables_sql(&self) -> &'static str {
        "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE' AND table_schema NOT IN ('pg_catalog', 'information_schema')"
    }

    /// `DELETE FROM <source> USING <joined> WHERE <join condition> AND ...`.
    /// Filtered LEFT JOINs delete by `ctid` from the joined SELECT.
    fn delete_sql(&self, table: &str, where_sql: &str) -> String {
        match JoinedTable::parse(table) {
            Some(join) if join.matches_all_source_rows(where_sql) => {
                format!("DELETE FROM {}", join.source)
            }
            Some(join) if join.kind == JoinKind::Left => {
                row_id_delete(join.source, table, where_sql, "ctid")
            }
            Some(join) => format!(
                "DELETE FROM {} USING {} WHERE {} = {}{}",
                join.source,
                join.joined,
                join.left,
                join.right,
                where_as_and(where_sql)
            ),
            None => format!("DELETE FROM {}{}", table.trim(), where_sql),
        }
    }
}
