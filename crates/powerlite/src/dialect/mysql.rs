//! MySQL / MariaDB.

use super::{Dialect, DialectKind};
use crate::params::Limit;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    /// `LIMIT count` or `LIMIT offset, count`.
    fn limit_clause(&self, limit: &Limit) -> String {
        match limit {
            Limit::Count(count) => format!(" LIMIT {count}"),
            Limit::Range { offset, count } => format!(" LIMIT {offset}, {count}"),
        }
    }

    fn columns_sql(&self, table: &str) -> String {
        format!("SHOW COLUMNS FROM {}", table.trim())
    }

    fn column_name_field(&self) -> &'static str {
        "Field"
    }

    fn tables_sql(&self) -> &'static str {
        "SHOW FULL TABLES WHERE Table_Type != 'VIEW'"
    }

    /// Multi-table DELETE: `DELETE <source> FROM <source> JOIN ...`.
    fn delete_sql(&self, table: &str, where_sql: &str) -> String {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"(?i)([a-z0-9_-]+)\s+(?:INNER|LEFT|RIGHT)\s+JOIN\b")
                .expect("invalid built-in join regex")
        });
        let table = table.trim();
        match re.captures(table).and_then(|c| c.get(1)) {
            Some(source) => format!("DELETE {} FROM {}{}", source.as_str(), table, where_sql),
            None => format!("DELETE FROM {table}{where_sql}"),
        }
    }

    fn supports_last_insert_id(&self) -> bool {
        true
    }
}
