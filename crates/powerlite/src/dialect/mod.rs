//! SQL dialects.
//!
//! Each backend family renders LIMIT windows, metadata queries and DELETE
//! statements its own way. [`dialect_for`] picks the implementation from a
//! driver name (`mysql`, `pgsql`, `oci`, `firebird`).

mod firebird;
mod mysql;
mod oci;
mod pgsql;


pub use firebird::Firebird;
pub use mysql::MySql;
pub use oci::Oracle;
pub use pgsql::Postgres;

use crate::error::{DbError, DbResult};
use crate::params::Limit;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Supported backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum DialectKind {
    MySql,
    Postgres,
    Oracle,
    Firebird,
}

impl DialectKind {
    /// Driver name, as accepted by [`dialect_for`].
    pub fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "pgsql",
            Self::Oracle => "oci",
            Self::Firebird => "firebird",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::Postgres => 5432,
            Self::Oracle => 1521,
            Self::Firebird => 3050,
        }
    }

    pub fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::MySql => Box::new(MySql),
            Self::Postgres => Box::new(Postgres),
            Self::Oracle => Box::new(Oracle),
            Self::Firebird => Box::new(Firebird),
        }
    }
}

impl FromStr for DialectKind {
    type Err = DbError;

    fn from_str(s: &str) -> DbResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::Postgres),
            "oci" | "oracle" => Ok(Self::Oracle),
            "firebird" => Ok(Self::Firebird),
            other => Err(DbError::Connection(format!("Unsupported driver: {other}"))),
        }
    }
}

impl TryFrom<String> for DialectKind {
    type Error = DbError;

    fn try_from(s: String) -> DbResult<Self> {
        s.parse()
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dialect implementation for a driver name.
pub fn dialect_for(name: &str) -> DbResult<Box<dyn Dialect>> {
    Ok(name.parse::<DialectKind>()?.dialect())
}

/// Where a dialect's row window goes in a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitPlacement {
    /// Right after `SELECT ` (Firebird `FIRST n SKIP m`).
    AfterSelect,
    /// At the end of the statement.
    Trailing,
}

/// Backend-specific SQL rendering and capabilities.
pub trait Dialect: Send + Sync + fmt::Debug {
    fn kind(&self) -> DialectKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Render the row window for a SELECT.
    fn limit_clause(&self, limit: &Limit) -> String;

    fn limit_placement(&self) -> LimitPlacement {
        LimitPlacement::Trailing
    }

    /// Query listing the columns of `table`.
    fn columns_sql(&self, table: &str) -> String;

    /// Result column carrying the column name in [`columns_sql`](Dialect::columns_sql) rows.
    fn column_name_field(&self) -> &'static str;

    /// Query listing the base tables (views excluded).
    fn tables_sql(&self) -> &'static str;

    /// Render a DELETE. `table` may embed a join
    /// (`"orders LEFT JOIN customers ON orders.customer_id = customers.id"`),
    /// `where_sql` is empty or starts with `" WHERE "`.
    fn delete_sql(&self, table: &str, where_sql: &str) -> String;

    fn supports_last_insert_id(&self) -> bool {
        false
    }

    /// Statements to run right after connecting.
    fn session_setup(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the client auto-commit flag must be switched off around
    /// explicit transactions.
    fn toggles_autocommit(&self) -> bool {
        false
    }
}

/// Join type of a join-encoded DELETE target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JoinKind {
    Inner,
    Left,
    Right,
}

/// `"<source> <kind> JOIN <joined> ON <left> = <right>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct JoinedTable<'a> {
    pub source: &'a str,
    pub kind: JoinKind,
    pub joined: &'a str,
    pub left: &'a str,
    pub right: &'a str,
}

impl<'a> JoinedTable<'a> {
    pub fn parse(table: &'a str) -> Option<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(
                r"(?i)([a-z0-9_-]+)\s+(INNER|LEFT|RIGHT)\s+JOIN\s+([a-z0-9_-]+)\s+ON\s+([a-z0-9_.-]+)\s*=\s*([a-z0-9_.-]+)",
            )
            .expect("invalid built-in join regex")
        });
        let caps = re.captures(table)?;
        let kind = match caps.get(2)?.as_str().to_ascii_uppercase().as_str() {
            "LEFT" => JoinKind::Left,
            "RIGHT" => JoinKind::Right,
            _ => JoinKind::Inner,
        };
        Some(Self {
            source: caps.get(1)?.as_str(),
            kind,
            joined: caps.get(3)?.as_str(),
            left: caps.get(4)?.as_str(),
            right: caps.get(5)?.as_str(),
        })
    }

    /// A LEFT JOIN without a filter matches every source row.
    pub fn matches_all_source_rows(&self, where_sql: &str) -> bool {
        self.kind == JoinKind::Left && where_sql.trim().is_empty()
    }
}

/// `" WHERE a = 1"` becomes `" AND a = 1"` so it can extend a correlated
/// subquery filter.
pub(crate) fn where_as_and(where_sql: &str) -> String {
    let trimmed = where_sql.trim_start();
    match trimmed.get(..5) {
        Some(kw) if kw.eq_ignore_ascii_case("WHERE") => format!(" AND{}", &trimmed[5..]),
        _ if trimmed.is_empty() => String::new(),
        _ => format!(" AND {trimmed}"),
    }
}

/// Table name as a SQL string literal.
pub(crate) fn quote_literal(name: &str) -> String {
    format!("'{}'", name.trim().replace('\'', "''"))
}

/// Delete the source rows selected by the join itself, matched on the
/// backend's physical row identifier `row_id`. Keeps LEFT JOIN semantics
/// for filters on unmatched rows (`joined.id IS NULL`).
pub(crate) fn row_id_delete(source: &str, table: &str, where_sql: &str, row_id: &str) -> String {
    format!(
        "DELETE FROM {source} WHERE {row_id} IN (SELECT {source}.{row_id} FROM {}{where_sql})",
        table.trim()
    )
}

/// Correlated `EXISTS` delete shared by the dialects without multi-table
/// DELETE support. Filtered LEFT JOINs go through [`row_id_delete`].
pub(crate) fn exists_delete(table: &str, where_sql: &str, row_id: &str) -> String {
    match JoinedTable::parse(table) {
        Some(join) if join.matches_all_source_rows(where_sql) => {
            format!("DELETE FROM {}", join.source)
        }
        Some(join) if join.kind == JoinKind::Left => {
            row_id_delete(join.source, table, where_sql, row_id)
        }
        Some(join) => format!(
            "DELETE FROM {} WHERE EXISTS (SELECT * FROM {} WHERE {} = {}{})",
            join.source,
            join.joined,
            join.right,
            join.left,
            where_as_and(where_sql)
        ),
        None => format!("DELETE FROM {}{}", table.trim(), where_sql),
    }
}
