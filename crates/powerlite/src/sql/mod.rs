//! SQL text helpers: statement classification, auto-commit detection,
//! placeholder scanning and the row-count probe rewrite.

mod where_clause;

#[cfg(test)]
mod tests;

pub use where_clause::WhereClause;

use crate::value::{PlaceholderKey, Placeholders};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Kind of statement a [`QueryBuilder`](crate::QueryBuilder) is composing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Raw,
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip leading whitespace, SQL comments (`--` and `/* */`), and parentheses
/// from a SQL string to find the first meaningful keyword.
pub(crate) fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("--") {
            match rest.find('\n') {
                Some(pos) => s = &rest[pos + 1..],
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix("/*") {
            match rest.find("*/") {
                Some(pos) => s = &rest[pos + 2..],
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
        }
        if s == before {
            return s;
        }
    }
}

pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    match s.get(0..keyword.len()) {
        Some(prefix) => {
            prefix.eq_ignore_ascii_case(keyword)
                && !s[keyword.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

/// Text of the statement that follows any `WITH` CTE definitions.
fn main_statement(sql: &str) -> &str {
    let trimmed = strip_sql_prefix(sql);
    if !starts_with_keyword(trimmed, "WITH") {
        return trimmed;
    }

    let mut depth: i32 = 0;
    let mut last_top_level = 0;
    let mut in_string = false;
    for (i, c) in trimmed.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    last_top_level = i + 1;
                }
            }
            _ => {}
        }
    }
    trimmed[last_top_level..].trim_start()
}

/// Whether a raw statement returns rows and takes the read path.
///
/// `WITH ...` statements are classified by the statement that follows the
/// CTE definitions.
pub fn is_select(sql: &str) -> bool {
    let trimmed = strip_sql_prefix(sql);
    if starts_with_keyword(trimmed, "SELECT") {
        return true;
    }
    if !starts_with_keyword(trimmed, "WITH") {
        return false;
    }
    let remainder = main_statement(trimmed);
    !["INSERT", "UPDATE", "DELETE"]
        .iter()
        .any(|kw| starts_with_keyword(remainder, kw))
}

/// Whether the statement inserts rows.
pub(crate) fn is_insert_like(sql: &str) -> bool {
    let statement = main_statement(sql);
    starts_with_keyword(statement, "INSERT") || starts_with_keyword(statement, "REPLACE")
}

fn auto_commit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^(?:ALTER\s+(DATABASE|EVENT|PROCEDURE|SERVER|TABLE|TABLESPACE|VIEW)\b",
            r"|CREATE\s+(?:OR\s+REPLACE\s+)?(?:UNIQUE\s+)?(DATABASE|EVENT|INDEX|PROCEDURE|SERVER|TABLE|TABLESPACE|TRIGGER|VIEW)\b",
            r"|DROP\s+(DATABASE|EVENT|INDEX|PROCEDURE|SERVER|TABLE|TABLESPACE|TRIGGER|VIEW)\b",
            r"|INSTALL\s+PLUGIN|LOCK\s+TABLES|RENAME\s+TABLE|TRUNCATE\s+TABLE|UNINSTALL\s+PLUGIN)",
        ))
        .expect("invalid built-in auto-commit regex")
    })
}

/// Whether the backend commits this statement implicitly (DDL and friends).
///
/// Only the leading keywords count. Such statements are never wrapped in an
/// explicit transaction.
pub fn is_auto_commit(sql: &str) -> bool {
    auto_commit_re().is_match(strip_sql_prefix(sql))
}

/// A placeholder marker found in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker<'a> {
    /// `:name`, without the colon.
    Named(&'a str),
    /// The n-th `?` marker, 1-based.
    Positional(usize),
}

/// Rewrite placeholder markers outside string literals and quoted
/// identifiers. `replace` returns the text to substitute, or `None` to keep
/// the marker as written. `::` casts are left alone.
pub(crate) fn rewrite_markers<'a, F>(sql: &'a str, mut replace: F) -> String
where
    F: FnMut(Marker<'a>) -> Option<String>,
{
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut positional = 0;
    let mut i = 0;
    let mut copied = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                i += 1;
            }
            b':' if i + 1 < bytes.len() && bytes[i + 1] == b':' => i += 2,
            b':' => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                if end > start {
                    if let Some(text) = replace(Marker::Named(&sql[start..end])) {
                        out.push_str(&sql[copied..i]);
                        out.push_str(&text);
                        copied = end;
                    }
                }
                i = end.max(i + 1);
            }
            b'?' => {
                positional += 1;
                if let Some(text) = replace(Marker::Positional(positional)) {
                    out.push_str(&sql[copied..i]);
                    out.push_str(&text);
                    copied = i + 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    out.push_str(&sql[copied.min(sql.len())..]);
    out
}

/// Substitute bound values into the SQL text for display.
///
/// The result is meant for humans (logs, errors, debug capture) and is never
/// sent to the database.
pub fn interpolate(sql: &str, placeholders: &Placeholders) -> String {
    if placeholders.is_empty() {
        return sql.to_string();
    }
    rewrite_markers(sql, |marker| {
        let key = match marker {
            Marker::Named(name) => PlaceholderKey::Named(name.to_string()),
            Marker::Positional(pos) => PlaceholderKey::Position(pos),
        };
        placeholders
            .iter()
            .find(|(k, _)| **k == key)
            .map(|(_, v)| v.to_sql_inline())
    })
}

/// Truncate SQL for log output on a char boundary.
pub(crate) fn truncate_sql(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn limiting_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:LIMIT[\s0-9]+|FIRST[\s0-9]+|SKIP[\s0-9]+|OFFSET[\s0-9]+|NEXT[\s0-9]+|HAVING\s+SUM|GROUP\s+BY|UNION)",
        )
        .expect("invalid built-in limit regex")
    })
}

fn aggregate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:COUNT|SUM|AVG|MIN|MAX|GROUP_CONCAT|STRING_AGG|LISTAGG|ARRAY_AGG)\s*\(")
            .expect("invalid built-in aggregate regex")
    })
}

fn select_from_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^\s*SELECT\s+(.*?)\s+FROM\s+(.*)$").expect("invalid built-in select regex")
    })
}

fn order_by_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^(.*)\s+ORDER\s+BY\s+.*$").expect("invalid built-in order-by regex")
    })
}

/// Rewrite a SELECT into a `COUNT` probe.
///
/// Returns `None` when the statement restricts or aggregates its rows
/// (LIMIT, FIRST, SKIP, OFFSET, FETCH NEXT, HAVING SUM, GROUP BY, UNION),
/// selects an aggregate (one row whatever the table holds) or does not look
/// like `SELECT <cols> FROM <rest>`. A trailing ORDER BY is dropped.
/// `count_expr` replaces the selected columns inside `COUNT(..)`.
pub fn count_probe_sql(sql: &str, count_expr: Option<&str>) -> Option<String> {
    if limiting_re().is_match(sql) {
        return None;
    }
    let caps = select_from_re().captures(sql)?;
    let columns = caps.get(1)?.as_str().trim();
    if aggregate_re().is_match(columns) {
        return None;
    }
    let mut rest = caps.get(2)?.as_str().trim_end();
    if let Some(without_order) = order_by_re().captures(rest).and_then(|c| c.get(1)) {
        rest = without_order.as_str();
    }
    let expr = count_expr.unwrap_or(columns);
    Some(format!("SELECT COUNT({expr}) AS row_count FROM {rest}"))
}
