//! WHERE clause compiler.

use crate::condition::{Condition, ConditionEntry};
use crate::error::{DbError, DbResult};
use crate::value::Placeholders;
use std::collections::HashSet;

/// Compiles a [`Condition`] into `" WHERE ..."` SQL and named placeholders.
///
/// Each keyed entry gets a placeholder named after its column (dots become
/// underscores) behind a letter prefix: `a_id`, then `b_id` for a second
/// `id`, and so on. A name handed out by an instance is never handed out
/// again by that instance, across [`reset`](WhereClause::reset) included.
///
/// # Example
/// ```
/// use powerlite::{Condition, WhereClause};
///
/// let mut w = WhereClause::new();
/// w.compile(&Condition::new().eq("id", 7).gt("users.age", 18)).unwrap();
/// assert_eq!(w.sql(), " WHERE id = :a_id AND users.age > :a_users_age");
/// ```
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    sql: String,
    placeholders: Placeholders,
    issued: HashSet<String>,
    reserved: HashSet<String>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep placeholder names used elsewhere in the same statement (INSERT
    /// or UPDATE values) out of the allocation.
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(names.into_iter().map(Into::into));
    }

    /// Compile a condition, replacing the SQL of the previous compile.
    ///
    /// Placeholders accumulate until [`reset`](WhereClause::reset). NULL and
    /// empty-string values are dropped before compiling.
    pub fn compile(&mut self, condition: &Condition) -> DbResult<&str> {
        match condition {
            Condition::Entries(entries) if !entries.is_empty() => {
                let mut output = Vec::with_capacity(entries.len());
                for entry in entries {
                    match entry {
                        ConditionEntry::Keyed { value, .. } if value.is_empty() => {}
                        ConditionEntry::Keyed { key, value } => {
                            let (column, has_operator) = split_key(key)?;
                            let name = self.allocate(&column);
                            if has_operator {
                                output.push(format!("{} :{}", key.trim(), name));
                            } else {
                                output.push(format!("{} = :{}", key.trim(), name));
                            }
                            self.placeholders.set(name, value.clone().normalized());
                        }
                        ConditionEntry::Fragment(sql) if sql.trim().is_empty() => {}
                        ConditionEntry::Fragment(sql) => output.push(sql.trim().to_string()),
                    }
                }
                self.sql = if output.is_empty() {
                    String::new()
                } else {
                    format!(" WHERE {}", output.join(" AND "))
                };
            }
            Condition::Raw(sql) if !sql.trim().is_empty() => {
                self.sql = format!(" WHERE {}", sql.trim());
            }
            _ => {
                self.sql.clear();
                self.placeholders.clear();
            }
        }
        Ok(&self.sql)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// Clear the SQL and the placeholder map.
    pub fn reset(&mut self) {
        self.sql.clear();
        self.placeholders.clear();
    }

    fn allocate(&mut self, column: &str) -> String {
        let mut slot = 0;
        loop {
            let name = format!("{}_{}", prefix(slot), column);
            if !self.issued.contains(&name)
                && !self.reserved.contains(&name)
                && !self.placeholders.contains(&name)
            {
                self.issued.insert(name.clone());
                return name;
            }
            slot += 1;
        }
    }
}

/// Split `"<column> [operator]"` into the placeholder-safe column name and
/// whether an operator follows it.
fn split_key(key: &str) -> DbResult<(String, bool)> {
    let trimmed = key.trim();
    let end = trimmed
        .find(|c: char| c.is_whitespace() || matches!(c, '=' | '<' | '>' | '!'))
        .unwrap_or(trimmed.len());
    let column = &trimmed[..end];
    if column.is_empty() {
        return Err(DbError::ConditionCompile(format!(
            "condition key {key:?} does not start with a column name"
        )));
    }
    if !column
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.'))
    {
        return Err(DbError::ConditionCompile(format!(
            "condition key {key:?} has an invalid column name"
        )));
    }
    Ok((column.replace('.', "_"), end < trimmed.len()))
}

/// Letter prefix for a slot: `a`..`z`, then `aa`, `ab`, ...
fn prefix(slot: usize) -> String {
    let mut n = slot;
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'a' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}
