//! Condition sets for WHERE clauses.
//!
//! A [`Condition`] is either a raw SQL fragment used verbatim, or an ordered
//! list of entries. Keyed entries carry a column with an optional embedded
//! operator (`"age >"`) and a value that will be bound; fragment entries are
//! inserted as-is.
//!
//! # Example
//! ```
//! use powerlite::{Condition, Op};
//!
//! let cond = Condition::new()
//!     .eq("status", "active")
//!     .op("age", Op::Gte, 18)
//!     .and("users.country", "FR")
//!     .fragment("deleted_at IS NULL");
//! assert_eq!(cond.len(), 4);
//! ```

use crate::value::Value;

/// Comparison operator embedded in a condition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

/// One entry of a condition list.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionEntry {
    /// `"<column> [operator]"` bound to a value.
    Keyed { key: String, value: Value },
    /// Raw SQL fragment, e.g. `"deleted_at IS NULL"`.
    Fragment(String),
}

/// A WHERE condition set.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// No condition.
    #[default]
    None,
    /// SQL text used verbatim after `WHERE`.
    Raw(String),
    /// Entries joined with `AND`.
    Entries(Vec<ConditionEntry>),
}

impl Condition {
    /// Start an empty entry list.
    pub fn new() -> Self {
        Self::Entries(Vec::new())
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Add a keyed entry. The key may embed its operator (`"price <"`);
    /// without one the entry renders as an equality.
    pub fn and(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(ConditionEntry::Keyed {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Add a keyed entry from a column and an explicit operator.
    pub fn op(self, column: impl AsRef<str>, op: Op, value: impl Into<Value>) -> Self {
        let column = column.as_ref().trim();
        match op {
            Op::Eq => self.and(column, value),
            _ => self.and(format!("{} {}", column, op.as_sql()), value),
        }
    }

    pub fn eq(self, column: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.op(column, Op::Eq, value)
    }

    pub fn ne(self, column: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.op(column, Op::Ne, value)
    }

    pub fn gt(self, column: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.op(column, Op::Gt, value)
    }

    pub fn gte(self, column: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.op(column, Op::Gte, value)
    }

    pub fn lt(self, column: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.op(column, Op::Lt, value)
    }

    pub fn lte(self, column: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.op(column, Op::Lte, value)
    }

    pub fn like(self, column: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.op(column, Op::Like, value)
    }

    pub fn not_like(self, column: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.op(column, Op::NotLike, value)
    }

    /// Add a raw SQL fragment entry.
    pub fn fragment(mut self, sql: impl Into<String>) -> Self {
        self.push(ConditionEntry::Fragment(sql.into()));
        self
    }

    /// Number of entries (a raw condition counts as one).
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Raw(sql) => usize::from(!sql.trim().is_empty()),
            Self::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, entry: ConditionEntry) {
        match self {
            Self::Entries(entries) => entries.push(entry),
            Self::None => *self = Self::Entries(vec![entry]),
            Self::Raw(sql) => {
                let mut entries = Vec::with_capacity(2);
                if !sql.trim().is_empty() {
                    entries.push(ConditionEntry::Fragment(std::mem::take(sql)));
                }
                entries.push(entry);
                *self = Self::Entries(entries);
            }
        }
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Self::Raw(sql.to_string())
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Self::Raw(sql)
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Condition {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |cond, (k, v)| cond.and(k, v))
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Condition {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |cond, (k, v)| cond.and(k, v))
    }
}

impl From<Vec<ConditionEntry>> for Condition {
    fn from(entries: Vec<ConditionEntry>) -> Self {
        Self::Entries(entries)
    }
}

impl From<Option<Condition>> for Condition {
    fn from(cond: Option<Condition>) -> Self {
        cond.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_helpers_embed_operator_in_key() {
        let cond = Condition::new().eq("id", 1).gte(" age ", 18).like("name", "a%");
        let Condition::Entries(entries) = cond else {
            panic!("expected entries");
        };
        let keys: Vec<_> = entries
            .iter()
            .map(|e| match e {
                ConditionEntry::Keyed { key, .. } => key.as_str(),
                ConditionEntry::Fragment(sql) => sql.as_str(),
            })
            .collect();
        assert_eq!(keys, vec!["id", "age >=", "name LIKE"]);
    }

    #[test]
    fn raw_condition_upgrades_to_entries() {
        let cond = Condition::raw("a = 1").and("b", 2);
        assert_eq!(
            cond,
            Condition::Entries(vec![
                ConditionEntry::Fragment("a = 1".into()),
                ConditionEntry::Keyed {
                    key: "b".into(),
                    value: Value::Int(2)
                },
            ])
        );
    }

    #[test]
    fn from_pairs_and_strings() {
        assert_eq!(Condition::from([("id", 3)]).len(), 1);
        assert!(Condition::from("  ").is_empty());
        assert!(Condition::None.is_empty());
    }
}
