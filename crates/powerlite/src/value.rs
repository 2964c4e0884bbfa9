//! Bindable values and placeholder maps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;
use std::fmt;

/// Format used when a date/time value is recorded as a placeholder.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) static NULL: Value = Value::Null;

/// A value that can be bound to a placeholder or read back from a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

/// Wire type hint passed to [`Statement::bind_value`](crate::Statement::bind_value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Bool,
    Null,
    Str,
}

impl ParamType {
    /// Infer the wire type of a value. Anything that is not an integer,
    /// boolean or NULL travels as a string.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Int(_) => Self::Int,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
            _ => Self::Str,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// NULL and the empty string are dropped from condition sets.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value. Numeric text (as returned by some drivers
    /// for `COUNT(*)`) is parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Date/time values become `YYYY-MM-DD HH:MM:SS` text; everything else
    /// is returned unchanged.
    pub fn normalized(self) -> Self {
        match self {
            Self::DateTime(dt) => Self::Text(dt.format(DATETIME_FORMAT).to_string()),
            other => other,
        }
    }

    /// SQL literal used when rendering a statement for humans.
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::DateTime(dt) => format!("'{}'", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::Int(i64::from(v))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Self::DateTime(v.naive_local())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Key of a bound value: a `:name` marker or a 1-based `?` position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderKey {
    Named(String),
    Position(usize),
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, ":{name}"),
            Self::Position(pos) => write!(f, "?{pos}"),
        }
    }
}

/// Ordered placeholder map.
///
/// Named keys are unique: setting an existing name replaces its value in
/// place. Positional entries are numbered in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders {
    entries: Vec<(PlaceholderKey, Value)>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chaining form of [`Placeholders::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a named placeholder. A leading `:` is accepted and ignored.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let name = name.strip_prefix(':').map(str::to_string).unwrap_or(name);
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| matches!(k, PlaceholderKey::Named(n) if *n == name))
        {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((PlaceholderKey::Named(name), value)),
        }
    }

    /// Append a positional placeholder.
    pub fn push(&mut self, value: impl Into<Value>) {
        let position = self.positional_count() + 1;
        self.entries
            .push((PlaceholderKey::Position(position), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = name.strip_prefix(':').unwrap_or(name);
        self.entries.iter().find_map(|(k, v)| match k {
            PlaceholderKey::Named(n) if n == name => Some(v),
            _ => None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlaceholderKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Names of all named placeholders, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(k, _)| match k {
            PlaceholderKey::Named(n) => Some(n.as_str()),
            PlaceholderKey::Position(_) => None,
        })
    }

    /// Merge another map into this one: named keys overwrite, positional
    /// entries are appended and renumbered.
    pub fn merge(&mut self, other: Placeholders) {
        for (key, value) in other.entries {
            match key {
                PlaceholderKey::Named(name) => self.set(name, value),
                PlaceholderKey::Position(_) => self.push(value),
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn positional_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| matches!(k, PlaceholderKey::Position(_)))
            .count()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Placeholders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut placeholders = Self::new();
        for (k, v) in iter {
            placeholders.set(k, v);
        }
        placeholders
    }
}
