//! Auxiliary clause parameters: DISTINCT, GROUP BY, ORDER BY and LIMIT.

use crate::error::{DbError, DbResult};
use std::fmt;
use std::str::FromStr;

/// Row window requested by a query.
///
/// Parses from `"10"` (count) or `"20, 10"` (offset, count).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    Range { offset: u64, count: u64 },
}

impl Limit {
    pub fn range(offset: u64, count: u64) -> Self {
        Self::Range { offset, count }
    }

    pub fn count(&self) -> u64 {
        match self {
            Self::Count(count) | Self::Range { count, .. } => *count,
        }
    }

    pub fn offset(&self) -> u64 {
        match self {
            Self::Count(_) => 0,
            Self::Range { offset, .. } => *offset,
        }
    }
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Self::Count(count)
    }
}

impl From<u32> for Limit {
    fn from(count: u32) -> Self {
        Self::Count(u64::from(count))
    }
}

impl From<usize> for Limit {
    fn from(count: usize) -> Self {
        Self::Count(count as u64)
    }
}

/// Negative counts are treated as zero.
impl From<i32> for Limit {
    fn from(count: i32) -> Self {
        Self::Count(u64::try_from(count).unwrap_or(0))
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Self::Range { offset, count }
    }
}

impl FromStr for Limit {
    type Err = DbError;

    fn from_str(s: &str) -> DbResult<Self> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| DbError::invalid_parameter(format!("invalid limit: {s:?}")))
        };
        match s.split_once(',') {
            Some((offset, count)) => Ok(Self::Range {
                offset: parse(offset)?,
                count: parse(count)?,
            }),
            None => Ok(Self::Count(parse(s)?)),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Range { offset, count } => write!(f, "{offset},{count}"),
        }
    }
}

/// A dynamically named parameter value, see [`QueryParameters::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Clause parameters of a SELECT.
///
/// Set the fields directly or through the chaining setters. The string-keyed
/// [`set`](QueryParameters::set)/[`get`](QueryParameters::get) pair accepts
/// both `camelCase` and `snake_case` names and rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    pub select_distinct: bool,
    pub group_by: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<Limit>,
}

const NAMES: [&str; 4] = ["selectDistinct", "groupBy", "orderBy", "limit"];

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.select_distinct = distinct;
        self
    }

    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Set a parameter by name.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> DbResult<&mut Self> {
        let value = value.into();
        match canonical(name)? {
            "selectDistinct" => {
                self.select_distinct = match value {
                    ParamValue::Bool(b) => b,
                    ParamValue::Int(n) => n != 0,
                    ParamValue::Null => false,
                    ParamValue::Text(s) => {
                        return Err(DbError::invalid_parameter(format!(
                            "selectDistinct expects a boolean, got {s:?}"
                        )));
                    }
                };
            }
            "groupBy" => self.group_by = text_value(value),
            "orderBy" => self.order_by = text_value(value),
            _ => {
                self.limit = match value {
                    ParamValue::Null => None,
                    ParamValue::Int(n) => Some(Limit::Count(u64::try_from(n).map_err(|_| {
                        DbError::invalid_parameter(format!("invalid limit: {n}"))
                    })?)),
                    ParamValue::Text(s) if s.trim().is_empty() => None,
                    ParamValue::Text(s) => Some(s.parse()?),
                    ParamValue::Bool(_) => {
                        return Err(DbError::invalid_parameter("limit expects a count or \"offset,count\""));
                    }
                };
            }
        }
        Ok(self)
    }

    /// Read a parameter by name.
    pub fn get(&self, name: &str) -> DbResult<ParamValue> {
        Ok(match canonical(name)? {
            "selectDistinct" => ParamValue::Bool(self.select_distinct),
            "groupBy" => self.group_by.clone().into(),
            "orderBy" => self.order_by.clone().into(),
            _ => self.limit.map(|l| l.to_string()).into(),
        })
    }

    /// All parameters in declaration order.
    pub fn get_all(&self) -> Vec<(&'static str, ParamValue)> {
        NAMES
            .iter()
            .map(|name| (*name, self.get(name).unwrap_or(ParamValue::Null)))
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Overlay every parameter that is set in `other`.
    pub fn merge(&mut self, other: &QueryParameters) {
        self.select_distinct |= other.select_distinct;
        if other.group_by.is_some() {
            self.group_by.clone_from(&other.group_by);
        }
        if other.order_by.is_some() {
            self.order_by.clone_from(&other.order_by);
        }
        if other.limit.is_some() {
            self.limit = other.limit;
        }
    }
}

fn canonical(name: &str) -> DbResult<&'static str> {
    match name {
        "selectDistinct" | "select_distinct" | "distinct" => Ok("selectDistinct"),
        "groupBy" | "group_by" => Ok("groupBy"),
        "orderBy" | "order_by" => Ok("orderBy"),
        "limit" => Ok("limit"),
        other => Err(DbError::invalid_parameter(format!(
            "unknown parameter {other:?}; expected one of {}",
            NAMES.join(", ")
        ))),
    }
}

fn text_value(value: ParamValue) -> Option<String> {
    match value {
        ParamValue::Null => None,
        ParamValue::Bool(b) => Some(b.to_string()),
        ParamValue::Int(n) => Some(n.to_string()),
        ParamValue::Text(s) if s.trim().is_empty() => None,
        ParamValue::Text(s) => Some(s),
    }
}
