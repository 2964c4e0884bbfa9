//! Result rows and fetch shapes

use crate::value::{NULL, Value};
use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::SerializeMap;
use std::sync::Arc;

/// Shape of the records returned by a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Column-name addressable row, preserving column order.
    #[default]
    Object,
    /// Column name to value map, in select order.
    Assoc,
    /// Positional values.
    Num,
    /// First column only.
    Column,
}

/// One row produced by a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row. Missing trailing values are read back as NULL.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Value of a column by name. Lookup is exact first, then
    /// case-insensitive since some backends fold identifiers.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(column)))?;
        Some(self.values.get(idx).unwrap_or(&NULL))
    }

    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        if idx >= self.columns.len() {
            return None;
        }
        Some(self.values.get(idx).unwrap_or(&NULL))
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn into_map(self) -> IndexMap<String, Value> {
        let mut values = self.values.into_iter();
        self.columns
            .iter()
            .map(|c| (c.clone(), values.next().unwrap_or(Value::Null)))
            .collect()
    }

    /// Convert into the requested record shape.
    pub fn into_record(self, mode: FetchMode) -> Record {
        match mode {
            FetchMode::Object => Record::Object(self),
            FetchMode::Assoc => Record::Assoc(self.into_map()),
            FetchMode::Num => Record::Num(self.into_values()),
            FetchMode::Column => {
                Record::Column(self.values.into_iter().next().unwrap_or(Value::Null))
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (idx, column) in self.columns.iter().enumerate() {
            map.serialize_entry(column, self.values.get(idx).unwrap_or(&NULL))?;
        }
        map.end()
    }
}

/// A fetched record in one of the [`FetchMode`] shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Object(Row),
    Assoc(IndexMap<String, Value>),
    Num(Vec<Value>),
    Column(Value),
}

impl Record {
    /// Named access. Positional and single-column records have no names.
    pub fn get(&self, column: &str) -> Option<&Value> {
        match self {
            Self::Object(row) => row.get(column),
            Self::Assoc(map) => map.get(column),
            Self::Num(_) | Self::Column(_) => None,
        }
    }

    /// Positional access, in select order.
    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        match self {
            Self::Object(row) => row.get_index(idx),
            Self::Assoc(map) => map.get_index(idx).map(|(_, value)| value),
            Self::Num(values) => values.get(idx),
            Self::Column(value) => (idx == 0).then_some(value),
        }
    }

    /// First value of the record.
    pub fn first(&self) -> Option<&Value> {
        self.get_index(0)
    }

    pub fn into_row(self) -> Option<Row> {
        match self {
            Self::Object(row) => Some(row),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
