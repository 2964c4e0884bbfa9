//! Value conversion between powerlite and the postgres wire types.

use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::value::{DATETIME_FORMAT, Value};
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres::types::{FromSql, IsNull, ToSql, Type};
use std::error::Error;
use std::sync::Arc;

/// A [`Value`] coerced to the type the server declared for its parameter.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum PgParam {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Text(String),
    Jsonb(String),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
}

impl ToSql for PgParam {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(v) => v.to_sql(ty, out),
            Self::Int2(v) => v.to_sql(ty, out),
            Self::Int4(v) => v.to_sql(ty, out),
            Self::Int8(v) => v.to_sql(ty, out),
            Self::Float4(v) => v.to_sql(ty, out),
            Self::Float8(v) => v.to_sql(ty, out),
            Self::Text(v) => {
                out.extend_from_slice(v.as_bytes());
                Ok(IsNull::No)
            }
            Self::Jsonb(v) => {
                // jsonb binary format version
                out.put_u8(1);
                out.extend_from_slice(v.as_bytes());
                Ok(IsNull::No)
            }
            Self::Timestamp(v) => v.to_sql(ty, out),
            Self::TimestampTz(v) => v.to_sql(ty, out),
            Self::Date(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    postgres::types::to_sql_checked!();
}

fn text_like(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN | Type::JSON
    )
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Coerce `value` to the declared parameter type `ty`.
pub(super) fn to_param(value: &Value, ty: &Type) -> DbResult<PgParam> {
    let mismatch = || DbError::invalid_parameter(format!("cannot bind {value} as {ty}"));
    if value.is_null() {
        return Ok(PgParam::Null);
    }

    let param = match *ty {
        Type::BOOL => match value {
            Value::Bool(b) => PgParam::Bool(*b),
            Value::Int(n) => PgParam::Bool(*n != 0),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "t" | "true" | "y" | "yes" | "on" => PgParam::Bool(true),
                "0" | "f" | "false" | "n" | "no" | "off" | "" => PgParam::Bool(false),
                _ => return Err(mismatch()),
            },
            _ => return Err(mismatch()),
        },
        Type::INT2 => {
            let n = value.as_i64().ok_or_else(mismatch)?;
            PgParam::Int2(i16::try_from(n).map_err(|_| mismatch())?)
        }
        Type::INT4 => {
            let n = value.as_i64().ok_or_else(mismatch)?;
            PgParam::Int4(i32::try_from(n).map_err(|_| mismatch())?)
        }
        Type::INT8 => PgParam::Int8(value.as_i64().ok_or_else(mismatch)?),
        Type::FLOAT4 => PgParam::Float4(value.as_f64().ok_or_else(mismatch)? as f32),
        Type::FLOAT8 => PgParam::Float8(value.as_f64().ok_or_else(mismatch)?),
        Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::DATE => {
            let dt = match value {
                Value::DateTime(dt) => *dt,
                Value::Text(s) => parse_datetime(s).ok_or_else(mismatch)?,
                _ => return Err(mismatch()),
            };
            match *ty {
                Type::TIMESTAMP => PgParam::Timestamp(dt),
                Type::TIMESTAMPTZ => PgParam::TimestampTz(dt.and_utc()),
                _ => PgParam::Date(dt.date()),
            }
        }
        Type::JSONB => PgParam::Jsonb(value.to_string()),
        ref other if text_like(other) => PgParam::Text(value.to_string()),
        _ => return Err(mismatch()),
    };
    Ok(param)
}

/// Raw text of textual and JSON columns.
struct RawText(String);

impl<'a> FromSql<'a> for RawText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let raw = if *ty == Type::JSONB {
            raw.split_first().map_or(raw, |(_, rest)| rest)
        } else {
            raw
        };
        Ok(Self(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        text_like(ty) || *ty == Type::JSONB
    }
}

fn get<'a, T: FromSql<'a>>(row: &'a postgres::Row, idx: usize) -> DbResult<Option<T>> {
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| DbError::driver(e.to_string()))
}

/// Read one column into a [`Value`].
fn read_value(row: &postgres::Row, idx: usize) -> DbResult<Value> {
    let column = &row.columns()[idx];
    let value = match *column.type_() {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, idx)?.map(|n| Value::Int(n.into())),
        Type::INT4 => get::<i32>(row, idx)?.map(|n| Value::Int(n.into())),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::Int),
        Type::OID => get::<u32>(row, idx)?.map(|n| Value::Int(n.into())),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|f| Value::Float(f.into())),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Value::Float),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?.map(Value::DateTime),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(|dt| Value::DateTime(dt.naive_utc())),
        Type::DATE => get::<NaiveDate>(row, idx)?.map(|d| Value::Text(d.format("%Y-%m-%d").to_string())),
        ref ty if RawText::accepts(ty) => get::<RawText>(row, idx)?.map(|t| Value::Text(t.0)),
        ref ty => {
            return Err(DbError::driver(format!(
                "column {} has unsupported type {ty}; cast it to text",
                column.name()
            )));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Materialize a postgres row.
pub(super) fn read_row(row: &postgres::Row, columns: &Arc<[String]>) -> DbResult<Row> {
    let values = (0..row.len())
        .map(|idx| read_value(row, idx))
        .collect::<DbResult<Vec<_>>>()?;
    Ok(Row::new(Arc::clone(columns), values))
}
