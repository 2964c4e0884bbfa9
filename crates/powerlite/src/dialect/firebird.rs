//! Firebird.

use super::{Dialect, DialectKind, LimitPlacement, exists_delete, quote_literal};
use crate::params::Limit;

#[derive(Debug, Clone, Copy, Default)]
pub struct Firebird;

const COLUMNS_SQL: &str = r"SELECT
    TRIM(R.RDB$FIELD_NAME) AS FIELD_NAME,
    TRIM(R.RDB$DEFAULT_VALUE) AS DEFAULT_VALUE,
    TRIM(R.RDB$NULL_FLAG) AS NULL_FLAG,
    TRIM(DECODE(R.RDB$IDENTITY_TYPE, 0, 'ALWAYS', 1, 'DEFAULT', 'UNKNOWN')) AS IDENTITY_TYPE,
    TRIM(F.RDB$FIELD_LENGTH / RCS.RDB$BYTES_PER_CHARACTER) AS FIELD_LENGTH,
    TRIM(F.RDB$FIELD_PRECISION) AS FIELD_PRECISION,
    TRIM(F.RDB$FIELD_SCALE) AS FIELD_SCALE,
    TRIM(CASE F.RDB$FIELD_TYPE
        WHEN 7 THEN 'SMALLINT'
        WHEN 8 THEN 'INTEGER'
        WHEN 10 THEN 'FLOAT'
        WHEN 12 THEN 'DATE'
        WHEN 13 THEN 'TIME'
        WHEN 14 THEN 'CHAR'
        WHEN 16 THEN 'BIGINT'
        WHEN 27 THEN 'DOUBLE'
        WHEN 35 THEN 'TIMESTAMP'
        WHEN 37 THEN 'VARCHAR'
        WHEN 261 THEN 'BLOB'
        ELSE 'UNKNOWN'
    END) AS FIELD_TYPE,
    TRIM(F.RDB$FIELD_SUB_TYPE) AS FIELD_SUB_TYPE
FROM RDB$FIELDS F
    LEFT JOIN RDB$RELATION_FIELDS R ON R.RDB$FIELD_SOURCE = F.RDB$FIELD_NAME
    LEFT JOIN RDB$CHARACTER_SETS RCS ON RCS.RDB$CHARACTER_SET_ID = F.RDB$CHARACTER_SET_ID
WHERE R.RDB$RELATION_NAME = ";

impl Dialect for Firebird {
    fn kind(&self) -> DialectKind {
        DialectKind::Firebird
    }

    /// `FIRST count ` or `FIRST count SKIP offset `, placed after `SELECT`.
    fn limit_clause(&self, limit: &Limit) -> String {
        match limit {
            Limit::Count(count) => format!("FIRST {count} "),
            Limit::Range { offset, count } => format!("FIRST {count} SKIP {offset} "),
        }
    }

    fn limit_placement(&self) -> LimitPlacement {
        LimitPlacement::AfterSelect
    }

    fn columns_sql(&self, table: &str) -> String {
        format!(
            "{COLUMNS_SQL}{} ORDER BY R.RDB$FIELD_POSITION",
            quote_literal(&table.to_uppercase())
        )
    }

    fn column_name_field(&self) -> &'static str {
        "FIELD_NAME"
    }

    fn tables_sql(&self) -> &'static str {
        "SELECT TRIM(RDB$RELATION_NAME) FROM RDB$RELATIONS WHERE RDB$VIEW_BLR IS NULL AND (RDB$SYSTEM_FLAG IS NULL OR RDB$SYSTEM_FLAG = 0)"
    }

    fn delete_sql(&self, table: &str, where_sql: &str) -> String {
        exists_delete(table, where_sql, "RDB$DB_KEY")
    }

    fn toggles_autocommit(&self) -> bool {
        true
    }
}
