//! Query builder and executor.
//!
//! A [`QueryBuilder`] owns one [`Connection`] and one [`Dialect`]. Every
//! composing call (`query`, `select`, `insert`, `update`, `delete`) starts a
//! fresh query descriptor: fields, table, values, WHERE clause, clause
//! parameters, placeholders and the previous cursor are all discarded.
//!
//! ```ignore
//! use powerlite::{Condition, FetchMode, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new(conn, powerlite::dialect_for("pgsql")?);
//! qb.select("id, name")
//!     .from("users")
//!     .filter(Condition::new().eq("status", "active"))?
//!     .order_by("name")
//!     .limit(10);
//! qb.execute()?;
//! while let Some(user) = qb.fetch(FetchMode::Object)? {
//!     println!("{:?}", user.get("name"));
//! }
//! ```

mod execute;
mod render;


pub use execute::ExecResult;

use crate::client::Connection;
use crate::condition::Condition;
use crate::debug::{DebugEntry, DebugLog, DebugMode};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::params::{Limit, ParamValue, QueryParameters};
use crate::result::ResultCursor;
use crate::row::{FetchMode, Record};
use crate::sql::{QueryKind, WhereClause};
use crate::value::{Placeholders, Value};

/// Composes, renders and executes one statement at a time.
pub struct QueryBuilder {
    conn: Box<dyn Connection>,
    dialect: Box<dyn Dialect>,

    // Query descriptor
    kind: Option<QueryKind>,
    raw_sql: String,
    fields: String,
    from: String,
    table: String,
    values: Vec<(String, Value)>,
    where_clause: WhereClause,
    parameters: QueryParameters,
    placeholders: Placeholders,

    // Execution state
    result: ResultCursor,
    query_string: String,
    last_affected: Option<u64>,
    last_insert_id: Option<String>,
    last_statement_inserted: bool,

    debug_mode: DebugMode,
    debug_once: Option<DebugMode>,
    debug_log: DebugLog,
}

impl QueryBuilder {
    pub fn new(conn: Box<dyn Connection>, dialect: Box<dyn Dialect>) -> Self {
        Self {
            conn,
            dialect,
            kind: None,
            raw_sql: String::new(),
            fields: String::new(),
            from: String::new(),
            table: String::new(),
            values: Vec::new(),
            where_clause: WhereClause::new(),
            parameters: QueryParameters::default(),
            placeholders: Placeholders::new(),
            result: ResultCursor::new(),
            query_string: String::new(),
            last_affected: None,
            last_insert_id: None,
            last_statement_inserted: false,
            debug_mode: DebugMode::Off,
            debug_once: None,
            debug_log: DebugLog::new(),
        }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn connection(&self) -> &dyn Connection {
        self.conn.as_ref()
    }

    pub fn connection_mut(&mut self) -> &mut dyn Connection {
        self.conn.as_mut()
    }

    // ==================== Composing ====================

    /// Start a raw statement. SELECT statements take the read path, anything
    /// else the write path.
    pub fn query(&mut self, sql: impl Into<String>) -> &mut Self {
        self.clear();
        self.kind = Some(QueryKind::Raw);
        self.raw_sql = sql.into();
        self
    }

    /// Start a SELECT with a column list such as `"id, name"`.
    pub fn select(&mut self, fields: impl AsRef<str>) -> &mut Self {
        self.clear();
        self.kind = Some(QueryKind::Select);
        self.fields = fields.as_ref().trim().to_string();
        self
    }

    /// Start a SELECT from separate column expressions.
    pub fn select_list<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<String> = fields
            .into_iter()
            .map(|f| f.as_ref().trim().to_string())
            .collect();
        self.select(fields.join(", "))
    }

    /// FROM expression, joins included.
    pub fn from(&mut self, from: impl AsRef<str>) -> &mut Self {
        self.from = from.as_ref().trim().to_string();
        self
    }

    /// Compile the WHERE clause of the current SELECT.
    pub fn filter(&mut self, condition: impl Into<Condition>) -> DbResult<&mut Self> {
        let condition = condition.into();
        self.where_clause.compile(&condition)?;
        self.placeholders.merge(self.where_clause.placeholders().clone());
        Ok(self)
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.parameters.select_distinct = true;
        self
    }

    pub fn group_by(&mut self, group_by: impl Into<String>) -> &mut Self {
        self.parameters.group_by = Some(group_by.into());
        self
    }

    pub fn order_by(&mut self, order_by: impl Into<String>) -> &mut Self {
        self.parameters.order_by = Some(order_by.into());
        self
    }

    pub fn limit(&mut self, limit: impl Into<Limit>) -> &mut Self {
        self.parameters.limit = Some(limit.into());
        self
    }

    /// Overlay clause parameters on the current descriptor.
    pub fn with_parameters(&mut self, parameters: &QueryParameters) -> &mut Self {
        self.parameters.merge(parameters);
        self
    }

    /// Set one clause parameter by name (`selectDistinct`, `groupBy`,
    /// `orderBy`, `limit`).
    pub fn parameter(&mut self, name: &str, value: impl Into<ParamValue>) -> DbResult<&mut Self> {
        self.parameters.set(name, value)?;
        Ok(self)
    }

    /// Add placeholder values for a raw statement.
    pub fn placeholders(&mut self, placeholders: Placeholders) -> &mut Self {
        self.placeholders.merge(placeholders);
        self
    }

    /// Start an INSERT. Fails before anything is sent when `values` is empty.
    pub fn insert<I, K, V>(&mut self, table: &str, values: I) -> DbResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let values = collect_values(table, values, "insert")?;
        self.clear();
        self.kind = Some(QueryKind::Insert);
        self.table = table.trim().to_string();
        for (column, value) in &values {
            self.placeholders.set(column.clone(), value.clone().normalized());
        }
        self.values = values;
        Ok(self)
    }

    /// Start an UPDATE of `values` on the rows matching `condition`.
    pub fn update<I, K, V>(
        &mut self,
        table: &str,
        values: I,
        condition: impl Into<Condition>,
    ) -> DbResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let values = collect_values(table, values, "update")?;
        self.clear();
        self.kind = Some(QueryKind::Update);
        self.table = table.trim().to_string();
        for (column, value) in &values {
            self.placeholders.set(column.clone(), value.clone().normalized());
        }
        self.where_clause
            .reserve(values.iter().map(|(column, _)| column.clone()));
        self.values = values;
        self.filter(condition)
    }

    /// Start a DELETE. `table` may embed a join, see [`Dialect::delete_sql`].
    pub fn delete(&mut self, table: &str, condition: impl Into<Condition>) -> DbResult<&mut Self> {
        self.clear();
        self.kind = Some(QueryKind::Delete);
        self.table = table.trim().to_string();
        self.filter(condition)
    }

    // ==================== Results ====================

    pub fn fetch(&mut self, mode: FetchMode) -> DbResult<Option<Record>> {
        self.result.fetch(mode)
    }

    pub fn fetch_all(&mut self, mode: FetchMode) -> DbResult<Vec<Record>> {
        self.result.fetch_all(mode)
    }

    // ==================== Debug ====================

    /// Debug mode for the current descriptor only. Reset by the next
    /// composing call.
    pub fn debug_once(&mut self, mode: impl Into<DebugMode>) -> &mut Self {
        self.debug_once = Some(mode.into());
        self
    }

    pub fn set_debug(&mut self, mode: impl Into<DebugMode>) {
        self.debug_mode = mode.into();
    }

    pub fn debug_mode(&self) -> DebugMode {
        self.debug_mode
    }

    pub fn debug_log(&self) -> &DebugLog {
        &self.debug_log
    }

    pub fn take_debug(&mut self) -> Vec<DebugEntry> {
        self.debug_log.take()
    }

    /// Mode in effect for the current descriptor.
    fn active_debug(&self) -> DebugMode {
        match self.debug_once {
            Some(mode) if mode.is_enabled() => mode,
            _ => self.debug_mode,
        }
    }

    // ==================== Accessors ====================

    pub fn kind(&self) -> Option<QueryKind> {
        self.kind
    }

    pub fn fields(&self) -> &str {
        &self.fields
    }

    pub fn from_expr(&self) -> &str {
        &self.from
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_sql
    }

    pub fn where_clause(&self) -> &WhereClause {
        &self.where_clause
    }

    pub fn parameters(&self) -> &QueryParameters {
        &self.parameters
    }

    pub fn bound_placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// SQL of the last executed statement.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn result(&self) -> &ResultCursor {
        &self.result
    }

    fn clear(&mut self) {
        self.kind = None;
        self.debug_once = None;
        self.raw_sql.clear();
        self.fields.clear();
        self.from.clear();
        self.table.clear();
        self.values.clear();
        self.where_clause = WhereClause::new();
        self.parameters.reset();
        self.placeholders.clear();
        self.result.reset();
    }
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("dialect", &self.dialect.name())
            .field("kind", &self.kind)
            .field("query_string", &self.query_string)
            .field("debug_mode", &self.debug_mode)
            .finish_non_exhaustive()
    }
}

/// Collect INSERT/UPDATE values, rejecting empty sets and column names that
/// cannot double as placeholder names.
fn collect_values<I, K, V>(table: &str, values: I, action: &str) -> DbResult<Vec<(String, Value)>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let values: Vec<(String, Value)> = values
        .into_iter()
        .map(|(k, v)| (k.into().trim().to_string(), v.into()))
        .collect();
    if values.is_empty() {
        return Err(DbError::validation(format!(
            "failed to {action} table {:?}: the set of values cannot be empty",
            table.trim()
        )));
    }
    if let Some((column, _)) = values.iter().find(|(column, _)| {
        column.is_empty()
            || !column
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }) {
        return Err(DbError::validation(format!(
            "failed to {action} table {:?}: invalid column name {column:?}",
            table.trim()
        )));
    }
    Ok(values)
}
