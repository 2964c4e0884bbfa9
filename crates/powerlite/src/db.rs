//! High-level database facade.
//!
//! [`Db`] wraps a [`QueryBuilder`] with one-call helpers for the common
//! operations: raw queries, SELECT shortcuts returning a row or a single
//! value, INSERT/UPDATE/DELETE returning the affected row count, schema
//! introspection and transaction control.
//!
//! ```ignore
//! use powerlite::{Condition, ConnectionConfig, Db, FetchMode, QueryParameters};
//!
//! let config = ConnectionConfig::from_env()?;
//! let mut db = Db::connect(&config, &my_connector)?;
//!
//! db.select("users", "id, name", Condition::new().eq("city", "Cardiff"), &QueryParameters::new().limit(10))?;
//! for user in db.fetch_all(FetchMode::Object)? {
//!     println!("{}", user.to_json());
//! }
//!
//! let id = db.insert("users", [("name", "Cathy"), ("city", "Cardiff")])?;
//! ```

use crate::builder::{ExecResult, QueryBuilder};
use crate::client::{Connection, Connector};
use crate::condition::Condition;
use crate::config::ConnectionConfig;
use crate::debug::{DebugEntry, DebugLog, DebugMode};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::params::{Limit, QueryParameters};
use crate::row::{FetchMode, Record};
use crate::value::{Placeholders, Value};
use std::collections::BTreeMap;

/// Default `select_count` column: `COUNT(*) AS rowsCount`.
pub const DEFAULT_COUNT: [(&str, &str); 1] = [("*", "rowsCount")];

/// Database facade over a [`QueryBuilder`].
#[derive(Debug)]
pub struct Db {
    qb: QueryBuilder,
    pending_debug: Option<DebugMode>,
}

impl Db {
    pub fn new(conn: Box<dyn Connection>, dialect: Box<dyn Dialect>) -> Self {
        Self {
            qb: QueryBuilder::new(conn, dialect),
            pending_debug: None,
        }
    }

    /// Open a connection for `config` and run the dialect's session setup.
    pub fn connect(config: &ConnectionConfig, connector: &dyn Connector) -> DbResult<Self> {
        let dialect = config.driver.dialect();
        let mut conn = connector.connect(config).map_err(|e| match e {
            DbError::Connection(msg) => DbError::Connection(msg),
            other => DbError::Connection(other.into_message()),
        })?;
        for statement in dialect.session_setup() {
            tracing::debug!(target: "powerlite.sql", driver = dialect.name(), "{statement}");
            conn.exec(statement)?;
        }
        tracing::debug!(
            target: "powerlite.sql",
            driver = dialect.name(),
            host = %config.host,
            database = %config.database,
            "connected"
        );
        Ok(Self::new(conn, dialect))
    }

    pub fn query_builder(&mut self) -> &mut QueryBuilder {
        &mut self.qb
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.qb.dialect()
    }

    /// Debug mode for the next operation only.
    pub fn debug_once(&mut self, mode: impl Into<DebugMode>) -> &mut Self {
        self.pending_debug = Some(mode.into());
        self
    }

    // ==================== Raw queries ====================

    /// Run a raw statement.
    pub fn query(&mut self, sql: &str, placeholders: Placeholders) -> DbResult<ExecResult> {
        self.qb.query(sql).placeholders(placeholders);
        self.run()
    }

    /// Run a raw statement and return its first record.
    pub fn query_row(
        &mut self,
        sql: &str,
        placeholders: Placeholders,
        mode: FetchMode,
    ) -> DbResult<Option<Record>> {
        self.query(sql, placeholders)?;
        self.qb.fetch(mode)
    }

    /// Run a raw statement and return the first value of its first record.
    pub fn query_value(&mut self, sql: &str, placeholders: Placeholders) -> DbResult<Option<Value>> {
        let record = self.query_row(sql, placeholders, FetchMode::Num)?;
        Ok(record.and_then(|r| r.first().cloned()))
    }

    // ==================== SELECT ====================

    /// Run a SELECT. `from` may embed joins.
    pub fn select(
        &mut self,
        from: &str,
        fields: impl AsRef<str>,
        condition: impl Into<Condition>,
        parameters: &QueryParameters,
    ) -> DbResult<ExecResult> {
        self.qb
            .select(fields)
            .from(from)
            .filter(condition)?
            .with_parameters(parameters);
        self.run()
    }

    /// Run a SELECT of `COUNT(<expr>) AS <alias>` columns and return the
    /// record. See [`DEFAULT_COUNT`].
    pub fn select_count(
        &mut self,
        from: &str,
        counts: &[(&str, &str)],
        condition: impl Into<Condition>,
        parameters: &QueryParameters,
    ) -> DbResult<Option<Record>> {
        let fields = counts
            .iter()
            .map(|(expr, alias)| format!("COUNT({expr}) AS {alias}"));
        self.qb
            .select_list(fields)
            .from(from)
            .filter(condition)?
            .with_parameters(parameters);
        self.run()?;
        self.qb.fetch(FetchMode::Object)
    }

    /// First record of a SELECT (`LIMIT 1` in the dialect's syntax).
    pub fn select_row(
        &mut self,
        from: &str,
        fields: impl AsRef<str>,
        condition: impl Into<Condition>,
        mode: FetchMode,
    ) -> DbResult<Option<Record>> {
        let parameters = QueryParameters::new().limit(Limit::Count(1));
        self.select(from, fields, condition, &parameters)?;
        self.qb.fetch(mode)
    }

    /// First value of the first record of a SELECT.
    pub fn select_value(
        &mut self,
        from: &str,
        field: &str,
        condition: impl Into<Condition>,
    ) -> DbResult<Option<Value>> {
        let record = self.select_row(from, field, condition, FetchMode::Num)?;
        Ok(record.and_then(|r| r.first().cloned()))
    }

    // ==================== Writes ====================

    /// Insert one record. Returns the affected row count.
    pub fn insert<I, K, V>(&mut self, table: &str, values: I) -> DbResult<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.qb.insert(table, values)?;
        Ok(self.run()?.affected())
    }

    /// Update the records matching `condition`. Returns the affected row count.
    pub fn update<I, K, V>(
        &mut self,
        table: &str,
        values: I,
        condition: impl Into<Condition>,
    ) -> DbResult<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.qb.update(table, values, condition)?;
        Ok(self.run()?.affected())
    }

    /// Delete the records matching `condition`. Returns the affected row count.
    pub fn delete(&mut self, table: &str, condition: impl Into<Condition>) -> DbResult<u64> {
        self.qb.delete(table, condition)?;
        Ok(self.run()?.affected())
    }

    // ==================== Results ====================

    pub fn fetch(&mut self, mode: FetchMode) -> DbResult<Option<Record>> {
        self.qb.fetch(mode)
    }

    pub fn fetch_all(&mut self, mode: FetchMode) -> DbResult<Vec<Record>> {
        self.qb.fetch_all(mode)
    }

    pub fn num_rows(&mut self) -> DbResult<u64> {
        self.qb.num_rows()
    }

    pub fn last_insert_id(&self) -> DbResult<Option<String>> {
        self.qb.last_insert_id()
    }

    pub fn maximum_value(&mut self, table: &str, field: &str) -> DbResult<Option<Value>> {
        self.qb.maximum_value(table, field)
    }

    // ==================== Introspection ====================

    /// Column descriptions of `table`, in the backend's own shape.
    pub fn columns(&mut self, table: &str, mode: FetchMode) -> DbResult<Vec<Record>> {
        let sql = self.qb.dialect().columns_sql(table);
        self.query(&sql, Placeholders::new())?;
        self.qb.fetch_all(mode)
    }

    /// Column names of `table`.
    pub fn column_names(&mut self, table: &str) -> DbResult<Vec<String>> {
        let field = self.qb.dialect().column_name_field();
        let columns = self.columns(table, FetchMode::Object)?;
        Ok(convert_to_simple_array(&columns, field)
            .into_iter()
            .map(|v| v.to_string())
            .collect())
    }

    /// Base tables of the current database.
    pub fn tables(&mut self) -> DbResult<Vec<String>> {
        let sql = self.qb.dialect().tables_sql();
        self.query(sql, Placeholders::new())?;
        Ok(self
            .qb
            .fetch_all(FetchMode::Column)?
            .iter()
            .filter_map(Record::first)
            .map(ToString::to_string)
            .collect())
    }

    // ==================== Transactions ====================

    pub fn transaction_begin(&mut self) -> DbResult<()> {
        self.qb.transaction_begin()
    }

    pub fn transaction_commit(&mut self) -> DbResult<()> {
        self.qb.transaction_commit()
    }

    pub fn transaction_rollback(&mut self) -> DbResult<()> {
        self.qb.transaction_rollback()
    }

    pub fn in_transaction(&self) -> bool {
        self.qb.in_transaction()
    }

    // ==================== Debug ====================

    pub fn set_debug(&mut self, mode: impl Into<DebugMode>) {
        self.qb.set_debug(mode);
    }

    pub fn debug_mode(&self) -> DebugMode {
        self.qb.debug_mode()
    }

    pub fn debug_log(&self) -> &DebugLog {
        self.qb.debug_log()
    }

    pub fn take_debug(&mut self) -> Vec<DebugEntry> {
        self.qb.take_debug()
    }

    fn run(&mut self) -> DbResult<ExecResult> {
        if let Some(mode) = self.pending_debug.take() {
            self.qb.debug_once(mode);
        }
        self.qb.execute()
    }
}

/// Values of `value_field` across `records`.
pub fn convert_to_simple_array(records: &[Record], value_field: &str) -> Vec<Value> {
    records
        .iter()
        .filter_map(|r| r.get(value_field).cloned())
        .collect()
}

/// Values of `value_field` keyed by the text of `key_field`.
pub fn convert_to_keyed_map(
    records: &[Record],
    value_field: &str,
    key_field: &str,
) -> BTreeMap<String, Value> {
    records
        .iter()
        .filter_map(|r| Some((r.get(key_field)?.to_string(), r.get(value_field)?.clone())))
        .collect()
}
