use super::QueryBuilder;
use super::render::no_query;
use crate::client::{Connection, Statement};
use crate::debug::{DebugEntry, StatementOutcome, trace_statement};
use crate::error::{DbError, DbResult};
use crate::row::FetchMode;
use crate::sql::{self, QueryKind};
use crate::transaction::TransactionScope;
use crate::value::{ParamType, Placeholders, Value};
use std::time::{Duration, Instant};

/// Outcome of [`QueryBuilder::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecResult {
    /// Read path: rows are ready to fetch.
    Rows,
    /// Write path: affected row count (0 when nothing changed or the
    /// statement was not sent).
    Affected(u64),
}

impl ExecResult {
    pub fn affected(self) -> u64 {
        match self {
            Self::Rows => 0,
            Self::Affected(n) => n,
        }
    }
}

struct WriteOutput {
    statement: Box<dyn Statement>,
    affected: u64,
    insert_id: Option<String>,
    rolled_back: bool,
}

impl QueryBuilder {
    /// Run the current descriptor.
    ///
    /// SELECT descriptors, and raw statements that read (`SELECT`, or `WITH`
    /// followed by a SELECT), take the read path. Everything else takes the
    /// write path.
    pub fn execute(&mut self) -> DbResult<ExecResult> {
        let reads = match self.kind {
            Some(QueryKind::Select) => true,
            Some(QueryKind::Raw) => sql::is_select(&self.raw_sql),
            Some(_) => false,
            None => return Err(no_query()),
        };
        if reads {
            self.execute_query()?;
            Ok(ExecResult::Rows)
        } else {
            self.execute_statement().map(ExecResult::Affected)
        }
    }

    /// Read path: prepare, bind, execute and keep the cursor. No transaction
    /// is opened.
    pub fn execute_query(&mut self) -> DbResult<()> {
        let kind = self.kind.ok_or_else(no_query)?;
        let sql = match kind {
            QueryKind::Raw => self.raw_sql.clone(),
            QueryKind::Select => self.select_sql(),
            other => {
                return Err(DbError::InvalidState(format!(
                    "{other} statements cannot take the read path"
                )));
            }
        };
        self.query_string.clone_from(&sql);
        self.last_affected = None;
        self.last_statement_inserted = false;

        let start = Instant::now();
        let run = prepare_bound(self.conn.as_mut(), &sql, &self.placeholders).and_then(|mut st| {
            st.execute()?;
            Ok(st)
        });
        let elapsed = start.elapsed();

        match run {
            Ok(statement) => {
                self.result.set(statement);
                self.record(kind, &sql, Some(elapsed), StatementOutcome::Rows, false);
                Ok(())
            }
            Err(err) => Err(self.fail(kind, &sql, elapsed, err)),
        }
    }

    /// Write path. Returns the affected row count.
    ///
    /// Unless a transaction is already open or the statement commits
    /// implicitly, the statement runs inside its own transaction, which is
    /// committed on success and rolled back on failure. Under debug capture
    /// the transaction is always rolled back, and a statement that could not
    /// be rolled back is not sent at all.
    pub fn execute_statement(&mut self) -> DbResult<u64> {
        let kind = self.kind.ok_or_else(no_query)?;
        let sql = match kind {
            QueryKind::Raw => self.raw_sql.clone(),
            QueryKind::Insert => self.insert_sql(),
            QueryKind::Update => self.update_sql(),
            QueryKind::Delete => self.delete_sql(),
            QueryKind::Select => {
                return Err(DbError::InvalidState(
                    "SELECT statements cannot take the write path".to_string(),
                ));
            }
        };
        self.query_string.clone_from(&sql);

        let debug = self.active_debug().is_enabled();
        let owned = !self.conn.in_transaction() && !sql::is_auto_commit(&sql);
        let inserts = kind == QueryKind::Insert || (kind == QueryKind::Raw && sql::is_insert_like(&sql));
        self.last_statement_inserted = inserts;
        self.last_insert_id = None;
        self.last_affected = Some(0);

        if debug && !owned {
            self.record(kind, &sql, None, StatementOutcome::NotSent, false);
            return Ok(0);
        }

        let capture_id = inserts && self.dialect.supports_last_insert_id();
        let start = Instant::now();
        let run = run_write(
            self.conn.as_mut(),
            &sql,
            &self.placeholders,
            owned,
            !debug,
            capture_id,
        );
        let elapsed = start.elapsed();

        match run {
            Ok(output) => {
                self.result.set(output.statement);
                if capture_id {
                    self.last_insert_id = output.insert_id;
                }
                self.last_affected = Some(output.affected);
                self.record(
                    kind,
                    &sql,
                    Some(elapsed),
                    StatementOutcome::Affected(output.affected),
                    output.rolled_back,
                );
                Ok(output.affected)
            }
            Err(err) => Err(self.fail(kind, &sql, elapsed, err)),
        }
    }

    /// Number of rows produced by the last statement.
    ///
    /// For a read, the statement is rewritten into a `COUNT` probe when its
    /// shape allows it, otherwise it is re-run and its rows are counted.
    /// For a write, the affected row count is returned.
    pub fn num_rows(&mut self) -> DbResult<u64> {
        if self.query_string.is_empty() {
            return Err(DbError::InvalidState(
                "num_rows() called before any query was executed".to_string(),
            ));
        }
        if let Some(affected) = self.last_affected {
            return Ok(affected);
        }

        let kind = self.kind.unwrap_or(QueryKind::Raw);
        let sql = self.query_string.clone();

        if let Some(probe) = sql::count_probe_sql(&sql, self.count_expr().as_deref()) {
            let start = Instant::now();
            let run = prepare_bound(self.conn.as_mut(), &probe, &self.placeholders).and_then(|mut st| {
                st.execute()?;
                st.fetch_next()
            });
            let elapsed = start.elapsed();
            match run {
                Ok(row) => {
                    let count = row.and_then(|row| {
                        row.get("row_count")
                            .or_else(|| row.get_index(0))
                            .and_then(Value::as_i64)
                    });
                    self.record(kind, &probe, Some(elapsed), StatementOutcome::Rows, false);
                    if let Some(count) = count {
                        return Ok(u64::try_from(count).unwrap_or(0));
                    }
                }
                Err(err) => {
                    tracing::debug!(
                        target: "powerlite.sql",
                        error = %err,
                        "row count probe failed, counting rows instead"
                    );
                }
            }
        }

        let start = Instant::now();
        let run = prepare_bound(self.conn.as_mut(), &sql, &self.placeholders).and_then(|mut st| {
            st.execute()?;
            let mut count: u64 = 0;
            while st.fetch_next()?.is_some() {
                count += 1;
            }
            Ok(count)
        });
        let elapsed = start.elapsed();
        match run {
            Ok(count) => {
                self.record(kind, &sql, Some(elapsed), StatementOutcome::Rows, false);
                Ok(count)
            }
            Err(err) => Err(self.fail(kind, &sql, elapsed, err)),
        }
    }

    /// Identifier generated by the last INSERT.
    ///
    /// Fails with a capability error on backends without the feature (use
    /// [`maximum_value`](QueryBuilder::maximum_value) there), and with a
    /// state error when the last statement was not an INSERT.
    pub fn last_insert_id(&self) -> DbResult<Option<String>> {
        if !self.dialect.supports_last_insert_id() {
            return Err(DbError::Capability(format!(
                "the {} driver does not support last_insert_id(); use maximum_value(table, field) instead",
                self.dialect.name()
            )));
        }
        if !self.last_statement_inserted {
            return Err(DbError::InvalidState(
                "last_insert_id() can only be called after an INSERT query".to_string(),
            ));
        }
        Ok(self.last_insert_id.clone())
    }

    /// Largest value of `field` in `table`, `None` when the table is empty.
    pub fn maximum_value(&mut self, table: &str, field: &str) -> DbResult<Option<Value>> {
        self.select(field)
            .from(table)
            .order_by(format!("{field} DESC"))
            .limit(1u64);
        self.execute_query()?;
        let record = self.fetch(FetchMode::Object)?;
        Ok(record.and_then(|r| r.get(field).or_else(|| r.first()).cloned()))
    }

    // ==================== Transactions ====================

    pub fn transaction_begin(&mut self) -> DbResult<()> {
        if self.dialect.toggles_autocommit() {
            self.conn.set_autocommit(false)?;
        }
        self.conn.begin_transaction()
    }

    pub fn transaction_commit(&mut self) -> DbResult<()> {
        self.conn.commit()?;
        if self.dialect.toggles_autocommit() {
            self.conn.set_autocommit(true)?;
        }
        Ok(())
    }

    pub fn transaction_rollback(&mut self) -> DbResult<()> {
        self.conn.rollback()?;
        if self.dialect.toggles_autocommit() {
            self.conn.set_autocommit(true)?;
        }
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        self.conn.in_transaction()
    }

    // ==================== Capture ====================

    fn record(
        &mut self,
        kind: QueryKind,
        sql: &str,
        elapsed: Option<Duration>,
        outcome: StatementOutcome,
        rolled_back: bool,
    ) {
        if let Some(elapsed) = elapsed {
            trace_statement(kind, sql, elapsed, &outcome);
        }
        let mode = self.active_debug();
        if mode.is_enabled() {
            let entry = DebugEntry {
                kind,
                sql: sql::interpolate(sql, &self.placeholders),
                placeholders: self.placeholders.clone(),
                elapsed,
                outcome,
                rolled_back,
            };
            self.debug_log.push(entry, mode);
        }
    }

    /// Record a failed statement and wrap the error with the rendered SQL.
    fn fail(&mut self, kind: QueryKind, sql: &str, elapsed: Duration, err: DbError) -> DbError {
        let message = err.into_message();
        self.record(
            kind,
            sql,
            Some(elapsed),
            StatementOutcome::error(message.clone()),
            false,
        );
        DbError::execution(message, sql::interpolate(sql, &self.placeholders))
    }
}

fn prepare_bound(
    conn: &mut dyn Connection,
    sql: &str,
    placeholders: &Placeholders,
) -> DbResult<Box<dyn Statement>> {
    let mut statement = conn.prepare(sql)?;
    for (key, value) in placeholders.iter() {
        statement.bind_value(key, value, ParamType::of(value))?;
    }
    Ok(statement)
}

/// Run one write statement inside a [`TransactionScope`]. Any early return
/// rolls the owned transaction back when the scope drops.
fn run_write(
    conn: &mut dyn Connection,
    sql: &str,
    placeholders: &Placeholders,
    owned: bool,
    keep: bool,
    capture_id: bool,
) -> DbResult<WriteOutput> {
    let mut scope = TransactionScope::enter(conn, owned)?;
    let mut statement = prepare_bound(scope.conn(), sql, placeholders)?;
    statement.execute()?;
    let affected = statement.row_count();
    let insert_id = if capture_id {
        scope.conn().last_insert_id()?
    } else {
        None
    };

    let rolled_back = !keep && scope.owns_transaction();
    if keep {
        scope.commit()?;
    } else {
        scope.rollback()?;
    }
    Ok(WriteOutput {
        statement,
        affected,
        insert_id,
        rolled_back,
    })
}
