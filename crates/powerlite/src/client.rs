//! Database client capability.
//!
//! powerlite does not talk to a database by itself. Anything that implements
//! [`Connection`] (and hands out [`Statement`]s) can back a
//! [`QueryBuilder`](crate::QueryBuilder): a real driver adapter such as
//! [`PgConnection`](crate::PgConnection), or a scripted test double.

use crate::config::ConnectionConfig;
use crate::error::DbResult;
use crate::row::Row;
use crate::value::{ParamType, PlaceholderKey, Value};

/// A live database connection.
///
/// All calls block the current thread until the backend answers.
pub trait Connection {
    /// Prepare a statement. Named markers use the `:name` form, positional
    /// markers use `?`.
    fn prepare(&mut self, sql: &str) -> DbResult<Box<dyn Statement>>;

    /// Execute a statement without parameters and return the affected row
    /// count. Used for session setup.
    fn exec(&mut self, sql: &str) -> DbResult<u64>;

    fn begin_transaction(&mut self) -> DbResult<()>;

    fn commit(&mut self) -> DbResult<()>;

    fn rollback(&mut self) -> DbResult<()>;

    fn in_transaction(&self) -> bool;

    /// Identifier generated by the last INSERT, when the backend exposes one.
    fn last_insert_id(&mut self) -> DbResult<Option<String>> {
        Ok(None)
    }

    /// Toggle client-side auto-commit.
    ///
    /// The default implementation does nothing.
    fn set_autocommit(&mut self, enabled: bool) -> DbResult<()> {
        let _ = enabled;
        Ok(())
    }
}

/// A prepared statement and, once executed, its row stream.
pub trait Statement {
    /// SQL text this statement was prepared from.
    fn sql(&self) -> &str;

    /// Bind a value by name (without the leading `:`) or by 1-based position.
    fn bind_value(&mut self, key: &PlaceholderKey, value: &Value, ty: ParamType) -> DbResult<()>;

    /// Run the statement. Backend rejections are returned as errors.
    fn execute(&mut self) -> DbResult<()>;

    /// Next row of the result set, `None` once drained.
    fn fetch_next(&mut self) -> DbResult<Option<Row>>;

    /// Rows affected by the last execution.
    fn row_count(&self) -> u64;
}

/// Opens connections from a [`ConnectionConfig`].
pub trait Connector {
    fn connect(&self, config: &ConnectionConfig) -> DbResult<Box<dyn Connection>>;
}

impl<F> Connector for F
where
    F: Fn(&ConnectionConfig) -> DbResult<Box<dyn Connection>>,
{
    fn connect(&self, config: &ConnectionConfig) -> DbResult<Box<dyn Connection>> {
        self(config)
    }
}
