//! # powerlite
//!
//! A multi-dialect SQL query builder for MySQL, PostgreSQL, Oracle and
//! Firebird.
//!
//! ## Features
//!
//! - **One API, four dialects**: LIMIT windows, metadata queries and
//!   multi-table DELETE are rendered per backend
//! - **Structured conditions**: `Condition` values compile to a WHERE clause
//!   with generated, collision-free placeholders
//! - **Safe writes**: INSERT/UPDATE/DELETE run inside a transaction unless
//!   the statement commits implicitly, and roll back on failure
//! - **Debug capture**: record every statement with its substituted values
//!   and timing; writes executed in debug mode are rolled back
//! - **Pagination**: count, window and render Bootstrap navigation in one call
//! - **Bring your own client**: implement `Connection` for any driver
//!   (a blocking PostgreSQL adapter ships behind the `postgres` feature)
//!
//! ## Db
//!
//! ```ignore
//! use powerlite::{Condition, ConnectionConfig, Db, FetchMode, QueryParameters};
//!
//! let mut db = Db::connect(&ConnectionConfig::from_env()?, &connector)?;
//!
//! // SELECT
//! db.select(
//!     "users",
//!     "id, name",
//!     Condition::new().eq("status", "active").gt("age", 18),
//!     &QueryParameters::new().order_by("name").limit(10),
//! )?;
//! let users = db.fetch_all(FetchMode::Object)?;
//!
//! // INSERT
//! db.insert("users", [("name", "alice"), ("status", "active")])?;
//!
//! // UPDATE
//! db.update("users", [("status", "inactive")], Condition::new().eq("id", 42))?;
//!
//! // DELETE
//! db.delete("users", Condition::new().eq("id", 42))?;
//! ```
//!
//! ## Query builder
//!
//! ```ignore
//! let qb = db.query_builder();
//! qb.select("u.id, COUNT(o.id) AS orders")
//!     .from("users u LEFT JOIN orders o ON o.user_id = u.id")
//!     .filter(Condition::new().eq("u.city", "Cardiff"))?
//!     .group_by("u.id")
//!     .limit(Limit::range(20, 10));
//! println!("{}", qb.to_sql()?);
//! qb.execute()?;
//! ```

pub mod builder;
pub mod client;
pub mod condition;
pub mod config;
pub mod db;
pub mod debug;
pub mod dialect;
pub mod error;
pub mod pagination;
pub mod params;
pub mod result;
pub mod row;
pub mod sql;
pub mod transaction;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg_client;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{ExecResult, QueryBuilder};
pub use client::{Connection, Connector, Statement};
pub use condition::{Condition, ConditionEntry, Op};
pub use config::ConnectionConfig;
pub use db::{Db, convert_to_keyed_map, convert_to_simple_array};
pub use debug::{DebugEntry, DebugLog, DebugMode, StatementOutcome};
pub use dialect::{Dialect, DialectKind, LimitPlacement, dialect_for};
pub use error::{DbError, DbResult};
pub use pagination::{Pagination, PaginationOptions};
pub use params::{Limit, ParamValue, QueryParameters};
pub use result::ResultCursor;
pub use row::{FetchMode, Record, Row};
pub use sql::{QueryKind, WhereClause};
pub use transaction::TransactionScope;
pub use value::{ParamType, PlaceholderKey, Placeholders, Value};

#[cfg(feature = "postgres")]
pub use pg_client::{PgConnection, PgConnector};
