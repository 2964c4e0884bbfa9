//! Statement-scoped transactions.
//!
//! The write path of [`QueryBuilder`](crate::QueryBuilder) wraps each
//! statement in a [`TransactionScope`]. A scope that owns a transaction and
//! is dropped without [`commit`](TransactionScope::commit) or
//! [`rollback`](TransactionScope::rollback) rolls it back, so an early `?`
//! return can never leave the connection inside a half-finished transaction.

use crate::client::Connection;
use crate::error::DbResult;

/// Guard around one statement's transaction.
pub struct TransactionScope<'c> {
    conn: &'c mut dyn Connection,
    owned: bool,
}

impl<'c> TransactionScope<'c> {
    /// Begin a transaction when `owned` is true, otherwise borrow the
    /// connection as-is (caller-owned transaction or auto-commit statement).
    pub fn enter(conn: &'c mut dyn Connection, owned: bool) -> DbResult<Self> {
        if owned {
            conn.begin_transaction()?;
        }
        Ok(Self { conn, owned })
    }

    /// Whether this scope began the transaction it guards.
    pub fn owns_transaction(&self) -> bool {
        self.owned
    }

    pub fn conn(&mut self) -> &mut dyn Connection {
        &mut *self.conn
    }

    /// Commit an owned transaction. A failed commit still rolls back on drop.
    pub fn commit(mut self) -> DbResult<()> {
        if self.owned {
            self.conn.commit()?;
            self.owned = false;
        }
        Ok(())
    }

    pub fn rollback(mut self) -> DbResult<()> {
        if std::mem::take(&mut self.owned) {
            self.conn.rollback()?;
        }
        Ok(())
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if self.owned {
            if let Err(e) = self.conn.rollback() {
                tracing::warn!(target: "powerlite.sql", error = %e, "rollback failed");
            } else {
                tracing::warn!(target: "powerlite.sql", "transaction rolled back on early exit");
            }
        }
    }
}
