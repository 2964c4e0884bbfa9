//! Cursor over the rows of the last executed statement.

use crate::client::Statement;
use crate::error::{DbError, DbResult};
use crate::row::{FetchMode, Record};

/// Holds at most one executed statement.
///
/// Setting a new statement or calling [`reset`](ResultCursor::reset) drops
/// the previous one without notifying the backend.
#[derive(Default)]
pub struct ResultCursor {
    statement: Option<Box<dyn Statement>>,
}

impl ResultCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, statement: Box<dyn Statement>) {
        self.statement = Some(statement);
    }

    pub fn reset(&mut self) {
        self.statement = None;
    }

    pub fn is_active(&self) -> bool {
        self.statement.is_some()
    }

    /// Next record, `None` once the rows are drained.
    pub fn fetch(&mut self, mode: FetchMode) -> DbResult<Option<Record>> {
        let statement = self.statement_mut()?;
        Ok(statement.fetch_next()?.map(|row| row.into_record(mode)))
    }

    /// All remaining records.
    pub fn fetch_all(&mut self, mode: FetchMode) -> DbResult<Vec<Record>> {
        let statement = self.statement_mut()?;
        let mut records = Vec::new();
        while let Some(row) = statement.fetch_next()? {
            records.push(row.into_record(mode));
        }
        Ok(records)
    }

    /// Drain the remaining rows and return how many there were.
    pub fn count_remaining(&mut self) -> DbResult<u64> {
        let statement = self.statement_mut()?;
        let mut count = 0;
        while statement.fetch_next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    fn statement_mut(&mut self) -> DbResult<&mut Box<dyn Statement>> {
        self.statement
            .as_mut()
            .ok_or_else(|| DbError::InvalidState("no statement has been executed".to_string()))
    }
}

impl std::fmt::Debug for ResultCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCursor")
            .field("sql", &self.statement.as_ref().map(|s| s.sql().to_string()))
            .finish()
    }
}
