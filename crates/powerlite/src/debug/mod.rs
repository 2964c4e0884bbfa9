//! Debug capture.
//!
//! With a [`DebugMode`] other than `Off`, every statement run by a
//! [`QueryBuilder`](crate::QueryBuilder) is recorded in a [`DebugLog`] with
//! its interpolated SQL, bound values, timing and outcome. Writes executed
//! under debug are rolled back, and writes that cannot be rolled back are not
//! sent at all.

#[cfg(test)]
mod tests;

use crate::sql::{QueryKind, truncate_sql};
use crate::value::Placeholders;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Maximum SQL length written to `tracing` events.
pub(crate) const MAX_LOGGED_SQL: usize = 2048;

/// Maximum length for error messages kept in a [`DebugEntry`].
const MAX_ERROR_LEN: usize = 512;

/// Debug capture mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugMode {
    /// Production mode: nothing is captured.
    #[default]
    Off,
    /// Capture and emit each entry as an `info` event.
    On,
    /// Capture only; read entries back with [`QueryBuilder::debug_log`](crate::QueryBuilder::debug_log).
    Silent,
}

impl DebugMode {
    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }
}

impl From<bool> for DebugMode {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// What happened to a captured statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    /// Read path: a cursor is available.
    Rows,
    /// Write path: rows affected.
    Affected(u64),
    /// The statement was not sent because it could not be rolled back.
    NotSent,
    /// The backend rejected the statement (truncated to 512 characters).
    Error(String),
}

impl StatementOutcome {
    pub fn error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", truncate_sql(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }
}

impl fmt::Display for StatementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows => f.write_str("rows"),
            Self::Affected(n) => write!(f, "{n} affected"),
            Self::NotSent => f.write_str("not sent"),
            Self::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// One captured statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugEntry {
    pub kind: QueryKind,
    /// SQL with values substituted for display.
    pub sql: String,
    pub placeholders: Placeholders,
    pub elapsed: Option<Duration>,
    pub outcome: StatementOutcome,
    /// Whether the write was rolled back after running.
    pub rolled_back: bool,
}

impl fmt::Display for DebugEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.kind, self.sql)?;
        if !self.placeholders.is_empty() {
            let values: Vec<String> = self
                .placeholders
                .iter()
                .map(|(k, v)| format!("{k} => {}", v.to_sql_inline()))
                .collect();
            writeln!(f, "  params: {}", values.join(", "))?;
        }
        match self.elapsed {
            Some(elapsed) => write!(f, "  {elapsed:?} | {}", self.outcome)?,
            None => write!(f, "  {}", self.outcome)?,
        }
        if self.rolled_back {
            f.write_str(" | rolled back")?;
        }
        Ok(())
    }
}

/// Accumulated debug entries.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    entries: Vec<DebugEntry>,
}

impl DebugLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: DebugEntry, mode: DebugMode) {
        if mode == DebugMode::On {
            tracing::info!(
                target: "powerlite.sql",
                kind = %entry.kind,
                outcome = %entry.outcome,
                rolled_back = entry.rolled_back,
                "{}",
                truncate_sql(&entry.sql, MAX_LOGGED_SQL)
            );
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DebugEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&DebugEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return all entries.
    pub fn take(&mut self) -> Vec<DebugEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Plain-text rendering of every entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Emit the per-statement `tracing` event.
pub(crate) fn trace_statement(
    kind: QueryKind,
    sql: &str,
    elapsed: Duration,
    outcome: &StatementOutcome,
) {
    match outcome {
        StatementOutcome::Error(err) => tracing::debug!(
            target: "powerlite.sql",
            kind = %kind,
            elapsed_us = elapsed.as_micros() as u64,
            error = %err,
            "{}",
            truncate_sql(sql, MAX_LOGGED_SQL)
        ),
        _ => tracing::debug!(
            target: "powerlite.sql",
            kind = %kind,
            elapsed_us = elapsed.as_micros() as u64,
            outcome = %outcome,
            "{}",
            truncate_sql(sql, MAX_LOGGED_SQL)
        ),
    }
}
