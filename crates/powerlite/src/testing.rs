//! Scripted in-memory connection for unit tests.

use crate::client::{Connection, Statement};
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::value::{ParamType, PlaceholderKey, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Prepare(String),
    Bind(PlaceholderKey, Value, ParamType),
    Execute(String),
    Exec(String),
    Begin,
    Commit,
    Rollback,
    LastInsertId,
    SetAutocommit(bool),
}

#[derive(Debug, Clone)]
enum Response {
    Rows(Arc<[String]>, Vec<Vec<Value>>),
    Affected(u64),
    Fail(String),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    responses: VecDeque<Response>,
    in_transaction: bool,
    last_insert_id: Option<String>,
}

/// Inspection and scripting handle shared with a [`MockConnection`].
#[derive(Debug, Clone)]
pub(crate) struct MockHandle(Rc<RefCell<State>>);

impl MockHandle {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    /// SQL of every executed statement, in order.
    pub fn executed(&self) -> Vec<String> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Execute(sql) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn binds(&self) -> Vec<(PlaceholderKey, Value, ParamType)> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Bind(k, v, t) => Some((k.clone(), v.clone(), *t)),
                _ => None,
            })
            .collect()
    }

    pub fn in_transaction(&self) -> bool {
        self.0.borrow().in_transaction
    }

    /// Script the next execution to return rows.
    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<Value>>) {
        let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
        self.0
            .borrow_mut()
            .responses
            .push_back(Response::Rows(columns, rows));
    }

    /// Script the next execution to affect `n` rows.
    pub fn push_affected(&self, n: u64) {
        self.0.borrow_mut().responses.push_back(Response::Affected(n));
    }

    /// Script the next execution to fail.
    pub fn push_error(&self, message: &str) {
        self.0
            .borrow_mut()
            .responses
            .push_back(Response::Fail(message.to_string()));
    }

    pub fn set_last_insert_id(&self, id: &str) {
        self.0.borrow_mut().last_insert_id = Some(id.to_string());
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }

    fn record(&self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }
}

pub(crate) struct MockConnection {
    handle: MockHandle,
}

impl MockConnection {
    pub fn new() -> (Self, MockHandle) {
        let handle = MockHandle(Rc::new(RefCell::new(State::default())));
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }
}

impl Connection for MockConnection {
    fn prepare(&mut self, sql: &str) -> DbResult<Box<dyn Statement>> {
        self.handle.record(Call::Prepare(sql.to_string()));
        Ok(Box::new(MockStatement {
            handle: self.handle.clone(),
            sql: sql.to_string(),
            rows: VecDeque::new(),
            row_count: 0,
        }))
    }

    fn exec(&mut self, sql: &str) -> DbResult<u64> {
        self.handle.record(Call::Exec(sql.to_string()));
        Ok(0)
    }

    fn begin_transaction(&mut self) -> DbResult<()> {
        self.handle.record(Call::Begin);
        let mut state = self.handle.0.borrow_mut();
        if state.in_transaction {
            return Err(DbError::driver("There is already an active transaction"));
        }
        state.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> DbResult<()> {
        self.handle.record(Call::Commit);
        self.handle.0.borrow_mut().in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> DbResult<()> {
        self.handle.record(Call::Rollback);
        self.handle.0.borrow_mut().in_transaction = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.handle.in_transaction()
    }

    fn last_insert_id(&mut self) -> DbResult<Option<String>> {
        self.handle.record(Call::LastInsertId);
        Ok(self.handle.0.borrow().last_insert_id.clone())
    }

    fn set_autocommit(&mut self, enabled: bool) -> DbResult<()> {
        self.handle.record(Call::SetAutocommit(enabled));
        Ok(())
    }
}

struct MockStatement {
    handle: MockHandle,
    sql: String,
    rows: VecDeque<Row>,
    row_count: u64,
}

impl Statement for MockStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn bind_value(&mut self, key: &PlaceholderKey, value: &Value, ty: ParamType) -> DbResult<()> {
        self.handle
            .record(Call::Bind(key.clone(), value.clone(), ty));
        Ok(())
    }

    fn execute(&mut self) -> DbResult<()> {
        self.handle.record(Call::Execute(self.sql.clone()));
        let response = self.handle.0.borrow_mut().responses.pop_front();
        match response {
            Some(Response::Rows(columns, rows)) => {
                self.row_count = rows.len() as u64;
                self.rows = rows
                    .into_iter()
                    .map(|values| Row::new(columns.clone(), values))
                    .collect();
            }
            Some(Response::Affected(n)) => self.row_count = n,
            Some(Response::Fail(message)) => return Err(DbError::driver(message)),
            None => {}
        }
        Ok(())
    }

    fn fetch_next(&mut self) -> DbResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }

    fn row_count(&self) -> u64 {
        self.row_count
    }
}
