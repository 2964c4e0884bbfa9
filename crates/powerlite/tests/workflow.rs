//! End-to-end flows through the public API against a scripted connection.

use powerlite::{
    Condition, Connection, ConnectionConfig, Db, DbError, DbResult, DebugMode, DialectKind,
    FetchMode, Pagination, PaginationOptions, ParamType, PlaceholderKey, QueryParameters, Row,
    Statement, StatementOutcome, Value,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

enum Reply {
    Rows(Vec<&'static str>, Vec<Vec<Value>>),
    Affected(u64),
    Fail(&'static str),
}

#[derive(Default)]
struct Backend {
    log: Vec<String>,
    replies: VecDeque<Reply>,
    in_transaction: bool,
}

#[derive(Clone, Default)]
struct Script(Rc<RefCell<Backend>>);

impl Script {
    fn reply(&self, reply: Reply) -> &Self {
        self.0.borrow_mut().replies.push_back(reply);
        self
    }

    fn log(&self) -> Vec<String> {
        self.0.borrow().log.clone()
    }

    fn connection(&self) -> Box<dyn Connection> {
        Box::new(ScriptedConnection(self.clone()))
    }

    fn db(&self, driver: DialectKind) -> Db {
        Db::new(self.connection(), driver.dialect())
    }
}

struct ScriptedConnection(Script);

impl Connection for ScriptedConnection {
    fn prepare(&mut self, sql: &str) -> DbResult<Box<dyn Statement>> {
        Ok(Box::new(ScriptedStatement {
            backend: self.0.clone(),
            sql: sql.to_string(),
            rows: VecDeque::new(),
            affected: 0,
        }))
    }

    fn exec(&mut self, sql: &str) -> DbResult<u64> {
        self.0 .0.borrow_mut().log.push(sql.to_string());
        Ok(0)
    }

    fn begin_transaction(&mut self) -> DbResult<()> {
        let mut backend = self.0 .0.borrow_mut();
        backend.in_transaction = true;
        backend.log.push("BEGIN".to_string());
        Ok(())
    }

    fn commit(&mut self) -> DbResult<()> {
        let mut backend = self.0 .0.borrow_mut();
        backend.in_transaction = false;
        backend.log.push("COMMIT".to_string());
        Ok(())
    }

    fn rollback(&mut self) -> DbResult<()> {
        let mut backend = self.0 .0.borrow_mut();
        backend.in_transaction = false;
        backend.log.push("ROLLBACK".to_string());
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.0 .0.borrow().in_transaction
    }
}

struct ScriptedStatement {
    backend: Script,
    sql: String,
    rows: VecDeque<Row>,
    affected: u64,
}

impl Statement for ScriptedStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn bind_value(&mut self, _key: &PlaceholderKey, _value: &Value, _ty: ParamType) -> DbResult<()> {
        Ok(())
    }

    fn execute(&mut self) -> DbResult<()> {
        let mut backend = self.backend.0.borrow_mut();
        backend.log.push(self.sql.clone());
        match backend.replies.pop_front() {
            Some(Reply::Rows(columns, rows)) => {
                let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
                self.rows = rows
                    .into_iter()
                    .map(|values| Row::new(Arc::clone(&columns), values))
                    .collect();
                self.affected = self.rows.len() as u64;
            }
            Some(Reply::Affected(n)) => self.affected = n,
            Some(Reply::Fail(msg)) => return Err(DbError::driver(msg)),
            None => {}
        }
        Ok(())
    }

    fn fetch_next(&mut self) -> DbResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }

    fn row_count(&self) -> u64 {
        self.affected
    }
}

#[test]
fn connect_runs_session_setup() {
    let script = Script::default();
    let connector = {
        let script = script.clone();
        move |_: &ConnectionConfig| -> DbResult<Box<dyn Connection>> { Ok(script.connection()) }
    };
    let config = ConnectionConfig::new(DialectKind::Oracle).database("XEPDB1");

    let db = Db::connect(&config, &connector).unwrap();
    assert_eq!(db.dialect().kind(), DialectKind::Oracle);
    assert_eq!(
        script.log(),
        vec!["ALTER SESSION SET NLS_DATE_FORMAT = 'YYYY-MM-DD'"]
    );
}

#[test]
fn connector_failures_are_connection_errors() {
    let connector = |_: &ConnectionConfig| -> DbResult<Box<dyn Connection>> {
        Err(DbError::driver("host unreachable"))
    };
    let err = Db::connect(&ConnectionConfig::new(DialectKind::MySql), &connector).unwrap_err();
    assert!(matches!(err, DbError::Connection(ref msg) if msg == "host unreachable"));
}

#[test]
fn writes_are_wrapped_in_a_transaction() {
    let script = Script::default();
    script.reply(Reply::Affected(1));
    let mut db = script.db(DialectKind::MySql);

    let affected = db
        .insert("users", [("name", "Cathy"), ("city", "Cardiff")])
        .unwrap();

    assert_eq!(affected, 1);
    assert_eq!(
        script.log(),
        vec![
            "BEGIN",
            "INSERT INTO users (name, city) VALUES (:name, :city)",
            "COMMIT"
        ]
    );
}

#[test]
fn failed_write_rolls_back_and_reports_the_statement() {
    let script = Script::default();
    script.reply(Reply::Fail("duplicate key"));
    let mut db = script.db(DialectKind::Postgres);

    let err = db
        .update("users", [("email", "a@b.c")], Condition::new().eq("id", 7))
        .unwrap_err();

    assert!(err.is_execution());
    assert!(err.to_string().contains("duplicate key"));
    assert!(err.sql().unwrap().contains("'a@b.c'"));
    assert_eq!(script.log().last().map(String::as_str), Some("ROLLBACK"));
    assert!(!db.in_transaction());
}

#[test]
fn ddl_runs_outside_a_transaction() {
    let script = Script::default();
    let mut db = script.db(DialectKind::MySql);
    db.query("CREATE TABLE audit (id INT)", Default::default())
        .unwrap();
    assert_eq!(script.log(), vec!["CREATE TABLE audit (id INT)"]);
}

#[test]
fn caller_transaction_spans_several_writes() {
    let script = Script::default();
    script.reply(Reply::Affected(1)).reply(Reply::Affected(2));
    let mut db = script.db(DialectKind::MySql);

    db.transaction_begin().unwrap();
    db.insert("orders", [("user_id", 1)]).unwrap();
    db.delete("carts", Condition::new().eq("user_id", 1)).unwrap();
    db.transaction_commit().unwrap();

    let log = script.log();
    assert_eq!(log.first().map(String::as_str), Some("BEGIN"));
    assert_eq!(log.last().map(String::as_str), Some("COMMIT"));
    assert_eq!(log.iter().filter(|s| *s == "BEGIN").count(), 1);
}

#[test]
fn debug_mode_rolls_writes_back() {
    let script = Script::default();
    script.reply(Reply::Affected(3));
    let mut db = script.db(DialectKind::MySql);
    db.set_debug(DebugMode::Silent);

    let affected = db
        .update("users", [("active", false)], Condition::new().eq("city", "Leeds"))
        .unwrap();

    assert_eq!(affected, 3);
    assert_eq!(script.log().last().map(String::as_str), Some("ROLLBACK"));
    let entries = db.take_debug();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].outcome, StatementOutcome::Affected(3));
    assert!(entries[0].rolled_back);
    assert!(entries[0].sql.contains("'Leeds'"));
}

#[test]
fn select_row_and_value() {
    let script = Script::default();
    script
        .reply(Reply::Rows(
            vec!["id", "name"],
            vec![vec![Value::Int(4), Value::from("Dan")]],
        ))
        .reply(Reply::Rows(vec!["name"], vec![vec![Value::from("Eve")]]));
    let mut db = script.db(DialectKind::Postgres);

    let row = db
        .select_row("users", "id, name", Condition::new().eq("id", 4), FetchMode::Object)
        .unwrap()
        .unwrap();
    assert_eq!(row.get("name"), Some(&Value::from("Dan")));

    let name = db
        .select_value("users", "name", Condition::new().eq("id", 5))
        .unwrap();
    assert_eq!(name, Some(Value::from("Eve")));
    assert_eq!(
        script.log()[0],
        "SELECT id, name FROM users WHERE id = :a_id LIMIT 1"
    );
}

#[test]
fn paginated_listing() {
    let script = Script::default();
    let page: Vec<Vec<Value>> = (21..=30).map(|id| vec![Value::Int(id)]).collect();
    script
        .reply(Reply::Rows(vec!["rowsCount"], vec![vec![Value::Int(95)]]))
        .reply(Reply::Rows(vec!["id"], page.clone()))
        .reply(Reply::Rows(vec!["id"], page));

    let mut pages = Pagination::new(
        script.db(DialectKind::Oracle),
        PaginationOptions::default(),
        10,
    );
    pages
        .select(
            "users",
            "id",
            Condition::new().eq("active", 1),
            &QueryParameters::new().order_by("id"),
            Some(3),
        )
        .unwrap();

    assert_eq!(pages.number_of_pages(), 10);
    assert_eq!(pages.current_page(), 3);
    assert_eq!(pages.current_number_of_records(), 10);
    assert_eq!(
        script.log()[1],
        "SELECT id FROM users WHERE active = :a_active ORDER BY id OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );

    let first = pages.fetch(FetchMode::Object).unwrap().unwrap();
    assert_eq!(first.get("id"), Some(&Value::Int(21)));

    let nav = pages.pagine("/users?p=3");
    assert!(nav.contains(r#"href="/users?p=4">4</a>"#));
    assert!(nav.contains("results 21 to 30 of 95"));
}
