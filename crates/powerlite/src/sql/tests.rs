use super::*;
use crate::condition::Condition;
use crate::error::DbError;
use crate::value::Value;
use chrono::NaiveDate;

#[test]
fn keyed_entries_render_equality_and_embedded_operators() {
    let mut w = WhereClause::new();
    let cond = Condition::new()
        .and("status", "active")
        .and("age >", 18)
        .and("name LIKE", "a%")
        .fragment("deleted_at IS NULL");
    let sql = w.compile(&cond).unwrap().to_string();

    assert_eq!(
        sql,
        " WHERE status = :a_status AND age > :a_age AND name LIKE :a_name AND deleted_at IS NULL"
    );
    assert_eq!(w.placeholders().get("a_age"), Some(&Value::Int(18)));
    assert_eq!(w.placeholders().len(), 3);
}

#[test]
fn same_column_twice_gets_next_prefix() {
    let mut w = WhereClause::new();
    let cond = Condition::new().and("price >=", 10).and("price <", 20);
    w.compile(&cond).unwrap();

    assert_eq!(w.sql(), " WHERE price >= :a_price AND price < :b_price");
    assert_eq!(w.placeholders().get("b_price"), Some(&Value::Int(20)));
}

#[test]
fn dotted_columns_use_underscores_in_names() {
    let mut w = WhereClause::new();
    w.compile(&Condition::from([("orders.customer_id", 5)])).unwrap();
    assert_eq!(w.sql(), " WHERE orders.customer_id = :a_orders_customer_id");
}

#[test]
fn null_and_empty_values_are_dropped() {
    let mut w = WhereClause::new();
    let cond = Condition::new()
        .and("a", Value::Null)
        .and("b", "")
        .and("c", 0)
        .and("d", false);
    w.compile(&cond).unwrap();

    assert_eq!(w.sql(), " WHERE c = :a_c AND d = :a_d");
    assert!(!w.placeholders().contains("a_a"));
    assert!(!w.placeholders().contains("a_b"));
}

#[test]
fn all_entries_dropped_yields_no_where() {
    let mut w = WhereClause::new();
    w.compile(&Condition::new().and("a", Value::Null)).unwrap();
    assert_eq!(w.sql(), "");
}

#[test]
fn raw_string_is_used_verbatim() {
    let mut w = WhereClause::new();
    w.compile(&Condition::from("  id IN (1, 2)  ")).unwrap();
    assert_eq!(w.sql(), " WHERE id IN (1, 2)");
    assert!(w.placeholders().is_empty());
}

#[test]
fn empty_condition_clears_everything() {
    let mut w = WhereClause::new();
    w.compile(&Condition::from([("id", 1)])).unwrap();
    w.compile(&Condition::None).unwrap();
    assert_eq!(w.sql(), "");
    assert!(w.placeholders().is_empty());
}

#[test]
fn datetime_values_are_recorded_as_text() {
    let at = NaiveDate::from_ymd_opt(2023, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 1))
        .unwrap();
    let mut w = WhereClause::new();
    w.compile(&Condition::new().and("created_at <", at)).unwrap();
    assert_eq!(
        w.placeholders().get("a_created_at"),
        Some(&Value::from("2023-12-31 23:59:01"))
    );
}

#[test]
fn compiling_again_without_reset_keeps_names_unique() {
    let mut w = WhereClause::new();
    let cond = Condition::from([("id", 1)]);
    w.compile(&cond).unwrap();
    w.compile(&cond).unwrap();

    assert_eq!(w.sql(), " WHERE id = :b_id");
    assert_eq!(w.placeholders().len(), 2);
}

#[test]
fn compiling_after_reset_never_reuses_a_name() {
    let mut w = WhereClause::new();
    let cond = Condition::new().and("id", 1).and("name", "x");

    w.compile(&cond).unwrap();
    let first: Vec<String> = w.placeholders().names().map(String::from).collect();
    w.reset();
    w.compile(&cond).unwrap();
    let second: Vec<String> = w.placeholders().names().map(String::from).collect();

    assert_eq!(second.len(), 2);
    assert!(second.iter().all(|n| !first.contains(n)));
}

#[test]
fn reserved_names_are_skipped() {
    let mut w = WhereClause::new();
    w.reserve(["a_id"]);
    w.compile(&Condition::from([("id", 1)])).unwrap();
    assert_eq!(w.sql(), " WHERE id = :b_id");
}

#[test]
fn malformed_keys_are_rejected() {
    let mut w = WhereClause::new();
    let err = w.compile(&Condition::from([(">= 5", 1)])).unwrap_err();
    assert!(matches!(err, DbError::ConditionCompile(_)));

    let err = w.compile(&Condition::from([("lower(name)", "x")])).unwrap_err();
    assert!(matches!(err, DbError::ConditionCompile(_)));
}

#[test]
fn raw_select_classification() {
    assert!(is_select("  select * from t"));
    assert!(is_select("/* report */ SELECT 1"));
    assert!(is_select("(SELECT a FROM t) UNION (SELECT a FROM u)"));
    assert!(is_select("WITH x AS (SELECT 1) SELECT * FROM x"));
    assert!(!is_select("WITH x AS (SELECT 1) DELETE FROM t"));
    assert!(!is_select("SHOW COLUMNS FROM t"));
    assert!(!is_select("selection_log"));
    assert!(!is_select("INSERT INTO t SELECT * FROM u"));
}

#[test]
fn auto_commit_statements() {
    assert!(is_auto_commit("CREATE TABLE t (id INT)"));
    assert!(is_auto_commit("drop index idx_a"));
    assert!(is_auto_commit("ALTER TABLE t ADD c INT"));
    assert!(is_auto_commit("TRUNCATE TABLE t"));
    assert!(is_auto_commit("LOCK TABLES t WRITE"));
    assert!(!is_auto_commit("UPDATE tables SET altered = 1"));
    assert!(!is_auto_commit("INSERT INTO t (created) VALUES (1)"));
}

#[test]
fn classification_ignores_keywords_inside_literals() {
    assert!(!is_auto_commit("UPDATE notes SET body = 'drop table x'"));
    assert!(!is_auto_commit("INSERT INTO log (msg) VALUES ('create table t')"));
    assert!(is_auto_commit("/* migrate */ CREATE UNIQUE INDEX idx_a ON t (a)"));
    assert!(!is_insert_like("UPDATE notes SET body = 'insert here'"));
    assert!(is_insert_like("insert into t (a) values (1)"));
    assert!(is_insert_like("WITH s AS (SELECT 1 AS a) INSERT INTO t (a) SELECT a FROM s"));
}

#[test]
fn interpolation_substitutes_longest_names_first() {
    let p = Placeholders::new()
        .with("a_id", 1)
        .with("a_id2", "O'Neil")
        .with("note", Value::Null);
    let sql = interpolate(
        "SELECT * FROM t WHERE id = :a_id AND id2 = :a_id2 AND n = :note AND s = ':a_id'",
        &p,
    );
    assert_eq!(
        sql,
        "SELECT * FROM t WHERE id = 1 AND id2 = 'O''Neil' AND n = NULL AND s = ':a_id'"
    );
}

#[test]
fn interpolation_fills_positional_markers_in_order() {
    let mut p = Placeholders::new();
    p.push(3);
    p.push("x");
    assert_eq!(
        interpolate("SELECT * FROM t WHERE a = ? AND b = ? AND c::text = ?", &p),
        "SELECT * FROM t WHERE a = 3 AND b = 'x' AND c::text = ?"
    );
}

#[test]
fn count_probe_rewrites_plain_selects() {
    assert_eq!(
        count_probe_sql("SELECT a,b FROM t WHERE x=:x ORDER BY a", None).as_deref(),
        Some("SELECT COUNT(a,b) AS row_count FROM t WHERE x=:x")
    );
    assert_eq!(
        count_probe_sql("SELECT DISTINCT city FROM users", None).as_deref(),
        Some("SELECT COUNT(DISTINCT city) AS row_count FROM users")
    );
    assert_eq!(
        count_probe_sql("SELECT id, name FROM users WHERE a = 1", Some("*")).as_deref(),
        Some("SELECT COUNT(*) AS row_count FROM users WHERE a = 1")
    );
}

#[test]
fn count_probe_skips_limited_or_grouped_selects() {
    assert_eq!(count_probe_sql("SELECT a FROM t LIMIT 5", None), None);
    assert_eq!(count_probe_sql("SELECT FIRST 5 a FROM t", None), None);
    assert_eq!(
        count_probe_sql("SELECT a FROM t OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY", None),
        None
    );
    assert_eq!(count_probe_sql("SELECT a, COUNT(*) FROM t GROUP BY a", None), None);
    assert_eq!(count_probe_sql("SHOW TABLES", None), None);
}

#[test]
fn count_probe_skips_aggregate_selects() {
    assert_eq!(count_probe_sql("SELECT SUM(total) AS s FROM orders", None), None);
    assert_eq!(count_probe_sql("SELECT MAX(id) FROM orders WHERE a = 1", Some("*")), None);
    assert_eq!(count_probe_sql("select count (*) from t", None), None);
}

#[test]
fn count_probe_keeps_first_name_columns() {
    assert_eq!(
        count_probe_sql("SELECT first_name FROM users", None).as_deref(),
        Some("SELECT COUNT(first_name) AS row_count FROM users")
    );
}

#[test]
fn truncation_respects_char_boundaries() {
    assert_eq!(truncate_sql("héllo", 2), "h");
    assert_eq!(truncate_sql("abc", 10), "abc");
}
