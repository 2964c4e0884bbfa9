use super::*;
use crate::value::Placeholders;

fn entry(outcome: StatementOutcome) -> DebugEntry {
    DebugEntry {
        kind: QueryKind::Update,
        sql: "UPDATE users SET name = 'x' WHERE id = 1".to_string(),
        placeholders: Placeholders::new().with("name", "x").with("a_id", 1),
        elapsed: Some(Duration::from_millis(3)),
        outcome,
        rolled_back: true,
    }
}

#[test]
fn mode_from_bool() {
    assert_eq!(DebugMode::from(true), DebugMode::On);
    assert!(!DebugMode::from(false).is_enabled());
    assert!(DebugMode::Silent.is_enabled());
}

#[test]
fn entry_display_lists_params_and_outcome() {
    let text = entry(StatementOutcome::Affected(1)).to_string();
    assert!(text.starts_with("[UPDATE] UPDATE users SET name = 'x' WHERE id = 1\n"));
    assert!(text.contains("params: :name => 'x', :a_id => 1"));
    assert!(text.ends_with("1 affected | rolled back"));
}

#[test]
fn long_errors_are_truncated() {
    let outcome = StatementOutcome::error("e".repeat(2000));
    let StatementOutcome::Error(msg) = outcome else {
        panic!("expected error outcome");
    };
    assert_eq!(msg.len(), 515);
    assert!(msg.ends_with("..."));
}

#[test]
fn log_accumulates_and_drains() {
    let mut log = DebugLog::new();
    log.push(entry(StatementOutcome::NotSent), DebugMode::Silent);
    log.push(entry(StatementOutcome::Rows), DebugMode::Silent);

    assert_eq!(log.len(), 2);
    assert_eq!(log.last().map(|e| &e.outcome), Some(&StatementOutcome::Rows));
    assert_eq!(log.render().matches("[UPDATE]").count(), 2);

    let drained = log.take();
    assert_eq!(drained.len(), 2);
    assert!(log.is_empty());
}

#[test]
fn mode_deserializes_lowercase() {
    #[derive(serde::Deserialize)]
    struct Cfg {
        debug: DebugMode,
    }
    let cfg: Cfg = toml::from_str("debug = \"silent\"").unwrap();
    assert_eq!(cfg.debug, DebugMode::Silent);
}
