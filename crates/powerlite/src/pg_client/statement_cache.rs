use std::collections::{HashMap, VecDeque};

/// Least-recently-used map of prepared statements keyed by SQL text.
#[derive(Debug)]
pub(super) struct StatementCache<S> {
    capacity: usize,
    map: HashMap<String, S>,
    order: VecDeque<String>,
}

impl<S: Clone> StatementCache<S> {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub(super) fn get(&mut self, key: &str) -> Option<S> {
        let stmt = self.map.get(key).cloned()?;
        self.touch(key);
        Some(stmt)
    }

    pub(super) fn insert(&mut self, key: String, stmt: S) {
        if self.map.insert(key.clone(), stmt).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_back(key);
        self.evict_if_needed();
    }

    pub(super) fn remove(&mut self, key: &str) -> Option<S> {
        let removed = self.map.remove(key);
        if removed.is_some() {
            self.remove_from_order(key);
        }
        removed
    }

    pub(super) fn len(&self) -> usize {
        self.map.len()
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k.as_str() == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn remove_from_order(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k.as_str() == key) {
            let _ = self.order.remove(pos);
        }
    }

    fn evict_if_needed(&mut self) {
        if self.capacity == 0 {
            self.map.clear();
            self.order.clear();
            return;
        }

        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            let _ = self.map.remove(&oldest);
        }
    }
}

/// Whether a failed execution should be retried with a freshly prepared
/// statement (the cached plan was invalidated server-side).
pub(super) fn is_retryable_prepared_error(err: &postgres::Error) -> bool {
    let Some(db_err) = err.as_db_error() else {
        return false;
    };

    match db_err.code().code() {
        // "cached plan must not change result type" (e.g. after schema change)
        "0A000" => db_err
            .message()
            .to_ascii_lowercase()
            .contains("cached plan must not change result type"),
        // invalid_sql_statement_name
        "26000" => true,
        _ => false,
    }
}
