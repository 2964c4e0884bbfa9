use super::QueryBuilder;
use crate::dialect::LimitPlacement;
use crate::error::{DbError, DbResult};
use crate::sql::QueryKind;

impl QueryBuilder {
    /// Render the current descriptor.
    pub fn to_sql(&self) -> DbResult<String> {
        match self.kind {
            Some(QueryKind::Raw) => Ok(self.raw_sql.clone()),
            Some(QueryKind::Select) => Ok(self.select_sql()),
            Some(QueryKind::Insert) => Ok(self.insert_sql()),
            Some(QueryKind::Update) => Ok(self.update_sql()),
            Some(QueryKind::Delete) => Ok(self.delete_sql()),
            None => Err(no_query()),
        }
    }

    pub(super) fn select_sql(&self) -> String {
        let params = &self.parameters;
        let distinct = if params.select_distinct { "DISTINCT " } else { "" };
        let fields = if self.fields.is_empty() { "*" } else { self.fields.as_str() };

        let mut tail = String::from(self.where_clause.sql());
        if let Some(group_by) = non_blank(params.group_by.as_deref()) {
            tail.push_str(" GROUP BY ");
            tail.push_str(group_by);
        }
        if let Some(order_by) = non_blank(params.order_by.as_deref()) {
            tail.push_str(" ORDER BY ");
            tail.push_str(order_by);
        }
        let limit = params
            .limit
            .map(|limit| self.dialect.limit_clause(&limit))
            .unwrap_or_default();

        match self.dialect.limit_placement() {
            LimitPlacement::AfterSelect => {
                format!("SELECT {limit}{distinct}{fields} FROM {}{tail}", self.from)
            }
            LimitPlacement::Trailing => {
                format!("SELECT {distinct}{fields} FROM {}{tail}{limit}", self.from)
            }
        }
    }

    pub(super) fn insert_sql(&self) -> String {
        let columns: Vec<&str> = self.values.iter().map(|(c, _)| c.as_str()).collect();
        let markers: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            markers.join(", ")
        )
    }

    pub(super) fn update_sql(&self) -> String {
        let assignments: Vec<String> = self
            .values
            .iter()
            .map(|(c, _)| format!("{c} = :{c}"))
            .collect();
        format!(
            "UPDATE {} SET {}{}",
            self.table,
            assignments.join(", "),
            self.where_clause.sql()
        )
    }

    pub(super) fn delete_sql(&self) -> String {
        self.dialect.delete_sql(&self.table, self.where_clause.sql())
    }

    /// Expression counted by the row-count probe of a structured SELECT.
    pub(super) fn count_expr(&self) -> Option<String> {
        match self.kind {
            Some(QueryKind::Select) if self.parameters.select_distinct => {
                Some(format!("DISTINCT {}", self.fields))
            }
            Some(QueryKind::Select) => Some("*".to_string()),
            _ => None,
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

pub(super) fn no_query() -> DbError {
    DbError::InvalidState("no query has been composed".to_string())
}
