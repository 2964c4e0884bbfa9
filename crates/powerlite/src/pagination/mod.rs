//! Page-based result slicing.
//!
//! [`Pagination::select`] runs a COUNT over the caller's FROM and WHERE,
//! resolves the current page, then runs the real SELECT limited to that
//! page. [`Pagination::pagine`] renders the navigation markup.
//!
//! ```ignore
//! use powerlite::{Condition, Pagination, PaginationOptions, QueryParameters};
//!
//! let mut pages = Pagination::new(db, PaginationOptions::default(), 20);
//! pages.select(
//!     "users",
//!     "id, name",
//!     Condition::new().eq("active", true),
//!     &QueryParameters::new().order_by("name"),
//!     requested_page,
//! )?;
//! while let Some(user) = pages.fetch(FetchMode::Object)? { /* ... */ }
//! let nav = pages.pagine("/users");
//! ```

mod options;
mod render;


pub use options::PaginationOptions;

use crate::condition::Condition;
use crate::db::Db;
use crate::error::{DbError, DbResult};
use crate::params::{Limit, QueryParameters};
use crate::row::{FetchMode, Record};
use crate::value::Value;

/// Counters derived by the last [`Pagination::select`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PageState {
    current_page: u64,
    total_records_count: u64,
    number_of_pages: u64,
    current_number_of_records: u64,
}

pub struct Pagination {
    db: Db,
    options: PaginationOptions,
    records_per_page: u64,
    current_page_override: Option<i64>,
    state: PageState,
}

impl Pagination {
    pub fn new(db: Db, options: PaginationOptions, records_per_page: u64) -> Self {
        Self {
            db,
            options,
            records_per_page,
            current_page_override: None,
            state: PageState::default(),
        }
    }

    /// Count the matching records, then select the records of the current
    /// page.
    ///
    /// The current page is the override set with
    /// [`set_current_page`](Pagination::set_current_page), else
    /// `requested_page` (typically read from the request by the caller), else
    /// 1, clamped to `1..=number_of_pages`.
    pub fn select(
        &mut self,
        from: &str,
        fields: &str,
        condition: impl Into<Condition>,
        parameters: &QueryParameters,
        requested_page: Option<i64>,
    ) -> DbResult<&mut Self> {
        self.state = PageState::default();
        if self.records_per_page == 0 {
            return Err(DbError::Pagination(
                "records per page must be greater than zero".to_string(),
            ));
        }
        let condition = condition.into();

        let count_expr = if parameters.select_distinct {
            format!("DISTINCT {}", fields.trim())
        } else {
            "*".to_string()
        };
        let record = self
            .db
            .select_count(
                from,
                &[(count_expr.as_str(), "rowsCount")],
                condition.clone(),
                &QueryParameters::default(),
            )
            .map_err(|e| DbError::Pagination(e.to_string()))?;
        let total = record
            .as_ref()
            .and_then(|r| r.get("rowsCount").or_else(|| r.first()))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                DbError::Pagination("error getting the total number of records".to_string())
            })?;
        let total = u64::try_from(total).unwrap_or(0);

        let number_of_pages = total.div_ceil(self.records_per_page);
        let requested = self.current_page_override.or(requested_page).unwrap_or(1);
        let current_page = clamp_page(requested, number_of_pages);

        let mut page_parameters = parameters.clone();
        page_parameters.limit = Some(Limit::range(
            (current_page - 1) * self.records_per_page,
            self.records_per_page,
        ));
        self.db
            .select(from, fields, condition, &page_parameters)
            .map_err(|e| DbError::Pagination(e.to_string()))?;
        let current_number_of_records = self
            .db
            .num_rows()
            .map_err(|e| DbError::Pagination(e.to_string()))?;

        self.state = PageState {
            current_page,
            total_records_count: total,
            number_of_pages,
            current_number_of_records,
        };
        tracing::debug!(
            target: "powerlite.sql",
            page = current_page,
            pages = number_of_pages,
            total,
            "page selected"
        );
        Ok(self)
    }

    /// Next record of the current page.
    pub fn fetch(&mut self, mode: FetchMode) -> DbResult<Option<Record>> {
        self.db.fetch(mode)
    }

    /// Remaining records of the current page.
    pub fn fetch_all(&mut self, mode: FetchMode) -> DbResult<Vec<Record>> {
        self.db.fetch_all(mode)
    }

    /// Force the page used by the next [`select`](Pagination::select),
    /// overriding the requested page.
    pub fn set_current_page(&mut self, page: i64) -> &mut Self {
        self.current_page_override = Some(page);
        self
    }

    pub fn set_records_per_page(&mut self, records_per_page: u64) -> &mut Self {
        self.records_per_page = records_per_page;
        self
    }

    pub fn set_options(&mut self, options: PaginationOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &PaginationOptions {
        &self.options
    }

    pub fn records_per_page(&self) -> u64 {
        self.records_per_page
    }

    pub fn current_page(&self) -> u64 {
        self.state.current_page
    }

    pub fn total_records_count(&self) -> u64 {
        self.state.total_records_count
    }

    pub fn number_of_pages(&self) -> u64 {
        self.state.number_of_pages
    }

    pub fn current_number_of_records(&self) -> u64 {
        self.state.current_number_of_records
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut Db {
        &mut self.db
    }

    pub fn into_db(self) -> Db {
        self.db
    }
}

impl std::fmt::Debug for Pagination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pagination")
            .field("records_per_page", &self.records_per_page)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Clamp a requested page to `1..=pages` (page 1 when there are no pages).
fn clamp_page(requested: i64, pages: u64) -> u64 {
    let requested = u64::try_from(requested).unwrap_or(1).max(1);
    requested.min(pages.max(1))
}
