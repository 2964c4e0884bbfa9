use serde::Deserialize;

/// Markup and link settings for [`Pagination::pagine`](super::Pagination::pagine).
///
/// Every field has a default, so a partial TOML or JSON table is enough:
///
/// ```
/// let options: powerlite::PaginationOptions =
///     toml::from_str("querystring = \"page\"\nnav_length = 3").unwrap();
/// assert_eq!(options.querystring, "page");
/// assert_eq!(options.active_class, "active");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationOptions {
    /// CSS class of the current page item.
    pub active_class: String,
    /// CSS class of the "Page" marker item.
    pub disabled_class: String,
    /// CSS class of the `<ul>` container.
    pub pagination_class: String,
    pub first_markup: String,
    pub previous_markup: String,
    pub next_markup: String,
    pub last_markup: String,
    /// Pages shown on each side of the current page.
    pub nav_length: u64,
    /// Query-string key (or rewritten path prefix) carrying the page number.
    pub querystring: String,
    /// Build `url + transition + querystring + n + extension` links instead
    /// of `url?querystring=n`.
    pub rewrite_links: bool,
    pub rewrite_transition: String,
    pub rewrite_extension: String,
    pub results_label: String,
    pub to_label: String,
    pub of_label: String,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            active_class: "active".to_string(),
            disabled_class: "disabled".to_string(),
            pagination_class: "pagination pagination-flat".to_string(),
            first_markup: r#"<i class="fas fa-angle-double-left"></i>"#.to_string(),
            previous_markup: r#"<i class="fas fa-angle-left"></i>"#.to_string(),
            next_markup: r#"<i class="fas fa-angle-right"></i>"#.to_string(),
            last_markup: r#"<i class="fas fa-angle-double-right"></i>"#.to_string(),
            nav_length: 2,
            querystring: "p".to_string(),
            rewrite_links: false,
            rewrite_transition: "&".to_string(),
            rewrite_extension: String::new(),
            results_label: "results".to_string(),
            to_label: "to".to_string(),
            of_label: "of".to_string(),
        }
    }
}

impl PaginationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn querystring(mut self, key: impl Into<String>) -> Self {
        self.querystring = key.into();
        self
    }

    pub fn nav_length(mut self, pages: u64) -> Self {
        self.nav_length = pages;
        self
    }

    /// Switch to rewritten links: `url + transition + querystring + n + extension`.
    pub fn rewrite(mut self, transition: impl Into<String>, extension: impl Into<String>) -> Self {
        self.rewrite_links = true;
        self.rewrite_transition = transition.into();
        self.rewrite_extension = extension.into();
        self
    }

    /// First, previous, next and last control markup.
    pub fn controls(
        mut self,
        first: impl Into<String>,
        previous: impl Into<String>,
        next: impl Into<String>,
        last: impl Into<String>,
    ) -> Self {
        self.first_markup = first.into();
        self.previous_markup = previous.into();
        self.next_markup = next.into();
        self.last_markup = last.into();
        self
    }

    /// Labels of the "results X to Y of Z" summary.
    pub fn labels(
        mut self,
        results: impl Into<String>,
        to: impl Into<String>,
        of: impl Into<String>,
    ) -> Self {
        self.results_label = results.into();
        self.to_label = to.into();
        self.of_label = of.into();
        self
    }
}
