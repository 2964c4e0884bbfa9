//! Navigation markup.

use super::{Pagination, PaginationOptions};
use regex::Regex;

impl Pagination {
    /// Render the page navigation for `url`.
    ///
    /// Any page number already present in `url` is removed first. The
    /// result is a `<ul>` of `page-item` links around the current page,
    /// followed by the "results X to Y of Z" summary. Returns an empty
    /// string when there are no records.
    pub fn pagine(&self, url: &str) -> String {
        let state = &self.state;
        if state.total_records_count == 0 {
            return String::new();
        }
        let opts = &self.options;
        let url = remove_previous_querystring(url, opts);
        let links = Links::new(&url, opts);

        let mut view = String::new();
        let (start, end) = if state.number_of_pages > 1 {
            let current = state.current_page;
            let loop_start = current.saturating_sub(opts.nav_length).max(1);
            let loop_end = state
                .number_of_pages
                .min(current.saturating_add(opts.nav_length));

            for page in loop_start..=loop_end {
                if page == current {
                    view.push_str(&format!(
                        r##"<li class="page-item {}"><a class="page-link" href="#">{page}</a></li>"##,
                        opts.active_class
                    ));
                } else {
                    view.push_str(&item(&links.page(page), &page.to_string()));
                }
            }

            if !view.is_empty() {
                view.insert_str(
                    0,
                    &format!(
                        r##"<li class="page-item {}"><a class="page-link" href="#">Page</a></li>"##,
                        opts.disabled_class
                    ),
                );

                if current > 1 {
                    let first = item(&links.page(1), &opts.first_markup);
                    let previous = item(&links.page(current - 1), &opts.previous_markup);
                    view.insert_str(0, &format!("{first}{previous}"));
                }
                if current < state.number_of_pages {
                    view.push_str(&item(&links.page(current + 1), &opts.next_markup));
                    view.push_str(&item(&links.page(state.number_of_pages), &opts.last_markup));
                }
            }

            let start = self.records_per_page * (current - 1) + 1;
            let end = (start + state.current_number_of_records).saturating_sub(1);
            (start, end)
        } else {
            (1, state.total_records_count)
        };

        let mut out = format!(r#"<ul class="{}">{view}</ul>"#, opts.pagination_class);
        out.push_str(r#"<div class="heading-elements pt-2 pr-3">"#);
        out.push_str(&format!(
            r#"<p class="text-right text-semibold">{} {start} {} {end} {} {}</p>"#,
            opts.results_label, opts.to_label, opts.of_label, state.total_records_count
        ));
        out.push_str("</div>");
        out
    }
}

fn item(href: &str, label: &str) -> String {
    format!(r#"<li class="page-item"><a class="page-link" href="{href}">{label}</a></li>"#)
}

/// Link builder for one rendering pass.
struct Links<'a> {
    url: &'a str,
    opts: &'a PaginationOptions,
    transition: &'a str,
}

impl<'a> Links<'a> {
    fn new(url: &'a str, opts: &'a PaginationOptions) -> Self {
        let transition = if opts.rewrite_links {
            opts.rewrite_transition.as_str()
        } else if url.contains('?') {
            "&amp;"
        } else {
            "?"
        };
        Self {
            url,
            opts,
            transition,
        }
    }

    /// Page 1 links to the bare url.
    fn page(&self, page: u64) -> String {
        let Links {
            url,
            opts,
            transition,
        } = self;
        match (page, opts.rewrite_links) {
            (1, true) => format!("{url}{}", opts.rewrite_extension),
            (1, false) => url.to_string(),
            (_, true) => format!(
                "{url}{transition}{}{page}{}",
                opts.querystring, opts.rewrite_extension
            ),
            (_, false) => format!("{url}{transition}{}={page}", opts.querystring),
        }
    }
}

/// Strip a page number left in `url` by a previous rendering.
fn remove_previous_querystring(url: &str, opts: &PaginationOptions) -> String {
    let key = regex::escape(&opts.querystring);
    let rules: Vec<(String, &str)> = if opts.rewrite_links {
        let mut rules = vec![(
            format!(
                "{}{key}[0-9]+",
                regex::escape(&opts.rewrite_transition)
            ),
            "",
        )];
        if !opts.rewrite_extension.is_empty() {
            rules.push((regex::escape(&opts.rewrite_extension), ""));
        }
        rules
    } else {
        vec![
            (format!(r"\?{key}=[0-9]+&(amp;)?"), "?"),
            (format!(r"\?{key}=[0-9]+"), ""),
            (format!(r"&(amp;)?{key}=[0-9]+"), ""),
        ]
    };

    let mut url = url.to_string();
    for (pattern, replacement) in rules {
        match Regex::new(&pattern) {
            Ok(re) => url = re.replace_all(&url, replacement).into_owned(),
            Err(err) => {
                tracing::warn!(target: "powerlite.sql", %err, pattern = %pattern, "skipping url cleanup rule");
            }
        }
    }
    url
}
