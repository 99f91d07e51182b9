//! Paginated per-file aggregate report.

use std::fmt::Write;

use serde::Serialize;
use tera::escape_html;
use url::form_urlencoded;

use crate::fetcher::{EventQuery, FilesQuery};
use crate::models::{PageResponse, QueryType};

/// Checkbox filters shared by the report and the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub hunk: bool,
    pub remove_stds: bool,
    pub reverse_order: bool,
}

/// State of the prev/next buttons and the page label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagingControls {
    pub info: String,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

#[derive(Debug, Clone)]
pub struct QueryPanel {
    current_page: u32,
    query_type: QueryType,
    filters: Filters,
    last: Option<PageResponse>,
}

impl Default for QueryPanel {
    fn default() -> Self {
        Self {
            current_page: 1,
            query_type: QueryType::default(),
            filters: Filters::default(),
            last: None,
        }
    }
}

impl QueryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn filters(&self) -> Filters {
        self.filters
    }

    pub fn last_response(&self) -> Option<&PageResponse> {
        self.last.as_ref()
    }

    /// Query for the current page, or `None` while no process is selected.
    pub fn request(&self, proc_name: Option<&str>) -> Option<FilesQuery> {
        let proc_name = proc_name?;
        Some(FilesQuery {
            query_type: self.query_type,
            page: self.current_page,
            proc_name: proc_name.to_string(),
            hunk: self.filters.hunk,
            remove_stds: self.filters.remove_stds,
            descending: self.filters.reverse_order,
        })
    }

    pub fn set_query_type(&mut self, query_type: QueryType) {
        self.query_type = query_type;
        self.current_page = 1;
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.current_page = 1;
    }

    pub fn reset_page(&mut self) {
        self.current_page = 1;
    }

    pub fn apply(&mut self, resp: PageResponse) {
        self.last = Some(resp);
    }

    /// Move to the server-reported previous page, if any.
    pub fn prev(&mut self) -> bool {
        match self.last.as_ref().and_then(|r| r.prev_page) {
            Some(page) => {
                self.current_page = page;
                true
            }
            None => false,
        }
    }

    /// Move to the server-reported next page, if any.
    pub fn next(&mut self) -> bool {
        match self.last.as_ref().and_then(|r| r.next_page) {
            Some(page) => {
                self.current_page = page;
                true
            }
            None => false,
        }
    }

    pub fn controls(&self) -> PagingControls {
        match &self.last {
            Some(resp) => PagingControls {
                info: format!("Page {} of {}", resp.page, resp.total_pages),
                prev_disabled: resp.prev_page.is_none(),
                next_disabled: resp.next_page.is_none(),
            },
            None => PagingControls {
                info: String::new(),
                prev_disabled: true,
                next_disabled: true,
            },
        }
    }

    /// Chart query scoped to a clicked file; `None` without a process.
    pub fn file_click(&self, proc_name: Option<&str>, fname: &str) -> Option<EventQuery> {
        let proc_name = proc_name?;
        Some(EventQuery {
            proc_name: proc_name.to_string(),
            fname: Some(fname.to_string()),
            hunk: self.filters.hunk,
            remove_stds: self.filters.remove_stds,
        })
    }

    /// Report table. File cells link to the file-scoped chart; a null
    /// aggregate leaves its cell empty.
    pub fn table_html(&self) -> String {
        const CELL: &str = "border: 1px solid black; padding: 4px;";
        let mut html = String::new();
        let _ = writeln!(html, "<table style=\"border-collapse: collapse;\">");
        let _ = writeln!(
            html,
            "  <tr><th style=\"{CELL}\">File</th><th style=\"{CELL}\">{}</th></tr>",
            self.query_type
        );
        if let Some(resp) = &self.last {
            for row in &resp.data {
                let fname = escape_html(&row.fname);
                let encoded: String = form_urlencoded::byte_serialize(row.fname.as_bytes()).collect();
                let _ = writeln!(
                    html,
                    "  <tr><td data-fname=\"{fname}\" style=\"{CELL} cursor:pointer;\"><a href=\"/file?fname={encoded}\">{fname}</a></td><td style=\"{CELL}\">{}</td></tr>",
                    row.display_value(),
                );
            }
        }
        html.push_str("</table>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryRow;

    fn page(page: u32, total: u32) -> PageResponse {
        PageResponse {
            data: vec![QueryRow {
                fname: "/srv/a b.txt".into(),
                value: Some(3.0),
            }],
            page,
            total_pages: total,
            prev_page: (page > 1).then(|| page - 1),
            next_page: (page < total).then(|| page + 1),
            total: None,
            page_size: None,
        }
    }

    #[test]
    fn test_request_requires_process() {
        let panel = QueryPanel::new();
        assert!(panel.request(None).is_none());
        let q = panel.request(Some("bash")).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.query_type, QueryType::Count);
    }

    #[test]
    fn test_query_type_change_resets_page() {
        let mut panel = QueryPanel::new();
        panel.apply(page(1, 4));
        assert!(panel.next());
        assert_eq!(panel.current_page(), 2);

        panel.set_query_type(QueryType::Bytes);
        assert_eq!(panel.current_page(), 1);
        assert_eq!(panel.request(Some("p")).unwrap().query_type, QueryType::Bytes);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut panel = QueryPanel::new();
        panel.apply(page(2, 4));
        panel.next();
        assert_eq!(panel.current_page(), 3);
        panel.set_filters(Filters {
            reverse_order: true,
            ..Filters::default()
        });
        assert_eq!(panel.current_page(), 1);
        assert!(panel.request(Some("p")).unwrap().descending);
    }

    #[test]
    fn test_controls_follow_server_cursor() {
        let mut panel = QueryPanel::new();
        let controls = panel.controls();
        assert!(controls.prev_disabled && controls.next_disabled);

        panel.apply(page(3, 3));
        let controls = panel.controls();
        assert_eq!(controls.info, "Page 3 of 3");
        assert!(!controls.prev_disabled);
        assert!(controls.next_disabled);
        assert!(!panel.next());
        assert_eq!(panel.current_page(), 1);
        assert!(panel.prev());
        assert_eq!(panel.current_page(), 2);
    }

    #[test]
    fn test_file_click_guard() {
        let panel = QueryPanel::new();
        assert!(panel.file_click(None, "/srv/a").is_none());
        let q = panel.file_click(Some("nginx"), "/srv/a").unwrap();
        assert_eq!(q.fname.as_deref(), Some("/srv/a"));
        assert_eq!(q.proc_name, "nginx");
    }

    #[test]
    fn test_table_html() {
        let mut panel = QueryPanel::new();
        panel.set_query_type(QueryType::Duration);
        panel.apply(page(1, 1));
        let html = panel.table_html();
        assert!(html.contains("<th style=\"border: 1px solid black; padding: 4px;\">duration</th>"));
        assert!(html.contains("data-fname=\"&#x2F;srv&#x2F;a b.txt\""));
        assert!(html.contains("href=\"/file?fname=%2Fsrv%2Fa+b.txt\""));
        assert_eq!(html.matches("<tr>").count(), 2);
    }

    #[test]
    fn test_table_html_null_aggregate_cell_is_empty() {
        let mut panel = QueryPanel::new();
        let mut resp = page(1, 1);
        resp.data[0].value = None;
        panel.apply(resp);
        let html = panel.table_html();
        assert!(html.ends_with("<td style=\"border: 1px solid black; padding: 4px;\"></td></tr>\n</table>\n"));
    }
}
