//! The dashboard controller.
//!
//! Owns every piece of view state (chart, process list, report panel,
//! pending alerts) and turns user interactions into backend fetches.
//! Each interaction is split in three: `plan_*` updates local state and
//! returns the fetches to issue, `Fetch::run` talks to the backend, and
//! `complete` applies the answer. A failed or superseded fetch never
//! touches what is currently shown.

pub mod fetch;
pub mod page;

use crate::chart::tooltip::Tooltip;
use crate::chart::zoom::ZoomTransform;
use crate::chart::{Chart, ChartOptions};
use crate::fetcher::{ApiClient, EventQuery};
use crate::models::{Marker, QueryType};
use crate::notification::Alerts;
use crate::query_panel::{Filters, QueryPanel};
use crate::selector::ProcessSelector;
use fetch::{Completed, Fetch, Issued};

pub struct Dashboard {
    client: ApiClient,
    chart: Chart,
    selector: ProcessSelector,
    panel: QueryPanel,
    markers: Vec<Marker>,
    /// Last chart query asked for, re-issued when filters change.
    chart_scope: Option<EventQuery>,
    alerts: Alerts,
    issued: Issued,
}

impl Dashboard {
    pub fn new(client: ApiClient, options: ChartOptions, markers: Vec<Marker>) -> Self {
        Self {
            client,
            chart: Chart::new(options),
            selector: ProcessSelector::new(),
            panel: QueryPanel::new(),
            markers,
            chart_scope: None,
            alerts: Alerts::new(),
            issued: Issued::default(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn selector(&self) -> &ProcessSelector {
        &self.selector
    }

    pub fn panel(&self) -> &QueryPanel {
        &self.panel
    }

    pub fn alerts(&self) -> &Alerts {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut Alerts {
        &mut self.alerts
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn chart_scope(&self) -> Option<&EventQuery> {
        self.chart_scope.as_ref()
    }

    // ── Planning ─────────────────────────────────────────────

    fn issue_procs(&mut self) -> Fetch {
        self.issued.procs += 1;
        Fetch::Procs {
            seq: self.issued.procs,
        }
    }

    fn issue_chart(&mut self, scope: Option<EventQuery>) -> Fetch {
        self.issued.chart += 1;
        self.chart_scope = scope.clone();
        Fetch::Chart {
            seq: self.issued.chart,
            scope,
        }
    }

    /// Current report page; `None` until a process is selected.
    pub fn plan_report(&mut self) -> Option<Fetch> {
        let query = self.panel.request(self.selector.selected())?;
        self.issued.report += 1;
        Some(Fetch::Report {
            seq: self.issued.report,
            query,
        })
    }

    /// Page load: process list, initial dataset, report table.
    pub fn plan_load(&mut self) -> Vec<Fetch> {
        let mut fetches = vec![self.issue_procs(), self.issue_chart(None)];
        fetches.extend(self.plan_report());
        fetches
    }

    pub fn plan_refresh_procs(&mut self) -> Fetch {
        self.issue_procs()
    }

    /// Radio change: chart the process and restart its report at page 1.
    /// `None` for a process that is not listed.
    pub fn plan_select(&mut self, name: &str) -> Option<Vec<Fetch>> {
        if !self.selector.select(name) {
            return None;
        }
        let filters = self.panel.filters();
        let query = EventQuery {
            hunk: filters.hunk,
            remove_stds: filters.remove_stds,
            ..EventQuery::for_proc(name)
        };
        let mut fetches = vec![self.issue_chart(Some(query))];
        self.panel.reset_page();
        fetches.extend(self.plan_report());
        Some(fetches)
    }

    /// Report row click. `None` without a selected process.
    pub fn plan_file_click(&mut self, fname: &str) -> Option<Fetch> {
        match self.panel.file_click(self.selector.selected(), fname) {
            Some(query) => Some(self.issue_chart(Some(query))),
            None => {
                tracing::debug!(fname = %fname, "file click ignored, no process selected");
                None
            }
        }
    }

    /// Checkbox change: restart the report and re-chart the current scope.
    pub fn plan_filters(&mut self, filters: Filters) -> Vec<Fetch> {
        self.panel.set_filters(filters);
        let mut fetches = Vec::new();
        if let Some(scope) = self.chart_scope.clone() {
            let query = EventQuery {
                hunk: filters.hunk,
                remove_stds: filters.remove_stds,
                ..scope
            };
            fetches.push(self.issue_chart(Some(query)));
        }
        fetches.extend(self.plan_report());
        fetches
    }

    pub fn plan_query_type(&mut self, query_type: QueryType) -> Option<Fetch> {
        self.panel.set_query_type(query_type);
        self.plan_report()
    }

    pub fn plan_prev_page(&mut self) -> Option<Fetch> {
        if !self.panel.prev() {
            return None;
        }
        self.plan_report()
    }

    pub fn plan_next_page(&mut self) -> Option<Fetch> {
        if !self.panel.next() {
            return None;
        }
        self.plan_report()
    }

    // ── Applying ─────────────────────────────────────────────

    /// Apply a finished fetch. Returns false when a newer request of the
    /// same kind was issued meanwhile and the answer was dropped.
    pub fn complete(&mut self, done: Completed) -> bool {
        match done {
            Completed::Procs { seq, result } => {
                if seq != self.issued.procs {
                    return stale("procs", seq);
                }
                match result {
                    Ok(names) => {
                        tracing::debug!(count = names.len(), "process list loaded");
                        self.selector.populate(&names);
                    }
                    Err(e) => self
                        .alerts
                        .raise(format!("Error loading process list: {}", e)),
                }
            }
            Completed::Chart { seq, result } => {
                if seq != self.issued.chart {
                    return stale("chart", seq);
                }
                match result {
                    Ok(events) => {
                        self.chart.render(&events, &self.markers);
                    }
                    Err(e) => self.alerts.raise(format!("Error loading events: {}", e)),
                }
            }
            Completed::Report { seq, query, result } => {
                if seq != self.issued.report {
                    return stale("report", seq);
                }
                match result {
                    Ok(resp) => self.panel.apply(resp),
                    Err(e) => tracing::error!(
                        query_type = %query.query_type,
                        page = query.page,
                        "report fetch failed: {}",
                        e
                    ),
                }
            }
        }
        true
    }

    /// Run planned fetches in order on this dashboard's client, applying
    /// each answer as it arrives.
    pub async fn execute(&mut self, fetches: impl IntoIterator<Item = Fetch>) {
        for fetch in fetches {
            let done = fetch.run(&self.client).await;
            self.complete(done);
        }
    }

    // ── Whole interactions ───────────────────────────────────

    pub async fn load(&mut self) {
        let fetches = self.plan_load();
        self.execute(fetches).await;
    }

    pub async fn refresh_procs(&mut self) {
        let fetch = self.plan_refresh_procs();
        self.execute([fetch]).await;
    }

    /// Returns false for a process that is not listed.
    pub async fn select_process(&mut self, name: &str) -> bool {
        match self.plan_select(name) {
            Some(fetches) => {
                self.execute(fetches).await;
                true
            }
            None => false,
        }
    }

    /// Without a selected process this performs no fetch; returns whether
    /// a fetch was issued.
    pub async fn click_file(&mut self, fname: &str) -> bool {
        let fetch = self.plan_file_click(fname);
        let issued = fetch.is_some();
        self.execute(fetch).await;
        issued
    }

    pub async fn set_filters(&mut self, filters: Filters) {
        let fetches = self.plan_filters(filters);
        self.execute(fetches).await;
    }

    pub async fn change_query_type(&mut self, query_type: QueryType) {
        let fetch = self.plan_query_type(query_type);
        self.execute(fetch).await;
    }

    pub async fn prev_page(&mut self) -> bool {
        let fetch = self.plan_prev_page();
        let moved = fetch.is_some();
        self.execute(fetch).await;
        moved
    }

    pub async fn next_page(&mut self) -> bool {
        let fetch = self.plan_next_page();
        let moved = fetch.is_some();
        self.execute(fetch).await;
        moved
    }

    /// Fetch the current report page; no-op until a process is selected.
    pub async fn refresh_report(&mut self) {
        let fetch = self.plan_report();
        self.execute(fetch).await;
    }

    // ── Pointer interaction ──────────────────────────────────

    pub fn zoom_by(&mut self, factor: f64, pointer_x: f64) -> ZoomTransform {
        self.chart.zoom_by(factor, pointer_x)
    }

    pub fn wheel(&mut self, delta_y: f64, pointer_x: f64) -> ZoomTransform {
        self.chart.wheel(delta_y, pointer_x)
    }

    pub fn pan(&mut self, dx: f64) -> ZoomTransform {
        self.chart.pan(dx)
    }

    pub fn reset_zoom(&mut self) {
        self.chart.reset_zoom();
    }

    pub fn hover(&mut self, segment: usize, page_x: f64, page_y: f64) -> Option<&Tooltip> {
        self.chart.hover(segment, page_x, page_y)
    }

    pub fn move_pointer(&mut self, page_x: f64, page_y: f64) {
        self.chart.move_pointer(page_x, page_y);
    }

    pub fn leave(&mut self) {
        self.chart.leave();
    }
}

fn stale(kind: &'static str, seq: u64) -> bool {
    tracing::debug!(kind, seq, "dropping superseded response");
    false
}
