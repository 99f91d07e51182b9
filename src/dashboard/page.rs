//! Server-rendered dashboard page.

use serde::Serialize;
use tera::{Context, Tera};

use super::Dashboard;
use crate::chart::tooltip::details_text;
use crate::chart::Chart;
use crate::models::QueryType;

const PAGE_TEMPLATE: &str = "index.html";

/// Pan distance of the page's pan buttons, in chart pixels.
const PAN_STEP: f64 = 200.0;

/// Wheel delta of the page's zoom buttons (a factor of 2 per click).
const WHEEL_STEP: f64 = 500.0;

/// Hit box of a segment link: minimum width and full height, in pixels.
const HOTSPOT_MIN_WIDTH: f64 = 6.0;
const HOTSPOT_HEIGHT: f64 = 12.0;

#[derive(Serialize)]
struct ProcView<'a> {
    id: &'a str,
    name: &'a str,
    checked: bool,
}

#[derive(Serialize)]
struct QueryTypeView {
    value: &'static str,
    selected: bool,
}

/// Link laid over a drawn segment; following it hovers that segment.
#[derive(Debug, Serialize)]
struct Hotspot {
    index: usize,
    left: f64,
    top: f64,
    width: f64,
    /// Pointer position reported to `/hover`, relative to the chart box.
    x: f64,
    y: f64,
    title: String,
}

/// Links over every segment still inside the visible time range.
fn hotspots(chart: &Chart) -> Vec<Hotspot> {
    let opts = chart.options();
    let iw = opts.inner_width();
    let events: Vec<_> = chart.events().collect();
    chart
        .segments()
        .into_iter()
        .filter(|seg| seg.x2 >= 0.0 && seg.x1 <= iw)
        .map(|seg| {
            let x1 = seg.x1.max(0.0);
            let width = (seg.x2.min(iw) - x1).max(HOTSPOT_MIN_WIDTH);
            let left = opts.margin.left + x1;
            let y = opts.margin.top + seg.y;
            Hotspot {
                index: seg.index,
                left,
                top: y - HOTSPOT_HEIGHT / 2.0,
                width,
                x: (left + width / 2.0).round(),
                y: y.round(),
                title: events.get(seg.index).map(|e| details_text(e)).unwrap_or_default(),
            }
        })
        .collect()
}

pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(PAGE_TEMPLATE, DEFAULT_PAGE_TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Render the whole page. Pending alerts are shown and consumed.
    pub fn render(&self, dashboard: &mut Dashboard) -> Result<String, tera::Error> {
        let alerts = dashboard.alerts_mut().drain();

        let selector = dashboard.selector();
        let procs: Vec<ProcView> = selector
            .options()
            .iter()
            .map(|o| ProcView {
                id: &o.id,
                name: &o.name,
                checked: selector.is_selected(&o.name),
            })
            .collect();

        let panel = dashboard.panel();
        let query_types: Vec<QueryTypeView> = QueryType::ALL
            .iter()
            .map(|t| QueryTypeView {
                value: t.as_str(),
                selected: *t == panel.query_type(),
            })
            .collect();

        let chart = dashboard.chart();
        let transform = chart.transform();
        let center = chart.options().inner_width() / 2.0;

        let mut context = Context::new();
        context.insert("alerts", &alerts);
        context.insert("procs", &procs);
        context.insert("filters", &panel.filters());
        context.insert("query_types", &query_types);
        context.insert("chart_svg", &chart.to_svg());
        context.insert("chart_width", &chart.options().width);
        context.insert("hotspots", &hotspots(chart));
        context.insert("tooltip_style", &chart.tooltip().style());
        context.insert("tooltip_html", &chart.tooltip().html);
        context.insert("tooltip_visible", &chart.tooltip().visible);
        context.insert("report_table", &panel.table_html());
        context.insert("paging", &panel.controls());
        context.insert("zoom_k", &format!("{:.2}", transform.k));
        context.insert("zoom_center", &center);
        context.insert("pan_step", &PAN_STEP);
        context.insert("wheel_step", &WHEEL_STEP);

        self.tera.render(PAGE_TEMPLATE, &context)
    }
}

const DEFAULT_PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>tracelens</title>
  <style>
    body { font-family: sans-serif; margin: 1rem; }
    .alert { background: #f8d7da; border: 1px solid #f5c2c7; padding: 0.5rem 1rem; margin-bottom: 1rem; }
    #chart_area { position: relative; }
    #chart_area a.segment { position: absolute; display: block; height: 12px; }
    #tooltip { position: absolute; background: #fff; border: 1px solid #999; padding: 6px; }
    .panel { display: flex; gap: 2rem; align-items: flex-start; }
  </style>
</head>
<body>
{% for alert in alerts %}
  <div class="alert" role="alert">{{ alert }}</div>
{% endfor %}
<div class="panel">
  <form id="procs" action="/select" method="get">
  {% for p in procs %}
    <div>
      <input id="{{ p.id }}" type="radio" name="proc" value="{{ p.name }}"{% if p.checked %} checked{% endif %}>
      <label for="{{ p.id }}" style="margin-left: 6px;">{{ p.name }}</label>
    </div>
  {% endfor %}
    <button type="submit">Show</button>
  </form>
  <form action="/filters" method="get">
    <label><input id="hunk" type="checkbox" name="hunk"{% if filters.hunk %} checked{% endif %}> hide unknown files</label>
    <label><input id="remove_stds" type="checkbox" name="remove_stds"{% if filters.remove_stds %} checked{% endif %}> remove std streams</label>
    <label><input id="reverse_order" type="checkbox" name="reverse_order"{% if filters.reverse_order %} checked{% endif %}> descending</label>
    <button type="submit">Apply</button>
  </form>
  <form action="/query" method="get">
    <select id="query_type" name="type">
    {% for t in query_types %}
      <option value="{{ t.value }}"{% if t.selected %} selected{% endif %}>{{ t.value }}</option>
    {% endfor %}
    </select>
    <button type="submit">Query</button>
  </form>
</div>
<div>
  zoom x{{ zoom_k }}
  <a href="/wheel?delta=-{{ wheel_step }}&amp;at={{ zoom_center }}">+</a>
  <a href="/wheel?delta={{ wheel_step }}&amp;at={{ zoom_center }}">-</a>
  <a href="/zoom?factor=10&amp;at={{ zoom_center }}">x10</a>
  <a href="/pan?dx={{ pan_step }}">&larr;</a>
  <a href="/pan?dx=-{{ pan_step }}">&rarr;</a>
  <a href="/zoom/reset">reset</a>
</div>
<div id="chart_area" style="width:{{ chart_width }}px">
  <div id="chart">{{ chart_svg | safe }}</div>
{% for s in hotspots %}
  <a class="segment" href="/hover?segment={{ s.index }}&amp;x={{ s.x }}&amp;y={{ s.y }}" title="{{ s.title }}" style="left:{{ s.left }}px;top:{{ s.top }}px;width:{{ s.width }}px"></a>
{% endfor %}
  <div id="tooltip" style="{{ tooltip_style }}">{{ tooltip_html | safe }}{% if tooltip_visible %} <a id="tooltip_close" href="/leave">&times;</a>{% endif %}</div>
</div>
<div id="query_report">{{ report_table | safe }}</div>
<div>
  <form action="/page/prev" method="get" style="display:inline"><button id="prev_page"{% if paging.prev_disabled %} disabled{% endif %}>Prev</button></form>
  <span id="page_info">{{ paging.info }}</span>
  <form action="/page/next" method="get" style="display:inline"><button id="next_page"{% if paging.next_disabled %} disabled{% endif %}>Next</button></form>
</div>
</body>
</html>
"##;
