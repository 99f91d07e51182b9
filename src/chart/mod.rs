//! Timeline (Gantt-style) chart of I/O events.
//!
//! `Chart` owns everything derived from the last dataset: scales, colors,
//! zoom state and the tooltip. `render` rebuilds all of it, so calling it
//! again always starts from a blank chart.

pub mod axis;
pub mod scale;
pub mod svg;
pub mod tooltip;
pub mod zoom;

use serde::Serialize;

use crate::models::{Event, Marker, Micros};
use axis::Tick;
use scale::{BandScale, OrdinalColor, TimeScale};
use tooltip::Tooltip;
use zoom::{ZoomBehavior, ZoomTransform};

/// Band padding between (and around) event-name rows.
const BAND_PADDING: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    /// Order event-name rows alphabetically instead of first-seen.
    pub sort_categories: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 800.0,
            margin: Margin {
                top: 40.0,
                right: 40.0,
                bottom: 60.0,
                left: 120.0,
            },
            sort_categories: true,
        }
    }
}

impl ChartOptions {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

/// A drawn event interval, in inner-area pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Index into `Chart::events`.
    pub index: usize,
    pub category: String,
    pub start: Micros,
    pub end: Micros,
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
    pub color: &'static str,
}

/// A drawn marker line spanning the inner height.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub time: Micros,
    pub x: f64,
}

#[derive(Debug)]
struct Plotted {
    event: Event,
    start: Micros,
    end: Micros,
    color: &'static str,
}

#[derive(Debug)]
pub struct Chart {
    options: ChartOptions,
    plotted: Vec<Plotted>,
    markers: Vec<Micros>,
    x: TimeScale,
    y: BandScale,
    zoom: ZoomBehavior,
    tooltip: Tooltip,
}

impl Chart {
    pub fn new(options: ChartOptions) -> Self {
        let x = TimeScale::from_extent(Vec::new(), (0.0, options.inner_width()));
        let y = BandScale::new(Vec::new(), (0.0, options.inner_height()), BAND_PADDING);
        let zoom = ZoomBehavior::new(options.inner_width());
        Self {
            options,
            plotted: Vec::new(),
            markers: Vec::new(),
            x,
            y,
            zoom,
            tooltip: Tooltip::default(),
        }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Replace the chart contents with a new dataset.
    ///
    /// Events or markers whose timestamps do not parse are skipped.
    /// Returns the number of plotted event segments.
    pub fn render(&mut self, events: &[Event], markers: &[Marker]) -> usize {
        let mut colors = OrdinalColor::new();
        let mut plotted = Vec::with_capacity(events.len());
        for event in events {
            match event.span() {
                Ok((start, end)) => plotted.push(Plotted {
                    color: colors.color(&event.event_name),
                    event: event.clone(),
                    start,
                    end,
                }),
                Err(e) => tracing::warn!(event = %event.event_name, "skipping event: {}", e),
            }
        }

        let mut marker_times = Vec::with_capacity(markers.len());
        for marker in markers {
            match marker.time() {
                Ok(t) => marker_times.push(t),
                Err(e) => tracing::warn!("skipping marker: {}", e),
            }
        }

        let instants = plotted
            .iter()
            .flat_map(|p| [p.start, p.end])
            .chain(marker_times.iter().copied());
        self.x = TimeScale::from_extent(instants, (0.0, self.options.inner_width()))
            .nice(axis::TIME_TICKS);

        let mut categories: Vec<String> = Vec::new();
        for p in &plotted {
            if !categories.contains(&p.event.event_name) {
                categories.push(p.event.event_name.clone());
            }
        }
        if self.options.sort_categories {
            categories.sort();
        }
        self.y = BandScale::new(categories, (0.0, self.options.inner_height()), BAND_PADDING);

        self.plotted = plotted;
        self.markers = marker_times;
        self.zoom = ZoomBehavior::new(self.options.inner_width());
        self.tooltip = Tooltip::default();

        tracing::debug!(
            segments = self.plotted.len(),
            markers = self.markers.len(),
            categories = self.y.domain().len(),
            "chart rendered"
        );
        self.plotted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plotted.is_empty() && self.markers.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.plotted.iter().map(|p| &p.event)
    }

    /// Base (unzoomed) time scale.
    pub fn base_x(&self) -> &TimeScale {
        &self.x
    }

    pub fn y(&self) -> &BandScale {
        &self.y
    }

    /// Time scale as currently visible.
    pub fn x(&self) -> TimeScale {
        self.zoom.transform().rescale_x(&self.x)
    }

    pub fn segments(&self) -> Vec<Segment> {
        let zx = self.x();
        self.plotted
            .iter()
            .enumerate()
            .map(|(index, p)| Segment {
                index,
                category: p.event.event_name.clone(),
                start: p.start,
                end: p.end,
                x1: zx.scale(p.start as f64),
                x2: zx.scale(p.end as f64),
                y: self.y.center(&p.event.event_name).unwrap_or(0.0),
                color: p.color,
            })
            .collect()
    }

    pub fn marker_lines(&self) -> Vec<MarkerLine> {
        let zx = self.x();
        self.markers
            .iter()
            .map(|&time| MarkerLine {
                time,
                x: zx.scale(time as f64),
            })
            .collect()
    }

    pub fn x_ticks(&self) -> Vec<Tick> {
        axis::time_ticks(&self.x())
    }

    pub fn y_ticks(&self) -> Vec<Tick> {
        axis::band_ticks(&self.y)
    }

    // ── Zoom ─────────────────────────────────────────────────

    pub fn transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    pub fn zoom_by(&mut self, factor: f64, pointer_x: f64) -> ZoomTransform {
        self.zoom.scale_by(factor, pointer_x)
    }

    pub fn zoom_to(&mut self, k: f64, pointer_x: f64) -> ZoomTransform {
        self.zoom.scale_to(k, pointer_x)
    }

    pub fn wheel(&mut self, delta_y: f64, pointer_x: f64) -> ZoomTransform {
        self.zoom.wheel(delta_y, pointer_x)
    }

    pub fn pan(&mut self, dx: f64) -> ZoomTransform {
        self.zoom.translate_by(dx)
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    // ── Tooltip ──────────────────────────────────────────────

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Pointer entered a segment. Unknown segments leave the tooltip as is.
    pub fn hover(&mut self, segment: usize, page_x: f64, page_y: f64) -> Option<&Tooltip> {
        let plotted = self.plotted.get(segment)?;
        self.tooltip.show(&plotted.event, page_x, page_y);
        Some(&self.tooltip)
    }

    pub fn move_pointer(&mut self, page_x: f64, page_y: f64) {
        self.tooltip.move_to(page_x, page_y);
    }

    pub fn leave(&mut self) {
        self.tooltip.hide();
    }

    pub fn to_svg(&self) -> String {
        svg::write_chart(self)
    }
}

impl Default for Chart {
    fn default() -> Self {
        Self::new(ChartOptions::default())
    }
}
