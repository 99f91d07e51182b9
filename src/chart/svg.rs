//! Chart drawing on plotters' SVG backend.
//!
//! The x coordinate is the visible (zoom-rescaled) time domain in epoch µs,
//! with mesh lines at the time-axis ticks. The y coordinate is the inner
//! height in pixels, flipped so band centers land where the band scale
//! puts them.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::axis::TICK_FORMAT;
use super::Chart;
use crate::models::format_micros;

pub const TITLE: &str = "File Access Patterns Tracing";
pub const X_LABEL: &str = "time (UTC)";
pub const Y_LABEL: &str = "event (operand/operation)";

pub const MARKER_COLOR: RGBColor = RGBColor(0xe4, 0x72, 0x08);
/// steelblue
const BACKGROUND: RGBColor = RGBColor(70, 130, 180);
const SEGMENT_WIDTH: u32 = 7;

type DrawResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Parse a `#rrggbb` palette entry; malformed channels read as 0.
pub fn hex_color(hex: &str) -> RGBColor {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    RGBColor(channel(0), channel(2), channel(4))
}

pub fn write_chart(chart: &Chart) -> String {
    let opts = chart.options();
    let size = (opts.width.round() as u32, opts.height.round() as u32);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        if let Err(e) = draw(chart, &root).and_then(|_| root.present()) {
            tracing::error!("chart drawing failed: {}", e);
        }
    }
    svg
}

/// Visible time domain, widened around a single instant so plotters
/// never sees an empty range.
fn visible_domain(chart: &Chart) -> (f64, f64) {
    let (d0, d1) = chart.x().domain();
    if d1 > d0 {
        (d0, d1)
    } else {
        (d0 - 0.5, d0 + 0.5)
    }
}

fn row_label(rows: &[(f64, String)], y: f64) -> String {
    rows.iter()
        .find(|(row, _)| (row - y).abs() < 0.5)
        .map(|(_, name)| name.clone())
        .unwrap_or_default()
}

fn draw(chart: &Chart, root: &DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult {
    let opts = chart.options();
    let m = opts.margin;
    let ih = opts.inner_height();
    root.fill(&WHITE)?;

    let (d0, d1) = visible_domain(chart);
    let x_ticks: Vec<f64> = chart
        .x_ticks()
        .into_iter()
        .map(|t| t.value)
        .filter(|t| (d0..=d1).contains(t))
        .collect();
    let x_count = x_ticks.len().max(1);
    let rows: Vec<(f64, String)> = chart
        .y_ticks()
        .into_iter()
        .map(|t| (ih - t.value, t.label))
        .collect();
    let y_count = rows.len().max(1);

    let mut ctx = ChartBuilder::on(root)
        .margin_top(m.top as u32)
        .margin_right(m.right as u32)
        .x_label_area_size(m.bottom as u32)
        .y_label_area_size(m.left as u32)
        .build_cartesian_2d(
            (d0..d1).with_key_points(x_ticks),
            (0.0..ih).with_key_points(rows.iter().map(|(y, _)| *y).collect()),
        )?;

    ctx.plotting_area().fill(&BACKGROUND.mix(0.1))?;

    ctx.configure_mesh()
        .x_labels(x_count)
        .y_labels(y_count)
        .bold_line_style(&BLACK.mix(0.15))
        .label_style(("sans-serif", 10))
        .x_label_formatter(&|t| format_micros(t.round() as i64, TICK_FORMAT))
        .y_label_formatter(&|y| row_label(&rows, *y))
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .draw()?;

    let marker_style = ShapeStyle::from(&MARKER_COLOR).stroke_width(2);
    ctx.draw_series(
        chart
            .marker_lines()
            .into_iter()
            .map(|line| line.time as f64)
            .filter(|t| (d0..=d1).contains(t))
            .map(|t| PathElement::new(vec![(t, 0.0), (t, ih)], marker_style)),
    )?;

    // Segments are clipped to the visible domain.
    ctx.draw_series(chart.segments().into_iter().filter_map(|seg| {
        let (start, end) = (seg.start as f64, seg.end as f64);
        if end < d0 || start > d1 {
            return None;
        }
        let y = ih - seg.y;
        let style = ShapeStyle::from(&hex_color(seg.color).mix(0.95)).stroke_width(SEGMENT_WIDTH);
        Some(PathElement::new(
            vec![(start.max(d0), y), (end.min(d1), y)],
            style,
        ))
    }))?;

    let title = TextStyle::from(("sans-serif", 18).into_font().style(FontStyle::Bold))
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(
        TITLE,
        ((opts.width / 2.0) as i32, (m.top / 2.0) as i32),
        title,
    ))?;

    Ok(())
}
