use super::scale::{BandScale, TimeScale};
use crate::models::format_micros;

/// Number of ticks requested from the time axis.
pub const TIME_TICKS: usize = 10;

/// `HH:MM:SS.ffffff`
pub const TICK_FORMAT: &str = "%H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Axis value: epoch µs on the time axis, band center on the category axis.
    pub value: f64,
    /// Pixel offset along the axis.
    pub position: f64,
    pub label: String,
}

/// Ticks of the bottom time axis under the given (possibly rescaled) scale.
pub fn time_ticks(scale: &TimeScale) -> Vec<Tick> {
    scale
        .ticks(TIME_TICKS)
        .into_iter()
        .map(|t| Tick {
            value: t,
            position: scale.scale(t),
            label: format_micros(t.round() as i64, TICK_FORMAT),
        })
        .collect()
}

/// One tick per category, centered in its band.
pub fn band_ticks(scale: &BandScale) -> Vec<Tick> {
    scale
        .domain()
        .iter()
        .filter_map(|name| {
            scale.center(name).map(|position| Tick {
                value: position,
                position,
                label: name.clone(),
            })
        })
        .collect()
}
