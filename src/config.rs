use std::time::Duration;

use crate::chart::ChartOptions;
use crate::models::{parse_time, Marker};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the trace backend API.
    pub api_url: String,
    pub chart_width: f64,
    pub chart_height: f64,
    pub sort_categories: bool,
    /// Reference lines drawn on every chart.
    pub markers: Vec<Marker>,
    /// Backend request timeout. `None` = wait indefinitely.
    pub request_timeout: Option<Duration>,
    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Config {
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            width: self.chart_width,
            height: self.chart_height,
            sort_categories: self.sort_categories,
            ..ChartOptions::default()
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build the config from any key lookup (the environment in production).
pub fn from_lookup<F>(get: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let api_url = get("TRACELENS_API_URL").unwrap_or_else(|| "http://127.0.0.1:5050".into());
    url::Url::parse(&api_url)
        .map_err(|e| anyhow::anyhow!("TRACELENS_API_URL '{}' is not a valid URL: {}", api_url, e))?;

    let defaults = ChartOptions::default();
    let chart_width = get("TRACELENS_CHART_WIDTH")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.width);
    let chart_height = get("TRACELENS_CHART_HEIGHT")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.height);
    let m = defaults.margin;
    if chart_width <= m.left + m.right || chart_height <= m.top + m.bottom {
        anyhow::bail!(
            "chart size {}x{} leaves no room inside the {}px/{}px margins",
            chart_width,
            chart_height,
            m.left + m.right,
            m.top + m.bottom
        );
    }

    let markers = get("TRACELENS_MARKERS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| -> anyhow::Result<Marker> {
            parse_time(s)?;
            Ok(Marker::new(s))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Config {
        port: get("TRACELENS_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080),
        api_url,
        chart_width,
        chart_height,
        sort_categories: get("TRACELENS_SORT_CATEGORIES")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true),
        markers,
        request_timeout: get("TRACELENS_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|&secs: &u64| secs > 0)
            .map(Duration::from_secs),
        json_logs: get("TRACELENS_LOG_FORMAT").as_deref() == Some("json"),
    })
}
