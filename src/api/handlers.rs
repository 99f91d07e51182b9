use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::QueryType;
use crate::query_panel::Filters;
use crate::AppState;

// ── Request DTOs ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SelectParams {
    pub proc: Option<String>,
}

#[derive(Deserialize)]
pub struct FileParams {
    pub fname: String,
}

/// HTML checkboxes are only sent when checked, usually as `on`.
#[derive(Deserialize)]
pub struct FilterParams {
    pub hunk: Option<String>,
    pub remove_stds: Option<String>,
    pub reverse_order: Option<String>,
}

impl FilterParams {
    fn to_filters(&self) -> Filters {
        Filters {
            hunk: checked(self.hunk.as_deref()),
            remove_stds: checked(self.remove_stds.as_deref()),
            reverse_order: checked(self.reverse_order.as_deref()),
        }
    }
}

fn checked(value: Option<&str>) -> bool {
    match value {
        Some(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "off" | "0"),
        None => false,
    }
}

#[derive(Deserialize)]
pub struct QueryTypeParams {
    #[serde(rename = "type")]
    pub query_type: String,
}

#[derive(Deserialize)]
pub struct ZoomParams {
    pub factor: f64,
    /// Pointer x in chart pixels; defaults to the chart center.
    pub at: Option<f64>,
}

#[derive(Deserialize)]
pub struct WheelParams {
    pub delta: f64,
    pub at: Option<f64>,
}

#[derive(Deserialize)]
pub struct PanParams {
    pub dx: f64,
}

#[derive(Deserialize)]
pub struct HoverParams {
    pub segment: usize,
    pub x: f64,
    pub y: f64,
}

fn finite(name: &str, v: f64) -> Result<f64, AppError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(AppError::BadRequest(format!("{} must be a finite number", name)))
    }
}

fn back() -> Redirect {
    Redirect::to("/")
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /: the dashboard page
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let mut dashboard = state.dashboard.lock().await;
    let page = state.pages.render(&mut dashboard)?;
    Ok(Html(page))
}

/// GET /chart.svg: the current chart as a standalone document
pub async fn chart_svg(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let svg = state.dashboard.lock().await.chart().to_svg();
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg)
}

/// GET /reload: redo the page-load fetches
pub async fn reload(State(state): State<Arc<AppState>>) -> Redirect {
    let fetches = state.dashboard.lock().await.plan_load();
    state.execute(fetches).await;
    back()
}

/// GET /select?proc=: radio change
pub async fn select_process(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SelectParams>,
) -> Result<Redirect, AppError> {
    let Some(name) = params.proc.filter(|p| !p.is_empty()) else {
        return Ok(back());
    };
    let Some(fetches) = state.dashboard.lock().await.plan_select(&name) else {
        return Err(AppError::UnknownProcess(name));
    };
    state.execute(fetches).await;
    Ok(back())
}

/// GET /file?fname=: report row click
pub async fn click_file(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> Redirect {
    let fetch = state.dashboard.lock().await.plan_file_click(&params.fname);
    state.execute(fetch).await;
    back()
}

/// GET /filters: checkbox change
pub async fn set_filters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Redirect {
    let filters = params.to_filters();
    let fetches = state.dashboard.lock().await.plan_filters(filters);
    state.execute(fetches).await;
    back()
}

/// GET /query?type=: report type dropdown change
pub async fn change_query_type(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryTypeParams>,
) -> Result<Redirect, AppError> {
    let query_type: QueryType = params.query_type.parse().map_err(AppError::BadRequest)?;
    let fetch = state.dashboard.lock().await.plan_query_type(query_type);
    state.execute(fetch).await;
    Ok(back())
}

/// GET /page/prev
pub async fn prev_page(State(state): State<Arc<AppState>>) -> Redirect {
    let fetch = state.dashboard.lock().await.plan_prev_page();
    state.execute(fetch).await;
    back()
}

/// GET /page/next
pub async fn next_page(State(state): State<Arc<AppState>>) -> Redirect {
    let fetch = state.dashboard.lock().await.plan_next_page();
    state.execute(fetch).await;
    back()
}

/// GET /zoom?factor=&at=: scale the time axis around a pointer
pub async fn zoom(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ZoomParams>,
) -> Result<Redirect, AppError> {
    let factor = finite("factor", params.factor)?;
    if factor <= 0.0 {
        return Err(AppError::BadRequest("factor must be positive".into()));
    }
    let mut dashboard = state.dashboard.lock().await;
    let at = match params.at {
        Some(at) => finite("at", at)?,
        None => dashboard.chart().options().inner_width() / 2.0,
    };
    let t = dashboard.zoom_by(factor, at);
    tracing::debug!(k = t.k, x = t.x, "zoomed");
    Ok(back())
}

/// GET /wheel?delta=&at=: mouse wheel over the chart
pub async fn wheel(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WheelParams>,
) -> Result<Redirect, AppError> {
    let delta = finite("delta", params.delta)?;
    let mut dashboard = state.dashboard.lock().await;
    let at = match params.at {
        Some(at) => finite("at", at)?,
        None => dashboard.chart().options().inner_width() / 2.0,
    };
    dashboard.wheel(delta, at);
    Ok(back())
}

/// GET /pan?dx=: drag the time axis
pub async fn pan(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PanParams>,
) -> Result<Redirect, AppError> {
    let dx = finite("dx", params.dx)?;
    state.dashboard.lock().await.pan(dx);
    Ok(back())
}

/// GET /zoom/reset
pub async fn reset_zoom(State(state): State<Arc<AppState>>) -> Redirect {
    state.dashboard.lock().await.reset_zoom();
    back()
}

/// GET /hover?segment=&x=&y=: pointer over an event segment
pub async fn hover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HoverParams>,
) -> Result<Redirect, AppError> {
    let (x, y) = (finite("x", params.x)?, finite("y", params.y)?);
    let mut dashboard = state.dashboard.lock().await;
    if dashboard.hover(params.segment, x, y).is_none() {
        return Err(AppError::BadRequest(format!(
            "no segment {} in the current chart",
            params.segment
        )));
    }
    Ok(back())
}

/// GET /leave: pointer left the segment
pub async fn leave(State(state): State<Arc<AppState>>) -> Redirect {
    state.dashboard.lock().await.leave();
    back()
}

/// GET /readyz: dashboard is up and the backend answers
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> Result<&'static str, AppError> {
    state.client.healthz().await?;
    Ok("ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_values() {
        assert!(checked(Some("on")));
        assert!(checked(Some("true")));
        assert!(checked(Some("")));
        assert!(!checked(Some("off")));
        assert!(!checked(Some("False")));
        assert!(!checked(None));
    }
}
