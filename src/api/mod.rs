use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    routing::get,
    Router,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::dashboard::fetch::Fetch;
use crate::dashboard::page::PageRenderer;
use crate::dashboard::Dashboard;
use crate::fetcher::ApiClient;

pub mod handlers;

/// Shared state of the dashboard server.
///
/// The mutex guards view state only. Backend calls run on `client`
/// with the lock released, so a slow backend never blocks page renders.
pub struct AppState {
    pub dashboard: Mutex<Dashboard>,
    pub client: ApiClient,
    pub pages: PageRenderer,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Result<Self, tera::Error> {
        Ok(Self {
            client: dashboard.client().clone(),
            dashboard: Mutex::new(dashboard),
            pages: PageRenderer::new()?,
        })
    }

    /// Run fetches planned under the lock, re-locking only to apply each
    /// answer. Superseded answers are dropped by the dashboard.
    pub async fn execute(&self, fetches: impl IntoIterator<Item = Fetch>) {
        for fetch in fetches {
            let done = fetch.run(&self.client).await;
            self.dashboard.lock().await.complete(done);
        }
    }
}

/// Build the dashboard router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/chart.svg", get(handlers::chart_svg))
        .route("/reload", get(handlers::reload))
        .route("/select", get(handlers::select_process))
        .route("/file", get(handlers::click_file))
        .route("/filters", get(handlers::set_filters))
        .route("/query", get(handlers::change_query_type))
        .route("/page/prev", get(handlers::prev_page))
        .route("/page/next", get(handlers::next_page))
        .route("/zoom", get(handlers::zoom))
        .route("/zoom/reset", get(handlers::reset_zoom))
        .route("/wheel", get(handlers::wheel))
        .route("/pan", get(handlers::pan))
        .route("/hover", get(handlers::hover))
        .route("/leave", get(handlers::leave))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(handlers::readiness_check))
        .fallback(fallback_404)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: tags every response with a unique X-Request-Id so page
/// interactions can be matched to log lines.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

async fn security_headers_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    // Every page reflects live dashboard state.
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    headers.remove("Server");

    resp
}
