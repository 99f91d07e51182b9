//! HTTP client for the trace backend API.
//!
//! One best-effort GET per call: no retries, no caching, no backoff.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::models::{Event, PageResponse, QueryType};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parameters of `/api/events/io`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub proc_name: String,
    pub fname: Option<String>,
    /// Hide events on unknown files.
    pub hunk: bool,
    /// Drop std streams / outliers.
    pub remove_stds: bool,
}

impl EventQuery {
    pub fn for_proc(proc_name: impl Into<String>) -> Self {
        Self {
            proc_name: proc_name.into(),
            ..Self::default()
        }
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("proc", self.proc_name.clone()),
            ("fname", self.fname.clone().unwrap_or_default()),
            ("hunk", self.hunk.to_string()),
            ("rmstd", self.remove_stds.to_string()),
        ]
    }
}

/// Parameters of `/api/files/{type}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilesQuery {
    pub query_type: QueryType,
    pub page: u32,
    pub proc_name: String,
    pub hunk: bool,
    pub remove_stds: bool,
    pub descending: bool,
}

impl FilesQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("proc", self.proc_name.clone()),
            ("hunk", self.hunk.to_string()),
            ("rmstd", self.remove_stds.to_string()),
            ("desc", self.descending.to_string()),
        ]
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// `timeout` of `None` lets a hung request wait indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(5));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET /api/events: the initial, unscoped dataset.
    pub async fn events(&self) -> Result<Vec<Event>, FetchError> {
        self.get_json("/api/events", &[]).await
    }

    /// GET /api/events/io: events of one process, optionally one file.
    pub async fn io_events(&self, query: &EventQuery) -> Result<Vec<Event>, FetchError> {
        self.get_json("/api/events/io", &query.pairs()).await
    }

    /// GET /api/events/procs: names of every traced process.
    pub async fn procs(&self) -> Result<Vec<String>, FetchError> {
        self.get_json("/api/events/procs", &[]).await
    }

    /// GET /api/files/{type}: one page of a per-file aggregate.
    pub async fn files(&self, query: &FilesQuery) -> Result<PageResponse, FetchError> {
        let path = format!("/api/files/{}", query.query_type.as_str());
        self.get_json(&path, &query.pairs()).await
    }

    /// GET /healthz on the backend.
    pub async fn healthz(&self) -> Result<(), FetchError> {
        let url = self.base_url.join("/healthz")?;
        let resp = self.send(url.clone(), &[]).await?;
        check_status(&url, resp.status())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let url = self.base_url.join(path)?;
        let resp = self.send(url.clone(), params).await?;
        check_status(&url, resp.status())?;

        let body = resp.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn send(
        &self,
        url: Url,
        params: &[(&'static str, String)],
    ) -> Result<reqwest::Response, FetchError> {
        tracing::debug!(url = %url, ?params, "backend request");
        self.client
            .get(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|source| {
                tracing::warn!("backend request to {} failed: {}", url, source);
                FetchError::Request {
                    url: url.to_string(),
                    source,
                }
            })
    }
}

fn check_status(url: &Url, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status,
        })
    }
}
