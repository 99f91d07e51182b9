use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Aggregate reports offered by `/api/files/{type}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    Count,
    Bytes,
    Duration,
}

impl QueryType {
    pub const ALL: [QueryType; 3] = [QueryType::Count, QueryType::Bytes, QueryType::Duration];

    /// Path segment used in `/api/files/{type}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Count => "count",
            QueryType::Bytes => "bytes",
            QueryType::Duration => "duration",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(QueryType::Count),
            "bytes" => Ok(QueryType::Bytes),
            "duration" => Ok(QueryType::Duration),
            other => Err(format!("unknown query type '{}'", other)),
        }
    }
}

/// One row of a per-file aggregate report.
///
/// The backend names the value column after the aggregate, so every
/// known column name is accepted as `value`. Sums over all-null columns
/// (bytes of `open` calls, say) arrive as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    pub fname: String,
    #[serde(default, alias = "count", alias = "total_bytes", alias = "total_duration")]
    pub value: Option<f64>,
}

impl QueryRow {
    /// Cell text of the value column; empty when the aggregate is null.
    pub fn display_value(&self) -> String {
        self.value.map(|v| v.to_string()).unwrap_or_default()
    }
}

/// A page of aggregate rows plus the server's paging cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    pub data: Vec<QueryRow>,
    pub page: u32,
    pub total_pages: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u32>,
}
