//! Backend requests planned by the dashboard.
//!
//! The dashboard plans a `Fetch` and later applies its `Completed` result.
//! Running it needs only an `ApiClient`, so the server awaits the backend
//! without holding the dashboard lock.

use crate::fetcher::{ApiClient, EventQuery, FetchError, FilesQuery};
use crate::models::{Event, PageResponse};

/// A request to issue. `seq` orders requests of the same kind; only the
/// most recently issued one is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    Procs {
        seq: u64,
    },
    /// `scope: None` is the initial, unscoped dataset.
    Chart {
        seq: u64,
        scope: Option<EventQuery>,
    },
    Report {
        seq: u64,
        query: FilesQuery,
    },
}

#[derive(Debug)]
pub enum Completed {
    Procs {
        seq: u64,
        result: Result<Vec<String>, FetchError>,
    },
    Chart {
        seq: u64,
        result: Result<Vec<Event>, FetchError>,
    },
    Report {
        seq: u64,
        query: FilesQuery,
        result: Result<PageResponse, FetchError>,
    },
}

impl Fetch {
    pub async fn run(self, client: &ApiClient) -> Completed {
        match self {
            Fetch::Procs { seq } => Completed::Procs {
                seq,
                result: client.procs().await,
            },
            Fetch::Chart { seq, scope } => {
                let result = match &scope {
                    Some(query) => client.io_events(query).await,
                    None => client.events().await,
                };
                Completed::Chart { seq, result }
            }
            Fetch::Report { seq, query } => {
                let result = client.files(&query).await;
                Completed::Report { seq, query, result }
            }
        }
    }
}

/// Latest sequence number issued per request kind.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Issued {
    pub procs: u64,
    pub chart: u64,
    pub report: u64,
}
