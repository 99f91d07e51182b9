//! tracelens: timeline dashboard for process I/O event traces.
//!
//! Library crate shared by the `tracelens` binary and the integration
//! tests in `tests/`.

pub mod api;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod notification;
pub mod query_panel;
pub mod selector;

pub use api::AppState;
