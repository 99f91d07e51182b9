use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::QueryType;

/// tracelens: timeline dashboard for process I/O traces
#[derive(Parser)]
#[command(name = "tracelens", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard server
    Serve {
        /// Port to bind (defaults to TRACELENS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch events and write the timeline chart as SVG
    Render {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        /// Process to chart; without it the initial dataset is used
        #[arg(long)]
        proc: Option<String>,
        /// Restrict to one file (requires --proc)
        #[arg(long, requires = "proc")]
        fname: Option<String>,
        /// Hide events on unknown files
        #[arg(long)]
        hunk: bool,
        /// Remove std streams
        #[arg(long)]
        rmstd: bool,
        /// Extra reference line (repeatable), e.g. "2024-01-01 12:00:00.000000"
        #[arg(long = "marker")]
        markers: Vec<String>,
    },

    /// List traced processes
    Procs,

    /// Print one page of a per-file aggregate report
    Files {
        #[arg(long = "type", default_value = "count")]
        query_type: QueryType,
        #[arg(long)]
        proc: String,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long)]
        hunk: bool,
        #[arg(long)]
        rmstd: bool,
        /// Largest values first
        #[arg(long)]
        desc: bool,
    },
}
