use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracelens::chart::Chart;
use tracelens::cli::{self, Commands};
use tracelens::config::{self, Config};
use tracelens::dashboard::Dashboard;
use tracelens::fetcher::{ApiClient, EventQuery, FilesQuery};
use tracelens::models::{parse_time, Marker};
use tracelens::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let cfg = config::load()?;
    init_tracing(cfg.json_logs);

    let result = match args.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(Commands::Render {
            output,
            proc,
            fname,
            hunk,
            rmstd,
            markers,
        }) => {
            let query = proc.map(|p| EventQuery {
                proc_name: p,
                fname,
                hunk,
                remove_stds: rmstd,
            });
            render_to_file(&cfg, query, &markers, &output).await
        }
        Some(Commands::Procs) => list_procs(&cfg).await,
        Some(Commands::Files {
            query_type,
            proc,
            page,
            hunk,
            rmstd,
            desc,
        }) => {
            let query = FilesQuery {
                query_type,
                page,
                proc_name: proc,
                hunk,
                remove_stds: rmstd,
                descending: desc,
            };
            print_files(&cfg, &query).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tracelens=debug,tower_http=debug".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn client(cfg: &Config) -> anyhow::Result<ApiClient> {
    ApiClient::new(&cfg.api_url, cfg.request_timeout)
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new(client(&cfg)?, cfg.chart_options(), cfg.markers.clone());

    tracing::info!("Loading initial dataset from {}...", cfg.api_url);
    dashboard.load().await;
    if !dashboard.alerts().is_empty() {
        tracing::warn!("Backend not fully reachable at startup; the page will show the errors");
    }

    let state = Arc::new(AppState::new(dashboard)?);
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("tracelens dashboard listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn render_to_file(
    cfg: &Config,
    query: Option<EventQuery>,
    extra_markers: &[String],
    output: &std::path::Path,
) -> anyhow::Result<()> {
    let client = client(cfg)?;
    let events = match &query {
        Some(q) => client.io_events(q).await?,
        None => client.events().await?,
    };

    let mut markers = cfg.markers.clone();
    for m in extra_markers {
        parse_time(m).with_context(|| format!("invalid --marker '{}'", m))?;
        markers.push(Marker::new(m.as_str()));
    }

    let mut chart = Chart::new(cfg.chart_options());
    let drawn = chart.render(&events, &markers);
    std::fs::write(output, chart.to_svg())
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote {} ({} of {} events, {} markers)",
        output.display(),
        drawn,
        events.len(),
        markers.len()
    );
    Ok(())
}

async fn list_procs(cfg: &Config) -> anyhow::Result<()> {
    let procs = client(cfg)?.procs().await?;
    if procs.is_empty() {
        println!("No traced processes.");
    }
    for p in procs {
        println!("{}", p);
    }
    Ok(())
}

async fn print_files(cfg: &Config, query: &FilesQuery) -> anyhow::Result<()> {
    let resp = client(cfg)?.files(query).await?;
    println!("{:<60} {:>16}", "FILE", query.query_type.as_str().to_uppercase());
    for row in &resp.data {
        println!("{:<60} {:>16}", row.fname, row.display_value());
    }
    println!("Page {} of {}", resp.page, resp.total_pages);
    Ok(())
}
