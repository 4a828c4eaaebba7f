//! quakereport - earthquake list viewer.
//!
//! Loads a GeoJSON earthquake feed and shows one row per event with a
//! magnitude-colored badge, the split location, and local date and time.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing::{debug, error};

mod cli;
mod client;
mod errors;
mod loader;
mod models;
mod output;
mod presenter;
mod server;

use cli::{Cli, Command, RenderArgs};
use client::{EarthquakeSource, EventQuery, FeedClient};
use loader::EarthquakeLoader;
use models::Earthquake;
use presenter::{EarthquakeAdapter, Palette};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // The blocking HTTP client must be created and dropped outside the runtime
    let client: Arc<dyn EarthquakeSource> =
        Arc::new(FeedClient::new().context("failed to create feed client")?);

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;

    match cli.command {
        Command::List(args) => {
            let url = args.source.resolve();
            runtime.block_on(cmd_list(Arc::clone(&client), url, &args.render))
        }
        Command::Query(args) => {
            let query = EventQuery {
                min_magnitude: Some(args.min_magnitude),
                limit: args.max_results,
                order_by: args.order_by,
                start: args.start,
                end: args.end,
            };
            let url = query
                .to_url(&args.base_url)
                .context("failed to build query URL")?;
            runtime.block_on(cmd_list(Arc::clone(&client), url, &args.render))
        }
        Command::Ui(args) => {
            let config = server::ServerConfig {
                port: args.port,
                host: args.host.clone(),
                url: Some(args.source.resolve()),
            };
            cmd_ui(&runtime, Arc::clone(&client), config)
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `list` and `query` commands - one load cycle, then render.
async fn cmd_list(source: Arc<dyn EarthquakeSource>, url: String, render: &RenderArgs) -> Result<()> {
    let quakes = load_list(source, url, render.limit).await?;
    write_list(quakes, render)
}

/// Run one load cycle and keep at most `limit` records.
///
/// State transitions are logged at debug level while the fetch runs.
async fn load_list(
    source: Arc<dyn EarthquakeSource>,
    url: String,
    limit: usize,
) -> Result<Vec<Earthquake>> {
    let loader = EarthquakeLoader::new(source, Some(url));
    debug!("loading {}", loader.url().unwrap_or("nothing"));

    let mut states = loader.subscribe();
    let progress = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            debug!("load state: {:?}", *states.borrow_and_update());
        }
    });

    let result = loader.load().await;
    debug!("load cycle ended in state {:?}", loader.state());

    // Closing the sender ends the progress task
    drop(loader);
    let _ = progress.await;

    let mut quakes = result.context("failed to load earthquake feed")?;
    quakes.truncate(limit);
    Ok(quakes)
}

/// Render a loaded list to stdout in the requested timezone.
fn write_list(quakes: Vec<Earthquake>, render: &RenderArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if render.utc {
        let adapter = EarthquakeAdapter::new(quakes, Palette::default(), Utc);
        output::write_events(&mut handle, &adapter, render.format)?;
    } else {
        let adapter = EarthquakeAdapter::new(quakes, Palette::default(), Local);
        output::write_events(&mut handle, &adapter, render.format)?;
    }

    Ok(())
}

/// Execute the `ui` command - start web server.
fn cmd_ui(
    runtime: &tokio::runtime::Runtime,
    source: Arc<dyn EarthquakeSource>,
    config: server::ServerConfig,
) -> Result<()> {
    let url = format!("http://{}:{}", config.host, config.port);
    println!("\x1b[1mquakereport Web UI\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Feed:    {}", config.url.as_deref().unwrap_or("none"));
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    let state = server::AppState::new(source, Palette::default(), config);
    runtime.block_on(server::run_server(state))
}
