//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use clap::{Args, Parser, Subcommand};

use crate::client::{FeedType, OrderBy};
use crate::output::Format;

/// Earthquake list viewer for USGS feeds.
#[derive(Parser, Debug)]
#[command(name = "quakereport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a feed and list its earthquakes
    List(ListArgs),

    /// Query the USGS event service and list the results
    Query(QueryArgs),

    /// Serve the list as a web page
    Ui(UiArgs),
}

/// Where to load earthquakes from.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Feed URL (GeoJSON); takes precedence over --feed
    #[arg(long)]
    pub url: Option<String>,

    /// USGS summary feed to load when no URL is given
    #[arg(long, default_value = "all_day", value_parser = parse_feed_type)]
    pub feed: FeedType,
}

impl SourceArgs {
    /// The URL to hand to the loader.
    #[must_use]
    pub fn resolve(&self) -> String {
        self.url.clone().unwrap_or_else(|| self.feed.url())
    }
}

/// How to render the list.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Maximum number of rows to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,

    /// Show dates and times in UTC instead of local time
    #[arg(long)]
    pub utc: bool,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Arguments for the `query` command.
#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Minimum magnitude
    #[arg(long, default_value = "6")]
    pub min_magnitude: f64,

    /// Maximum results to request
    #[arg(long, default_value = "10")]
    pub max_results: usize,

    /// Result order: time, time-asc, magnitude, magnitude-asc
    #[arg(long, default_value = "time", value_parser = parse_order_by)]
    pub order_by: OrderBy,

    /// Start date (YYYY-MM-DD or ISO8601)
    #[arg(long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD or ISO8601)
    #[arg(long)]
    pub end: Option<String>,

    /// Service base URL
    #[arg(long, default_value = crate::client::USGS_BASE_URL)]
    pub base_url: String,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Arguments for the `ui` command.
#[derive(Parser, Debug)]
pub struct UiArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Parse a feed type from string.
fn parse_feed_type(s: &str) -> Result<FeedType, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a query order from string.
fn parse_order_by(s: &str) -> Result<OrderBy, String> {
    s.parse()
}
