//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::client::{DEFAULT_PLATES_URL, FeedType};
use crate::output::Format;
use crate::pipeline::PipelineConfig;
use crate::render::TileProvider;

/// Render recent earthquakes on an interactive map.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
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
    /// Fetch the feeds and write a Leaflet map page
    Render(RenderArgs),

    /// Fetch the earthquake feed and print classified markers
    Markers(MarkersArgs),
}

/// Where and how to fetch the earthquake feed.
#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Summary feed to fetch
    #[arg(long, default_value = "all_week", value_parser = parse_feed_type)]
    pub feed: FeedType,

    /// Full earthquake feed URL (overrides --feed)
    #[arg(long)]
    pub quake_url: Option<String>,

    /// Fail on the first malformed feature instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Per-request timeout in seconds (default: wait indefinitely)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl FeedArgs {
    /// Earthquake feed URL after applying the override.
    #[must_use]
    pub fn earthquake_url(&self) -> String {
        self.quake_url.clone().unwrap_or_else(|| self.feed.url())
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Arguments for the `render` command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Overlay tectonic plate boundaries
    #[arg(long)]
    pub plates: bool,

    /// Plate boundary GeoJSON URL
    #[arg(long, default_value = DEFAULT_PLATES_URL)]
    pub plates_url: String,

    /// Background tiles
    #[arg(long, default_value = "street", value_parser = parse_tile_provider)]
    pub tiles: TileProvider,

    /// Output file, or `-` for stdout
    #[arg(long, short = 'o', default_value = "map.html")]
    pub output: PathBuf,
}

impl RenderArgs {
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            earthquake_url: self.feed.earthquake_url(),
            plates_url: self.plates_url.clone(),
            overlay_plates: self.plates,
            tile_provider: self.tiles,
            strict: self.feed.strict,
        }
    }
}

/// Arguments for the `markers` command.
#[derive(Args, Debug)]
pub struct MarkersArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

impl MarkersArgs {
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            earthquake_url: self.feed.earthquake_url(),
            strict: self.feed.strict,
            ..PipelineConfig::default()
        }
    }
}

/// Parse a feed type from string.
fn parse_feed_type(s: &str) -> Result<FeedType, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a tile provider from string.
fn parse_tile_provider(s: &str) -> Result<TileProvider, String> {
    s.parse()
}
