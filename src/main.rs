//! quakemap - Recent earthquakes on an interactive map.
//!
//! Fetches the USGS earthquake feed (and optionally the PB2002 tectonic
//! plate boundaries), sizes each event by magnitude and colors it by depth,
//! and writes a standalone Leaflet page or prints the classified markers.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

mod bounds;
mod classify;
mod cli;
mod client;
mod errors;
mod models;
mod output;
mod pipeline;
mod render;

use cli::{Cli, Command};
use client::FeedClient;
use render::LeafletPage;

/// Title of the generated page.
const PAGE_TITLE: &str = "Earthquakes - Past Week";

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

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    match cli.command {
        Command::Render(args) => runtime.block_on(cmd_render(args)),
        Command::Markers(args) => runtime.block_on(cmd_markers(args)),
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

/// Execute the `render` command - fetch, classify and write the map page.
async fn cmd_render(args: cli::RenderArgs) -> Result<()> {
    let config = args.pipeline_config();
    let client = FeedClient::new(
        config.earthquake_url.clone(),
        config.plates_url.clone(),
        args.feed.timeout(),
    )
    .context("failed to create feed client")?;

    let mut page = LeafletPage::new(PAGE_TITLE);
    pipeline::render(&client, &config, &mut page)
        .await
        .context("failed to render earthquake map")?;

    let html = page.into_html();
    if args.output == Path::new("-") {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(html.as_bytes())?;
        handle.flush()?;
    } else {
        fs::write(&args.output, html)
            .with_context(|| format!("failed to write {}", args.output.display()))?;
        info!("wrote {}", args.output.display());
    }

    Ok(())
}

/// Execute the `markers` command - print classified events.
async fn cmd_markers(args: cli::MarkersArgs) -> Result<()> {
    let config = args.pipeline_config();
    let client = FeedClient::new(
        config.earthquake_url.clone(),
        config.plates_url.clone(),
        args.feed.timeout(),
    )
    .context("failed to create feed client")?;

    let mut loaded = pipeline::load_events(&client, &config)
        .await
        .context("failed to fetch earthquake feed")?;

    // Limit results
    loaded.events.truncate(args.limit);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &loaded.events, args.format)?;

    Ok(())
}
