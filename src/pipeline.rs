//! The render pipeline: fetch, validate, frame, classify, draw.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bounds;
use crate::client::{DEFAULT_PLATES_URL, FeedSource, FeedType};
use crate::errors::QuakemapError;
use crate::models::{EarthquakeEvent, FeatureCollection};
use crate::render::{Legend, MapSurface, Marker, PlateStyle, TileProvider};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub earthquake_url: String,
    pub plates_url: String,
    /// Fetch and draw plate boundaries
    pub overlay_plates: bool,
    pub tile_provider: TileProvider,
    /// Abort on the first malformed feature instead of skipping it
    pub strict: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            earthquake_url: FeedType::default().url(),
            plates_url: DEFAULT_PLATES_URL.to_string(),
            overlay_plates: false,
            tile_provider: TileProvider::default(),
            strict: false,
        }
    }
}

/// Validated events plus the count of features that were dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadedEvents {
    pub events: Vec<EarthquakeEvent>,
    pub skipped: usize,
}

/// What a successful render drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSummary {
    pub markers: usize,
    pub skipped: usize,
    pub plates: bool,
}

/// Turn a feed into validated events according to the strictness policy.
///
/// # Errors
///
/// In strict mode, returns the first malformed-feature error.
pub fn parse_events(feed: &FeatureCollection, strict: bool) -> Result<LoadedEvents, QuakemapError> {
    let mut loaded = LoadedEvents::default();
    for result in feed.events() {
        match result {
            Ok(event) => loaded.events.push(event),
            Err(e) if strict => return Err(e),
            Err(e) => {
                warn!("skipping feature: {e}");
                loaded.skipped += 1;
            }
        }
    }
    Ok(loaded)
}

/// Fetch and validate only the earthquake feed.
///
/// # Errors
///
/// Returns an error if the fetch fails, or on malformed features in strict
/// mode.
pub async fn load_events<S: FeedSource>(
    source: &S,
    config: &PipelineConfig,
) -> Result<LoadedEvents, QuakemapError> {
    let feed = source.fetch_earthquakes().await?;
    parse_events(&feed, config.strict)
}

/// Fetch everything the map needs. With the overlay enabled both requests
/// run concurrently and both must succeed.
async fn fetch_all<S: FeedSource>(
    source: &S,
    config: &PipelineConfig,
) -> Result<(FeatureCollection, Option<Value>), QuakemapError> {
    if config.overlay_plates {
        let (feed, plates) = tokio::try_join!(source.fetch_earthquakes(), source.fetch_plates())?;
        Ok((feed, Some(plates)))
    } else {
        Ok((source.fetch_earthquakes().await?, None))
    }
}

/// Run the full pipeline into `surface`.
///
/// The surface is untouched unless every fetch and parse step succeeded.
///
/// # Errors
///
/// Returns an error if either feed cannot be fetched or parsed, or on
/// malformed features in strict mode.
pub async fn render<S: FeedSource, M: MapSurface>(
    source: &S,
    config: &PipelineConfig,
    surface: &mut M,
) -> Result<RenderSummary, QuakemapError> {
    let (feed, plates) = fetch_all(source, config).await?;
    let loaded = parse_events(&feed, config.strict)?;
    debug!(
        events = loaded.events.len(),
        skipped = loaded.skipped,
        "parsed earthquake feed"
    );

    surface.fit_view(&bounds::initial_view(&loaded.events));
    surface.add_tile_layer(config.tile_provider);

    for event in &loaded.events {
        surface.add_marker(&Marker::from(event));
    }

    if let Some(plates) = &plates {
        surface.add_plate_overlay(plates, &PlateStyle::default());
    }

    surface.add_legend(&Legend::default());

    let summary = RenderSummary {
        markers: loaded.events.len(),
        skipped: loaded.skipped,
        plates: plates.is_some(),
    };
    info!(
        markers = summary.markers,
        skipped = summary.skipped,
        plates = summary.plates,
        tiles = config.tile_provider.as_str(),
        "rendered map"
    );
    Ok(summary)
}
