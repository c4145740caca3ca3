//! Terminal output for classified events.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::classify::DepthBucket;
use crate::models::EarthquakeEvent;
use crate::render::Marker;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const ICON_QUAKE: &str = "🌍";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// An event together with its visual encoding.
///
/// This is the normalized structure we emit in JSON/NDJSON output.
#[derive(Debug, Clone, Serialize)]
pub struct OutputMarker {
    pub id: String,
    pub time: Option<String>,
    pub magnitude: f64,
    pub depth_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub place: Option<String>,
    pub radius: f64,
    pub color: DepthBucket,
}

impl From<&EarthquakeEvent> for OutputMarker {
    fn from(e: &EarthquakeEvent) -> Self {
        let marker = Marker::from(e);
        Self {
            id: e.id.clone(),
            time: e.time.map(|t| t.to_rfc3339()),
            magnitude: e.magnitude,
            depth_km: e.depth_km,
            latitude: e.latitude,
            longitude: e.longitude,
            place: e.place.clone(),
            radius: marker.radius,
            color: marker.color,
        }
    }
}

/// Closest ANSI color for a depth bucket.
fn bucket_ansi(bucket: DepthBucket) -> &'static str {
    match bucket {
        DepthBucket::LightGreen => "\x1b[92m",
        DepthBucket::Green => "\x1b[32m",
        DepthBucket::Yellow => "\x1b[93m",
        DepthBucket::Orange => "\x1b[38;5;208m",
        DepthBucket::Red => "\x1b[91m",
        DepthBucket::DarkRed => "\x1b[31m",
    }
}

/// Write events in human-readable format, colored by depth bucket.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, events: &[EarthquakeEvent]) -> io::Result<()> {
    for event in events {
        let marker = Marker::from(event);
        let time = event
            .time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".into());
        let place = event.place.as_deref().unwrap_or("Unknown location");
        let color = bucket_ansi(marker.color);
        let bucket = marker.color.as_str();
        let radius = marker.radius;
        let mag = event.magnitude;
        let depth = event.depth_km;

        writeln!(
            writer,
            "{ICON_QUAKE} {BOLD}M{mag:.1}{RESET} │ \
             {color}{bucket:10}{RESET} │ \
             {DIM}{depth:>5.0}km{RESET} │ \
             {DIM}r={radius:<5.1}{RESET} │ \
             {time} UTC │ \
             {place}"
        )?;
    }
    Ok(())
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, events: &[EarthquakeEvent]) -> io::Result<()> {
    let output: Vec<OutputMarker> = events.iter().map(OutputMarker::from).collect();
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, events: &[EarthquakeEvent]) -> io::Result<()> {
    for event in events {
        let output = OutputMarker::from(event);
        let json = serde_json::to_string(&output)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(
    writer: &mut W,
    events: &[EarthquakeEvent],
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events),
        Format::Json => write_json(writer, events),
        Format::Ndjson => write_ndjson(writer, events),
    }
}
