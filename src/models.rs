//! Data models for GeoJSON earthquake feeds.
//!
//! The raw structures mirror the USGS summary feed loosely: every field the
//! map needs is optional at this layer so a single bad feature never breaks
//! deserialization of the whole collection. [`EarthquakeEvent`] is the
//! validated form the rest of the crate works with.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::QuakemapError;

/// Top-level GeoJSON response from the earthquake feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata (USGS specific, absent from plain GeoJSON)
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Raw features, decoded one at a time by [`FeatureCollection::events`]
    pub features: Vec<Value>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakemapError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }

    /// Parse every feature into an [`EarthquakeEvent`], in feed order.
    pub fn events(&self) -> impl Iterator<Item = Result<EarthquakeEvent, QuakemapError>> + '_ {
        self.features
            .iter()
            .enumerate()
            .map(|(index, value)| EarthquakeEvent::try_from_value(index, value))
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// When this feed was generated (ms since epoch)
    pub generated: Option<i64>,

    /// Human-readable title
    pub title: Option<String>,

    /// Number of events in response
    pub count: Option<usize>,
}

impl Metadata {
    /// Get the generation time as a `DateTime<Utc>`.
    #[must_use]
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

/// A single raw GeoJSON feature.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Event ID; GeoJSON allows a string or a number
    #[serde(default)]
    pub id: Option<Value>,

    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub properties: Option<Properties>,
}

/// Raw geometry. Coordinates are kept untyped until validation.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Expected: [longitude, latitude, depth_km]
    #[serde(default)]
    pub coordinates: Value,
}

/// Event properties the map cares about. Everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value; USGS sends `null` for some events
    #[serde(default)]
    pub mag: Option<Value>,

    /// Human-readable place description
    #[serde(default)]
    pub place: Option<Value>,

    /// Event time (ms since epoch)
    #[serde(default)]
    pub time: Option<Value>,
}

/// A validated earthquake event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarthquakeEvent {
    /// Feed event ID, empty when the feed carries none
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Depth in kilometers (positive down)
    pub depth_km: f64,
    pub magnitude: f64,
    pub place: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

impl EarthquakeEvent {
    /// Create an event from bare location and size values.
    #[must_use]
    pub fn new(longitude: f64, latitude: f64, depth_km: f64, magnitude: f64) -> Self {
        Self {
            id: String::new(),
            longitude,
            latitude,
            depth_km,
            magnitude,
            place: None,
            time: None,
        }
    }

    /// Decode and validate one entry of a collection's `features` array.
    ///
    /// # Errors
    ///
    /// Returns [`QuakemapError::MalformedFeature`] when the entry is not a
    /// feature object or fails [`EarthquakeEvent::try_from_feature`].
    pub fn try_from_value(index: usize, value: &Value) -> Result<Self, QuakemapError> {
        let feature = Feature::deserialize(value)
            .map_err(|e| QuakemapError::malformed(index, format!("not a feature: {e}")))?;
        Self::try_from_feature(index, &feature)
    }

    /// Validate a raw feature.
    ///
    /// `index` is the feature's position in the collection and only feeds
    /// the error message.
    ///
    /// # Errors
    ///
    /// Returns [`QuakemapError::MalformedFeature`] when the geometry does not
    /// hold exactly three numeric coordinates or the magnitude is missing or
    /// non-numeric.
    pub fn try_from_feature(index: usize, feature: &Feature) -> Result<Self, QuakemapError> {
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| QuakemapError::malformed(index, "missing geometry"))?;

        let coordinates = geometry.coordinates.as_array().ok_or_else(|| {
            QuakemapError::malformed(
                index,
                format!("coordinates is not an array: {}", geometry.coordinates),
            )
        })?;
        let [lon, lat, depth] = coordinates.as_slice() else {
            return Err(QuakemapError::malformed(
                index,
                format!("expected 3 coordinates, got {}", coordinates.len()),
            ));
        };

        let properties = feature
            .properties
            .as_ref()
            .ok_or_else(|| QuakemapError::malformed(index, "missing properties"))?;
        let mag = properties
            .mag
            .as_ref()
            .ok_or_else(|| QuakemapError::malformed(index, "missing magnitude"))?;

        Ok(Self {
            id: feature.id.as_ref().map(id_string).unwrap_or_default(),
            place: properties
                .place
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string),
            time: properties.time.as_ref().and_then(epoch_millis),
            ..Self::new(
                number(index, "longitude", lon)?,
                number(index, "latitude", lat)?,
                number(index, "depth", depth)?,
                number(index, "magnitude", mag)?,
            )
        })
    }
}

/// String and number ids both become strings; anything else is dropped.
fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Epoch milliseconds, integral or not. Other types are dropped.
fn epoch_millis(time: &Value) -> Option<DateTime<Utc>> {
    let ms = match time.as_i64() {
        Some(ms) => ms,
        None => time.as_f64().filter(|f| f.is_finite())? as i64,
    };
    Utc.timestamp_millis_opt(ms).single()
}

fn number(index: usize, field: &str, value: &Value) -> Result<f64, QuakemapError> {
    match value.as_f64() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(QuakemapError::malformed(
            index,
            format!("{field} is not a number: {value}"),
        )),
    }
}
