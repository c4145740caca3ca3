//! Visual encoding of earthquake events.
//!
//! Magnitude drives the marker radius, depth drives the color bucket.

use serde::Serialize;

/// Radius scale factor applied to magnitude.
const RADIUS_PER_MAGNITUDE: f64 = 5.0;

/// Depth color bucket, shallowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthBucket {
    /// depth < 10 km
    LightGreen,
    /// 10 <= depth < 30 km
    Green,
    /// 30 <= depth < 50 km
    Yellow,
    /// 50 <= depth < 70 km
    Orange,
    /// 70 <= depth < 90 km
    Red,
    /// depth >= 90 km
    DarkRed,
}

impl DepthBucket {
    /// All buckets in legend order.
    pub const ALL: [Self; 6] = [
        Self::LightGreen,
        Self::Green,
        Self::Yellow,
        Self::Orange,
        Self::Red,
        Self::DarkRed,
    ];

    /// CSS color name used for stroke and fill.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LightGreen => "lightgreen",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::DarkRed => "darkred",
        }
    }

    /// Depth range covered by this bucket, as shown in the legend.
    #[must_use]
    pub const fn range(self) -> &'static str {
        match self {
            Self::LightGreen => "< 10 km",
            Self::Green => "10-30 km",
            Self::Yellow => "30-50 km",
            Self::Orange => "50-70 km",
            Self::Red => "70-90 km",
            Self::DarkRed => "> 90 km",
        }
    }

    /// Descriptive legend label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LightGreen => "Shallow",
            Self::Green => "Intermediate",
            Self::Yellow => "Moderate",
            Self::Orange => "Strong",
            Self::Red => "Major",
            Self::DarkRed => "Great",
        }
    }
}

impl std::fmt::Display for DepthBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker radius for a magnitude. Not clamped: zero and negative
/// magnitudes pass straight through.
#[must_use]
pub fn marker_size(magnitude: f64) -> f64 {
    magnitude * RADIUS_PER_MAGNITUDE
}

/// Color bucket for a depth in kilometers.
///
/// Ranges are closed on the lower bound, so 10 km is `Green`. NaN falls
/// through to `DarkRed`.
#[must_use]
pub fn marker_color(depth_km: f64) -> DepthBucket {
    match depth_km {
        d if d < 10.0 => DepthBucket::LightGreen,
        d if d < 30.0 => DepthBucket::Green,
        d if d < 50.0 => DepthBucket::Yellow,
        d if d < 70.0 => DepthBucket::Orange,
        d if d < 90.0 => DepthBucket::Red,
        _ => DepthBucket::DarkRed,
    }
}
