//! Renderer boundary and the Leaflet page renderer.
//!
//! The pipeline drives a [`MapSurface`]; [`LeafletPage`] turns those calls
//! into a standalone HTML document that loads Leaflet from a CDN.

use serde::Serialize;
use serde_json::{Value, json};

use crate::bounds::InitialView;
use crate::classify::{self, DepthBucket};
use crate::models::EarthquakeEvent;

/// Fill opacity for event markers.
const MARKER_FILL_OPACITY: f64 = 0.7;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Background tile source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileProvider {
    /// OpenStreetMap standard tiles
    #[default]
    Street,
    /// Google satellite imagery with labels
    Satellite,
}

impl TileProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::Satellite => "satellite",
        }
    }

    /// Leaflet URL template.
    #[must_use]
    pub const fn url_template(self) -> &'static str {
        match self {
            Self::Street => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            Self::Satellite => "https://{s}.google.com/vt/lyrs=s,h&x={x}&y={y}&z={z}",
        }
    }

    /// Leaflet `tileLayer` options.
    #[must_use]
    pub fn options(self) -> Value {
        match self {
            Self::Street => json!({
                "attribution": "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
            }),
            Self::Satellite => json!({
                "maxZoom": 20,
                "subdomains": ["mt0", "mt1", "mt2", "mt3"]
            }),
        }
    }
}

impl std::str::FromStr for TileProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "street" | "osm" => Ok(Self::Street),
            "satellite" => Ok(Self::Satellite),
            _ => Err(format!("unknown tile provider: {s} (expected: street, satellite)")),
        }
    }
}

/// A circle marker for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub color: DepthBucket,
    pub popup: String,
}

impl From<&EarthquakeEvent> for Marker {
    fn from(event: &EarthquakeEvent) -> Self {
        Self {
            latitude: event.latitude,
            longitude: event.longitude,
            radius: classify::marker_size(event.magnitude),
            color: classify::marker_color(event.depth_km),
            popup: format!(
                "Magnitude: {}, Depth: {} km",
                event.magnitude, event.depth_km
            ),
        }
    }
}

/// Line style for the plate boundary overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateStyle {
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
}

impl Default for PlateStyle {
    fn default() -> Self {
        Self {
            color: "orange",
            weight: 2,
            opacity: 0.7,
        }
    }
}

/// Legend control contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: &'static str,
    /// Leaflet control position
    pub position: &'static str,
    pub entries: Vec<DepthBucket>,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            title: "Legend",
            position: "bottomright",
            entries: DepthBucket::ALL.to_vec(),
        }
    }
}

impl Legend {
    /// Inner HTML of the legend control.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!("<b>{}</b><br>", escape_html(self.title));
        for bucket in &self.entries {
            html.push_str(&format!(
                "<div><i style=\"background: {color}; width: 20px; height: 20px; display: inline-block;\"></i> Depth {range} - {label}</div>",
                color = bucket.as_str(),
                range = escape_html(bucket.range()),
                label = bucket.label(),
            ));
        }
        html
    }
}

/// The drawing surface the pipeline renders into.
///
/// Calls arrive in order: view, tiles, markers, optional overlay, legend.
pub trait MapSurface {
    fn fit_view(&mut self, view: &InitialView);
    fn add_tile_layer(&mut self, tiles: TileProvider);
    fn add_marker(&mut self, marker: &Marker);
    fn add_plate_overlay(&mut self, plates: &Value, style: &PlateStyle);
    fn add_legend(&mut self, legend: &Legend);
}

/// Builds a self-contained Leaflet HTML page.
#[derive(Debug, Default)]
pub struct LeafletPage {
    title: String,
    script: Vec<String>,
}

impl LeafletPage {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            script: Vec::new(),
        }
    }

    /// Finish the page.
    #[must_use]
    pub fn into_html(self) -> String {
        let title = escape_html(&self.title);
        let script = self.script.join("\n");
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="{LEAFLET_CSS}" />
    <script src="{LEAFLET_JS}"></script>
    <style>
        html, body {{ height: 100%; margin: 0; }}
        #map {{ height: 100%; width: 100%; }}
        .legend {{ background: white; padding: 6px 8px; border-radius: 5px; line-height: 24px; }}
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
var map = L.map('map');
function addQuake(lat, lon, radius, color, popup) {{
    L.circleMarker([lat, lon], {{
        radius: radius,
        color: color,
        fillColor: color,
        fillOpacity: {MARKER_FILL_OPACITY}
    }}).bindPopup(popup).addTo(map);
}}
{script}
    </script>
</body>
</html>
"#
        )
    }
}

impl MapSurface for LeafletPage {
    fn fit_view(&mut self, view: &InitialView) {
        let line = match view {
            InitialView::FitBounds(bounds) => format!("map.fitBounds({});", script_json(bounds.points())),
            InitialView::World { center, zoom } => {
                format!("map.setView({}, {zoom});", script_json(center))
            }
        };
        self.script.push(line);
    }

    fn add_tile_layer(&mut self, tiles: TileProvider) {
        self.script.push(format!(
            "L.tileLayer({}, {}).addTo(map);",
            script_json(&tiles.url_template()),
            script_json(&tiles.options())
        ));
    }

    fn add_marker(&mut self, marker: &Marker) {
        self.script.push(format!(
            "addQuake({}, {}, {}, {}, {});",
            script_json(&marker.latitude),
            script_json(&marker.longitude),
            script_json(&marker.radius),
            script_json(&marker.color),
            script_json(&marker.popup)
        ));
    }

    fn add_plate_overlay(&mut self, plates: &Value, style: &PlateStyle) {
        self.script.push(format!(
            "L.geoJSON({}, {{ style: function () {{ return {}; }} }}).addTo(map);",
            script_json(plates),
            script_json(style)
        ));
    }

    fn add_legend(&mut self, legend: &Legend) {
        self.script.push(format!(
            r"var legend = L.control({{ position: {position} }});
legend.onAdd = function () {{
    var div = L.DomUtil.create('div', 'info legend');
    div.innerHTML = {html};
    return div;
}};
legend.addTo(map);",
            position = script_json(&legend.position),
            html = script_json(&legend.to_html()),
        ));
    }
}

/// Serialize a value for inclusion inside a `<script>` element.
///
/// `<` is escaped so feed content can never close the element early.
///
/// Callers pass numbers, strings, `Value`s and derived structs with string
/// keys, none of which serde_json can fail on; the `null` arm is unreachable.
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds;

    #[test]
    fn test_marker_from_event() {
        let event = EarthquakeEvent::new(-122.4, 37.8, 5.0, 4.2);
        let marker = Marker::from(&event);
        assert!((marker.radius - 21.0).abs() < 1e-9);
        assert_eq!(marker.color, DepthBucket::LightGreen);
        assert_eq!(marker.popup, "Magnitude: 4.2, Depth: 5 km");
    }

    #[test]
    fn test_tile_provider_parse() {
        assert_eq!("street".parse::<TileProvider>().unwrap(), TileProvider::Street);
        assert_eq!("Satellite".parse::<TileProvider>().unwrap(), TileProvider::Satellite);
        assert!("terrain".parse::<TileProvider>().is_err());
    }

    #[test]
    fn test_legend_html() {
        let html = Legend::default().to_html();
        assert!(html.starts_with("<b>Legend</b><br>"));
        assert!(html.contains("background: lightgreen;"));
        assert!(html.contains("Depth &lt; 10 km - Shallow"));
        assert!(html.contains("Depth 70-90 km - Major"));
        assert!(html.contains("Depth &gt; 90 km - Great"));
        assert_eq!(html.matches("<div>").count(), 6);
    }

    #[test]
    fn test_page_fits_bounds() {
        let events = [EarthquakeEvent::new(-122.4, 37.8, 5.0, 4.2)];
        let mut page = LeafletPage::new("Earthquakes");
        page.fit_view(&bounds::initial_view(&events));
        page.add_tile_layer(TileProvider::Street);
        page.add_marker(&Marker::from(&events[0]));
        page.add_legend(&Legend::default());
        let html = page.into_html();

        assert!(html.contains("map.fitBounds([[37.8,-122.4]]);"));
        assert!(html.contains("tile.openstreetmap.org"));
        assert!(html.contains(r#"addQuake(37.8, -122.4, 21.0, "lightgreen", "Magnitude: 4.2, Depth: 5 km");"#));
        assert!(html.contains("position: \"bottomright\""));
        assert!(!html.contains("setView"));
    }

    #[test]
    fn test_page_world_view_when_empty() {
        let mut page = LeafletPage::new("Earthquakes");
        page.fit_view(&bounds::initial_view(&[]));
        let html = page.into_html();
        assert!(html.contains("map.setView([20.0,0.0], 2);"));
        assert!(!html.contains("fitBounds"));
    }

    #[test]
    fn test_overlay_is_script_safe() {
        let plates = json!({
            "type": "FeatureCollection",
            "features": [{"properties": {"Name": "</script><b>"}}]
        });
        let mut page = LeafletPage::new("Plates");
        page.add_plate_overlay(&plates, &PlateStyle::default());
        let html = page.into_html();

        assert!(html.contains("L.geoJSON("));
        assert!(html.contains(r#"return {"color":"orange","weight":2,"opacity":0.7};"#));
        assert!(!html.contains("</script><b>"));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_satellite_options() {
        let options = TileProvider::Satellite.options();
        assert_eq!(options["maxZoom"], 20);
        assert_eq!(options["subdomains"][3], "mt3");
    }

    #[test]
    fn test_title_escaped() {
        let html = LeafletPage::new("M<5 & up").into_html();
        assert!(html.contains("<title>M&lt;5 &amp; up</title>"));
    }

    #[test]
    fn test_script_json_never_degrades_to_null() {
        let view = bounds::initial_view(&[EarthquakeEvent::new(1.0, 2.0, 3.0, 4.0)]);
        let InitialView::FitBounds(b) = view else {
            panic!("expected bounds");
        };
        assert_eq!(script_json(b.points()), "[[2.0,1.0]]");
        assert!(script_json(&Legend::default().to_html()).starts_with('"'));
        assert_eq!(script_json(&PlateStyle::default()), r#"{"color":"orange","weight":2,"opacity":0.7}"#);
        assert_eq!(script_json(&json!({"a": "</script>"})), r#"{"a":"\u003c/script>"}"#);
    }
}
