//! Initial map framing.

use serde::Serialize;

use crate::models::EarthquakeEvent;

/// Center used when there is nothing to fit.
pub const WORLD_CENTER: [f64; 2] = [20.0, 0.0];

/// Zoom used when there is nothing to fit.
pub const WORLD_ZOOM: u8 = 2;

/// Ordered `[lat, lon]` pairs, one per event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Bounds(Vec<[f64; 2]>);

impl Bounds {
    #[must_use]
    pub fn points(&self) -> &[[f64; 2]] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How the renderer should frame the map on load.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialView {
    /// Fit the viewport around every event.
    FitBounds(Bounds),
    /// No events: show the whole world.
    World { center: [f64; 2], zoom: u8 },
}

/// Collect `[lat, lon]` for every event in input order.
///
/// No deduplication and no outlier rejection.
#[must_use]
pub fn bounds(events: &[EarthquakeEvent]) -> Bounds {
    Bounds(events.iter().map(|e| [e.latitude, e.longitude]).collect())
}

/// Pick the initial view for a set of events.
#[must_use]
pub fn initial_view(events: &[EarthquakeEvent]) -> InitialView {
    let bounds = bounds(events);
    if bounds.is_empty() {
        InitialView::World {
            center: WORLD_CENTER,
            zoom: WORLD_ZOOM,
        }
    } else {
        InitialView::FitBounds(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let events = [EarthquakeEvent::new(-122.4, 37.8, 5.0, 4.2)];
        assert_eq!(bounds(&events).points(), &[[37.8, -122.4]]);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let events = [
            EarthquakeEvent::new(10.0, 1.0, 5.0, 1.0),
            EarthquakeEvent::new(-20.0, -2.0, 5.0, 1.0),
            EarthquakeEvent::new(10.0, 1.0, 5.0, 1.0),
        ];
        let b = bounds(&events);
        assert_eq!(b.points().len(), 3);
        assert_eq!(b.points(), &[[1.0, 10.0], [-2.0, -20.0], [1.0, 10.0]]);
        assert_eq!(
            serde_json::to_string(&b).unwrap(),
            "[[1.0,10.0],[-2.0,-20.0],[1.0,10.0]]"
        );
    }

    #[test]
    fn test_empty_falls_back_to_world() {
        assert!(bounds(&[]).is_empty());
        assert_eq!(
            initial_view(&[]),
            InitialView::World {
                center: WORLD_CENTER,
                zoom: WORLD_ZOOM
            }
        );
    }

    #[test]
    fn test_non_empty_fits_bounds() {
        let events = [EarthquakeEvent::new(-122.4, 37.8, 5.0, 4.2)];
        match initial_view(&events) {
            InitialView::FitBounds(b) => assert_eq!(b.points().len(), 1),
            other => panic!("unexpected view: {other:?}"),
        }
    }
}
