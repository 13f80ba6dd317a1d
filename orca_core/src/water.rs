//! Water-region classification.
//!
//! A point is "in water" when it falls inside at least one of a fixed list of
//! latitude/longitude rectangles roughly covering the navigable Salish Sea.
//! This is a coarse approximation: land inside a box classifies as water and
//! water outside every box classifies as land.

use geo::{coord, Coord, Rect};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::types::LatLng;

/// A named rectangular marine region. Boundaries are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterRegion {
    pub name: String,
    /// x = longitude, y = latitude
    pub bounds: Rect<f64>,
}

impl WaterRegion {
    pub fn new(name: impl Into<String>, min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            name: name.into(),
            bounds: Rect::new(coord! { x: min_lng, y: min_lat }, coord! { x: max_lng, y: max_lat }),
        }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        let Coord { x: min_lng, y: min_lat } = self.bounds.min();
        let Coord { x: max_lng, y: max_lat } = self.bounds.max();
        lat >= min_lat && lat <= max_lat && lng >= min_lng && lng <= max_lng
    }
}

/// Ordered list of water regions. Configuration data, never derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterRegions {
    regions: Vec<WaterRegion>,
}

impl WaterRegions {
    pub fn new(regions: Vec<WaterRegion>) -> Self {
        Self { regions }
    }

    /// Main Salish Sea, Burrard Inlet and Howe Sound.
    pub fn salish_sea() -> Self {
        Self::new(vec![
            WaterRegion::new("Main Salish Sea", 47.0, 50.0, -125.0, -122.0),
            WaterRegion::new("Burrard Inlet", 49.0, 49.5, -123.5, -122.5),
            WaterRegion::new("Howe Sound", 49.3, 49.7, -123.5, -123.0),
        ])
    }

    pub fn regions(&self) -> &[WaterRegion] {
        &self.regions
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.regions.iter().any(|r| r.contains(lat, lng))
    }

    pub fn contains_point(&self, p: LatLng) -> bool {
        self.contains(p.lat, p.lng)
    }

    /// Name of the first region containing the point.
    pub fn region_of(&self, lat: f64, lng: f64) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.contains(lat, lng))
            .map(|r| r.name.as_str())
    }
}

impl Default for WaterRegions {
    fn default() -> Self {
        Self::salish_sea()
    }
}

/// The default region list, built once.
pub static SALISH_SEA: Lazy<WaterRegions> = Lazy::new(WaterRegions::salish_sea);

/// Classifies a point against the default Salish Sea regions.
pub fn is_in_water(lat: f64, lng: f64) -> bool {
    SALISH_SEA.contains(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_haro_strait_is_water() {
        assert!(is_in_water(48.6, -123.2));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert!(is_in_water(47.0, -125.0));
        assert!(is_in_water(50.0, -122.0));
        assert!(!is_in_water(50.0001, -123.0));
        assert!(!is_in_water(48.0, -121.9999));
    }

    #[test]
    fn test_far_away_points_are_land() {
        assert!(!is_in_water(37.7749, -122.4194)); // San Francisco
        assert!(!is_in_water(0.0, 0.0));
        assert!(!is_in_water(f64::NAN, -123.0));
        assert!(!is_in_water(400.0, -900.0));
    }

    #[test]
    fn test_shared_default_matches_fresh_list() {
        assert_eq!(*SALISH_SEA, WaterRegions::default());
    }

    #[test]
    fn test_region_of_reports_first_match() {
        let regions = WaterRegions::salish_sea();
        // Burrard Inlet lies inside the main box, which is listed first
        assert_eq!(regions.region_of(49.2, -123.0), Some("Main Salish Sea"));
        assert_eq!(regions.region_of(10.0, 10.0), None);
    }

    #[test]
    fn test_custom_region_list() {
        let regions = WaterRegions::new(vec![WaterRegion::new("Puget", 47.0, 48.0, -123.0, -122.0)]);
        assert!(regions.contains(47.5, -122.5));
        assert!(!regions.contains(48.6, -123.2));
        assert!(!WaterRegions::new(Vec::new()).contains(47.5, -122.5));
    }

    proptest! {
        #[test]
        fn prop_points_inside_a_box_are_water(
            idx in 0usize..3,
            u in 0.0f64..=1.0,
            v in 0.0f64..=1.0,
        ) {
            let regions = WaterRegions::salish_sea();
            let b = &regions.regions()[idx].bounds;
            let lat = b.min().y + (b.max().y - b.min().y) * u;
            let lng = b.min().x + (b.max().x - b.min().x) * v;
            prop_assert!(is_in_water(lat.min(b.max().y), lng.min(b.max().x)));
        }

        #[test]
        fn prop_points_north_of_every_box_are_land(lat in 50.0001f64..90.0, lng in -180.0f64..180.0) {
            prop_assert!(!is_in_water(lat, lng));
        }

        #[test]
        fn prop_points_east_of_every_box_are_land(lat in -90.0f64..90.0, lng in -121.9999f64..180.0) {
            prop_assert!(!is_in_water(lat, lng));
        }
    }
}
