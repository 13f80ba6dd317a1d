//! Water-constrained path interpolation between two sightings.
//!
//! Each intermediate point starts as a straight-line blend of the endpoints.
//! When that blend lands outside the water regions the point is recomputed on
//! a quadratic Bézier curve whose control point is the endpoints' midpoint,
//! shifted west when it sits close to the eastern shore. The decision is made
//! per fraction, so every point is independent of its neighbours.

use serde::{Deserialize, Serialize};

use crate::types::LatLng;
use crate::water::{WaterRegions, SALISH_SEA};

/// Tuning for the shoreline nudge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Midpoints east of this longitude are considered close to shore
    pub nudge_threshold_lng: f64,

    /// Degrees of longitude the midpoint is moved west
    pub nudge_offset_lng: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            nudge_threshold_lng: -123.5,
            nudge_offset_lng: 0.2,
        }
    }
}

/// Generates interpolated paths against a set of water regions.
#[derive(Debug, Clone, Copy)]
pub struct PathInterpolator<'a> {
    water: &'a WaterRegions,
    config: PathConfig,
}

impl<'a> PathInterpolator<'a> {
    pub fn new(water: &'a WaterRegions, config: PathConfig) -> Self {
        Self { water, config }
    }

    /// Lazily yields `steps + 1` points from `start` to `end`.
    ///
    /// # Panics
    /// If `steps` is zero.
    pub fn points(&self, start: LatLng, end: LatLng, steps: usize) -> PathPoints<'a> {
        assert!(steps >= 1, "path interpolation needs at least one step");
        PathPoints {
            interpolator: *self,
            start,
            end,
            steps,
            next: 0,
        }
    }

    /// Collects [`points`](Self::points) into a vector.
    pub fn interpolate(&self, start: LatLng, end: LatLng, steps: usize) -> Vec<LatLng> {
        self.points(start, end, steps).collect()
    }

    /// The point at `fraction` along the path, with the water correction.
    pub fn point_at(&self, start: LatLng, end: LatLng, fraction: f64) -> LatLng {
        let linear = LatLng::new(
            start.lat + (end.lat - start.lat) * fraction,
            start.lng + (end.lng - start.lng) * fraction,
        );
        if self.water.contains_point(linear) {
            return linear;
        }

        let control = self.nudged_midpoint(start, end);
        let f = fraction;
        LatLng::new(
            start.lat + 2.0 * (control.lat - start.lat) * f * (1.0 - f) + (end.lat - start.lat) * f * f,
            start.lng + 2.0 * (control.lng - start.lng) * f * (1.0 - f) + (end.lng - start.lng) * f * f,
        )
    }

    fn nudged_midpoint(&self, start: LatLng, end: LatLng) -> LatLng {
        let mut mid = LatLng::new((start.lat + end.lat) / 2.0, (start.lng + end.lng) / 2.0);
        if mid.lng > self.config.nudge_threshold_lng {
            mid.lng -= self.config.nudge_offset_lng;
        }
        mid
    }
}

/// Iterator returned by [`PathInterpolator::points`].
#[derive(Debug, Clone)]
pub struct PathPoints<'a> {
    interpolator: PathInterpolator<'a>,
    start: LatLng,
    end: LatLng,
    steps: usize,
    next: usize,
}

impl Iterator for PathPoints<'_> {
    type Item = LatLng;

    fn next(&mut self) -> Option<LatLng> {
        let i = self.next;
        if i > self.steps {
            return None;
        }
        self.next += 1;

        // Endpoints are returned verbatim
        let point = if i == 0 {
            self.start
        } else if i == self.steps {
            self.end
        } else {
            let fraction = i as f64 / self.steps as f64;
            self.interpolator.point_at(self.start, self.end, fraction)
        };
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PathPoints<'_> {}

/// Interpolates against the default water regions and path tuning.
///
/// # Panics
/// If `steps` is zero.
pub fn interpolate(start: LatLng, end: LatLng, steps: usize) -> Vec<LatLng> {
    PathInterpolator::new(&SALISH_SEA, PathConfig::default()).interpolate(start, end, steps)
}
