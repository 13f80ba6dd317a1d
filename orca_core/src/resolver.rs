//! The position resolver.
//!
//! For a query date and selection, produces at most one position per target
//! family:
//! 1. **Exact match**: the first in-water sighting on that calendar day that
//!    includes the family (and the selection, if any).
//! 2. **Interpolation**: otherwise, the point along the water-constrained
//!    path between the latest qualifying sighting at or before the query and
//!    the earliest one after it, picked by elapsed-time fraction.
//!
//! Families with neither are left out. Nothing here fails on bad data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::family::{Family, FamilyClassifier};
use crate::path::{PathConfig, PathInterpolator};
use crate::types::{canonical_instant, LatLng, PositionQuery, ResolvedPosition, SightingRecord};
use crate::water::WaterRegions;

/// Resolver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Path steps between two anchors (yields steps + 1 points)
    pub interpolation_steps: usize,

    pub path: PathConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            interpolation_steps: 20,
            path: PathConfig::default(),
        }
    }
}

/// Resolves display positions from an immutable list of sightings.
///
/// Holds configuration only; every call reads its arguments and returns a
/// fresh result.
#[derive(Debug, Clone, Default)]
pub struct PositionResolver {
    config: ResolverConfig,
    classifier: FamilyClassifier,
    water: WaterRegions,
}

impl PositionResolver {
    /// # Panics
    /// If `config.interpolation_steps` is zero.
    pub fn new(config: ResolverConfig, classifier: FamilyClassifier, water: WaterRegions) -> Self {
        assert!(
            config.interpolation_steps >= 1,
            "interpolation_steps must be at least 1"
        );
        Self {
            config,
            classifier,
            water,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn classifier(&self) -> &FamilyClassifier {
        &self.classifier
    }

    pub fn water(&self) -> &WaterRegions {
        &self.water
    }

    /// Families a query asks about, in resolution order.
    pub fn target_families(&self, query: &PositionQuery) -> Vec<Family> {
        if query.has_selection() {
            self.classifier.families_in(&query.selection)
        } else {
            self.classifier.tracked().to_vec()
        }
    }

    /// Resolves one position per target family that has one.
    pub fn resolve(&self, query: &PositionQuery, sightings: &[SightingRecord]) -> Vec<ResolvedPosition> {
        let families = self.target_families(query);
        let mut resolved = Vec::with_capacity(families.len());

        for family in &families {
            let position = self
                .exact_match(query, sightings, family)
                .or_else(|| self.interpolated(query, sightings, family));

            match position {
                Some(p) => resolved.push(p),
                None => trace!(family = %family, date = %query.date, "no displayable position"),
            }
        }

        debug!(
            date = %query.date,
            families = families.len(),
            resolved = resolved.len(),
            "resolved positions"
        );
        resolved
    }

    /// Location of a record usable as a position or an anchor.
    fn water_location(&self, record: &SightingRecord) -> Option<LatLng> {
        record
            .location
            .filter(|loc| loc.is_finite() && self.water.contains_point(*loc))
    }

    fn qualifies(&self, query: &PositionQuery, record: &SightingRecord, family: &Family) -> bool {
        record.matrilines.iter().any(|m| self.classifier.is_member(m, family))
            && (!query.has_selection() || record.intersects(&query.selection))
    }

    fn exact_match(
        &self,
        query: &PositionQuery,
        sightings: &[SightingRecord],
        family: &Family,
    ) -> Option<ResolvedPosition> {
        sightings.iter().find_map(|record| {
            if record.date() != query.date || !self.qualifies(query, record, family) {
                return None;
            }
            let location = self.water_location(record)?;
            trace!(family = %family, record = %record.id, "exact sighting");
            Some(ResolvedPosition {
                family: family.clone(),
                position: location,
                matrilines: self.classifier.members_of(record, family),
                is_actual_sighting: true,
            })
        })
    }

    fn interpolated(
        &self,
        query: &PositionQuery,
        sightings: &[SightingRecord],
        family: &Family,
    ) -> Option<ResolvedPosition> {
        let mut anchors: Vec<(&SightingRecord, LatLng)> = sightings
            .iter()
            .filter(|r| self.qualifies(query, r, family))
            .filter_map(|r| self.water_location(r).map(|loc| (r, loc)))
            .collect();
        // Stable, so equal instants keep source order
        anchors.sort_by_key(|(r, _)| r.observed_at);

        let target = canonical_instant(query.date);
        let split = anchors.partition_point(|(r, _)| r.observed_at <= target);
        let (prev, prev_loc) = *anchors.get(split.checked_sub(1)?)?;
        let (next, next_loc) = *anchors.get(split)?;

        let span = (next.observed_at - prev.observed_at).num_milliseconds();
        let fraction = if span > 0 {
            (target - prev.observed_at).num_milliseconds() as f64 / span as f64
        } else {
            0.0
        };

        let interpolator = PathInterpolator::new(&self.water, self.config.path);
        let points = interpolator.interpolate(prev_loc, next_loc, self.config.interpolation_steps);
        let index = ((fraction * points.len() as f64).floor().max(0.0) as usize).min(points.len() - 1);
        let point = points[index];

        if !point.is_finite() || !self.water.contains_point(point) {
            trace!(family = %family, index, "interpolated point is on land");
            return None;
        }

        trace!(
            family = %family,
            prev = %prev.id,
            next = %next.id,
            fraction,
            index,
            "interpolated position"
        );
        Some(ResolvedPosition {
            family: family.clone(),
            position: point,
            matrilines: self.classifier.members_of(prev, family),
            is_actual_sighting: false,
        })
    }
}

/// Resolves with the default families, water regions and step count.
///
/// An empty `selected` list means every tracked family.
pub fn resolve(date: NaiveDate, sightings: &[SightingRecord], selected: &[String]) -> Vec<ResolvedPosition> {
    let query = PositionQuery::new(date).with_selection(selected.iter().cloned());
    PositionResolver::default().resolve(&query, sightings)
}
