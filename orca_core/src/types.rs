//! Data model shared by the resolver, the timeline and playback.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::family::Family;

/// Time of day assumed for sightings recorded without one (12:00).
pub const CANONICAL_HOUR: u32 = 12;

/// Returns `date` at the canonical time of day.
pub fn canonical_instant(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(CANONICAL_HOUR, 0, 0).unwrap_or_default())
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(p: LatLng) -> Self {
        Coord { x: p.lng, y: p.lat }
    }
}

impl From<Coord<f64>> for LatLng {
    fn from(c: Coord<f64>) -> Self {
        Self { lat: c.y, lng: c.x }
    }
}

/// One encounter with one or more orcas, as supplied by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingRecord {
    /// Opaque unique identifier
    pub id: String,

    /// When the first observation was made
    pub observed_at: NaiveDateTime,

    /// Where the first observation was made; `None` when unparseable
    pub location: Option<LatLng>,

    /// Where the last observation of the encounter was made
    pub end_location: Option<LatLng>,

    /// Raw individual/matriline identifiers, in source order
    pub matrilines: Vec<String>,

    /// Minimum estimated number of individuals present
    pub group_size: u32,
}

impl SightingRecord {
    /// Creates a date-only record observed at the canonical time of day.
    pub fn on_date(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            observed_at: canonical_instant(date),
            location: None,
            end_location: None,
            matrilines: Vec::new(),
            group_size: 0,
        }
    }

    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(LatLng::new(lat, lng));
        self
    }

    pub fn with_end_location(mut self, lat: f64, lng: f64) -> Self {
        self.end_location = Some(LatLng::new(lat, lng));
        self
    }

    pub fn with_matrilines<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matrilines = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_group_size(mut self, size: u32) -> Self {
        self.group_size = size;
        self
    }

    /// Calendar day of the observation.
    pub fn date(&self) -> NaiveDate {
        self.observed_at.date()
    }

    /// True when any identifier in this record appears in `selection`.
    pub fn intersects(&self, selection: &[String]) -> bool {
        self.matrilines.iter().any(|m| selection.contains(m))
    }
}

/// A position to draw for one family on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPosition {
    pub family: Family,
    pub position: LatLng,
    /// Identifiers within the family backing this position
    pub matrilines: Vec<String>,
    /// True for a sighting on the query date, false when interpolated
    pub is_actual_sighting: bool,
}

impl ResolvedPosition {
    /// Marker caption, e.g. `"T18, T18B (Estimated)"`.
    pub fn title(&self) -> String {
        let ids = self.matrilines.join(", ");
        if self.is_actual_sighting {
            ids
        } else {
            format!("{} (Estimated)", ids)
        }
    }
}

/// An immutable resolver input: one date plus an optional selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionQuery {
    pub date: NaiveDate,
    /// Raw identifiers; empty means every tracked family
    pub selection: Vec<String>,
}

impl PositionQuery {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            selection: Vec::new(),
        }
    }

    /// Entries are trimmed; blank ones are dropped.
    pub fn with_selection<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = ids
            .into_iter()
            .map(Into::into)
            .filter_map(|id| {
                let trimmed = id.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect();
        self
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }
}
