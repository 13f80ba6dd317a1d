//! Timeline index: the calendar days playback and the scrubber walk through.

use chrono::{Datelike, NaiveDate};

use crate::types::SightingRecord;

/// Every calendar day from January 1 of the earliest sighting's year through
/// December 31 of the latest sighting's year, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineIndex {
    dates: Vec<NaiveDate>,
}

impl TimelineIndex {
    pub fn from_sightings(sightings: &[SightingRecord]) -> Self {
        let years = sightings.iter().map(|s| s.date().year());
        let (Some(first), Some(last)) = (years.clone().min(), years.max()) else {
            return Self::default();
        };

        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(first, 1, 1),
            NaiveDate::from_ymd_opt(last, 12, 31),
        ) else {
            return Self::default();
        };

        Self {
            dates: start.iter_days().take_while(|d| *d <= end).collect(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Index of `date`, or `None` when it lies outside the domain.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Slider index for `date`; dates outside the domain map to 0.
    pub fn position_of(&self, date: NaiveDate) -> usize {
        self.index_of(date).unwrap_or(0)
    }

    /// Next playback index, wrapping to the start.
    pub fn advance(&self, index: usize) -> Option<usize> {
        advance(index, self.len())
    }
}

/// The date domain for a list of sightings. Empty input gives an empty domain.
pub fn date_domain(sightings: &[SightingRecord]) -> Vec<NaiveDate> {
    TimelineIndex::from_sightings(sightings).dates
}

/// `(index + 1) mod len`; `None` when there is nothing to play.
pub fn advance(index: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some((index % len + 1) % len)
    }
}
