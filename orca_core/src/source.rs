//! Sighting sources: the injected data-access dependency.
//!
//! A source is constructed once per session and handed to whoever needs a
//! snapshot. The JSON source accepts the loose shape produced by the web API
//! and the yearly exports:
//!
//! ```json
//! [{ "id": "2023-0", "date": "2023-06-01", "startLocation": {"lat": 48.6, "lng": -123.2},
//!    "endLocation": null, "matrilines": ["T18", "T18B"], "groupSize": 5 }]
//! ```
//!
//! `timestamp` may replace `date`, `location` may replace `startLocation`,
//! and `matrilines` may be a single comma-separated string.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::family::{is_usable_identifier, sanitize_identifiers};
use crate::types::{canonical_instant, LatLng, SightingRecord};

/// Anything that can produce a snapshot of sighting records.
pub trait SightingSource {
    fn load(&self) -> Result<Vec<SightingRecord>, SourceError>;
}

/// Serves a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<SightingRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<SightingRecord>) -> Self {
        Self { records }
    }
}

impl SightingSource for MemorySource {
    fn load(&self) -> Result<Vec<SightingRecord>, SourceError> {
        Ok(self.records.clone())
    }
}

/// Reads a JSON array of sighting records from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SightingSource for JsonFileSource {
    fn load(&self) -> Result<Vec<SightingRecord>, SourceError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let records = parse_sightings(&text)?;
        debug!(path = %self.path.display(), count = records.len(), "loaded sightings");
        Ok(records)
    }
}

/// Parses a JSON array of raw records.
///
/// Only input that is not a JSON array is an error. Each element is converted
/// on its own; elements that are not objects or carry no usable date are
/// dropped and the rest of the snapshot still loads.
pub fn parse_sightings(json: &str) -> Result<Vec<SightingRecord>, SourceError> {
    let raw: Vec<Value> = serde_json::from_str(json)?;
    let total = raw.len();
    let records: Vec<SightingRecord> = raw
        .iter()
        .enumerate()
        .filter_map(|(i, v)| record_from_value(i, v))
        .collect();
    if records.len() < total {
        warn!(dropped = total - records.len(), "skipped malformed sightings");
    }
    Ok(records)
}

const DATE_KEYS: [&str; 3] = ["date", "timestamp", "observedAt"];
const LOCATION_KEYS: [&str; 2] = ["location", "startLocation"];

fn record_from_value(index: usize, value: &Value) -> Option<SightingRecord> {
    let Some(fields) = value.as_object() else {
        warn!(index, "sighting entry is not an object");
        return None;
    };

    let id = match fields.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("#{}", index),
    };

    // First key that parses wins
    let observed_at = DATE_KEYS
        .iter()
        .filter_map(|key| fields.get(*key))
        .find_map(|v| v.as_str().and_then(parse_instant));
    let Some(observed_at) = observed_at else {
        warn!(id = %id, "unparseable sighting date");
        return None;
    };

    Some(SightingRecord {
        id,
        observed_at,
        location: LOCATION_KEYS
            .iter()
            .filter_map(|key| fields.get(*key))
            .find_map(parse_location),
        end_location: fields.get("endLocation").and_then(parse_location),
        matrilines: fields.get("matrilines").map(parse_matrilines).unwrap_or_default(),
        group_size: fields.get("groupSize").and_then(parse_count).unwrap_or(0),
    })
}

/// Date-only strings get the canonical time of day.
fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
        .map(canonical_instant)
}

fn parse_location(v: &Value) -> Option<LatLng> {
    let lat = coordinate(v.get("lat")?)?;
    let lng = coordinate(v.get("lng").or_else(|| v.get("lon"))?)?;
    let loc = LatLng::new(lat, lng);
    loc.is_finite().then_some(loc)
}

/// Numbers or numeric strings.
fn coordinate(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_count(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_matrilines(v: &Value) -> Vec<String> {
    match v {
        Value::String(s) => sanitize_identifiers(s),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.trim().to_string()))
            .filter(|s| is_usable_identifier(s))
            .collect(),
        _ => Vec::new(),
    }
}
