//! Whole-pipeline checks: snapshot → resolver → timeline.

use chrono::NaiveDate;
use orca_core::source::parse_sightings;
use orca_core::{date_domain, is_in_water, resolve, SightingSource, MemorySource, TimelineIndex};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const SNAPSHOT: &str = r#"[
    {"id": "1", "date": "2023-06-01", "startLocation": {"lat": 48.6, "lng": -123.2}, "matrilines": ["T18"], "groupSize": 5},
    {"id": "2", "date": "2023-06-05", "startLocation": {"lat": 48.8, "lng": -123.6}, "matrilines": ["T18"], "groupSize": 5},
    {"id": "3", "date": "2024-02-10", "startLocation": null, "matrilines": ["T19", "?"], "groupSize": 2},
    {"id": "4", "date": "not a date", "startLocation": {"lat": 48.6, "lng": -123.2}, "matrilines": ["T19"]}
]"#;

#[test]
fn midway_estimate_between_two_sightings() {
    let sightings = parse_sightings(SNAPSHOT).unwrap();
    assert_eq!(sightings.len(), 3);

    let positions = resolve(day(2023, 6, 3), &sightings, &[]);
    assert_eq!(positions.len(), 1);

    let p = &positions[0];
    assert_eq!(p.family.as_str(), "T18");
    assert!(!p.is_actual_sighting);
    assert!(is_in_water(p.position.lat, p.position.lng));
    assert!((p.position.lat - 48.7).abs() < 0.05);
    assert!((p.position.lng + 123.4).abs() < 0.05);
    assert_ne!((p.position.lat, p.position.lng), (48.6, -123.2));
    assert_ne!((p.position.lat, p.position.lng), (48.8, -123.6));
}

#[test]
fn sighting_days_resolve_exactly() {
    let sightings = parse_sightings(SNAPSHOT).unwrap();
    let positions = resolve(day(2023, 6, 5), &sightings, &[]);
    assert_eq!(positions.len(), 1);
    assert!(positions[0].is_actual_sighting);
    assert_eq!((positions[0].position.lat, positions[0].position.lng), (48.8, -123.6));
}

#[test]
fn every_domain_day_resolves_without_panicking() {
    let sightings = MemorySource::new(parse_sightings(SNAPSHOT).unwrap()).load().unwrap();
    let domain = date_domain(&sightings);
    assert_eq!(domain.len(), 365 + 366);

    let index = TimelineIndex::from_sightings(&sightings);
    for date in index.dates() {
        for p in resolve(*date, &sightings, &[]) {
            if !p.is_actual_sighting {
                assert!(is_in_water(p.position.lat, p.position.lng));
            }
        }
    }
}
