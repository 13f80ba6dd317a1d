//! Human-readable and JSON renderings of resolved frames.

use chrono::NaiveDate;
use orca_core::{PlaybackFrame, ResolvedPosition};
use serde_json::json;

/// One line per position, e.g. `T18  48.70000 -123.40000  T18 (Estimated)`.
pub fn position_line(position: &ResolvedPosition) -> String {
    format!(
        "{:<5} {:>9.5} {:>10.5}  {}",
        position.family,
        position.position.lat,
        position.position.lng,
        position.title()
    )
}

/// Frame header followed by its positions.
pub fn frame_lines(frame: &PlaybackFrame) -> Vec<String> {
    day_lines(frame.date, Some(frame.index), &frame.positions)
}

/// Header and positions for one date. `index` is `None` outside the timeline.
pub fn day_lines(date: NaiveDate, index: Option<usize>, positions: &[ResolvedPosition]) -> Vec<String> {
    let label = match index {
        Some(i) => format!("day {}", i),
        None => "outside timeline".to_string(),
    };
    let mut lines = vec![format!(
        "{} ({}): {} position(s)",
        date.format("%B %-d, %Y"),
        label,
        positions.len()
    )];
    if positions.is_empty() {
        lines.push("  no displayable positions".to_string());
    }
    lines.extend(positions.iter().map(|p| format!("  {}", position_line(p))));
    lines
}

/// Machine-readable summary of a run.
pub fn frames_json(frames: &[PlaybackFrame], total_sightings: usize, domain_days: usize) -> serde_json::Value {
    json!({
        "sightings": total_sightings,
        "days": domain_days,
        "frames": frames,
    })
}

/// Summary for a single date outside the timeline; its frame has a null index.
pub fn unindexed_json(
    date: NaiveDate,
    positions: &[ResolvedPosition],
    total_sightings: usize,
    domain_days: usize,
) -> serde_json::Value {
    json!({
        "sightings": total_sightings,
        "days": domain_days,
        "frames": [{ "index": null, "date": date, "positions": positions }],
    })
}
