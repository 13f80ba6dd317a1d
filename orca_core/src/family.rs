//! Family classification of matriline identifiers.
//!
//! A family key is the leading run of letters plus the digits that follow it:
//! `T18B1` belongs to `T18`, `t19` to `T19`. Anything else has no family.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::SightingRecord;

/// Coarse grouping key shared by related matrilines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Family(String);

impl Family {
    /// Extracts the family prefix from an identifier.
    ///
    /// Returns `None` for blank input, placeholders, or identifiers that do not
    /// start with letters followed by at least one digit.
    pub fn parse(identifier: &str) -> Option<Family> {
        let id = identifier.trim();
        let letters = id.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        if letters == 0 {
            return None;
        }
        let digits = id[letters..].chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        // Both runs are ASCII, so char counts are byte offsets
        Some(Family(id[..letters + digits].to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Maps identifiers onto the configured set of tracked families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyClassifier {
    tracked: Vec<Family>,
}

impl FamilyClassifier {
    /// Builds a classifier from family keys. Unparseable keys and duplicates
    /// are dropped; order is kept.
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tracked: Vec<Family> = Vec::new();
        for family in families.into_iter().filter_map(|f| Family::parse(f.as_ref())) {
            if !tracked.contains(&family) {
                tracked.push(family);
            }
        }
        Self { tracked }
    }

    pub fn tracked(&self) -> &[Family] {
        &self.tracked
    }

    /// The tracked family this identifier belongs to.
    pub fn family_of(&self, identifier: &str) -> Option<Family> {
        Family::parse(identifier).filter(|f| self.tracked.contains(f))
    }

    /// True when the identifier belongs to `family`.
    pub fn is_member(&self, identifier: &str, family: &Family) -> bool {
        Family::parse(identifier).as_ref() == Some(family)
    }

    /// Distinct tracked families in `identifiers`, in first-appearance order.
    pub fn families_in<'a, I>(&self, identifiers: I) -> Vec<Family>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut out: Vec<Family> = Vec::new();
        for family in identifiers.into_iter().filter_map(|id| self.family_of(id)) {
            if !out.contains(&family) {
                out.push(family);
            }
        }
        out
    }

    /// Distinct tracked families present in a record.
    pub fn families_of(&self, record: &SightingRecord) -> Vec<Family> {
        self.families_in(&record.matrilines)
    }

    /// The record's identifiers that belong to `family`, in record order.
    pub fn members_of(&self, record: &SightingRecord, family: &Family) -> Vec<String> {
        record
            .matrilines
            .iter()
            .filter(|m| self.is_member(m, family))
            .cloned()
            .collect()
    }
}

impl Default for FamilyClassifier {
    fn default() -> Self {
        Self::new(["T18", "T19"])
    }
}

/// Splits a comma-separated identifier cell and drops placeholders.
///
/// Empty entries, `?` and anything containing `(` (uncertain sightings such
/// as `T18(?)`) are removed.
pub fn sanitize_identifiers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| is_usable_identifier(id))
        .map(str::to_string)
        .collect()
}

/// True unless the identifier is blank or a placeholder marker.
pub fn is_usable_identifier(id: &str) -> bool {
    let id = id.trim();
    !id.is_empty() && id != "?" && !id.contains('(')
}
