//! Orca Core - Position Resolution for Matriline Sightings
//!
//! Turns a list of orca sighting records into map positions for a chosen
//! day:
//! 1. **Water**: a coarse bounding-box test for the Salish Sea
//! 2. **Path**: interpolation between sightings that bends away from shore
//! 3. **Family**: grouping of matriline identifiers (`T18B1` → `T18`)
//! 4. **Resolver**: exact sighting if there is one, otherwise an estimate
//! 5. **Timeline**: the day-by-day domain that drives playback
//!
//! All of the above are pure functions of their inputs. The only stateful
//! piece is [`playback::PlaybackSession`], which owns a single timer.

pub mod error;
pub mod family;
pub mod path;
pub mod playback;
pub mod resolver;
pub mod source;
pub mod timeline;
pub mod types;
pub mod water;

// Re-export key types for convenience
pub use error::SourceError;
pub use family::{Family, FamilyClassifier};
pub use path::{interpolate, PathConfig, PathInterpolator};
pub use playback::{PlaybackFrame, PlaybackSession, PlaybackSpeed, PlaybackState, ReplayView};
pub use resolver::{resolve, PositionResolver, ResolverConfig};
pub use source::{JsonFileSource, MemorySource, SightingSource};
pub use timeline::{advance, date_domain, TimelineIndex};
pub use types::{LatLng, PositionQuery, ResolvedPosition, SightingRecord};
pub use water::{is_in_water, WaterRegion, WaterRegions, SALISH_SEA};
