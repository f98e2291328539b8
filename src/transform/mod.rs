//! Zone-to-feature transform.
//!
//! # Data Flow
//! ```text
//! upstream JSON document (serde_json::Value)
//!     → locate zone list (`data` | document itself | `zones`)
//!     → zone.rs (per-record: resolve properties + geometry)
//!     → Ok(Feature) kept / Err(ZoneSkip) dropped with a warning
//!     → geojson.rs FeatureCollection
//! ```
//!
//! The transform is a pure function of its input: it borrows the document,
//! never mutates it, and keeps no state between calls. A bad record only
//! costs that record.

pub mod geojson;
pub mod zone;

use serde_json::Value;

pub use geojson::{Feature, FeatureCollection, Geometry, ZoneProperties};
pub use zone::{convert_zone, ZoneSkip};

/// Result of converting a whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub collection: FeatureCollection,
    /// Number of zone records that produced no feature.
    pub skipped: usize,
}

/// Locate the zone list inside an upstream document.
///
/// Checked in order: a `data` array, the document itself as an array, a
/// `zones` array. Anything else has no zones.
pub fn locate_zones(document: &Value) -> &[Value] {
    if let Some(zones) = document.get("data").and_then(Value::as_array) {
        return zones;
    }
    if let Some(zones) = document.as_array() {
        return zones;
    }
    if let Some(zones) = document.get("zones").and_then(Value::as_array) {
        return zones;
    }
    &[]
}

/// Convert an upstream document, reporting how many zones were dropped.
pub fn convert(document: &Value) -> Conversion {
    let zones = locate_zones(document);
    let mut features = Vec::with_capacity(zones.len());
    let mut skipped = 0;

    for (index, zone) in zones.iter().enumerate() {
        match convert_zone(zone) {
            Ok(feature) => features.push(feature),
            Err(reason) => {
                tracing::warn!(index, reason = %reason, "Skipping zone");
                skipped += 1;
            }
        }
    }

    Conversion {
        collection: FeatureCollection::new(features),
        skipped,
    }
}

/// Convert an upstream document into a feature collection.
pub fn to_feature_collection(document: &Value) -> FeatureCollection {
    convert(document).collection
}
