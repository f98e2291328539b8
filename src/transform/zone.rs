//! Zone record resolution.
//!
//! Upstream zone records name the same field several ways. Both the
//! property table and the geometry candidates are plain data, checked left
//! to right; the first usable value wins.

use serde_json::{Map, Value};
use thiserror::Error;

use super::geojson::{Feature, Geometry, Property, ZoneProperties};

/// Candidate source keys for each output property, in priority order.
pub const PROPERTY_KEYS: &[(Property, &[&str])] = &[
    (Property::Id, &["id", "zone_id", "zoneId"]),
    (Property::Name, &["name", "zone_name", "zoneName"]),
    (Property::Level, &["level", "zone_level", "zoneLevel"]),
    (Property::Type, &["type", "zone_type", "zoneType"]),
    (Property::Description, &["description", "zone_description", "zoneDescription"]),
    (Property::Altitude, &["altitude", "zone_altitude", "zoneAltitude"]),
    (Property::StartTime, &["start_time", "startTime"]),
    (Property::EndTime, &["end_time", "endTime"]),
];

/// How a geometry candidate is turned into a feature geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource {
    /// A ready-made GeoJSON geometry object.
    Object,
    /// A bare coordinate ring, wrapped as a single-ring polygon.
    Ring,
}

/// Geometry candidates, in priority order.
pub const GEOMETRY_KEYS: &[(&str, GeometrySource)] = &[
    ("geometry", GeometrySource::Object),
    ("coordinates", GeometrySource::Ring),
    ("boundary", GeometrySource::Ring),
    ("polygon", GeometrySource::Ring),
];

/// Why a zone record produced no feature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneSkip {
    /// The record is not a JSON object.
    #[error("zone record is not an object (found {0})")]
    NotAnObject(&'static str),

    /// None of the geometry candidates held a usable value.
    #[error("no geometry found for zone")]
    NoGeometry,
}

/// Convert one zone record into a feature.
pub fn convert_zone(zone: &Value) -> Result<Feature, ZoneSkip> {
    let record = zone
        .as_object()
        .ok_or_else(|| ZoneSkip::NotAnObject(json_kind(zone)))?;

    let geometry = resolve_geometry(record).ok_or(ZoneSkip::NoGeometry)?;

    Ok(Feature {
        properties: resolve_properties(record),
        geometry,
    })
}

/// Resolve every property in [`PROPERTY_KEYS`]; unresolved ones stay `None`.
pub fn resolve_properties(record: &Map<String, Value>) -> ZoneProperties {
    let mut properties = ZoneProperties::default();
    for (property, keys) in PROPERTY_KEYS {
        *properties.slot_mut(*property) = first_present(record, keys).cloned();
    }
    properties
}

/// Resolve geometry from the first usable candidate in [`GEOMETRY_KEYS`].
pub fn resolve_geometry(record: &Map<String, Value>) -> Option<Geometry> {
    GEOMETRY_KEYS.iter().find_map(|(key, source)| {
        let value = record.get(*key)?;
        match (source, value) {
            (GeometrySource::Object, Value::Object(_)) => Some(Geometry::Verbatim(value.clone())),
            (GeometrySource::Ring, Value::Array(_)) => Some(Geometry::polygon(value.clone())),
            _ => None,
        }
    })
}

/// First value under `keys` that exists and is not `null`.
fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
