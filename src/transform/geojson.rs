//! GeoJSON output types.
//!
//! Only the shapes the zone transform emits are modelled. Serialization
//! order is fixed by field declaration order, so the same input always
//! produces the same bytes.

use serde::Serialize;
use serde_json::Value;

/// A GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A single GeoJSON `Feature`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub properties: ZoneProperties,
    pub geometry: Geometry,
}

/// Properties resolved from a zone record.
///
/// Unresolved fields are skipped on output, never written as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ZoneProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Value>,
}

impl ZoneProperties {
    /// Mutable slot for a property by its output name.
    pub(crate) fn slot_mut(&mut self, property: Property) -> &mut Option<Value> {
        match property {
            Property::Id => &mut self.id,
            Property::Name => &mut self.name,
            Property::Level => &mut self.level,
            Property::Type => &mut self.kind,
            Property::Description => &mut self.description,
            Property::Altitude => &mut self.altitude,
            Property::StartTime => &mut self.start_time,
            Property::EndTime => &mut self.end_time,
        }
    }
}

/// Semantic properties a zone record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Id,
    Name,
    Level,
    Type,
    Description,
    Altitude,
    StartTime,
    EndTime,
}

/// Feature geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Geometry {
    /// A polygon built from a bare coordinate ring.
    Ring(RingGeometry),
    /// A geometry object supplied by the upstream, copied as-is.
    Verbatim(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RingGeometry {
    /// Single-ring polygon: `coordinates` holds exactly one ring.
    Polygon { coordinates: [Value; 1] },
}

impl Geometry {
    /// Wrap a coordinate ring as a single-ring `Polygon`.
    pub fn polygon(ring: Value) -> Self {
        Geometry::Ring(RingGeometry::Polygon { coordinates: [ring] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_collection_shape() {
        let out = serde_json::to_string(&FeatureCollection::default()).unwrap();
        assert_eq!(out, r#"{"type":"FeatureCollection","features":[]}"#);
    }

    #[test]
    fn test_feature_omits_missing_properties() {
        let feature = Feature {
            properties: ZoneProperties {
                id: Some(json!("A1")),
                kind: Some(json!(2)),
                ..Default::default()
            },
            geometry: Geometry::polygon(json!([[0, 0], [1, 0], [0, 0]])),
        };

        let out = serde_json::to_string(&feature).unwrap();
        assert_eq!(
            out,
            r#"{"type":"Feature","properties":{"id":"A1","type":2},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[0,0]]]}}"#
        );
    }

    #[test]
    fn test_verbatim_geometry() {
        let raw = json!({"type": "Point", "coordinates": [113.9, 22.5]});
        let out = serde_json::to_value(Geometry::Verbatim(raw.clone())).unwrap();
        assert_eq!(out, raw);
    }
}
