//! GeoJSON shapes exchanged with map sources.
//!
//! The route pipeline only ever draws markers and a growing line, so the model
//! stops at [`Geometry::Point`] and [`Geometry::LineString`]. Geometries read
//! and write the standard `{"type", "coordinates"}` object through serde;
//! features and collections are write-only since map sources consume them.

use foundation::LonLat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    #[serde(with = "position")]
    Point(LonLat),
    #[serde(with = "positions")]
    LineString(Vec<LonLat>),
}

impl Geometry {
    /// Parses a GeoJSON geometry object such as a feature's `geometry` member.
    pub fn from_geojson_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            properties: Map::new(),
            geometry,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// A collection holding one property-less feature.
    pub fn single(geometry: Geometry) -> Self {
        Self {
            features: vec![Feature::new(geometry)],
        }
    }

    pub fn point(p: LonLat) -> Self {
        Self::single(Geometry::Point(p))
    }

    pub fn line_string(coords: impl Into<Vec<LonLat>>) -> Self {
        Self::single(Geometry::LineString(coords.into()))
    }

    pub fn to_geojson_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `[lon, lat]` on the wire. Members past the latitude, such as altitude, are
/// dropped on read.
mod position {
    use foundation::LonLat;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(p: &LonLat, serializer: S) -> Result<S::Ok, S::Error> {
        p.to_array().serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LonLat, D::Error> {
        let raw = Vec::<f64>::deserialize(deserializer)?;
        from_members(&raw).ok_or_else(|| D::Error::invalid_length(raw.len(), &"[lon, lat]"))
    }

    pub(super) fn from_members(raw: &[f64]) -> Option<LonLat> {
        match raw {
            [lon, lat, ..] => Some(LonLat::new(*lon, *lat)),
            _ => None,
        }
    }
}

mod positions {
    use foundation::LonLat;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        coords: &[LonLat],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(coords.iter().map(|p| p.to_array()))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<LonLat>, D::Error> {
        let raw = Vec::<Vec<f64>>::deserialize(deserializer)?;
        raw.iter()
            .enumerate()
            .map(|(i, members)| {
                super::position::from_members(members).ok_or_else(|| {
                    D::Error::custom(format!("coordinate {i} must have [lon, lat]"))
                })
            })
            .collect()
    }
}
