use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property bag carried by every feature
pub type Properties = Map<String, Value>;

/// A `[longitude, latitude]` pair. Extra ordinates such as altitude are
/// accepted on input and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position(pub [f64; 2]);

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(ordinates: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match ordinates[..] {
            [lng, lat, ..] => Ok(Position([lng, lat])),
            _ => Err(format!(
                "position needs at least 2 ordinates, got {}",
                ordinates.len()
            )),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        position.0
    }
}

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

impl GeoJsonGeometry {
    pub fn point(at: LatLng) -> Self {
        GeoJsonGeometry::Point {
            coordinates: Position(at.to_lng_lat()),
        }
    }

    /// Position of a point geometry
    pub fn as_point(&self) -> Option<LatLng> {
        match self {
            GeoJsonGeometry::Point { coordinates } => Some(LatLng::from_lng_lat(coordinates.0)),
            _ => None,
        }
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct GeoJsonFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<Properties>,
}

impl GeoJsonFeature {
    pub fn new(geometry: GeoJsonGeometry, properties: Properties) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: Some(properties),
        }
    }

    /// Looks up a property
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|props| props.get(key))
    }

    /// Position of the feature when it is a point
    pub fn point(&self) -> Option<LatLng> {
        self.geometry.as_ref().and_then(GeoJsonGeometry::as_point)
    }
}

/// Ordered list of features
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<GeoJsonFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<GeoJsonFeature>) -> Self {
        Self { features }
    }

    /// Parses a collection from raw JSON
    pub fn from_str(geojson: &str) -> crate::Result<Self> {
        serde_json::from_str(geojson)
            .map_err(|e| crate::Error::Source(format!("Invalid GeoJSON: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FromIterator<GeoJsonFeature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = GeoJsonFeature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_parsing() {
        let geojson_str = r#"
        {
            "type": "FeatureCollection",
            "crs": { "type": "name" },
            "features": [
                {
                    "type": "Feature",
                    "properties": {
                        "latitude": "37.76",
                        "longitude": "-122.41",
                        "service_name": "Street Cleaning"
                    },
                    "geometry": {
                        "type": "Point",
                        "coordinates": [-122.41, 37.76]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {"latitude": "37.70", "longitude": "-122.45"},
                    "geometry": null
                }
            ]
        }
        "#;

        let collection = FeatureCollection::from_str(geojson_str).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(
            collection.features[0].point(),
            Some(LatLng::new(37.76, -122.41))
        );
        assert!(collection.features[1].geometry.is_none());
        assert_eq!(
            collection.features[0].property("service_name"),
            Some(&Value::from("Street Cleaning"))
        );
    }

    #[test]
    fn test_altitude_is_dropped() {
        let collection = FeatureCollection::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": null,
                        "geometry": { "type": "Point", "coordinates": [-122.41, 37.76, 12.5] }
                    },
                    {
                        "type": "Feature",
                        "properties": null,
                        "geometry": {
                            "type": "LineString",
                            "coordinates": [[-122.41, 37.76, 0.0], [-122.40, 37.77, 3.0]]
                        }
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(
            collection.features[0].point(),
            Some(LatLng::new(37.76, -122.41))
        );

        let json = serde_json::to_value(&collection.features[0]).unwrap();
        assert_eq!(json["geometry"]["coordinates"], serde_json::json!([-122.41, 37.76]));
    }

    #[test]
    fn test_short_position_is_an_error() {
        let err = FeatureCollection::from_str(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "Point", "coordinates": [1.0]}}
            ]}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_wrong_root() {
        let err = FeatureCollection::from_str(r#"{"type": "Feature", "geometry": null}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_serializes_type_tags() {
        let feature = GeoJsonFeature::new(
            GeoJsonGeometry::point(LatLng::new(1.0, 2.0)),
            Properties::new(),
        );
        let json = serde_json::to_value(FeatureCollection::new(vec![feature])).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0], 2.0);
    }
}
