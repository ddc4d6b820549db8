//! Normalizes fetched report records into point features.
//!
//! Every record carries its position as `latitude`/`longitude` properties.
//! The geometry is rebuilt from those properties, so it always mirrors them,
//! and two display hints are stamped onto the properties.

use crate::{
    core::{
        constants::{LINE_COLOR, LINE_KEY, MARKER_COLOR, MARKER_COLOR_KEY},
        geo::LatLng,
    },
    data::geojson::{FeatureCollection, GeoJsonFeature, GeoJsonGeometry},
};
use serde_json::Value;

/// A record the normalizer could not place on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    /// Position in the input collection
    pub index: usize,
    pub reason: String,
}

/// Output of [`normalize`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub collection: FeatureCollection,
    pub rejected: Vec<Rejected>,
}

/// Rebuilds every feature's geometry from its coordinate properties.
///
/// Records without a usable `latitude`/`longitude` pair are skipped and
/// reported in [`Normalized::rejected`]; the accepted ones keep their order.
#[must_use]
pub fn normalize(collection: FeatureCollection) -> Normalized {
    let mut normalized = Normalized::default();
    normalized.collection.features.reserve(collection.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        match normalize_feature(feature) {
            Ok(feature) => normalized.collection.features.push(feature),
            Err(reason) => normalized.rejected.push(Rejected { index, reason }),
        }
    }

    normalized
}

fn normalize_feature(mut feature: GeoJsonFeature) -> Result<GeoJsonFeature, String> {
    let position = position_of(&feature)?;

    feature.geometry = Some(GeoJsonGeometry::point(position));
    let properties = feature.properties.get_or_insert_with(Default::default);
    properties.insert(MARKER_COLOR_KEY.to_string(), Value::from(MARKER_COLOR));
    properties.insert(LINE_KEY.to_string(), Value::from(LINE_COLOR));

    Ok(feature)
}

fn position_of(feature: &GeoJsonFeature) -> Result<LatLng, String> {
    let lat = coordinate(feature, "latitude")?;
    let lng = coordinate(feature, "longitude")?;

    let position = LatLng::new(lat, lng);
    if !position.is_valid() {
        return Err(format!("coordinates out of range: {}, {}", lat, lng));
    }
    Ok(position)
}

/// Reads a coordinate stored either as a JSON number or a numeric string
fn coordinate(feature: &GeoJsonFeature, key: &str) -> Result<f64, String> {
    let value = feature
        .property(key)
        .ok_or_else(|| format!("missing {}", key))?;

    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{} is not a number: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geojson::{Position, Properties};
    use serde_json::json;

    fn record(lat: Value, lng: Value) -> GeoJsonFeature {
        let mut properties = Properties::new();
        properties.insert("latitude".into(), lat);
        properties.insert("longitude".into(), lng);
        properties.insert("status".into(), json!("Closed"));
        GeoJsonFeature {
            id: None,
            geometry: None,
            properties: Some(properties),
        }
    }

    #[test]
    fn test_geometry_mirrors_properties() {
        let input = FeatureCollection::new(vec![record(json!(37.7612), json!(-122.4194))]);
        let out = normalize(input);

        assert!(out.rejected.is_empty());
        let feature = &out.collection.features[0];
        assert_eq!(
            feature.geometry,
            Some(GeoJsonGeometry::Point {
                coordinates: Position([-122.4194, 37.7612])
            })
        );
        assert_eq!(feature.property("marker-color"), Some(&json!("#0000ff")));
        assert_eq!(feature.property("line"), Some(&json!("blue")));
        assert_eq!(feature.property("status"), Some(&json!("Closed")));
    }

    #[test]
    fn test_numeric_strings() {
        let input = FeatureCollection::new(vec![record(json!("37.75"), json!(" -122.40 "))]);
        let out = normalize(input);
        assert_eq!(
            out.collection.features[0].point(),
            Some(LatLng::new(37.75, -122.40))
        );
    }

    #[test]
    fn test_overwrites_existing_geometry() {
        let mut feature = record(json!(37.0), json!(-122.0));
        feature.geometry = Some(GeoJsonGeometry::Point {
            coordinates: Position([0.0, 0.0]),
        });
        let out = normalize(FeatureCollection::new(vec![feature]));
        assert_eq!(
            out.collection.features[0].point(),
            Some(LatLng::new(37.0, -122.0))
        );
    }

    #[test]
    fn test_idempotent() {
        let input = FeatureCollection::new(vec![
            record(json!(37.1), json!(-122.1)),
            record(json!("37.2"), json!("-122.2")),
        ]);
        let once = normalize(input).collection;
        let twice = normalize(once.clone()).collection;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rejects_missing_and_invalid() {
        let mut missing = record(json!(37.0), json!(-122.0));
        if let Some(props) = missing.properties.as_mut() {
            props.remove("longitude");
        }
        let input = FeatureCollection::new(vec![
            record(json!(37.3), json!(-122.3)),
            missing,
            record(json!("n/a"), json!(-122.0)),
            record(json!(137.0), json!(-122.0)),
            GeoJsonFeature {
                id: None,
                geometry: None,
                properties: None,
            },
            record(json!(37.4), json!(-122.4)),
        ]);

        let out = normalize(input);
        assert_eq!(out.collection.len(), 2);
        assert_eq!(
            out.collection.features[0].point(),
            Some(LatLng::new(37.3, -122.3))
        );
        assert_eq!(
            out.collection.features[1].point(),
            Some(LatLng::new(37.4, -122.4))
        );
        let indices: Vec<usize> = out.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert_eq!(out.rejected[0].reason, "missing longitude");
    }
}
