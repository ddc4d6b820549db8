use crate::{data::geojson::FeatureCollection, layers::expression::Expression};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Style layer types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    Background,
    Fill,
    Line,
    Symbol,
    Raster,
    Circle,
    FillExtrusion,
    Heatmap,
    Hillshade,
    Sky,
}

/// Data sources the map registers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourceSpec {
    /// Terrain-RGB elevation tiles
    RasterDem { url: String },
    /// Vector tiles
    Vector { url: String },
    /// Inline GeoJSON, optionally clustered by the renderer
    #[serde(rename_all = "camelCase")]
    Geojson {
        data: FeatureCollection,
        #[serde(default)]
        cluster: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cluster_max_zoom: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cluster_radius: Option<f64>,
    },
}

/// One style layer, in the renderer's JSON vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        rename = "source-layer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Value>,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            source: None,
            source_layer: None,
            filter: None,
            minzoom: None,
            layout: Map::new(),
            paint: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    pub fn with_filter(mut self, filter: Expression) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_minzoom(mut self, minzoom: f64) -> Self {
        self.minzoom = Some(minzoom);
        self
    }

    pub fn with_layout(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.layout.insert(key.to_string(), value.into());
        self
    }

    pub fn with_paint(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.paint.insert(key.to_string(), value.into());
        self
    }

    /// A symbol layer that renders text labels
    pub fn is_text_label(&self) -> bool {
        self.kind == LayerKind::Symbol && self.layout.contains_key("text-field")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_serialization() {
        let layer = LayerSpec::new("3d-buildings", LayerKind::FillExtrusion)
            .with_source("composite")
            .with_source_layer("building")
            .with_minzoom(12.0)
            .with_paint("fill-extrusion-opacity", 0.6);

        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "fill-extrusion");
        assert_eq!(json["source-layer"], "building");
        assert_eq!(json["paint"]["fill-extrusion-opacity"], 0.6);
        assert!(json.get("layout").is_none());
        assert!(json.get("filter").is_none());
    }

    #[test]
    fn test_parses_base_style_layer() {
        let layer: LayerSpec = serde_json::from_value(json!({
            "id": "place-city-lg-n",
            "type": "symbol",
            "source": "composite",
            "source-layer": "place_label",
            "minzoom": 1,
            "layout": { "text-field": "{name_en}", "text-size": 14 },
            "paint": { "text-color": "#fff" }
        }))
        .unwrap();

        assert_eq!(layer.kind, LayerKind::Symbol);
        assert!(layer.is_text_label());
        assert_eq!(layer.minzoom, Some(1.0));
    }

    #[test]
    fn test_icon_only_symbol_is_not_a_label() {
        let layer = LayerSpec::new("poi-icons", LayerKind::Symbol).with_layout("icon-image", "dot");
        assert!(!layer.is_text_label());
    }

    #[test]
    fn test_source_serialization() {
        let dem = SourceSpec::RasterDem {
            url: "mapbox://mapbox.terrain-rgb".into(),
        };
        assert_eq!(
            serde_json::to_value(&dem).unwrap(),
            json!({ "type": "raster-dem", "url": "mapbox://mapbox.terrain-rgb" })
        );

        let reports = SourceSpec::Geojson {
            data: FeatureCollection::default(),
            cluster: true,
            cluster_max_zoom: Some(13),
            cluster_radius: Some(20.0),
        };
        let json = serde_json::to_value(&reports).unwrap();
        assert_eq!(json["type"], "geojson");
        assert_eq!(json["clusterMaxZoom"], 13);
        assert_eq!(json["clusterRadius"], 20.0);
        assert_eq!(json["data"]["type"], "FeatureCollection");
    }
}
