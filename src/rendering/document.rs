//! Headless renderer that records the style as a JSON document
//!
//! [`StyleDocument`] keeps sources and layers in style order, clusters its
//! GeoJSON sources with [`GridClusterIndex`] and hit-tests circle layers
//! against the camera, which is enough to drive the map components without a
//! browser and to export what they declared.

use std::sync::Arc;

use crate::prelude::{HashMap, HashSet};
use crate::{
    core::{
        camera::{CameraState, EaseOptions},
        config::{BaseStyle, Credentials},
        geo::Point,
        map::MapOptions,
    },
    data::{
        geojson::{FeatureCollection, GeoJsonFeature},
        http,
    },
    input::events::{Cursor, EventKind, MapEvent},
    layers::{
        expression::evaluate,
        spec::{LayerKind, LayerSpec, SourceSpec},
    },
    spatial::clustering::GridClusterIndex,
    traits::{ClusterIndex, MapRenderer},
    ui::controls::{ControlPosition, ControlSpec},
    MapError, Result,
};
use serde_json::{json, Map as JsonMap, Value};

/// Renderer defaults for GeoJSON sources that leave clustering unset
const DEFAULT_SOURCE_MAX_ZOOM: u8 = 14;
const DEFAULT_SOURCE_RADIUS: f64 = 50.0;

/// Circle radius assumed when a layer's paint does not evaluate to a number
const DEFAULT_HIT_RADIUS: f64 = 5.0;

#[derive(Debug, Clone)]
struct GeoJsonData {
    index: Arc<GridClusterIndex>,
    clustered: bool,
}

impl GeoJsonData {
    fn build(source: &SourceSpec) -> Option<Self> {
        match source {
            SourceSpec::Geojson {
                data,
                cluster,
                cluster_max_zoom,
                cluster_radius,
            } => {
                let radius = if *cluster {
                    cluster_radius.unwrap_or(DEFAULT_SOURCE_RADIUS)
                } else {
                    0.0
                };
                let max_zoom = cluster_max_zoom.unwrap_or(DEFAULT_SOURCE_MAX_ZOOM);
                Some(Self {
                    index: Arc::new(GridClusterIndex::new(data, max_zoom, radius)),
                    clustered: *cluster,
                })
            }
            _ => None,
        }
    }
}

/// A Mapbox-style document standing in for a live renderer
#[derive(Debug, Clone)]
pub struct StyleDocument {
    options: Option<MapOptions>,
    /// Sources that came with the base style, kept verbatim
    base_sources: JsonMap<String, Value>,
    sources: Vec<(String, SourceSpec)>,
    geojson: HashMap<String, GeoJsonData>,
    layers: Vec<LayerSpec>,
    controls: Vec<(ControlSpec, ControlPosition)>,
    subscriptions: Vec<(EventKind, Option<String>)>,
    camera: CameraState,
    viewport: Point,
    cursor: Cursor,
    hovered: HashSet<String>,
    eases: Vec<EaseOptions>,
}

impl StyleDocument {
    /// An empty style for a viewport of `viewport` pixels
    pub fn new(viewport: Point) -> Self {
        Self {
            options: None,
            base_sources: JsonMap::new(),
            sources: Vec::new(),
            geojson: HashMap::default(),
            layers: Vec::new(),
            controls: Vec::new(),
            subscriptions: Vec::new(),
            camera: CameraState::default(),
            viewport,
            cursor: Cursor::Default,
            hovered: HashSet::default(),
            eases: Vec::new(),
        }
    }

    /// Starts from a base style document.
    ///
    /// Base layers of a type this crate does not model are dropped with a
    /// warning.
    pub fn from_style_json(style: Value, viewport: Point) -> Result<Self> {
        let Value::Object(mut style) = style else {
            return Err(MapError::Style("style document is not an object".into()));
        };

        let mut document = Self::new(viewport);
        if let Some(Value::Object(sources)) = style.remove("sources") {
            document.base_sources = sources;
        }

        let layers = match style.remove("layers") {
            Some(Value::Array(layers)) => layers,
            Some(_) => return Err(MapError::Style("style layers are not an array".into())),
            None => Vec::new(),
        };
        for layer in layers {
            match serde_json::from_value::<LayerSpec>(layer) {
                Ok(layer) => document.layers.push(layer),
                Err(e) => log::warn!("skipping base style layer: {}", e),
            }
        }

        log::debug!(
            "base style has {} sources and {} layers",
            document.base_sources.len(),
            document.layers.len()
        );
        Ok(document)
    }

    /// Downloads a base style
    pub async fn fetch(
        style: &BaseStyle,
        credentials: &Credentials,
        viewport: Point,
    ) -> Result<Self> {
        log::debug!("downloading style {}", style.resolve());
        let request = http::HTTP_CLIENT.get(style.download_url(credentials));
        let document: Value = http::get_json(request).await?;
        Self::from_style_json(document, viewport)
    }

    pub fn options(&self) -> Option<&MapOptions> {
        self.options.as_ref()
    }

    pub fn controls(&self) -> &[(ControlSpec, ControlPosition)] {
        &self.controls
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Every ease request received, oldest first
    pub fn eases(&self) -> &[EaseOptions] {
        &self.eases
    }

    pub fn is_subscribed(&self, kind: EventKind, layer: Option<&str>) -> bool {
        self.subscriptions
            .iter()
            .any(|(k, l)| *k == kind && l.as_deref() == layer)
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.base_sources.contains_key(id) || self.sources.iter().any(|(s, _)| s == id)
    }

    /// A source added through the renderer, with its current data
    pub fn source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources
            .iter()
            .find(|(source, _)| source == id)
            .map(|(_, spec)| spec)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    fn layer_position(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Features a layer draws at the current zoom, before hit-testing
    pub fn rendered_features(&self, layer_id: &str) -> Vec<GeoJsonFeature> {
        let Some(layer) = self.layer(layer_id) else {
            return Vec::new();
        };
        let Some(data) = layer.source.as_ref().and_then(|s| self.geojson.get(s)) else {
            return Vec::new();
        };

        let zoom = self.camera.zoom;
        data.index
            .features_at(zoom)
            .into_iter()
            .filter(|feature| passes_filter(layer, feature, zoom))
            .collect()
    }

    fn hit(&self, layer: &LayerSpec, point: Point) -> Vec<GeoJsonFeature> {
        if layer.kind != LayerKind::Circle {
            return Vec::new();
        }
        let zoom = self.camera.zoom;
        self.rendered_features(&layer.id)
            .into_iter()
            .filter(|feature| {
                let Some(at) = feature.point() else {
                    return false;
                };
                let screen = self.camera.world_to_screen(at.project(zoom), self.viewport);
                screen.distance_to(&point) <= circle_radius(layer, feature, zoom)
            })
            .collect()
    }

    /// Moves the camera to `zoom` as a user gesture would
    pub fn zoom_to(&mut self, zoom: f64) -> MapEvent {
        self.camera.apply(&EaseOptions {
            zoom: Some(zoom),
            ..Default::default()
        });
        MapEvent::Zoom {
            zoom: self.camera.zoom,
        }
    }

    /// Events a click at `point` produces for the current subscriptions
    pub fn click_at(&self, point: Point) -> Vec<MapEvent> {
        let mut events = Vec::new();
        for (kind, layer) in &self.subscriptions {
            if *kind != EventKind::Click {
                continue;
            }
            match layer {
                Some(id) if !self.query_rendered_features(point, &[id.as_str()]).is_empty() => {
                    events.push(MapEvent::Click {
                        point,
                        layer: Some(id.clone()),
                    })
                }
                Some(_) => {}
                None => events.push(MapEvent::Click { point, layer: None }),
            }
        }
        events
    }

    /// Enter and leave events for a pointer now at `point`
    pub fn pointer_moved(&mut self, point: Point) -> Vec<MapEvent> {
        let mut watched: Vec<String> = self
            .subscriptions
            .iter()
            .filter(|(kind, _)| matches!(kind, EventKind::MouseEnter | EventKind::MouseLeave))
            .filter_map(|(_, layer)| layer.clone())
            .collect();
        watched.sort_unstable();
        watched.dedup();

        let mut events = Vec::new();
        for layer in watched {
            let over = !self.query_rendered_features(point, &[layer.as_str()]).is_empty();
            let was_over = self.hovered.contains(&layer);
            if over && !was_over {
                self.hovered.insert(layer.clone());
                if self.is_subscribed(EventKind::MouseEnter, Some(layer.as_str())) {
                    events.push(MapEvent::MouseEnter { layer });
                }
            } else if !over && was_over {
                self.hovered.remove(&layer);
                if self.is_subscribed(EventKind::MouseLeave, Some(layer.as_str())) {
                    events.push(MapEvent::MouseLeave { layer });
                }
            }
        }
        events
    }

    /// The style as a Mapbox style document, version 8
    pub fn to_style_json(&self) -> Result<Value> {
        let mut sources = self.base_sources.clone();
        for (id, source) in &self.sources {
            sources.insert(id.clone(), serde_json::to_value(source)?);
        }

        Ok(json!({
            "version": 8,
            "center": self.camera.center.to_lng_lat(),
            "zoom": self.camera.zoom,
            "pitch": self.camera.pitch,
            "bearing": self.camera.bearing,
            "sources": sources,
            "layers": self.layers,
        }))
    }
}

impl Default for StyleDocument {
    fn default() -> Self {
        Self::new(Point::new(1200.0, 800.0))
    }
}

impl MapRenderer for StyleDocument {
    fn initialize(&mut self, options: &MapOptions) -> Result<()> {
        if options.container.is_empty() {
            return Err(MapError::Config("map container id is empty".into()));
        }
        self.camera = options.camera;
        self.options = Some(options.clone());
        Ok(())
    }

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<()> {
        if self.has_source(id) {
            return Err(MapError::Source(format!("source {} already exists", id)));
        }
        if let Some(data) = GeoJsonData::build(&source) {
            self.geojson.insert(id.to_string(), data);
        }
        self.sources.push((id.to_string(), source));
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        let Some((_, source)) = self.sources.iter_mut().find(|(s, _)| s == id) else {
            return Err(MapError::Source(format!("source {} does not exist", id)));
        };
        let SourceSpec::Geojson { data: current, .. } = source else {
            return Err(MapError::Source(format!("source {} is not GeoJSON", id)));
        };
        *current = data;
        if let Some(rebuilt) = GeoJsonData::build(source) {
            self.geojson.insert(id.to_string(), rebuilt);
        }
        Ok(())
    }

    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) -> Result<()> {
        if self.layer_position(&layer.id).is_some() {
            return Err(MapError::Layer(format!("layer {} already exists", layer.id)));
        }
        match before {
            Some(before) => {
                let index = self.layer_position(before).ok_or_else(|| {
                    MapError::Layer(format!("layer {} does not exist", before))
                })?;
                self.layers.insert(index, layer);
            }
            None => self.layers.push(layer),
        }
        Ok(())
    }

    fn add_control(&mut self, control: ControlSpec, position: ControlPosition) -> Result<()> {
        self.controls.push((control, position));
        Ok(())
    }

    fn style_layers(&self) -> Vec<LayerSpec> {
        self.layers.clone()
    }

    fn subscribe(&mut self, kind: EventKind, layer: Option<&str>) {
        if !self.is_subscribed(kind, layer) {
            self.subscriptions.push((kind, layer.map(str::to_string)));
        }
    }

    fn camera(&self) -> CameraState {
        self.camera
    }

    fn ease_to(&mut self, options: EaseOptions) {
        self.camera.apply(&options);
        self.eases.push(options);
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn query_rendered_features(&self, point: Point, layers: &[&str]) -> Vec<GeoJsonFeature> {
        self.layers
            .iter()
            .rev()
            .filter(|layer| layers.contains(&layer.id.as_str()))
            .flat_map(|layer| self.hit(layer, point))
            .collect()
    }

    fn cluster_index(&self, source_id: &str) -> Option<Arc<dyn ClusterIndex>> {
        self.geojson
            .get(source_id)
            .filter(|data| data.clustered)
            .map(|data| data.index.clone() as Arc<dyn ClusterIndex>)
    }
}

fn passes_filter(layer: &LayerSpec, feature: &GeoJsonFeature, zoom: f64) -> bool {
    let Some(filter) = &layer.filter else {
        return true;
    };
    let empty = JsonMap::new();
    let properties = feature.properties.as_ref().unwrap_or(&empty);
    evaluate(filter, properties, zoom) == Value::Bool(true)
}

fn circle_radius(layer: &LayerSpec, feature: &GeoJsonFeature, zoom: f64) -> f64 {
    let empty = JsonMap::new();
    let properties = feature.properties.as_ref().unwrap_or(&empty);
    layer
        .paint
        .get("circle-radius")
        .map(|radius| evaluate(radius, properties, zoom))
        .and_then(|radius| radius.as_f64())
        .unwrap_or(DEFAULT_HIT_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng,
        data::geojson::{GeoJsonGeometry, Properties},
        layers::expression::Expression,
    };

    fn base_style() -> Value {
        json!({
            "version": 8,
            "sources": {
                "composite": { "type": "vector", "url": "mapbox://mapbox.mapbox-streets-v7" }
            },
            "layers": [
                { "id": "background", "type": "background" },
                { "id": "water", "type": "fill", "source": "composite", "source-layer": "water" },
                { "id": "road-label", "type": "symbol", "source": "composite",
                  "layout": { "text-field": "{name}" } },
                { "id": "mystery", "type": "not-a-layer-type" }
            ]
        })
    }

    fn base_document() -> StyleDocument {
        StyleDocument::from_style_json(base_style(), Point::new(800.0, 600.0)).unwrap()
    }

    fn report(lat: f64, lng: f64) -> GeoJsonFeature {
        GeoJsonFeature::new(GeoJsonGeometry::point(LatLng::new(lat, lng)), Properties::new())
    }

    #[test]
    fn test_parses_base_style() {
        let document = base_document();
        let ids: Vec<_> = document.style_layers().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["background", "water", "road-label"]);
        assert!(document.has_source("composite"));

        assert!(StyleDocument::from_style_json(json!([1, 2]), Point::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_add_layer_before() {
        let mut document = base_document();
        document
            .add_layer(LayerSpec::new("extrusions", LayerKind::FillExtrusion), Some("road-label"))
            .unwrap();
        document.add_layer(LayerSpec::new("top", LayerKind::Circle), None).unwrap();

        let ids: Vec<_> = document.style_layers().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["background", "water", "extrusions", "road-label", "top"]);

        assert!(document
            .add_layer(LayerSpec::new("orphan", LayerKind::Fill), Some("missing"))
            .is_err());
        assert!(document.add_layer(LayerSpec::new("top", LayerKind::Fill), None).is_err());
    }

    #[test]
    fn test_duplicate_source() {
        let mut document = base_document();
        let vector = SourceSpec::Vector {
            url: "mapbox://x".into(),
        };
        assert!(document.add_source("composite", vector.clone()).is_err());
        assert!(document.add_source("other", vector).is_ok());
    }

    #[test]
    fn test_hit_testing_circle_layer() {
        let mut document = StyleDocument::new(Point::new(800.0, 600.0));
        let center = LatLng::new(37.77, -122.42);
        document.camera = CameraState::new(center, 15.0);

        document
            .add_source(
                "reports",
                SourceSpec::Geojson {
                    data: FeatureCollection::new(vec![report(37.77, -122.42)]),
                    cluster: false,
                    cluster_max_zoom: None,
                    cluster_radius: None,
                },
            )
            .unwrap();
        document
            .add_layer(
                LayerSpec::new("points", LayerKind::Circle)
                    .with_source("reports")
                    .with_filter(Expression::not(Expression::has("point_count")))
                    .with_paint("circle-radius", 4),
                None,
            )
            .unwrap();

        assert_eq!(document.rendered_features("points").len(), 1);
        assert_eq!(
            document
                .query_rendered_features(Point::new(402.0, 300.0), &["points"])
                .len(),
            1
        );
        assert!(document
            .query_rendered_features(Point::new(420.0, 300.0), &["points"])
            .is_empty());
        assert!(document.cluster_index("reports").is_none());
    }

    #[test]
    fn test_ease_and_export() {
        let mut document = StyleDocument::default();
        document.ease_to(EaseOptions::angle(40.0, -17.0));
        assert_eq!(document.camera().pitch, 40.0);
        assert_eq!(document.eases().len(), 1);

        let style = document.to_style_json().unwrap();
        assert_eq!(style["version"], 8);
        assert_eq!(style["pitch"], 40.0);
        assert_eq!(style["layers"], json!([]));
    }
}
