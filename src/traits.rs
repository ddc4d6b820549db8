//! Capability traits at the seams of the crate
//!
//! The map-rendering library is an external collaborator. Everything this
//! crate needs from it is listed on [`MapRenderer`]; its clustering index is
//! narrowed further to [`ClusterIndex`], so the presenter's own logic can be
//! exercised against any implementation.

use std::sync::Arc;

use crate::{
    core::{
        camera::{CameraState, EaseOptions},
        geo::Point,
        map::MapOptions,
    },
    data::geojson::{FeatureCollection, GeoJsonFeature},
    input::events::{Cursor, EventKind},
    layers::spec::{LayerSpec, SourceSpec},
    ui::controls::{ControlPosition, ControlSpec},
    Result,
};
use async_trait::async_trait;

/// The rendering collaborator surface consumed by the map components
pub trait MapRenderer: Send {
    /// Creates the map view: container, style, initial camera, hash sync and
    /// credentials
    fn initialize(&mut self, options: &MapOptions) -> Result<()>;

    /// Registers a data source under `id`
    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<()>;

    /// Replaces the data of a registered GeoJSON source
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()>;

    /// Adds a layer on top of the style, or directly below `before`
    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) -> Result<()>;

    /// Adds a UI control at a corner of the map
    fn add_control(&mut self, control: ControlSpec, position: ControlPosition) -> Result<()>;

    /// Current style layers in render order, bottom first
    fn style_layers(&self) -> Vec<LayerSpec>;

    /// Asks the renderer to deliver events of `kind`, optionally restricted to
    /// features of one layer
    fn subscribe(&mut self, kind: EventKind, layer: Option<&str>);

    /// Current camera
    fn camera(&self) -> CameraState;

    /// Animates the camera
    fn ease_to(&mut self, options: EaseOptions);

    fn set_cursor(&mut self, cursor: Cursor);

    /// Features of `layers` rendered under a container point, topmost first
    fn query_rendered_features(&self, point: Point, layers: &[&str]) -> Vec<GeoJsonFeature>;

    /// Clustering index behind a clustered source
    fn cluster_index(&self, source_id: &str) -> Option<Arc<dyn ClusterIndex>>;
}

/// Cluster id → expansion zoom
#[async_trait]
pub trait ClusterIndex: Send + Sync {
    /// Zoom level at which the cluster splits into its children
    async fn expansion_zoom(&self, cluster_id: u64) -> Result<f64>;
}

/// Remote dataset feeding the cluster presenter
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch(&self) -> Result<FeatureCollection>;
}
