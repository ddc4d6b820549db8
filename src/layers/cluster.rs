//! Clustered report markers
//!
//! The presenter owns the report collection once it has been fetched and
//! normalized. It registers a clustering source with the renderer, declares
//! the cluster, count and single-point layers, and reacts to clicks and hover
//! on clusters. The clustering itself belongs to the renderer's index.

use crate::{
    core::{
        camera::EaseOptions,
        constants::{
            CLUSTERS_LAYER_ID, CLUSTER_COUNT_LAYER_ID, DEFAULT_CLUSTER_MAX_ZOOM,
            DEFAULT_CLUSTER_RADIUS, MAX_RECORDS, REPORTS_SOURCE_ID, UNCLUSTERED_LAYER_ID,
        },
        geo::{LatLng, Point},
    },
    data::{
        geojson::FeatureCollection,
        normalize::{normalize, Normalized, Rejected},
    },
    input::{
        events::{Cursor, EventKind},
        handler::Handler,
    },
    layers::{
        expression::Expression,
        spec::{LayerKind, LayerSpec, SourceSpec},
    },
    traits::{DatasetSource, MapRenderer},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Events the presenter listens to on the cluster layer, and who handles them
pub const INTERACTIONS: [(EventKind, Handler); 3] = [
    (EventKind::Click, Handler::ExpandCluster),
    (EventKind::MouseEnter, Handler::PointerCursor),
    (EventKind::MouseLeave, Handler::DefaultCursor),
];

/// Clustering thresholds for the report source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSourceOptions {
    pub source_id: String,
    /// Let the renderer cluster the points at all
    pub enabled: bool,
    /// Highest zoom at which points are still clustered
    pub max_zoom: u8,
    /// Cluster membership radius in pixels
    pub radius: f64,
}

impl Default for ClusterSourceOptions {
    fn default() -> Self {
        Self {
            source_id: REPORTS_SOURCE_ID.to_string(),
            enabled: true,
            max_zoom: DEFAULT_CLUSTER_MAX_ZOOM,
            radius: DEFAULT_CLUSTER_RADIUS,
        }
    }
}

/// Visual encoding for clusters holding at least `min_count` points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterBand {
    pub min_count: u64,
    pub radius: f64,
    pub color: String,
}

impl ClusterBand {
    pub fn new(min_count: u64, radius: f64, color: impl Into<String>) -> Self {
        Self {
            min_count,
            radius,
            color: color.into(),
        }
    }
}

/// Ascending bands; a count on a boundary takes the upper band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterBands(Vec<ClusterBand>);

impl ClusterBands {
    pub fn new(bands: Vec<ClusterBand>) -> Result<Self> {
        let bands = Self(bands);
        bands.validate()?;
        Ok(bands)
    }

    pub fn validate(&self) -> Result<()> {
        match self.0.first() {
            None => return Err(MapError::Config("cluster bands are empty".into())),
            Some(first) if first.min_count != 0 => {
                return Err(MapError::Config(
                    "the first cluster band must start at 0".into(),
                ))
            }
            _ => {}
        }
        if self.0.windows(2).any(|w| w[0].min_count >= w[1].min_count) {
            return Err(MapError::Config(
                "cluster bands must be strictly ascending".into(),
            ));
        }
        Ok(())
    }

    pub fn bands(&self) -> &[ClusterBand] {
        &self.0
    }

    /// Band a cluster of `point_count` points falls into
    pub fn band_for(&self, point_count: u64) -> Option<&ClusterBand> {
        self.0
            .iter()
            .rev()
            .find(|band| band.min_count <= point_count)
    }

    /// `circle-color` stepped on `point_count`
    pub fn color_expression(&self) -> Expression {
        self.step(|band| Expression::literal(band.color.as_str()))
    }

    /// `circle-radius` stepped on `point_count`
    pub fn radius_expression(&self) -> Expression {
        self.step(|band| Expression::literal(band.radius))
    }

    fn step(&self, output: impl Fn(&ClusterBand) -> Expression) -> Expression {
        let Some((first, rest)) = self.0.split_first() else {
            return Expression::literal(Value::Null);
        };
        Expression::step(
            Expression::get("point_count"),
            output(first),
            rest.iter().map(|band| (band.min_count as f64, output(band))),
        )
    }
}

impl Default for ClusterBands {
    fn default() -> Self {
        Self(vec![
            ClusterBand::new(0, 20.0, "#51bbd6"),
            ClusterBand::new(100, 30.0, "#f1f075"),
            ClusterBand::new(750, 40.0, "#f28cb1"),
        ])
    }
}

/// What a click on the cluster layer led to
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The camera eases onto the cluster at its expansion zoom
    Eased {
        cluster_id: u64,
        center: LatLng,
        zoom: f64,
    },
    /// Nothing happened; the camera is untouched
    Ignored(String),
}

/// Summary of one dataset load
#[derive(Debug, Clone, PartialEq)]
pub struct PresenterReport {
    /// Records the dataset returned
    pub fetched: usize,
    /// Records left after the [`MAX_RECORDS`] cap
    pub kept: usize,
    pub registered: usize,
    pub rejected: Vec<Rejected>,
}

#[derive(Debug, Clone)]
pub struct ClusterPresenter {
    options: ClusterSourceOptions,
    bands: ClusterBands,
    /// Size of the collection handed to the renderer, once registered
    registered: Option<usize>,
}

impl ClusterPresenter {
    pub fn new(options: ClusterSourceOptions, bands: ClusterBands) -> Self {
        Self {
            options,
            bands,
            registered: None,
        }
    }

    pub fn options(&self) -> &ClusterSourceOptions {
        &self.options
    }

    pub fn bands(&self) -> &ClusterBands {
        &self.bands
    }

    /// Number of records the renderer currently holds
    pub fn registered(&self) -> Option<usize> {
        self.registered
    }

    /// Fetches, normalizes and hands the reports to the renderer.
    ///
    /// At most [`MAX_RECORDS`] records are kept, in dataset order, whatever
    /// the source returns. The first load registers the source and layers;
    /// later loads replace the source data wholesale.
    pub async fn load(
        &mut self,
        renderer: &mut dyn MapRenderer,
        dataset: &dyn DatasetSource,
    ) -> Result<PresenterReport> {
        let mut raw = dataset.fetch().await.map_err(|e| {
            log::error!("report dataset unavailable: {}", e);
            e
        })?;
        let fetched = raw.len();
        if fetched > MAX_RECORDS {
            log::warn!(
                "dataset returned {} records, keeping the first {}",
                fetched,
                MAX_RECORDS
            );
            raw.features.truncate(MAX_RECORDS);
        }
        let kept = raw.len();

        let Normalized {
            collection,
            rejected,
        } = normalize(raw);
        if let Some(first) = rejected.first() {
            log::warn!(
                "skipped {} of {} records without usable coordinates (first: #{} {})",
                rejected.len(),
                kept,
                first.index,
                first.reason
            );
        }

        let registered = collection.len();
        if self.registered.is_some() {
            renderer.set_source_data(&self.options.source_id, collection)?;
        } else {
            self.register(renderer, collection)?;
        }
        self.registered = Some(registered);

        log::info!("{} reports on the map", registered);
        Ok(PresenterReport {
            fetched,
            kept,
            registered,
            rejected,
        })
    }

    /// Registers the clustering source and the three marker layers
    pub fn register(
        &mut self,
        renderer: &mut dyn MapRenderer,
        collection: FeatureCollection,
    ) -> Result<()> {
        let count = collection.len();
        renderer.add_source(&self.options.source_id, self.source(collection))?;
        for layer in self.layers() {
            renderer.add_layer(layer, None)?;
        }
        self.registered = Some(count);
        Ok(())
    }

    fn source(&self, data: FeatureCollection) -> SourceSpec {
        let enabled = self.options.enabled;
        SourceSpec::Geojson {
            data,
            cluster: enabled,
            cluster_max_zoom: enabled.then_some(self.options.max_zoom),
            cluster_radius: enabled.then_some(self.options.radius),
        }
    }

    /// Cluster circles, cluster counts and single points, bottom first
    pub fn layers(&self) -> Vec<LayerSpec> {
        let source = self.options.source_id.as_str();

        let clusters = LayerSpec::new(CLUSTERS_LAYER_ID, LayerKind::Circle)
            .with_source(source)
            .with_filter(Expression::has("point_count"))
            .with_paint("circle-color", self.bands.color_expression())
            .with_paint("circle-radius", self.bands.radius_expression());

        let counts = LayerSpec::new(CLUSTER_COUNT_LAYER_ID, LayerKind::Symbol)
            .with_source(source)
            .with_filter(Expression::has("point_count"))
            .with_layout("text-field", "{point_count_abbreviated}")
            .with_layout(
                "text-font",
                json!(["DIN Offc Pro Medium", "Arial Unicode MS Bold"]),
            )
            .with_layout("text-size", 12);

        let points = LayerSpec::new(UNCLUSTERED_LAYER_ID, LayerKind::Circle)
            .with_source(source)
            .with_filter(Expression::not(Expression::has("point_count")))
            .with_paint("circle-color", "#11b4da")
            .with_paint("circle-radius", 4)
            .with_paint("circle-stroke-width", 1)
            .with_paint("circle-stroke-color", "#fff");

        vec![clusters, counts, points]
    }

    /// Zooms into the cluster under `point`.
    ///
    /// A click that hits no cluster, or whose expansion zoom cannot be
    /// resolved, leaves the camera where it is.
    pub async fn on_click(&self, renderer: &mut dyn MapRenderer, point: Point) -> ClickOutcome {
        let features = renderer.query_rendered_features(point, &[CLUSTERS_LAYER_ID]);
        let Some(feature) = features.first() else {
            return ignored("no cluster under the pointer".into());
        };
        let Some(cluster_id) = feature.property("cluster_id").and_then(Value::as_u64) else {
            return ignored("feature has no cluster_id".into());
        };
        let Some(center) = feature.point() else {
            return ignored(format!("cluster {} has no point geometry", cluster_id));
        };
        let Some(index) = renderer.cluster_index(&self.options.source_id) else {
            return ignored(format!("source {} is not clustered", self.options.source_id));
        };

        match index.expansion_zoom(cluster_id).await {
            Ok(zoom) => {
                log::debug!("expanding cluster {} at zoom {}", cluster_id, zoom);
                renderer.ease_to(EaseOptions::center_zoom(center, zoom));
                ClickOutcome::Eased {
                    cluster_id,
                    center,
                    zoom,
                }
            }
            Err(e) => ignored(format!("cluster {}: {}", cluster_id, e)),
        }
    }

    /// Pointer cursor while hovering a cluster
    pub fn on_hover(&self, renderer: &mut dyn MapRenderer, entered: bool) -> Cursor {
        let cursor = if entered {
            Cursor::Pointer
        } else {
            Cursor::Default
        };
        renderer.set_cursor(cursor);
        cursor
    }
}

impl Default for ClusterPresenter {
    fn default() -> Self {
        Self::new(ClusterSourceOptions::default(), ClusterBands::default())
    }
}

fn ignored(reason: String) -> ClickOutcome {
    log::debug!("ignoring cluster click: {}", reason);
    ClickOutcome::Ignored(reason)
}

/// Short label for a point count: `"999"`, `"1.2k"`, `"15k"`
pub fn abbreviate_count(count: u64) -> String {
    if count >= 10_000 {
        format!("{}k", (count as f64 / 1000.0).round())
    } else if count >= 1000 {
        format!("{}k", (count as f64 / 100.0).round() / 10.0)
    } else {
        count.to_string()
    }
}
