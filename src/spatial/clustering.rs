//! Hierarchical point clustering
//!
//! Points are clustered once per integer zoom, from one level past the
//! maximum cluster zoom down to zero. Each level merges the nodes of the
//! level above that fall within the pixel radius of a seed node, in input
//! order, so the result is deterministic for a given collection.

use crate::prelude::HashMap;
use crate::{
    core::geo::{world_size, LatLng},
    data::geojson::{FeatureCollection, GeoJsonFeature, GeoJsonGeometry, Properties},
    layers::cluster::abbreviate_count,
    spatial::index::{SpatialIndex, SpatialItem},
    traits::ClusterIndex,
    MapError, Result,
};
use async_trait::async_trait;
use serde_json::Value;

/// A cluster formed at some zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterInfo {
    pub id: u64,
    /// Highest zoom at which the cluster exists
    pub zoom: u8,
    pub point_count: u64,
    /// Count-weighted centroid of its members
    pub center: LatLng,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf { position: [f64; 2], feature: usize },
    Cluster { position: [f64; 2], count: u64, id: u64 },
}

impl Node {
    fn position(&self) -> [f64; 2] {
        match self {
            Node::Leaf { position, .. } | Node::Cluster { position, .. } => *position,
        }
    }

    fn count(&self) -> u64 {
        match self {
            Node::Leaf { .. } => 1,
            Node::Cluster { count, .. } => *count,
        }
    }
}

/// Clustering index over a point collection
#[derive(Debug, Clone)]
pub struct GridClusterIndex {
    features: Vec<GeoJsonFeature>,
    /// Nodes per zoom; the last level holds the unclustered leaves
    levels: Vec<Vec<Node>>,
    clusters: HashMap<u64, ClusterInfo>,
    max_zoom: u8,
    radius: f64,
}

impl GridClusterIndex {
    /// Indexes the point features of `collection`. A non-positive `radius`
    /// disables clustering.
    pub fn new(collection: &FeatureCollection, max_zoom: u8, radius: f64) -> Self {
        let features: Vec<GeoJsonFeature> = collection
            .features
            .iter()
            .filter(|feature| feature.point().is_some())
            .cloned()
            .collect();

        let leaves: Vec<Node> = features
            .iter()
            .enumerate()
            .filter_map(|(feature, f)| {
                f.point().map(|at| Node::Leaf {
                    position: at.to_unit_mercator(),
                    feature,
                })
            })
            .collect();

        let leaf_level = usize::from(max_zoom) + 1;
        let mut levels = vec![Vec::new(); leaf_level + 1];
        levels[leaf_level] = leaves;

        let mut clusters = HashMap::default();
        let mut next_id = 1;
        for zoom in (0..=max_zoom).rev() {
            let above = &levels[usize::from(zoom) + 1];
            let merged = if radius > 0.0 {
                cluster_level(above, zoom, radius, &mut next_id, &mut clusters)
            } else {
                above.clone()
            };
            levels[usize::from(zoom)] = merged;
        }

        log::debug!(
            "indexed {} points into {} clusters (max zoom {}, radius {})",
            features.len(),
            clusters.len(),
            max_zoom,
            radius
        );

        Self {
            features,
            levels,
            clusters,
            max_zoom,
            radius,
        }
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn cluster(&self, id: u64) -> Option<&ClusterInfo> {
        self.clusters.get(&id)
    }

    /// Cluster and point features visible at `zoom`.
    ///
    /// Unclustered points are returned as they were indexed; clusters carry
    /// `cluster`, `cluster_id`, `point_count` and `point_count_abbreviated`.
    pub fn features_at(&self, zoom: f64) -> Vec<GeoJsonFeature> {
        self.levels[self.level_for(zoom)]
            .iter()
            .filter_map(|node| self.node_feature(node))
            .collect()
    }

    fn level_for(&self, zoom: f64) -> usize {
        let leaf_level = usize::from(self.max_zoom) + 1;
        if zoom.is_nan() || zoom <= 0.0 {
            0
        } else {
            (zoom.floor() as usize).min(leaf_level)
        }
    }

    fn node_feature(&self, node: &Node) -> Option<GeoJsonFeature> {
        match node {
            Node::Leaf { feature, .. } => self.features.get(*feature).cloned(),
            Node::Cluster { id, .. } => self.clusters.get(id).map(cluster_feature),
        }
    }
}

/// Merges the nodes of the level above `zoom`
fn cluster_level(
    nodes: &[Node],
    zoom: u8,
    radius: f64,
    next_id: &mut u64,
    clusters: &mut HashMap<u64, ClusterInfo>,
) -> Vec<Node> {
    let reach = radius / world_size(f64::from(zoom));
    let index = SpatialIndex::bulk_load(
        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| SpatialItem::new(i as u64, node.position(), i))
            .collect(),
    );

    let mut visited = vec![false; nodes.len()];
    let mut merged = Vec::with_capacity(nodes.len());

    for (i, node) in nodes.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let mut neighbors: Vec<usize> = index
            .query_radius(node.position(), reach)
            .into_iter()
            .map(|item| item.data)
            .filter(|&j| !visited[j])
            .collect();

        if neighbors.is_empty() {
            merged.push(node.clone());
            continue;
        }
        neighbors.sort_unstable();

        let mut count = node.count();
        let [mut wx, mut wy] = weighted(node);
        for &j in &neighbors {
            visited[j] = true;
            let [x, y] = weighted(&nodes[j]);
            wx += x;
            wy += y;
            count += nodes[j].count();
        }

        let position = [wx / count as f64, wy / count as f64];
        let id = *next_id;
        *next_id += 1;
        clusters.insert(
            id,
            ClusterInfo {
                id,
                zoom,
                point_count: count,
                center: LatLng::from_unit_mercator(position),
            },
        );
        merged.push(Node::Cluster {
            position,
            count,
            id,
        });
    }

    merged
}

fn weighted(node: &Node) -> [f64; 2] {
    let [x, y] = node.position();
    let weight = node.count() as f64;
    [x * weight, y * weight]
}

fn cluster_feature(info: &ClusterInfo) -> GeoJsonFeature {
    let mut properties = Properties::new();
    properties.insert("cluster".into(), Value::Bool(true));
    properties.insert("cluster_id".into(), Value::from(info.id));
    properties.insert("point_count".into(), Value::from(info.point_count));
    properties.insert(
        "point_count_abbreviated".into(),
        Value::from(abbreviate_count(info.point_count)),
    );

    let mut feature = GeoJsonFeature::new(GeoJsonGeometry::point(info.center), properties);
    feature.id = Some(Value::from(info.id));
    feature
}

#[async_trait]
impl ClusterIndex for GridClusterIndex {
    async fn expansion_zoom(&self, cluster_id: u64) -> Result<f64> {
        self.cluster(cluster_id)
            .map(|info| f64::from(info.zoom) + 1.0)
            .ok_or(MapError::ClusterNotFound(cluster_id))
    }
}
