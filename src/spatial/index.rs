use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A positioned item that can be indexed via an R-tree
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub id: u64,
    /// Normalized Web Mercator position
    pub position: [f64; 2],
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(id: u64, position: [f64; 2], data: T) -> Self {
        Self { id, position, data }
    }
}

impl<T> PartialEq for SpatialItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for SpatialItem<T> {}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl<T> PointDistance for SpatialItem<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over point items
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
}

impl<T> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
        }
    }

    /// Builds the tree in one pass, which balances better than repeated inserts
    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        Self {
            rtree: RTree::bulk_load(items),
        }
    }

    pub fn insert(&mut self, item: SpatialItem<T>) {
        self.rtree.insert(item);
    }

    /// Items inside the axis-aligned box spanned by two corners
    pub fn query(&self, min: [f64; 2], max: [f64; 2]) -> Vec<&SpatialItem<T>> {
        let envelope = AABB::from_corners(min, max);
        self.rtree.locate_in_envelope_intersecting(&envelope).collect()
    }

    /// Items within `radius` of `center`, boundary included
    pub fn query_radius(&self, center: [f64; 2], radius: f64) -> Vec<&SpatialItem<T>> {
        // rstar compares against the squared distance
        self.rtree
            .locate_within_distance(center, radius * radius)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpatialItem<T>> {
        self.rtree.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
