pub mod clustering;
pub mod index;

pub use clustering::{ClusterInfo, GridClusterIndex};
pub use index::{SpatialIndex, SpatialItem};
