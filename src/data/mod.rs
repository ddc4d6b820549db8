pub mod dataset;
pub mod geojson;
pub(crate) mod http;
pub mod normalize;

pub use dataset::{DatasetConfig, InMemoryDataset, SocrataDataset};
pub use geojson::{FeatureCollection, GeoJsonFeature, GeoJsonGeometry, Position, Properties};
pub use normalize::{normalize, Normalized, Rejected};
