//! # clustermap
//!
//! Declarative wiring for an interactive street-report map: terrain
//! shading, 3D building extrusions and clustered point markers fetched from a
//! public GeoJSON dataset.
//!
//! The crate does not draw anything itself. Rendering, projection, tiling and
//! clustering belong to a map-rendering collaborator, described here by the
//! [`MapRenderer`] and [`ClusterIndex`] traits. A headless implementation,
//! [`StyleDocument`], records the declared style as a Mapbox-style JSON
//! document so the wiring can be exercised and exported without a browser.

pub mod animation;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod spatial;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    camera::{CameraState, EaseOptions},
    config::{BaseStyle, Credentials, MapConfig},
    geo::{LatLng, Point},
    map::{Map, MapOptions, Outcome},
};

pub use animation::ease::{EaseController, ViewAngle, ViewAnglePolicy};

pub use data::{
    dataset::{DatasetConfig, InMemoryDataset, SocrataDataset},
    geojson::{FeatureCollection, GeoJsonFeature, GeoJsonGeometry},
    normalize::{normalize, Normalized, Rejected},
};

pub use input::{events::MapEvent, handler::EventManager};

pub use layers::{
    cluster::{
        ClickOutcome, ClusterBand, ClusterBands, ClusterPresenter, ClusterSourceOptions,
        PresenterReport,
    },
    expression::Expression,
    spec::{LayerKind, LayerSpec, SourceSpec},
    terrain::{AugmentReport, ExtrusionPlacement, StyleAugmenter},
};

pub use rendering::document::StyleDocument;

pub use spatial::clustering::GridClusterIndex;

pub use traits::{ClusterIndex, DatasetSource, MapRenderer};

pub use ui::controls::{ControlPosition, ControlSpec};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Style error: {0}")]
    Style(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing access token (set {})", constants::ACCESS_TOKEN_ENV)]
    MissingCredential,

    #[error("Cluster {0} not found")]
    ClusterNotFound(u64),
}

/// Error type alias for convenience
pub type Error = MapError;
