//! Prelude module for common clustermap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use clustermap::prelude::*;`

pub use crate::core::{
    camera::{CameraState, EaseOptions},
    config::{BaseStyle, Credentials, MapConfig},
    geo::{LatLng, Point},
    map::{Map, MapOptions, Outcome},
};

pub use crate::animation::ease::{EaseController, ViewAngle, ViewAnglePolicy};

pub use crate::data::{
    dataset::{DatasetConfig, InMemoryDataset, SocrataDataset},
    geojson::{FeatureCollection, GeoJsonFeature, GeoJsonGeometry, Position, Properties},
    normalize::{normalize, Normalized, Rejected},
};

pub use crate::input::{
    events::{Cursor, EventKind, MapEvent},
    handler::{EventManager, Handler},
};

pub use crate::layers::{
    cluster::{
        ClickOutcome, ClusterBand, ClusterBands, ClusterPresenter, ClusterSourceOptions,
        PresenterReport,
    },
    expression::Expression,
    spec::{LayerKind, LayerSpec, SourceSpec},
    terrain::{AugmentReport, ExtrusionPlacement, StyleAugmenter},
};

pub use crate::rendering::document::StyleDocument;

pub use crate::spatial::clustering::GridClusterIndex;

pub use crate::traits::{ClusterIndex, DatasetSource, MapRenderer};

pub use crate::ui::controls::{ControlPosition, ControlSpec};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
