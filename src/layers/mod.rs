pub mod cluster;
pub mod expression;
pub mod spec;
pub mod terrain;

pub use cluster::{ClickOutcome, ClusterPresenter, PresenterReport};
pub use expression::Expression;
pub use spec::{LayerKind, LayerSpec, SourceSpec};
pub use terrain::{AugmentReport, ExtrusionPlacement, StyleAugmenter};
