//! Terrain shading and 3D buildings added on top of the base style

use crate::{
    core::constants::{BUILDINGS_LAYER_ID, HILLSHADE_LAYER_ID, TERRAIN_SOURCE_ID, TERRAIN_URL},
    layers::{
        expression::Expression,
        spec::{LayerKind, LayerSpec, SourceSpec},
    },
    traits::MapRenderer,
    Result,
};

/// Zoom window over which buildings rise from flat to full height
const EXTRUSION_RAMP: (f64, f64) = (15.0, 15.05);

/// Where the building layer ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtrusionPlacement {
    /// Directly below the first text-label layer
    BelowLabels(String),
    /// The style has no text labels; appended on top
    Top,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentReport {
    pub extrusion: ExtrusionPlacement,
}

/// Adds the hillshade and building-extrusion layers once the style is ready
#[derive(Debug, Clone, Default)]
pub struct StyleAugmenter;

impl StyleAugmenter {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, renderer: &mut dyn MapRenderer) -> Result<AugmentReport> {
        self.add_hillshade(renderer)?;
        let extrusion = self.add_extrusions(renderer)?;
        Ok(AugmentReport { extrusion })
    }

    fn add_hillshade(&self, renderer: &mut dyn MapRenderer) -> Result<()> {
        renderer.add_source(
            TERRAIN_SOURCE_ID,
            SourceSpec::RasterDem {
                url: TERRAIN_URL.to_string(),
            },
        )?;
        renderer.add_layer(
            LayerSpec::new(HILLSHADE_LAYER_ID, LayerKind::Hillshade).with_source(TERRAIN_SOURCE_ID),
            None,
        )
    }

    fn add_extrusions(&self, renderer: &mut dyn MapRenderer) -> Result<ExtrusionPlacement> {
        let label_layer = first_label_layer(&renderer.style_layers());

        match &label_layer {
            Some(id) => log::debug!("inserting {} below {}", BUILDINGS_LAYER_ID, id),
            None => log::warn!(
                "style has no text label layer; {} goes on top",
                BUILDINGS_LAYER_ID
            ),
        }

        renderer.add_layer(building_layer(), label_layer.as_deref())?;

        Ok(match label_layer {
            Some(id) => ExtrusionPlacement::BelowLabels(id),
            None => ExtrusionPlacement::Top,
        })
    }
}

/// The first symbol layer rendering text, in style order
pub fn first_label_layer(layers: &[LayerSpec]) -> Option<String> {
    layers
        .iter()
        .find(|layer| layer.is_text_label())
        .map(|layer| layer.id.clone())
}

/// Footprints flagged `extrude`, raised to `height` above `min_height`
pub fn building_layer() -> LayerSpec {
    let ramp = |property: &str| {
        Expression::interpolate_linear(
            Expression::zoom(),
            [
                (EXTRUSION_RAMP.0, Expression::literal(0)),
                (EXTRUSION_RAMP.1, Expression::get(property)),
            ],
        )
    };

    LayerSpec::new(BUILDINGS_LAYER_ID, LayerKind::FillExtrusion)
        .with_source("composite")
        .with_source_layer("building")
        .with_filter(Expression::eq(
            Expression::get("extrude"),
            Expression::literal("true"),
        ))
        .with_minzoom(12.0)
        .with_paint("fill-extrusion-color", "#FFFFFF")
        .with_paint("fill-extrusion-height", ramp("height"))
        .with_paint("fill-extrusion-base", ramp("min_height"))
        .with_paint("fill-extrusion-opacity", 0.6)
}
