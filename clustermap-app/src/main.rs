use std::sync::Arc;

use anyhow::Context;
use clustermap::{
    Credentials, Map, MapConfig, MapEvent, MapRenderer, Outcome, SocrataDataset, StyleDocument,
};

/// Bootstraps the street-report map against a headless renderer, runs the
/// load sequence and prints the resulting style document.
///
/// Usage: `clustermap-app [config.json]`. The access token is read from
/// `MAPBOX_ACCESS_TOKEN` when the config does not carry one.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            MapConfig::from_json_str(&json).with_context(|| format!("parsing config {}", path))?
        }
        None => MapConfig::default(),
    };
    if config.credentials.is_empty() {
        config.credentials = Credentials::from_env().context("no access token configured")?;
    }

    let document = match StyleDocument::fetch(
        &config.style,
        &config.credentials,
        config.viewport_size,
    )
    .await
    {
        Ok(document) => document,
        Err(e) => {
            log::error!("base style unavailable, starting from an empty style: {}", e);
            StyleDocument::new(config.viewport_size)
        }
    };

    let dataset = Arc::new(SocrataDataset::new(config.dataset.clone()));
    let mut map = Map::bootstrap(document, config, dataset)?;

    match map.handle_event(MapEvent::Load).await {
        Ok(outcomes) => {
            for outcome in outcomes {
                if let Outcome::Loaded { augment, reports } = outcome {
                    log::info!(
                        "buildings placed {:?}; {} of {} reports shown",
                        augment.extrusion,
                        reports.registered,
                        reports.fetched
                    );
                }
            }
        }
        Err(e) => log::error!("map load incomplete: {}", e),
    }

    let zoom = map.renderer().camera().zoom;
    let event = map.renderer_mut().zoom_to(zoom);
    map.handle_event(event).await?;

    let style = map.renderer().to_style_json()?;
    println!("{}", serde_json::to_string_pretty(&style)?);
    if let Some(hash) = map.location_hash() {
        log::info!("view {}", hash);
    }
    Ok(())
}
