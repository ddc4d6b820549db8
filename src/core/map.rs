use std::sync::Arc;

use crate::{
    animation::ease::{EaseController, ViewAngle},
    core::{
        camera::CameraState,
        config::{Credentials, MapConfig},
        constants::CLUSTERS_LAYER_ID,
    },
    input::{
        events::{Cursor, EventKind, MapEvent},
        handler::{EventManager, Handler},
    },
    layers::{
        cluster::{ClickOutcome, ClusterPresenter, PresenterReport, INTERACTIONS},
        terrain::{AugmentReport, StyleAugmenter},
    },
    traits::{DatasetSource, MapRenderer},
    ui::controls::default_controls,
    MapError, Result,
};

/// Everything the renderer needs to create the map view
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// DOM container id
    pub container: String,
    /// Resolved base style URL
    pub style: String,
    pub camera: CameraState,
    /// Keep the camera in the URL fragment
    pub hash: bool,
    pub credentials: Credentials,
}

impl MapOptions {
    pub fn from_config(config: &MapConfig) -> Result<Self> {
        Ok(Self {
            container: config.container.clone(),
            style: config.style.resolve(),
            camera: config.initial_camera()?,
            hash: config.hash,
            credentials: config.credentials.clone(),
        })
    }
}

/// Result of one handler run
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// First load: controls, terrain, buildings and reports are in place
    Loaded {
        augment: AugmentReport,
        reports: PresenterReport,
    },
    /// A later load replaced the report data
    Reloaded(PresenterReport),
    ViewAngle(ViewAngle),
    Click(ClickOutcome),
    Cursor(Cursor),
    /// The event did not carry what the handler needed
    Ignored,
}

/// The street-report map: one renderer plus the components wired to it
pub struct Map<R: MapRenderer> {
    renderer: R,
    config: MapConfig,
    events: EventManager,
    augmenter: StyleAugmenter,
    presenter: ClusterPresenter,
    ease: EaseController,
    dataset: Arc<dyn DatasetSource>,
    loaded: bool,
}

impl<R: MapRenderer> Map<R> {
    /// Validates `config`, creates the map view and subscribes to the load
    /// and zoom events. Nothing else happens until [`MapEvent::Load`]
    /// arrives.
    pub fn bootstrap(
        mut renderer: R,
        config: MapConfig,
        dataset: Arc<dyn DatasetSource>,
    ) -> Result<Self> {
        config.validate()?;
        let options = MapOptions::from_config(&config)?;
        renderer.initialize(&options)?;

        log::info!(
            "map created in #{} with {} at {}",
            options.container,
            options.style,
            options.camera.to_hash()
        );

        let mut map = Self {
            renderer,
            events: EventManager::new(),
            augmenter: StyleAugmenter::new(),
            presenter: ClusterPresenter::new(config.clusters.clone(), config.bands.clone()),
            ease: EaseController::new(config.view_angle),
            dataset,
            config,
            loaded: false,
        };
        map.listen(EventKind::Load, None, Handler::LoadMap);
        map.listen(EventKind::Zoom, None, Handler::EaseView);
        Ok(map)
    }

    fn listen(&mut self, kind: EventKind, layer: Option<&str>, handler: Handler) {
        self.renderer.subscribe(kind, layer);
        self.events.on(kind, layer, handler);
    }

    /// Runs every handler registered for `event`, in registration order
    pub async fn handle_event(&mut self, event: MapEvent) -> Result<Vec<Outcome>> {
        let handlers = self.events.handlers_for(&event);
        if handlers.is_empty() {
            log::trace!("no handler for {} event", event.kind());
        }

        let mut outcomes = Vec::with_capacity(handlers.len());
        for handler in handlers {
            outcomes.push(self.dispatch(handler, &event).await?);
        }
        Ok(outcomes)
    }

    async fn dispatch(&mut self, handler: Handler, event: &MapEvent) -> Result<Outcome> {
        Ok(match handler {
            Handler::LoadMap => self.on_load().await?,
            Handler::EaseView => Outcome::ViewAngle(self.ease.on_zoom(&mut self.renderer)),
            Handler::ExpandCluster => match event {
                MapEvent::Click { point, .. } => {
                    Outcome::Click(self.presenter.on_click(&mut self.renderer, *point).await)
                }
                _ => Outcome::Ignored,
            },
            Handler::PointerCursor => {
                Outcome::Cursor(self.presenter.on_hover(&mut self.renderer, true))
            }
            Handler::DefaultCursor => {
                Outcome::Cursor(self.presenter.on_hover(&mut self.renderer, false))
            }
        })
    }

    async fn on_load(&mut self) -> Result<Outcome> {
        if self.loaded {
            log::debug!("map loaded again, refreshing reports");
            return Ok(Outcome::Reloaded(self.reload_reports().await?));
        }

        for (control, position) in default_controls(&self.config.credentials) {
            self.renderer.add_control(control, position)?;
        }
        let augment = self.augmenter.apply(&mut self.renderer)?;
        self.loaded = true;

        let reports = self.reload_reports().await?;
        Ok(Outcome::Loaded { augment, reports })
    }

    /// Fetches the dataset again and hands it to the presenter. The first
    /// successful run also wires the cluster interactions.
    ///
    /// Fails until [`MapEvent::Load`] has been handled, since the report
    /// layers must sit above the terrain and building layers.
    pub async fn reload_reports(&mut self) -> Result<PresenterReport> {
        if !self.loaded {
            return Err(MapError::Source("reports cannot load before the map style".into()));
        }
        let first = self.presenter.registered().is_none();
        let report = self
            .presenter
            .load(&mut self.renderer, self.dataset.as_ref())
            .await?;

        if first {
            for (kind, handler) in INTERACTIONS {
                self.listen(kind, Some(CLUSTERS_LAYER_ID), handler);
            }
        }
        Ok(report)
    }

    /// URL fragment mirroring the camera, when hash sync is on
    pub fn location_hash(&self) -> Option<String> {
        self.config.hash.then(|| self.renderer.camera().to_hash())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn presenter(&self) -> &ClusterPresenter {
        &self.presenter
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng, data::dataset::InMemoryDataset, rendering::document::StyleDocument,
    };

    fn config() -> MapConfig {
        MapConfig {
            credentials: Credentials::new("pk.test"),
            ..Default::default()
        }
    }

    fn empty_dataset() -> Arc<dyn DatasetSource> {
        Arc::new(InMemoryDataset::default())
    }

    #[test]
    fn test_bootstrap_initializes_and_subscribes() {
        let map = Map::bootstrap(StyleDocument::default(), config(), empty_dataset()).unwrap();
        let document = map.renderer();

        let options = document.options().unwrap();
        assert_eq!(options.container, "map");
        assert_eq!(options.style, "mapbox://styles/mapbox/dark-v9");
        assert_eq!(options.camera.zoom, 12.47);
        assert!(options.hash);

        assert!(document.is_subscribed(EventKind::Load, None));
        assert!(document.is_subscribed(EventKind::Zoom, None));
        assert!(!document.is_subscribed(EventKind::Click, Some(CLUSTERS_LAYER_ID)));
        assert!(!map.is_loaded());
    }

    #[test]
    fn test_bootstrap_requires_token() {
        let result = Map::bootstrap(
            StyleDocument::default(),
            MapConfig::default(),
            empty_dataset(),
        );
        assert!(matches!(result, Err(MapError::MissingCredential)));
    }

    #[test]
    fn test_bootstrap_restores_hash() {
        let config = MapConfig {
            initial_hash: Some("#15/37.7749/-122.4194/20/45".into()),
            ..config()
        };
        let map = Map::bootstrap(StyleDocument::default(), config, empty_dataset()).unwrap();
        let camera = map.renderer().camera();
        assert_eq!(camera.zoom, 15.0);
        assert_eq!(camera.center, LatLng::new(37.7749, -122.4194));
        assert_eq!(camera.pitch, 45.0);
        assert_eq!(map.location_hash().as_deref(), Some("#15/37.7749/-122.4194/20/45"));
    }

    #[tokio::test]
    async fn test_zoom_event_eases_angle() {
        let mut map = Map::bootstrap(StyleDocument::default(), config(), empty_dataset()).unwrap();

        let event = map.renderer_mut().zoom_to(17.0);
        let outcomes = map.handle_event(event).await.unwrap();
        assert_eq!(outcomes, vec![Outcome::ViewAngle(ViewAngle::new(40.0, -17.0))]);
        assert_eq!(map.renderer().camera().bearing, -17.0);

        let event = map.renderer_mut().zoom_to(16.0);
        let outcomes = map.handle_event(event).await.unwrap();
        assert_eq!(outcomes, vec![Outcome::ViewAngle(ViewAngle::new(0.0, 0.0))]);
        assert_eq!(map.renderer().camera().pitch, 0.0);
    }

    #[tokio::test]
    async fn test_reload_before_load_is_refused() {
        let mut map = Map::bootstrap(StyleDocument::default(), config(), empty_dataset()).unwrap();

        let result = map.reload_reports().await;
        assert!(matches!(result, Err(MapError::Source(_))));
        assert!(map.presenter().registered().is_none());
        assert!(map.renderer().style_layers().is_empty());
        assert!(!map.renderer().is_subscribed(EventKind::Click, Some(CLUSTERS_LAYER_ID)));
    }

    #[tokio::test]
    async fn test_unrouted_events_do_nothing() {
        let mut map = Map::bootstrap(StyleDocument::default(), config(), empty_dataset()).unwrap();
        let outcomes = map
            .handle_event(MapEvent::MouseEnter {
                layer: CLUSTERS_LAYER_ID.into(),
            })
            .await
            .unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(map.renderer().cursor(), Cursor::Default);
    }
}
