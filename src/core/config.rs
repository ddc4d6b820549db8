//! Configuration for the map, its data and its interaction policies
//!
//! Every section has a `Default` matching the stock street-report map, so a
//! host only overrides what it needs. The whole tree deserializes from JSON
//! with missing sections falling back to their defaults.

use crate::{
    animation::ease::ViewAnglePolicy,
    core::{
        camera::CameraState,
        constants::{
            ACCESS_TOKEN_ENV, DEFAULT_CENTER, DEFAULT_CONTAINER, DEFAULT_ZOOM, MAX_RECORDS,
            STYLES_API,
        },
        geo::{LatLng, Point},
    },
    data::dataset::DatasetConfig,
    layers::cluster::{ClusterBands, ClusterSourceOptions},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Base style presets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseStyle {
    Dark,
    Outdoors,
    Custom(String),
}

impl BaseStyle {
    /// Style URL understood by the renderer
    pub fn resolve(&self) -> String {
        match self {
            Self::Dark => "mapbox://styles/mapbox/dark-v9".to_string(),
            Self::Outdoors => "mapbox://styles/mapbox/outdoors-v9".to_string(),
            Self::Custom(url) => url.clone(),
        }
    }

    /// Plain HTTPS URL of the style document, with the access token attached
    /// when the style lives on the `mapbox://` scheme.
    pub fn download_url(&self, credentials: &Credentials) -> String {
        let url = self.resolve();
        match url.strip_prefix("mapbox://styles/") {
            Some(path) => format!(
                "{}/{}?access_token={}",
                STYLES_API,
                path,
                credentials.access_token()
            ),
            None => url,
        }
    }
}

impl Default for BaseStyle {
    fn default() -> Self {
        Self::Dark
    }
}

/// Opaque renderer access token, shared with the geocoder control
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    access_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Reads the token from the environment
    pub fn from_env() -> Result<Self> {
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Ok(Self::new(token.trim())),
            _ => Err(MapError::MissingCredential),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub container: String,
    pub style: BaseStyle,
    pub center: LatLng,
    pub zoom: f64,
    /// Keep the camera in the URL fragment
    pub hash: bool,
    /// Fragment to restore the camera from when `hash` is on
    pub initial_hash: Option<String>,
    pub credentials: Credentials,
    pub dataset: DatasetConfig,
    pub clusters: ClusterSourceOptions,
    pub bands: ClusterBands,
    pub view_angle: ViewAnglePolicy,
    /// Viewport size in pixels, used by headless renderers
    pub viewport_size: Point,
}

impl MapConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Camera the map starts with
    pub fn initial_camera(&self) -> Result<CameraState> {
        match (&self.initial_hash, self.hash) {
            (Some(fragment), true) => CameraState::from_hash(fragment),
            _ => Ok(CameraState::new(self.center, self.zoom)),
        }
    }

    /// Rejects configurations the components cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.credentials.is_empty() {
            return Err(MapError::MissingCredential);
        }
        if !self.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "center {}, {}",
                self.center.lat, self.center.lng
            )));
        }
        if self.dataset.limit == 0 || self.dataset.limit > MAX_RECORDS {
            return Err(MapError::Config(format!(
                "dataset limit must be within 1..={}, got {}",
                MAX_RECORDS, self.dataset.limit
            )));
        }
        if !(self.clusters.radius >= 0.0 && self.clusters.radius.is_finite()) {
            return Err(MapError::Config(format!(
                "cluster radius must be a non-negative number, got {}",
                self.clusters.radius
            )));
        }
        self.bands.validate()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            style: BaseStyle::default(),
            center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
            hash: true,
            initial_hash: None,
            credentials: Credentials::default(),
            dataset: DatasetConfig::default(),
            clusters: ClusterSourceOptions::default(),
            bands: ClusterBands::default(),
            view_angle: ViewAnglePolicy::default(),
            viewport_size: Point::new(1200.0, 800.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_token() -> MapConfig {
        MapConfig {
            credentials: Credentials::new("pk.test"),
            ..Default::default()
        }
    }

    #[test]
    fn test_style_presets() {
        assert_eq!(BaseStyle::Dark.resolve(), "mapbox://styles/mapbox/dark-v9");
        assert_eq!(
            BaseStyle::Outdoors.resolve(),
            "mapbox://styles/mapbox/outdoors-v9"
        );
        assert_eq!(
            BaseStyle::Custom("https://example.com/style.json".into()).resolve(),
            "https://example.com/style.json"
        );
    }

    #[test]
    fn test_style_download_url() {
        let credentials = Credentials::new("pk.abc");
        assert_eq!(
            BaseStyle::Dark.download_url(&credentials),
            "https://api.mapbox.com/styles/v1/mapbox/dark-v9?access_token=pk.abc"
        );
        assert_eq!(
            BaseStyle::Custom("https://example.com/s.json".into()).download_url(&credentials),
            "https://example.com/s.json"
        );
    }

    #[test]
    fn test_defaults() {
        let config = MapConfig::default();
        assert_eq!(config.container, "map");
        assert_eq!(config.center, LatLng::new(37.75846, -122.42347));
        assert_eq!(config.zoom, 12.47);
        assert!(config.hash);
        assert_eq!(config.dataset.limit, 10_000);
        assert_eq!(config.clusters.max_zoom, 13);
        assert_eq!(config.clusters.radius, 20.0);
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            MapConfig::default().validate(),
            Err(MapError::MissingCredential)
        ));
        assert!(config_with_token().validate().is_ok());

        let mut config = config_with_token();
        config.dataset.limit = 10_001;
        assert!(matches!(config.validate(), Err(MapError::Config(_))));

        let mut config = config_with_token();
        config.clusters.radius = -1.0;
        assert!(matches!(config.validate(), Err(MapError::Config(_))));
    }

    #[test]
    fn test_partial_json() {
        let config = MapConfig::from_json_str(
            r#"{ "style": "outdoors", "zoom": 14.0, "credentials": { "access_token": "pk.x" } }"#,
        )
        .unwrap();
        assert_eq!(config.style, BaseStyle::Outdoors);
        assert_eq!(config.zoom, 14.0);
        assert_eq!(config.credentials.access_token(), "pk.x");
        assert_eq!(config.container, "map");
    }

    #[test]
    fn test_initial_camera_from_hash() {
        let mut config = config_with_token();
        config.initial_hash = Some("#15/37.7/-122.4".into());
        let camera = config.initial_camera().unwrap();
        assert_eq!(camera.zoom, 15.0);
        assert_eq!(camera.center, LatLng::new(37.7, -122.4));

        config.hash = false;
        let camera = config.initial_camera().unwrap();
        assert_eq!(camera.zoom, 12.47);
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let rendered = format!("{:?}", Credentials::new("pk.secret"));
        assert!(!rendered.contains("pk.secret"));
    }
}
