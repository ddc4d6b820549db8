use crate::core::config::Credentials;
use serde::{Deserialize, Serialize};

/// Corner of the map container a control is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Default for ControlPosition {
    fn default() -> Self {
        Self::TopRight
    }
}

/// Controls the map adds once loaded
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "kebab-case")]
pub enum ControlSpec {
    /// Place search, authenticated with the map's token
    Geocoder {
        #[serde(rename = "accessToken")]
        access_token: String,
    },
    /// Zoom buttons and compass
    Navigation,
}

impl ControlSpec {
    pub fn geocoder(credentials: &Credentials) -> Self {
        Self::Geocoder {
            access_token: credentials.access_token().to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControlSpec::Geocoder { .. } => "geocoder",
            ControlSpec::Navigation => "navigation",
        }
    }
}

impl std::fmt::Debug for ControlSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Geocoder first, then navigation, both top-right
pub fn default_controls(credentials: &Credentials) -> Vec<(ControlSpec, ControlPosition)> {
    vec![
        (ControlSpec::geocoder(credentials), ControlPosition::TopRight),
        (ControlSpec::Navigation, ControlPosition::TopRight),
    ]
}
