use crate::core::constants::{MAX_PITCH, MAX_ZOOM};
use crate::core::geo::{world_size, LatLng, Point};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, zoom and camera angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// Tilt away from the top-down view, in degrees
    pub pitch: f64,
    /// Rotation counter-clockwise from north, in degrees
    pub bearing: f64,
}

/// Camera animation request. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EaseOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
}

impl EaseOptions {
    /// Fly to a location at a zoom level, leaving the angle alone
    pub fn center_zoom(center: LatLng, zoom: f64) -> Self {
        Self {
            center: Some(center),
            zoom: Some(zoom),
            ..Default::default()
        }
    }

    /// Change only the camera angle
    pub fn angle(pitch: f64, bearing: f64) -> Self {
        Self {
            pitch: Some(pitch),
            bearing: Some(bearing),
            ..Default::default()
        }
    }
}

impl CameraState {
    /// Creates a new top-down camera
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, MAX_ZOOM),
            pitch: 0.0,
            bearing: 0.0,
        }
    }

    /// Applies an ease request immediately, clamping every field
    pub fn apply(&mut self, options: &EaseOptions) {
        if let Some(center) = options.center {
            self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
        }
        if let Some(zoom) = options.zoom {
            self.zoom = zoom.clamp(0.0, MAX_ZOOM);
        }
        if let Some(pitch) = options.pitch {
            self.pitch = pitch.clamp(0.0, MAX_PITCH);
        }
        if let Some(bearing) = options.bearing {
            self.bearing = wrap_bearing(bearing);
        }
    }

    /// Converts a world pixel position at the current zoom to a container
    /// point for a viewport of `size`. Pitch and bearing are ignored.
    pub fn world_to_screen(&self, world: Point, size: Point) -> Point {
        let center = self.center.project(self.zoom);
        let mut offset = world.subtract(&center);
        // Wrap across the antimeridian so the nearest copy wins
        let span = world_size(self.zoom);
        if offset.x > span / 2.0 {
            offset.x -= span;
        } else if offset.x < -span / 2.0 {
            offset.x += span;
        }
        offset.add(&Point::new(size.x / 2.0, size.y / 2.0))
    }

    /// Serializes as a URL fragment: `#zoom/lat/lng[/bearing[/pitch]]`
    pub fn to_hash(&self) -> String {
        let mut hash = format!(
            "#{}/{}/{}",
            round_to(self.zoom, 2),
            round_to(self.center.lat, 5),
            round_to(self.center.lng, 5)
        );
        if self.bearing != 0.0 || self.pitch != 0.0 {
            hash.push_str(&format!("/{}", round_to(self.bearing, 1)));
        }
        if self.pitch != 0.0 {
            hash.push_str(&format!("/{}", round_to(self.pitch, 0)));
        }
        hash
    }

    /// Parses a fragment produced by [`CameraState::to_hash`]
    pub fn from_hash(hash: &str) -> Result<Self> {
        let fragment = hash.trim_start_matches('#');
        let parts = fragment
            .split('/')
            .map(|part| {
                part.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| MapError::Config(format!("invalid map hash '{}'", hash)))
            })
            .collect::<Result<Vec<f64>>>()?;

        if !(3..=5).contains(&parts.len()) {
            return Err(MapError::Config(format!("invalid map hash '{}'", hash)));
        }

        let center = LatLng::new(parts[1], parts[2]);
        if !center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "hash center {}, {}",
                center.lat, center.lng
            )));
        }

        let mut camera = Self::new(center, parts[0]);
        camera.apply(&EaseOptions {
            bearing: parts.get(3).copied(),
            pitch: parts.get(4).copied(),
            ..Default::default()
        });
        Ok(camera)
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0)
    }
}

/// Wraps a bearing into `(-180, 180]`
fn wrap_bearing(bearing: f64) -> f64 {
    let wrapped = bearing % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = CameraState::new(LatLng::new(37.75846, -122.42347), 12.47);
        assert_eq!(camera.zoom, 12.47);
        assert_eq!(camera.pitch, 0.0);
        assert_eq!(camera.bearing, 0.0);
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let mut camera = CameraState::new(LatLng::new(37.0, -122.0), 10.0);
        camera.apply(&EaseOptions::angle(40.0, -17.0));

        assert_eq!(camera.center, LatLng::new(37.0, -122.0));
        assert_eq!(camera.zoom, 10.0);
        assert_eq!(camera.pitch, 40.0);
        assert_eq!(camera.bearing, -17.0);
    }

    #[test]
    fn test_apply_clamps() {
        let mut camera = CameraState::default();
        camera.apply(&EaseOptions {
            zoom: Some(30.0),
            pitch: Some(85.0),
            bearing: Some(343.0),
            ..Default::default()
        });

        assert_eq!(camera.zoom, MAX_ZOOM);
        assert_eq!(camera.pitch, MAX_PITCH);
        assert_eq!(camera.bearing, -17.0);
    }

    #[test]
    fn test_hash_flat() {
        let camera = CameraState::new(LatLng::new(37.75846, -122.42347), 12.47);
        assert_eq!(camera.to_hash(), "#12.47/37.75846/-122.42347");
    }

    #[test]
    fn test_hash_with_angle() {
        let mut camera = CameraState::new(LatLng::new(37.75846, -122.42347), 16.5);
        camera.apply(&EaseOptions::angle(40.0, -17.0));
        let hash = camera.to_hash();
        assert_eq!(hash, "#16.5/37.75846/-122.42347/-17/40");

        let parsed = CameraState::from_hash(&hash).unwrap();
        assert_eq!(parsed, camera);
    }

    #[test]
    fn test_hash_rejects_garbage() {
        assert!(CameraState::from_hash("#12/abc/1").is_err());
        assert!(CameraState::from_hash("#12").is_err());
        assert!(CameraState::from_hash("#12/95/0").is_err());
    }

    #[test]
    fn test_world_to_screen_center() {
        let camera = CameraState::new(LatLng::new(37.75846, -122.42347), 12.0);
        let size = Point::new(800.0, 600.0);
        let world = camera.center.project(camera.zoom);
        let screen = camera.world_to_screen(world, size);
        assert!((screen.x - 400.0).abs() < 1e-6);
        assert!((screen.y - 300.0).abs() < 1e-6);
    }
}
