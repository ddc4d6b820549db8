use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::constants::TILE_SIZE;

/// Web Mercator latitude limit
const MAX_LATITUDE: f64 = 85.051129;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate from a GeoJSON `[longitude, latitude]` pair
    pub fn from_lng_lat(coordinates: [f64; 2]) -> Self {
        Self::new(coordinates[1], coordinates[0])
    }

    /// GeoJSON ordering: `[longitude, latitude]`
    pub fn to_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Clamps latitude to the Mercator range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects to normalized Web Mercator, both axes in `[0, 1]`
    /// with the origin at the north-west corner.
    pub fn to_unit_mercator(&self) -> [f64; 2] {
        let x = self.lng / 360.0 + 0.5;
        let sin = Self::clamp_lat(self.lat).to_radians().sin();
        let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
        [x, y.clamp(0.0, 1.0)]
    }

    /// Inverse of [`LatLng::to_unit_mercator`]
    pub fn from_unit_mercator(unit: [f64; 2]) -> Self {
        let lng = (unit[0] - 0.5) * 360.0;
        let y2 = (180.0 - unit[1] * 360.0) * PI / 180.0;
        let lat = 360.0 * y2.exp().atan() / PI - 90.0;
        Self::new(lat, lng)
    }

    /// Projects to world pixel coordinates at the given zoom
    pub fn project(&self, zoom: f64) -> Point {
        let [x, y] = self.to_unit_mercator();
        let world = world_size(zoom);
        Point::new(x * world, y * world)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Width of the whole world in pixels at `zoom`
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2_f64.powf(zoom)
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(37.75846, -122.42347);
        assert_eq!(coord.lat, 37.75846);
        assert_eq!(coord.lng, -122.42347);
        assert!(coord.is_valid());
        assert_eq!(coord.to_lng_lat(), [-122.42347, 37.75846]);
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, -181.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_unit_mercator_round_trip() {
        let sf = LatLng::new(37.75846, -122.42347);
        let back = LatLng::from_unit_mercator(sf.to_unit_mercator());
        assert!((back.lat - sf.lat).abs() < 1e-9);
        assert!((back.lng - sf.lng).abs() < 1e-9);
    }

    #[test]
    fn test_projection_origin() {
        let center = LatLng::new(0.0, 0.0).project(0.0);
        assert!((center.x - 256.0).abs() < 1e-9);
        assert!((center.y - 256.0).abs() < 1e-9);

        // Each zoom level doubles the world
        let z1 = LatLng::new(0.0, 0.0).project(1.0);
        assert!((z1.x - 512.0).abs() < 1e-9);
    }
}
