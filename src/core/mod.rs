pub mod camera;
pub mod config;
pub mod constants;
pub mod geo;
pub mod map;

pub use camera::{CameraState, EaseOptions};
pub use config::{BaseStyle, Credentials, MapConfig};
pub use geo::{LatLng, Point};
pub use map::{Map, MapOptions, Outcome};
