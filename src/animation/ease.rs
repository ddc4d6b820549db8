//! Zoom-dependent camera angle
//!
//! Past a zoom threshold the camera tilts so extruded buildings read as 3D;
//! at or below it the camera looks straight down again.

use crate::{core::camera::EaseOptions, traits::MapRenderer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewAngle {
    /// Degrees away from nadir
    pub pitch: f64,
    /// Degrees counter-clockwise from north
    pub bearing: f64,
}

impl ViewAngle {
    pub const fn new(pitch: f64, bearing: f64) -> Self {
        Self { pitch, bearing }
    }
}

/// Two camera angles split at a zoom threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewAnglePolicy {
    /// Zoom strictly above which the pitched angle applies
    pub threshold: f64,
    pub pitched: ViewAngle,
    pub flat: ViewAngle,
}

impl ViewAnglePolicy {
    pub fn angle_for(&self, zoom: f64) -> ViewAngle {
        if zoom > self.threshold {
            self.pitched
        } else {
            self.flat
        }
    }
}

impl Default for ViewAnglePolicy {
    fn default() -> Self {
        Self {
            threshold: 16.0,
            pitched: ViewAngle::new(40.0, -17.0),
            flat: ViewAngle::new(0.0, 0.0),
        }
    }
}

/// Eases the camera angle whenever the zoom changes
#[derive(Debug, Clone, Default)]
pub struct EaseController {
    policy: ViewAnglePolicy,
}

impl EaseController {
    pub fn new(policy: ViewAnglePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ViewAnglePolicy {
        &self.policy
    }

    /// Target angle for a zoom level
    pub fn view_for_zoom(&self, zoom: f64) -> ViewAngle {
        self.policy.angle_for(zoom)
    }

    /// Eases to the angle matching the renderer's current zoom.
    ///
    /// Issued on every zoom event, including repeats of the current angle.
    pub fn on_zoom(&self, renderer: &mut dyn MapRenderer) -> ViewAngle {
        let zoom = renderer.camera().zoom;
        let angle = self.view_for_zoom(zoom);
        log::trace!(
            "zoom {:.2}: easing to pitch {} bearing {}",
            zoom,
            angle.pitch,
            angle.bearing
        );
        renderer.ease_to(EaseOptions::angle(angle.pitch, angle.bearing));
        angle
    }
}
