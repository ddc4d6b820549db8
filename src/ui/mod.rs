pub mod controls;

pub use controls::{default_controls, ControlPosition, ControlSpec};
