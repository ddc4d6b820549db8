pub mod ease;

pub use ease::{EaseController, ViewAngle, ViewAnglePolicy};
