use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Event types the renderer can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Style and sources finished loading
    Load,
    /// Zoom level changed
    Zoom,
    Click,
    MouseEnter,
    MouseLeave,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Load => "load",
            EventKind::Zoom => "zoom",
            EventKind::Click => "click",
            EventKind::MouseEnter => "mouseenter",
            EventKind::MouseLeave => "mouseleave",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map event types emitted by the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The map is ready for style and source changes
    Load,
    /// The zoom level changed
    Zoom { zoom: f64 },
    /// Click at a container point; `layer` is set for layer-delegated clicks
    Click { point: Point, layer: Option<String> },
    /// Pointer entered a feature of `layer`
    MouseEnter { layer: String },
    /// Pointer left the features of `layer`
    MouseLeave { layer: String },
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::Load => EventKind::Load,
            MapEvent::Zoom { .. } => EventKind::Zoom,
            MapEvent::Click { .. } => EventKind::Click,
            MapEvent::MouseEnter { .. } => EventKind::MouseEnter,
            MapEvent::MouseLeave { .. } => EventKind::MouseLeave,
        }
    }

    /// Layer the event was delegated to, if any
    pub fn layer(&self) -> Option<&str> {
        match self {
            MapEvent::Click { layer, .. } => layer.as_deref(),
            MapEvent::MouseEnter { layer } | MapEvent::MouseLeave { layer } => Some(layer),
            _ => None,
        }
    }
}

/// Canvas cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    /// CSS `cursor` value; the default cursor clears the inline style
    pub fn css(&self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        }
    }
}
