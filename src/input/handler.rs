use crate::{
    input::events::{EventKind, MapEvent},
    prelude::HashMap,
};

/// Component reactions the map can route an event to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Add controls, augment the style and load the reports
    LoadMap,
    /// Re-evaluate the camera angle
    EaseView,
    /// Zoom into the clicked cluster
    ExpandCluster,
    PointerCursor,
    DefaultCursor,
}

/// Routes events to the handlers registered for them
#[derive(Debug, Default)]
pub struct EventManager {
    /// Handlers keyed by event type and optional layer
    listeners: HashMap<String, Vec<Handler>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(kind: EventKind, layer: Option<&str>) -> String {
        match layer {
            Some(layer) => format!("{}:{}", kind, layer),
            None => kind.to_string(),
        }
    }

    /// Register a handler
    pub fn on(&mut self, kind: EventKind, layer: Option<&str>, handler: Handler) {
        self.listeners
            .entry(Self::key(kind, layer))
            .or_default()
            .push(handler);
    }

    /// Handlers for an event, in registration order
    pub fn handlers_for(&self, event: &MapEvent) -> Vec<Handler> {
        self.listeners
            .get(&Self::key(event.kind(), event.layer()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_registered(&self, kind: EventKind, layer: Option<&str>) -> bool {
        self.listeners.contains_key(&Self::key(kind, layer))
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    #[test]
    fn test_layer_scoped_handlers() {
        let mut events = EventManager::new();
        events.on(EventKind::Click, Some("clusters"), Handler::ExpandCluster);
        events.on(EventKind::Zoom, None, Handler::EaseView);

        let on_layer = MapEvent::Click {
            point: Point::new(0.0, 0.0),
            layer: Some("clusters".into()),
        };
        let elsewhere = MapEvent::Click {
            point: Point::new(0.0, 0.0),
            layer: None,
        };

        assert_eq!(events.handlers_for(&on_layer), vec![Handler::ExpandCluster]);
        assert!(events.handlers_for(&elsewhere).is_empty());
        assert_eq!(
            events.handlers_for(&MapEvent::Zoom { zoom: 12.0 }),
            vec![Handler::EaseView]
        );
    }

    #[test]
    fn test_registration_order() {
        let mut events = EventManager::new();
        events.on(EventKind::Load, None, Handler::LoadMap);
        events.on(EventKind::Load, None, Handler::EaseView);
        assert_eq!(
            events.handlers_for(&MapEvent::Load),
            vec![Handler::LoadMap, Handler::EaseView]
        );
        assert!(events.is_registered(EventKind::Load, None));

        events.clear();
        assert!(!events.is_registered(EventKind::Load, None));
    }
}
