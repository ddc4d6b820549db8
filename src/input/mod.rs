pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{Cursor, EventKind, MapEvent};
pub use handler::{EventManager, Handler};
