//! Engine event bus
//!
//! Typed publish/subscribe notifications shared between subsystems:
//! the window layer publishes resizes, the scene manager publishes
//! scene and object lifecycle events, the renderer consumes resizes.

mod event_bus;

pub use event_bus::{EngineEvent, EventBus, EventReceiver};
