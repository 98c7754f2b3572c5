/// Event bus: fan-out of engine events to any number of subscribers.
///
/// Each subscriber owns an unbounded channel receiver. Publishing clones
/// the event into every live channel; subscribers whose receiver was
/// dropped are pruned on the next publish.
///
/// Consumption is pull-based: a subsystem drains its receiver at a point
/// of its choosing (e.g. the renderer at the start of a frame), which keeps
/// all reactions on the frame-loop thread.

use std::sync::Mutex;
use crate::scene::ObjectKey;

/// Notifications exchanged between engine subsystems
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The presentation surface changed size (pixels)
    Resized { width: u32, height: u32 },
    /// The current scene was replaced
    SceneTransition,
    /// An object was added to the current scene
    ObjectCreated { object: ObjectKey, name: String },
    /// An object was removed from the current scene and destroyed
    ObjectDestroyed { object: ObjectKey },
}

/// Receiving end of an event subscription
pub struct EventReceiver {
    receiver: flume::Receiver<EngineEvent>,
}

impl EventReceiver {
    /// Take every pending event, oldest first
    pub fn drain(&self) -> Vec<EngineEvent> {
        self.receiver.try_iter().collect()
    }

    /// Take the next pending event, if any
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of events waiting to be drained
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

/// Publish/subscribe hub for `EngineEvent`s
pub struct EventBus {
    subscribers: Mutex<Vec<flume::Sender<EngineEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a new subscriber
    ///
    /// Only events published after this call are delivered.
    pub fn subscribe(&self) -> EventReceiver {
        let (sender, receiver) = flume::unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(sender);
        }
        EventReceiver { receiver }
    }

    /// Deliver an event to every live subscriber
    pub fn publish(&self, event: EngineEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        }
    }

    /// Number of live subscribers (as of the last publish)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
