//! Central scene manager for the engine.
//!
//! Owns the current `Scene` and reports its lifecycle on the engine event
//! bus: scene transitions, objects created under the root, and objects
//! destroyed by node removal. Mutations are synchronous; an iterator
//! created afterwards sees them.

use std::sync::Arc;
use crate::error::Result;
use crate::engine_info;
use crate::event::{EventBus, EngineEvent};
use crate::scene::{Scene, Object, ObjectKey, NodeKey};

pub struct SceneManager {
    scene: Scene,
    event_bus: Arc<EventBus>,
}

impl SceneManager {
    /// Create a scene manager with an empty scene
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            scene: Scene::new(),
            event_bus,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Replace the current scene, returning the previous one
    pub fn set_scene(&mut self, scene: Scene) -> Scene {
        let previous = std::mem::replace(&mut self.scene, scene);
        engine_info!("aurora3d::SceneManager", "Scene transition ({} objects -> {} objects)",
            previous.object_count(), self.scene.object_count());
        self.event_bus.publish(EngineEvent::SceneTransition);
        previous
    }

    /// Wrap `object` in a new node appended under the root
    pub fn add_object(&mut self, object: Object) -> Result<NodeKey> {
        let name = object.name().to_string();
        let root = self.scene.root();
        let node = self.scene.insert_object(root, object)?;

        if let Some(object) = self.scene.node(node).and_then(|n| n.object()) {
            self.event_bus.publish(EngineEvent::ObjectCreated { object, name });
        }
        Ok(node)
    }

    /// Detach `node` from the scene, destroying what became unreachable
    ///
    /// Publishes one `ObjectDestroyed` per destroyed object.
    pub fn remove_node(&mut self, node: NodeKey) -> Vec<ObjectKey> {
        let destroyed = self.scene.remove_node(node);
        for &object in &destroyed {
            self.event_bus.publish(EngineEvent::ObjectDestroyed { object });
        }
        destroyed
    }

    /// Bind the rendering camera of the current scene
    pub fn set_camera(&mut self, camera: ObjectKey) -> Result<()> {
        self.scene.set_camera(camera)
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

#[cfg(test)]
#[path = "scene_manager_tests.rs"]
mod tests;
