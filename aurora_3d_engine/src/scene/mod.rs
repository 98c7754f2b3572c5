//! Scene module
//!
//! Arena-backed scene tree, the objects it holds, their components, and
//! the scene manager that publishes scene lifecycle events.

mod component;
mod object;
mod scene_node;
mod scene;
mod scene_iterator;
mod scene_manager;

pub use component::{
    SyncState, PositionComponent, ModelComponent, ModelGpuState, SkyboxComponent,
    SkyboxGpuState, Component, ComponentKind, ComponentSet,
};
pub use object::{Object, ObjectKey, ObjectVariant, CameraParams, LightParams, LightKind};
pub use scene_node::{SceneNode, NodeKey, EMPTY_NODE_NAME};
pub use scene::Scene;
pub use scene_iterator::SceneIterator;
pub use scene_manager::SceneManager;
