/// Scene object components.
///
/// Objects are composed of orthogonal components stored in a
/// `ComponentSet` keyed by `ComponentKind`. Components that own derived
/// GPU state (texture views, binding groups) carry a `SyncState`: while
/// `Dirty`, the derived state is stale and is rebuilt by the frame
/// assembler before the object is drawn.

use std::sync::Arc;
use glam::{Vec3, Quat, Mat4};
use crate::graphics_device::{TextureView, BindingGroup};
use crate::resource::{MeshKey, TextureKey};

// ===== SYNC STATE =====

/// Whether the derived GPU state matches the logical component state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Dirty,
    Clean,
}

// ===== POSITION =====

/// World transform of an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionComponent {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl PositionComponent {
    pub fn new(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Orient the object so that `forward()` points at `target`
    ///
    /// No-op when `target` is the object position.
    pub fn look_at(&mut self, target: Vec3) {
        let direction = (target - self.translation).normalize_or_zero();
        if direction != Vec3::ZERO {
            self.rotation = Quat::from_rotation_arc(Vec3::NEG_Z, direction);
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Rotation-only matrix (normal transform for uniformly scaled models)
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }

    /// Local -Z in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Default for PositionComponent {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

// ===== MODEL =====

/// GPU state derived from a `ModelComponent`
pub struct ModelGpuState {
    pub albedo_view: Arc<dyn TextureView>,
    pub specular_view: Arc<dyn TextureView>,
    /// One binding group per in-flight frame slot
    pub binding_groups: Vec<Arc<dyn BindingGroup>>,
}

/// Renderable mesh with its surface textures
#[derive(Default)]
pub struct ModelComponent {
    mesh: Option<MeshKey>,
    albedo: Option<TextureKey>,
    specular: Option<TextureKey>,
    sync: SyncState,
    gpu: Option<ModelGpuState>,
}

impl ModelComponent {
    pub fn new(mesh: Option<MeshKey>) -> Self {
        Self { mesh, ..Self::default() }
    }

    pub fn mesh(&self) -> Option<MeshKey> {
        self.mesh
    }

    pub fn albedo(&self) -> Option<TextureKey> {
        self.albedo
    }

    pub fn specular(&self) -> Option<TextureKey> {
        self.specular
    }

    pub fn set_mesh(&mut self, mesh: Option<MeshKey>) {
        self.mesh = mesh;
    }

    /// Swap the albedo texture; GPU state is rebuilt on the next frame
    pub fn set_albedo(&mut self, texture: Option<TextureKey>) {
        self.albedo = texture;
        self.sync = SyncState::Dirty;
    }

    /// Swap the specular texture; GPU state is rebuilt on the next frame
    pub fn set_specular(&mut self, texture: Option<TextureKey>) {
        self.specular = texture;
        self.sync = SyncState::Dirty;
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    pub fn is_dirty(&self) -> bool {
        self.sync == SyncState::Dirty
    }

    pub fn mark_dirty(&mut self) {
        self.sync = SyncState::Dirty;
    }

    pub fn gpu_state(&self) -> Option<&ModelGpuState> {
        self.gpu.as_ref()
    }

    /// Detach the derived state so it can be released before a rebuild
    pub fn take_gpu_state(&mut self) -> Option<ModelGpuState> {
        self.gpu.take()
    }

    /// Install freshly built state and clear the dirty flag
    pub fn set_gpu_state(&mut self, state: ModelGpuState) {
        self.gpu = Some(state);
        self.sync = SyncState::Clean;
    }
}

// ===== SKYBOX =====

/// GPU state derived from a `SkyboxComponent`
pub struct SkyboxGpuState {
    pub cubemap_view: Arc<dyn TextureView>,
    pub binding_groups: Vec<Arc<dyn BindingGroup>>,
}

/// Cubemap drawn behind the scene by the World object
#[derive(Default)]
pub struct SkyboxComponent {
    mesh: Option<MeshKey>,
    cubemap: Option<TextureKey>,
    sync: SyncState,
    gpu: Option<SkyboxGpuState>,
}

impl SkyboxComponent {
    pub fn new(mesh: Option<MeshKey>, cubemap: Option<TextureKey>) -> Self {
        Self { mesh, cubemap, ..Self::default() }
    }

    pub fn mesh(&self) -> Option<MeshKey> {
        self.mesh
    }

    pub fn cubemap(&self) -> Option<TextureKey> {
        self.cubemap
    }

    pub fn set_cubemap(&mut self, cubemap: Option<TextureKey>) {
        self.cubemap = cubemap;
        self.sync = SyncState::Dirty;
    }

    pub fn is_dirty(&self) -> bool {
        self.sync == SyncState::Dirty
    }

    pub fn gpu_state(&self) -> Option<&SkyboxGpuState> {
        self.gpu.as_ref()
    }

    pub fn take_gpu_state(&mut self) -> Option<SkyboxGpuState> {
        self.gpu.take()
    }

    pub fn set_gpu_state(&mut self, state: SkyboxGpuState) {
        self.gpu = Some(state);
        self.sync = SyncState::Clean;
    }
}

// ===== COMPONENT SET =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Position,
    Model,
    Skybox,
}

pub enum Component {
    Position(PositionComponent),
    Model(ModelComponent),
    Skybox(SkyboxComponent),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Position(_) => ComponentKind::Position,
            Component::Model(_) => ComponentKind::Model,
            Component::Skybox(_) => ComponentKind::Skybox,
        }
    }
}

/// At most one component per kind
#[derive(Default)]
pub struct ComponentSet {
    components: Vec<Component>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component, replacing any component of the same kind
    pub fn insert(&mut self, component: Component) -> Option<Component> {
        let kind = component.kind();
        match self.components.iter().position(|c| c.kind() == kind) {
            Some(index) => Some(std::mem::replace(&mut self.components[index], component)),
            None => {
                self.components.push(component);
                None
            }
        }
    }

    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        let index = self.components.iter().position(|c| c.kind() == kind)?;
        Some(self.components.remove(index))
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind() == kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.iter().map(Component::kind)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn position(&self) -> Option<&PositionComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Position(position) => Some(position),
            _ => None,
        })
    }

    pub fn position_mut(&mut self) -> Option<&mut PositionComponent> {
        self.components.iter_mut().find_map(|c| match c {
            Component::Position(position) => Some(position),
            _ => None,
        })
    }

    pub fn model(&self) -> Option<&ModelComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Model(model) => Some(model),
            _ => None,
        })
    }

    pub fn model_mut(&mut self) -> Option<&mut ModelComponent> {
        self.components.iter_mut().find_map(|c| match c {
            Component::Model(model) => Some(model),
            _ => None,
        })
    }

    pub fn skybox(&self) -> Option<&SkyboxComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Skybox(skybox) => Some(skybox),
            _ => None,
        })
    }

    pub fn skybox_mut(&mut self) -> Option<&mut SkyboxComponent> {
        self.components.iter_mut().find_map(|c| match c {
            Component::Skybox(skybox) => Some(skybox),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "component_tests.rs"]
mod tests;
