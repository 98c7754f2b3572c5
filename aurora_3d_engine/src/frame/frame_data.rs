/// Per-frame data records.
///
/// Built fresh every frame by the frame assembler and consumed by the
/// deferred renderer within the same frame. The `Pod` records are
/// uploaded verbatim into the frame slot's scene uniform buffer; the
/// others reference GPU objects and drive draw calls.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use crate::graphics_device::{Buffer, BindingGroup, IndexType};

/// Camera transforms as seen by shaders
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraData {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    /// xyz world position, w = 1
    pub position: Vec4,
}

impl CameraData {
    /// Neutral camera used when the scene has none bound
    pub fn identity() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            position: Vec4::W,
        }
    }
}

impl Default for CameraData {
    fn default() -> Self {
        Self::identity()
    }
}

/// One shadow caster (one cube face for point lights)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowData {
    pub view_projection: Mat4,
    /// xyz world position, w = range
    pub position: Vec4,
}

/// One light contribution (one cube face for point lights)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightData {
    pub view_projection: Mat4,
    /// xyz world position, w = range
    pub position: Vec4,
    /// rgb color, a = 1
    pub color: Vec4,
}

/// Header of the scene uniform buffer, followed by the shadow and light
/// arrays
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneData {
    pub camera: CameraData,
    pub shadow_count: u32,
    pub light_count: u32,
    pub _padding: [u32; 2],
}

/// Push constants of the geometry pipeline
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelPushConstants {
    pub model: Mat4,
    pub rotation: Mat4,
}

/// One drawable prop
#[derive(Clone)]
pub struct ModelData {
    pub model: Mat4,
    pub rotation: Mat4,
    pub vertex_buffer: Arc<dyn Buffer>,
    pub index_buffer: Arc<dyn Buffer>,
    pub index_count: u32,
    pub index_type: IndexType,
    /// Texture bindings of the current frame slot
    pub binding_group: Arc<dyn BindingGroup>,
}

impl ModelData {
    pub fn push_constants(&self) -> ModelPushConstants {
        ModelPushConstants {
            model: self.model,
            rotation: self.rotation,
        }
    }
}

#[derive(Clone)]
pub struct SkyboxData {
    pub vertex_buffer: Arc<dyn Buffer>,
    pub index_buffer: Arc<dyn Buffer>,
    pub index_count: u32,
    pub index_type: IndexType,
    pub binding_group: Arc<dyn BindingGroup>,
}

/// Everything assembled from the scene for one frame
#[derive(Clone, Default)]
pub struct FrameData {
    pub camera: CameraData,
    pub shadows: Vec<ShadowData>,
    pub lights: Vec<LightData>,
    pub models: Vec<ModelData>,
    pub skybox: Option<SkyboxData>,
}

impl FrameData {
    /// Uniform header for the assembled lists
    pub fn scene_data(&self) -> SceneData {
        SceneData {
            camera: self.camera,
            shadow_count: self.shadows.len() as u32,
            light_count: self.lights.len() as u32,
            _padding: [0; 2],
        }
    }

    /// Size of the scene uniform buffer for the given capacities
    pub fn uniform_size(max_shadows: usize, max_lights: usize) -> u64 {
        (std::mem::size_of::<SceneData>()
            + max_shadows * std::mem::size_of::<ShadowData>()
            + max_lights * std::mem::size_of::<LightData>()) as u64
    }

    /// Serialize into the scene uniform layout
    ///
    /// Header, then `max_shadows` shadow entries, then the lights. Unused
    /// entries are zeroed.
    pub fn uniform_bytes(&self, max_shadows: usize, max_lights: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::uniform_size(max_shadows, max_lights) as usize);
        bytes.extend_from_slice(bytemuck::bytes_of(&self.scene_data()));

        let mut shadows = vec![ShadowData::zeroed(); max_shadows];
        for (slot, shadow) in shadows.iter_mut().zip(&self.shadows) {
            *slot = *shadow;
        }
        bytes.extend_from_slice(bytemuck::cast_slice(&shadows));

        let mut lights = vec![LightData::zeroed(); max_lights];
        for (slot, light) in lights.iter_mut().zip(&self.lights) {
            *slot = *light;
        }
        bytes.extend_from_slice(bytemuck::cast_slice(&lights));
        bytes
    }
}
