//! Per-frame assembly module
//!
//! Turns the scene into the records consumed by the render passes of one
//! frame: camera, shadow casters, lights, models, and skybox.

mod frame_data;
mod projection;
mod frame_assembler;

pub use frame_data::{
    CameraData, ShadowData, LightData, SceneData, ModelData, ModelPushConstants,
    SkyboxData, FrameData,
};
pub use projection::{
    SHADOW_NEAR, CUBE_FACES, vulkan_perspective, vulkan_orthographic, view_along,
    point_light_view_projections, cone_light_view_projection,
    rectangle_light_view_projection, camera_data,
};
pub use frame_assembler::{FrameAssembler, AssemblyContext, MODEL_TEXTURE_SET, SKYBOX_TEXTURE_SET};
