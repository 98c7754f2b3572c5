/// Deferred renderer configuration and per-frame statistics

use crate::graphics_device::TextureFormat;

/// Renderer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Number of frames recorded ahead of the GPU (one uniform buffer and
    /// binding group set per slot)
    pub frames_in_flight: usize,
    /// Shadow-map slots rendered every frame
    pub max_shadow_maps: usize,
    /// Lights uploaded every frame
    pub max_lights: usize,
    /// Width and height of each shadow map
    pub shadow_map_size: u32,
    pub depth_format: TextureFormat,
    pub gbuffer_albedo_format: TextureFormat,
    pub gbuffer_normal_format: TextureFormat,
    pub gbuffer_position_format: TextureFormat,
    /// Clear color of the presented image
    pub clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            max_shadow_maps: 8,
            max_lights: 16,
            shadow_map_size: 2048,
            depth_format: TextureFormat::D32_FLOAT,
            gbuffer_albedo_format: TextureFormat::R8G8B8A8_UNORM,
            gbuffer_normal_format: TextureFormat::R16G16B16A16_SFLOAT,
            gbuffer_position_format: TextureFormat::R16G16B16A16_SFLOAT,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Renderer statistics of the last recorded frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Number of draw calls this frame
    pub draw_calls: u32,
    /// Number of triangles drawn this frame
    pub triangles: u32,
    /// Shadow entries rendered (the remaining slots were only cleared)
    pub shadow_casters: u32,
    pub lights: u32,
}
