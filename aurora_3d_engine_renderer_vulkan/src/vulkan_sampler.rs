/// SamplerCache - internal VkSampler management for the Vulkan backend
///
/// Samplers are created on first use and destroyed with the device. The
/// engine only distinguishes color textures from shadow maps, so the
/// cache never holds more than two entries.

use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::engine_err;
use crate::vulkan_context::GpuContext;
use ash::vk;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Sampler flavours used by binding groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SamplerKind {
    /// Trilinear, repeating; albedo, specular and cubemaps
    Linear,
    /// Depth comparison, clamped to a white border (outside = lit)
    Shadow,
}

pub(crate) struct SamplerCache {
    ctx: Option<Arc<GpuContext>>,
    cache: FxHashMap<SamplerKind, vk::Sampler>,
}

impl SamplerCache {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Self {
        Self {
            ctx: Some(ctx),
            cache: FxHashMap::default(),
        }
    }

    /// Get or create the sampler of a kind
    pub(crate) fn get(&mut self, kind: SamplerKind) -> Result<vk::Sampler> {
        if let Some(&sampler) = self.cache.get(&kind) {
            return Ok(sampler);
        }

        let ctx = self.ctx.as_ref()
            .ok_or_else(|| engine_err!("aurora3d::vulkan", "Sampler cache used after shutdown"))?;
        let sampler = Self::create_vk_sampler(ctx, kind)?;
        self.cache.insert(kind, sampler);
        Ok(sampler)
    }

    /// Destroy all cached samplers and release the context
    ///
    /// Must run while the logical device is still alive.
    pub(crate) fn shutdown(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            for (_, sampler) in self.cache.drain() {
                unsafe { ctx.device.destroy_sampler(sampler, None); }
            }
        }
    }

    fn create_vk_sampler(ctx: &GpuContext, kind: SamplerKind) -> Result<vk::Sampler> {
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE)
            .anisotropy_enable(false)
            .max_anisotropy(1.0)
            .unnormalized_coordinates(false);

        let create_info = match kind {
            SamplerKind::Linear => create_info
                .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
                .address_mode_u(vk::SamplerAddressMode::REPEAT)
                .address_mode_v(vk::SamplerAddressMode::REPEAT)
                .address_mode_w(vk::SamplerAddressMode::REPEAT)
                .border_color(vk::BorderColor::FLOAT_OPAQUE_BLACK)
                .compare_enable(false)
                .compare_op(vk::CompareOp::ALWAYS),
            SamplerKind::Shadow => create_info
                .mipmap_mode(vk::SamplerMipmapMode::NEAREST)
                .address_mode_u(vk::SamplerAddressMode::CLAMP_TO_BORDER)
                .address_mode_v(vk::SamplerAddressMode::CLAMP_TO_BORDER)
                .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_BORDER)
                .border_color(vk::BorderColor::FLOAT_OPAQUE_WHITE)
                .compare_enable(true)
                .compare_op(vk::CompareOp::LESS_OR_EQUAL),
        };

        unsafe {
            ctx.device.create_sampler(&create_info, None)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to create {:?} sampler: {:?}", kind, e))
        }
    }
}

impl Drop for SamplerCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}
