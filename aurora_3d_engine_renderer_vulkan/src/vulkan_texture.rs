/// Texture - Vulkan implementation of the Texture and TextureView traits

use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::aurora3d::render::{
    Texture as EngineTexture, TextureView as EngineTextureView, TextureInfo, Extent2D,
};
use ash::vk;
use std::any::Any;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_image::{ImageMemory, VulkanImageView, ViewParams};

/// Vulkan texture implementation
///
/// Uploaded once and left in SHADER_READ_ONLY_OPTIMAL layout.
pub struct VulkanTexture {
    pub(crate) memory: Arc<ImageMemory>,
    info: TextureInfo,
}

impl VulkanTexture {
    pub(crate) fn new(memory: ImageMemory, info: TextureInfo) -> Self {
        Self { memory: Arc::new(memory), info }
    }

    pub fn handle(&self) -> vk::Image {
        self.memory.image
    }
}

impl EngineTexture for VulkanTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Sampled view over a texture
///
/// Holds the texture memory, so dropping the texture first is fine.
pub struct VulkanTextureView {
    view: VulkanImageView,
    info: TextureInfo,
}

impl VulkanTextureView {
    pub(crate) fn create(ctx: &Arc<GpuContext>, texture: &VulkanTexture) -> Result<Self> {
        let info = texture.info.clone();
        let view_type = if info.cubemap {
            vk::ImageViewType::CUBE
        } else if info.array_layers > 1 {
            vk::ImageViewType::TYPE_2D_ARRAY
        } else {
            vk::ImageViewType::TYPE_2D
        };

        let view = VulkanImageView::create(ctx, texture.memory.image, Some(Arc::clone(&texture.memory)), ViewParams {
            format: info.format,
            extent: Extent2D::new(info.width, info.height),
            aspect: vk::ImageAspectFlags::COLOR,
            view_type,
            array_layers: info.array_layers.max(1),
        })?;

        Ok(Self { view, info })
    }

    pub fn handle(&self) -> vk::ImageView {
        self.view.handle()
    }
}

impl EngineTextureView for VulkanTextureView {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
