/// Swapchain - Vulkan implementation of the Swapchain trait
///
/// The host creates the surface and VkSwapchainKHR, acquires and presents.
/// This type wraps the resulting images with engine image views so the
/// render graph can build framebuffers over them.

use aurora_3d_engine::aurora3d::{Result, Error};
use aurora_3d_engine::aurora3d::render::{
    Swapchain as EngineSwapchain, ImageView as EngineImageView, Extent2D, TextureFormat,
};
use aurora_3d_engine::{engine_error, engine_info};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::format_from_vk;
use crate::vulkan_image::{VulkanImageView, ViewParams};

/// Presentation images of a host swapchain
pub struct VulkanSwapchain {
    ctx: Arc<GpuContext>,
    format: TextureFormat,
    extent: Extent2D,
    views: Vec<Arc<VulkanImageView>>,
}

impl VulkanSwapchain {
    /// Wrap the images of a host swapchain
    ///
    /// Fails if the surface format has no engine equivalent.
    pub fn new(ctx: Arc<GpuContext>, images: &[vk::Image], format: vk::Format, extent: vk::Extent2D) -> Result<Self> {
        let mut swapchain = Self {
            ctx,
            format: Self::engine_format(format)?,
            extent: Extent2D::new(extent.width, extent.height),
            views: Vec::new(),
        };
        swapchain.views = swapchain.create_views(images)?;
        Ok(swapchain)
    }

    /// Replace the images after the host recreated its swapchain
    ///
    /// Old views are released; framebuffers still holding them keep them
    /// alive until the render graph rebuilds.
    pub fn recreate(&mut self, images: &[vk::Image], format: vk::Format, extent: vk::Extent2D) -> Result<()> {
        self.format = Self::engine_format(format)?;
        self.extent = Extent2D::new(extent.width, extent.height);
        self.views = self.create_views(images)?;
        engine_info!("aurora3d::vulkan", "Swapchain images recreated: {} x {}x{}",
            self.views.len(), extent.width, extent.height);
        Ok(())
    }

    fn engine_format(format: vk::Format) -> Result<TextureFormat> {
        format_from_vk(format).ok_or_else(|| {
            engine_error!("aurora3d::vulkan", "Unsupported swapchain format {:?}", format);
            Error::InitializationFailed(format!("Unsupported swapchain format {:?}", format))
        })
    }

    fn create_views(&self, images: &[vk::Image]) -> Result<Vec<Arc<VulkanImageView>>> {
        images.iter()
            .map(|&image| {
                VulkanImageView::create(&self.ctx, image, None, ViewParams {
                    format: self.format,
                    extent: self.extent,
                    aspect: vk::ImageAspectFlags::COLOR,
                    view_type: vk::ImageViewType::TYPE_2D,
                    array_layers: 1,
                })
                .map(Arc::new)
            })
            .collect()
    }
}

impl EngineSwapchain for VulkanSwapchain {
    fn image_count(&self) -> usize {
        self.views.len()
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn image_view(&self, index: u32) -> Option<Arc<dyn EngineImageView>> {
        self.views.get(index as usize).map(|view| Arc::clone(view) as Arc<dyn EngineImageView>)
    }
}
