/// Framebuffer - Vulkan implementation of the Framebuffer trait
///
/// Wraps a VkFramebuffer over the attachment views of one render pass.
/// Created once per attachment set and reused each frame.

use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::aurora3d::render::{
    Framebuffer as EngineFramebuffer, FramebufferDesc, ImageView as EngineImageView,
};
use aurora_3d_engine::engine_err;
use ash::vk;
use std::any::Any;
use std::sync::Arc;

use crate::vulkan_context::{GpuContext, backend};
use crate::vulkan_image::VulkanImageView;
use crate::vulkan_render_pass::VulkanRenderPass;

/// Vulkan framebuffer implementation
///
/// Holds its attachment views, which must outlive the VkFramebuffer.
pub struct VulkanFramebuffer {
    ctx: Arc<GpuContext>,
    pub(crate) framebuffer: vk::Framebuffer,
    width: u32,
    height: u32,
    _attachments: Vec<Arc<dyn EngineImageView>>,
}

impl VulkanFramebuffer {
    pub(crate) fn create(ctx: &Arc<GpuContext>, desc: &FramebufferDesc) -> Result<Self> {
        let render_pass = backend::<VulkanRenderPass>(desc.render_pass.as_any(), "Render pass")?;

        let views = desc.attachments.iter()
            .map(|view| backend::<VulkanImageView>(view.as_any(), "Framebuffer attachment").map(|v| v.view))
            .collect::<Result<Vec<vk::ImageView>>>()?;

        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass.render_pass)
            .attachments(&views)
            .width(desc.width)
            .height(desc.height)
            .layers(desc.layers.max(1));

        let framebuffer = unsafe {
            ctx.device.create_framebuffer(&create_info, None)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to create {}x{} framebuffer: {:?}",
                    desc.width, desc.height, e))?
        };

        Ok(Self {
            ctx: Arc::clone(ctx),
            framebuffer,
            width: desc.width,
            height: desc.height,
            _attachments: desc.attachments.clone(),
        })
    }

    pub fn handle(&self) -> vk::Framebuffer {
        self.framebuffer
    }
}

impl EngineFramebuffer for VulkanFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanFramebuffer {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
