/// RenderPass - Vulkan implementation of the RenderPass trait
///
/// Translates a multi-subpass `RenderPassDesc` into a vk::RenderPass.

use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::aurora3d::render::{RenderPass as EngineRenderPass, RenderPassDesc};
use aurora_3d_engine::engine_err;
use ash::vk;
use std::any::Any;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{attachment_to_vk, attachment_ref_to_vk, dependency_to_vk};

/// Vulkan render pass implementation
pub struct VulkanRenderPass {
    ctx: Arc<GpuContext>,
    pub(crate) render_pass: vk::RenderPass,
    subpass_count: u32,
}

/// Attachment references of one subpass, kept alive while the
/// vk::SubpassDescription borrowing them is in use
struct SubpassRefs {
    inputs: Vec<vk::AttachmentReference>,
    colors: Vec<vk::AttachmentReference>,
    depth: Option<vk::AttachmentReference>,
}

impl VulkanRenderPass {
    pub(crate) fn create(ctx: &Arc<GpuContext>, desc: &RenderPassDesc) -> Result<Self> {
        let attachments: Vec<vk::AttachmentDescription> = desc.attachments.iter()
            .map(attachment_to_vk)
            .collect();

        let refs: Vec<SubpassRefs> = desc.subpasses.iter()
            .map(|subpass| SubpassRefs {
                inputs: subpass.input_attachments.iter().map(attachment_ref_to_vk).collect(),
                colors: subpass.color_attachments.iter().map(attachment_ref_to_vk).collect(),
                depth: subpass.depth_stencil_attachment.as_ref().map(attachment_ref_to_vk),
            })
            .collect();

        let subpasses: Vec<vk::SubpassDescription> = refs.iter()
            .map(|refs| {
                let subpass = vk::SubpassDescription::default()
                    .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
                    .input_attachments(&refs.inputs)
                    .color_attachments(&refs.colors);
                match &refs.depth {
                    Some(depth) => subpass.depth_stencil_attachment(depth),
                    None => subpass,
                }
            })
            .collect();

        let dependencies: Vec<vk::SubpassDependency> = desc.dependencies.iter()
            .map(dependency_to_vk)
            .collect();

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let render_pass = unsafe {
            ctx.device.create_render_pass(&create_info, None)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to create render pass ({} attachments, {} subpasses): {:?}",
                    attachments.len(), subpasses.len(), e))?
        };

        Ok(Self {
            ctx: Arc::clone(ctx),
            render_pass,
            subpass_count: subpasses.len() as u32,
        })
    }

    pub fn handle(&self) -> vk::RenderPass {
        self.render_pass
    }
}

impl EngineRenderPass for VulkanRenderPass {
    fn subpass_count(&self) -> u32 {
        self.subpass_count
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanRenderPass {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_render_pass(self.render_pass, None);
        }
    }
}
