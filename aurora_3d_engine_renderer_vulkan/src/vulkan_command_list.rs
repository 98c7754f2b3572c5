/// CommandList - Vulkan implementation of the CommandList trait
///
/// Owns one primary command buffer. The host frame loop calls `begin`,
/// hands the list to the renderer, calls `end`, then submits
/// `command_buffer()` with its own semaphores and fences.

use aurora_3d_engine::aurora3d::{Result, Error};
use aurora_3d_engine::aurora3d::render::{
    CommandList as EngineCommandList,
    RenderPass as EngineRenderPass,
    Framebuffer as EngineFramebuffer,
    Pipeline as EnginePipeline,
    Buffer as EngineBuffer,
    BindingGroup as EngineBindingGroup,
    Viewport, Rect2D, ClearValue, IndexType, ShaderStage,
};
use aurora_3d_engine::engine_error;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_binding_group::VulkanBindingGroup;
use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_context::{GpuContext, backend};
use crate::vulkan_format::{clear_value_to_vk, index_type_to_vk, shader_stages_to_vk};
use crate::vulkan_frame_buffer::VulkanFramebuffer;
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_render_pass::VulkanRenderPass;

/// Vulkan command list implementation
pub struct VulkanCommandList {
    ctx: Arc<GpuContext>,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    is_recording: bool,
    /// Subpass count of the render pass being recorded, None outside one
    active_subpasses: Option<u32>,
    current_subpass: u32,
    /// Layout of the bound pipeline (for push constants)
    bound_pipeline_layout: Option<vk::PipelineLayout>,
}

impl VulkanCommandList {
    pub fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = ctx.device.create_command_pool(&pool_info, None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create command pool: {:?}", e);
                    Error::BackendError(format!("Failed to create command pool: {:?}", e))
                })?;

            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = match ctx.device.allocate_command_buffers(&allocate_info) {
                Ok(buffers) => buffers,
                Err(e) => {
                    ctx.device.destroy_command_pool(command_pool, None);
                    engine_error!("aurora3d::vulkan", "Failed to allocate command buffer: {:?}", e);
                    return Err(Error::BackendError(format!("Failed to allocate command buffer: {:?}", e)));
                }
            };

            Ok(Self {
                ctx,
                command_pool,
                command_buffer: command_buffers[0],
                is_recording: false,
                active_subpasses: None,
                current_subpass: 0,
                bound_pipeline_layout: None,
            })
        }
    }

    /// Underlying command buffer, for submission
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Reset the buffer and start recording
    pub fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::BackendError("Command list already recording".to_string()));
        }

        unsafe {
            self.ctx.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| Error::BackendError(format!("Failed to reset command buffer: {:?}", e)))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            self.ctx.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| Error::BackendError(format!("Failed to begin command buffer: {:?}", e)))?;
        }

        self.is_recording = true;
        self.active_subpasses = None;
        self.current_subpass = 0;
        self.bound_pipeline_layout = None;
        Ok(())
    }

    pub fn end(&mut self) -> Result<()> {
        self.require_recording()?;
        if self.active_subpasses.is_some() {
            return Err(Error::BackendError("Render pass not ended before ending command list".to_string()));
        }

        unsafe {
            self.ctx.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| Error::BackendError(format!("Failed to end command buffer: {:?}", e)))?;
        }
        self.is_recording = false;
        Ok(())
    }

    fn require_recording(&self) -> Result<()> {
        if self.is_recording {
            Ok(())
        } else {
            Err(Error::BackendError("Command list not recording".to_string()))
        }
    }

    fn require_render_pass(&self) -> Result<u32> {
        self.require_recording()?;
        self.active_subpasses
            .ok_or_else(|| Error::BackendError("Not inside a render pass".to_string()))
    }
}

impl EngineCommandList for VulkanCommandList {
    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn EngineRenderPass>,
        framebuffer: &Arc<dyn EngineFramebuffer>,
        render_area: Rect2D,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        self.require_recording()?;
        if self.active_subpasses.is_some() {
            return Err(Error::BackendError("Already inside a render pass".to_string()));
        }

        let vk_render_pass = backend::<VulkanRenderPass>(render_pass.as_any(), "Render pass")?;
        let vk_framebuffer = backend::<VulkanFramebuffer>(framebuffer.as_any(), "Framebuffer")?;
        let vk_clear_values: Vec<vk::ClearValue> = clear_values.iter().copied().map(clear_value_to_vk).collect();

        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(vk_render_pass.render_pass)
            .framebuffer(vk_framebuffer.framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: render_area.x, y: render_area.y },
                extent: vk::Extent2D { width: render_area.width, height: render_area.height },
            })
            .clear_values(&vk_clear_values);

        unsafe {
            self.ctx.device.cmd_begin_render_pass(self.command_buffer, &begin_info, vk::SubpassContents::INLINE);
        }

        self.active_subpasses = Some(render_pass.subpass_count());
        self.current_subpass = 0;
        Ok(())
    }

    fn next_subpass(&mut self) -> Result<()> {
        let subpass_count = self.require_render_pass()?;
        if self.current_subpass + 1 >= subpass_count {
            return Err(Error::BackendError(format!(
                "next_subpass past the last of {} subpasses", subpass_count
            )));
        }

        unsafe {
            self.ctx.device.cmd_next_subpass(self.command_buffer, vk::SubpassContents::INLINE);
        }
        self.current_subpass += 1;
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.require_render_pass()?;

        unsafe {
            self.ctx.device.cmd_end_render_pass(self.command_buffer);
        }
        self.active_subpasses = None;
        self.current_subpass = 0;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.require_recording()?;

        let vk_viewport = vk::Viewport {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: viewport.height,
            min_depth: viewport.min_depth,
            max_depth: viewport.max_depth,
        };
        unsafe {
            self.ctx.device.cmd_set_viewport(self.command_buffer, 0, &[vk_viewport]);
        }
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.require_recording()?;

        let vk_scissor = vk::Rect2D {
            offset: vk::Offset2D { x: scissor.x, y: scissor.y },
            extent: vk::Extent2D { width: scissor.width, height: scissor.height },
        };
        unsafe {
            self.ctx.device.cmd_set_scissor(self.command_buffer, 0, &[vk_scissor]);
        }
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn EnginePipeline>) -> Result<()> {
        self.require_recording()?;

        let vk_pipeline = backend::<VulkanPipeline>(pipeline.as_any(), "Pipeline")?;
        unsafe {
            self.ctx.device.cmd_bind_pipeline(self.command_buffer, vk::PipelineBindPoint::GRAPHICS, vk_pipeline.pipeline);
        }
        self.bound_pipeline_layout = Some(vk_pipeline.pipeline_layout);
        Ok(())
    }

    fn bind_binding_group(
        &mut self,
        pipeline: &Arc<dyn EnginePipeline>,
        set_index: u32,
        binding_group: &Arc<dyn EngineBindingGroup>,
    ) -> Result<()> {
        self.require_recording()?;

        let vk_pipeline = backend::<VulkanPipeline>(pipeline.as_any(), "Pipeline")?;
        let vk_group = backend::<VulkanBindingGroup>(binding_group.as_any(), "Binding group")?;
        unsafe {
            self.ctx.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline_layout,
                set_index,
                &[vk_group.descriptor_set],
                &[],
            );
        }
        Ok(())
    }

    fn push_constants(
        &mut self,
        pipeline: &Arc<dyn EnginePipeline>,
        stages: &[ShaderStage],
        offset: u32,
        data: &[u8],
    ) -> Result<()> {
        self.require_recording()?;

        let layout = backend::<VulkanPipeline>(pipeline.as_any(), "Pipeline")?.pipeline_layout;
        if self.bound_pipeline_layout != Some(layout) {
            engine_error!("aurora3d::vulkan", "push_constants on a pipeline that is not bound");
            return Err(Error::BackendError("push_constants requires the pipeline to be bound".to_string()));
        }

        unsafe {
            self.ctx.device.cmd_push_constants(self.command_buffer, layout, shader_stages_to_vk(stages), offset, data);
        }
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn EngineBuffer>, offset: u64) -> Result<()> {
        self.require_recording()?;

        let vk_buffer = backend::<VulkanBuffer>(buffer.as_any(), "Vertex buffer")?;
        unsafe {
            self.ctx.device.cmd_bind_vertex_buffers(self.command_buffer, 0, &[vk_buffer.buffer], &[offset]);
        }
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &Arc<dyn EngineBuffer>, offset: u64, index_type: IndexType) -> Result<()> {
        self.require_recording()?;

        let vk_buffer = backend::<VulkanBuffer>(buffer.as_any(), "Index buffer")?;
        unsafe {
            self.ctx.device.cmd_bind_index_buffer(self.command_buffer, vk_buffer.buffer, offset, index_type_to_vk(index_type));
        }
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.require_render_pass()?;

        unsafe {
            self.ctx.device.cmd_draw(self.command_buffer, vertex_count, 1, first_vertex, 0);
        }
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.require_render_pass()?;

        unsafe {
            self.ctx.device.cmd_draw_indexed(self.command_buffer, index_count, 1, first_index, vertex_offset, 0);
        }
        Ok(())
    }
}

impl Drop for VulkanCommandList {
    fn drop(&mut self) {
        unsafe {
            // Freeing the pool frees its command buffer
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
