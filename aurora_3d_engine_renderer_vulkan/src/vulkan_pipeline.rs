/// Pipeline - Vulkan implementation of the Pipeline trait
///
/// Shader modules and fixed-function state are built by the host. The
/// backend takes ownership of the finished pipeline, its layout, and the
/// descriptor set layouts binding groups are allocated against.

use aurora_3d_engine::aurora3d::render::Pipeline as EnginePipeline;
use ash::vk;
use std::any::Any;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan pipeline implementation
pub struct VulkanPipeline {
    ctx: Arc<GpuContext>,
    pub(crate) pipeline: vk::Pipeline,
    pub(crate) pipeline_layout: vk::PipelineLayout,
    /// Set layouts in set index order
    pub(crate) set_layouts: Vec<vk::DescriptorSetLayout>,
}

impl VulkanPipeline {
    /// Take ownership of host-created pipeline objects
    ///
    /// All handles are destroyed when the pipeline is dropped.
    pub fn new(
        ctx: Arc<GpuContext>,
        pipeline: vk::Pipeline,
        pipeline_layout: vk::PipelineLayout,
        set_layouts: Vec<vk::DescriptorSetLayout>,
    ) -> Self {
        Self { ctx, pipeline, pipeline_layout, set_layouts }
    }

    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    pub fn layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }

    pub(crate) fn set_layout(&self, set_index: u32) -> Option<vk::DescriptorSetLayout> {
        self.set_layouts.get(set_index as usize).copied()
    }
}

impl EnginePipeline for VulkanPipeline {
    fn binding_group_layout_count(&self) -> u32 {
        self.set_layouts.len() as u32
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline(self.pipeline, None);
            self.ctx.device.destroy_pipeline_layout(self.pipeline_layout, None);
            for &set_layout in &self.set_layouts {
                self.ctx.device.destroy_descriptor_set_layout(set_layout, None);
            }
        }
    }
}
