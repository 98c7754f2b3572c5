/// BindingGroup - Vulkan implementation of the BindingGroup trait
///
/// Wraps a VkDescriptorSet. Sets are returned to their pool when the pool
/// is destroyed with the device; rewriting an existing group in place is
/// the way to change its resources.

use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::aurora3d::render::{
    BindingGroup as EngineBindingGroup, BindingResource, ImageView as EngineImageView,
};
use ash::vk;
use std::any::Any;

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_context::backend;
use crate::vulkan_format::descriptor_type;
use crate::vulkan_image::VulkanImageView;
use crate::vulkan_sampler::{SamplerCache, SamplerKind};
use crate::vulkan_texture::VulkanTextureView;

/// Vulkan binding group implementation
pub struct VulkanBindingGroup {
    pub(crate) descriptor_set: vk::DescriptorSet,
    set_index: u32,
}

impl VulkanBindingGroup {
    pub(crate) fn new(descriptor_set: vk::DescriptorSet, set_index: u32) -> Self {
        Self { descriptor_set, set_index }
    }

    pub fn handle(&self) -> vk::DescriptorSet {
        self.descriptor_set
    }
}

impl EngineBindingGroup for VulkanBindingGroup {
    fn set_index(&self) -> u32 {
        self.set_index
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

enum DescriptorInfo {
    Buffer(vk::DescriptorBufferInfo),
    Image(vk::DescriptorImageInfo),
}

fn attachment_layout(view: &dyn EngineImageView) -> vk::ImageLayout {
    if view.format().is_depth() {
        vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL
    } else {
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
    }
}

fn descriptor_info(resource: &BindingResource, samplers: &mut SamplerCache) -> Result<DescriptorInfo> {
    Ok(match resource {
        BindingResource::UniformBuffer(buffer) => {
            let buffer = backend::<VulkanBuffer>(buffer.as_any(), "Uniform buffer")?;
            DescriptorInfo::Buffer(vk::DescriptorBufferInfo::default()
                .buffer(buffer.buffer)
                .offset(0)
                .range(vk::WHOLE_SIZE))
        }
        BindingResource::SampledTexture(view) => {
            let texture_view = backend::<VulkanTextureView>(view.as_any(), "Texture view")?;
            DescriptorInfo::Image(vk::DescriptorImageInfo::default()
                .sampler(samplers.get(SamplerKind::Linear)?)
                .image_view(texture_view.handle())
                .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL))
        }
        BindingResource::InputAttachment(view) => {
            let image_view = backend::<VulkanImageView>(view.as_any(), "Input attachment")?;
            DescriptorInfo::Image(vk::DescriptorImageInfo::default()
                .image_view(image_view.view)
                .image_layout(attachment_layout(*view)))
        }
        BindingResource::DepthTexture(view) => {
            let image_view = backend::<VulkanImageView>(view.as_any(), "Depth texture")?;
            DescriptorInfo::Image(vk::DescriptorImageInfo::default()
                .sampler(samplers.get(SamplerKind::Shadow)?)
                .image_view(image_view.view)
                .image_layout(attachment_layout(*view)))
        }
    })
}

/// Write `resources` to bindings 0..n of `descriptor_set`
///
/// Shared by group creation and in-place updates.
pub(crate) fn write_descriptors(
    device: &ash::Device,
    descriptor_set: vk::DescriptorSet,
    resources: &[BindingResource],
    samplers: &mut SamplerCache,
) -> Result<()> {
    let infos = resources.iter()
        .map(|resource| descriptor_info(resource, samplers))
        .collect::<Result<Vec<DescriptorInfo>>>()?;

    let writes: Vec<vk::WriteDescriptorSet> = resources.iter()
        .zip(&infos)
        .enumerate()
        .map(|(binding, (resource, info))| {
            let write = vk::WriteDescriptorSet::default()
                .dst_set(descriptor_set)
                .dst_binding(binding as u32)
                .dst_array_element(0)
                .descriptor_type(descriptor_type(resource));
            match info {
                DescriptorInfo::Buffer(buffer_info) => write.buffer_info(std::slice::from_ref(buffer_info)),
                DescriptorInfo::Image(image_info) => write.image_info(std::slice::from_ref(image_info)),
            }
        })
        .collect();

    unsafe {
        device.update_descriptor_sets(&writes, &[]);
    }
    Ok(())
}
