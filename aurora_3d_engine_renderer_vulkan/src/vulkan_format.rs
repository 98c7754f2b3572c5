/// Conversions from engine descriptor types to Vulkan types
///
/// Pure functions, no device needed.

use aurora_3d_engine::aurora3d::render::{
    TextureFormat, LoadOp, StoreOp, ImageLayout, ImageUsage, ImageAspect, PipelineStage,
    Access, SubpassIndex, IndexType, ShaderStage, BufferUsage, ClearValue, BindingResource,
    AttachmentDesc, AttachmentRef, SubpassDependency,
};
use ash::vk;

/// Convert TextureFormat to Vulkan format
pub fn format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,
        TextureFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
        TextureFormat::D16_UNORM => vk::Format::D16_UNORM,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        TextureFormat::D32_FLOAT_S8_UINT => vk::Format::D32_SFLOAT_S8_UINT,
    }
}

/// Engine format of a Vulkan format (swapchain surfaces), None if unsupported
pub fn format_from_vk(format: vk::Format) -> Option<TextureFormat> {
    match format {
        vk::Format::R8G8B8A8_SRGB => Some(TextureFormat::R8G8B8A8_SRGB),
        vk::Format::R8G8B8A8_UNORM => Some(TextureFormat::R8G8B8A8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(TextureFormat::B8G8R8A8_SRGB),
        vk::Format::B8G8R8A8_UNORM => Some(TextureFormat::B8G8R8A8_UNORM),
        vk::Format::R16G16B16A16_SFLOAT => Some(TextureFormat::R16G16B16A16_SFLOAT),
        vk::Format::R32G32B32A32_SFLOAT => Some(TextureFormat::R32G32B32A32_SFLOAT),
        vk::Format::D16_UNORM => Some(TextureFormat::D16_UNORM),
        vk::Format::D32_SFLOAT => Some(TextureFormat::D32_FLOAT),
        vk::Format::D24_UNORM_S8_UINT => Some(TextureFormat::D24_UNORM_S8_UINT),
        vk::Format::D32_SFLOAT_S8_UINT => Some(TextureFormat::D32_FLOAT_S8_UINT),
        _ => None,
    }
}

pub fn load_op_to_vk(load_op: LoadOp) -> vk::AttachmentLoadOp {
    match load_op {
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
        LoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        LoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

pub fn store_op_to_vk(store_op: StoreOp) -> vk::AttachmentStoreOp {
    match store_op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
    }
}

pub fn image_layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::General => vk::ImageLayout::GENERAL,
        ImageLayout::ColorAttachment => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilAttachment => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilReadOnly => vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
        ImageLayout::ShaderReadOnly => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::TransferSrc => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        ImageLayout::TransferDst => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

/// Sample count flags; unsupported counts fall back to one sample
pub fn sample_count_to_vk(samples: u32) -> vk::SampleCountFlags {
    match samples {
        2 => vk::SampleCountFlags::TYPE_2,
        4 => vk::SampleCountFlags::TYPE_4,
        8 => vk::SampleCountFlags::TYPE_8,
        16 => vk::SampleCountFlags::TYPE_16,
        _ => vk::SampleCountFlags::TYPE_1,
    }
}

pub fn image_usage_to_vk(usage: ImageUsage) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if usage.contains(ImageUsage::COLOR_ATTACHMENT) {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.contains(ImageUsage::DEPTH_STENCIL_ATTACHMENT) {
        flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    if usage.contains(ImageUsage::INPUT_ATTACHMENT) {
        flags |= vk::ImageUsageFlags::INPUT_ATTACHMENT;
    }
    if usage.contains(ImageUsage::SAMPLED) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    if usage.contains(ImageUsage::TRANSFER_SRC) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(ImageUsage::TRANSFER_DST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    flags
}

pub fn image_aspect_to_vk(aspect: ImageAspect) -> vk::ImageAspectFlags {
    let mut flags = vk::ImageAspectFlags::empty();
    if aspect.contains(ImageAspect::COLOR) {
        flags |= vk::ImageAspectFlags::COLOR;
    }
    if aspect.contains(ImageAspect::DEPTH) {
        flags |= vk::ImageAspectFlags::DEPTH;
    }
    if aspect.contains(ImageAspect::STENCIL) {
        flags |= vk::ImageAspectFlags::STENCIL;
    }
    flags
}

pub fn pipeline_stage_to_vk(stage: PipelineStage) -> vk::PipelineStageFlags {
    let mapping = [
        (PipelineStage::TOP_OF_PIPE, vk::PipelineStageFlags::TOP_OF_PIPE),
        (PipelineStage::FRAGMENT_SHADER, vk::PipelineStageFlags::FRAGMENT_SHADER),
        (PipelineStage::EARLY_FRAGMENT_TESTS, vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS),
        (PipelineStage::LATE_FRAGMENT_TESTS, vk::PipelineStageFlags::LATE_FRAGMENT_TESTS),
        (PipelineStage::COLOR_ATTACHMENT_OUTPUT, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT),
        (PipelineStage::BOTTOM_OF_PIPE, vk::PipelineStageFlags::BOTTOM_OF_PIPE),
    ];
    mapping.iter()
        .filter(|(engine, _)| stage.contains(*engine))
        .fold(vk::PipelineStageFlags::empty(), |flags, (_, vk_flag)| flags | *vk_flag)
}

pub fn access_to_vk(access: Access) -> vk::AccessFlags {
    let mapping = [
        (Access::INPUT_ATTACHMENT_READ, vk::AccessFlags::INPUT_ATTACHMENT_READ),
        (Access::SHADER_READ, vk::AccessFlags::SHADER_READ),
        (Access::COLOR_ATTACHMENT_READ, vk::AccessFlags::COLOR_ATTACHMENT_READ),
        (Access::COLOR_ATTACHMENT_WRITE, vk::AccessFlags::COLOR_ATTACHMENT_WRITE),
        (Access::DEPTH_STENCIL_ATTACHMENT_READ, vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ),
        (Access::DEPTH_STENCIL_ATTACHMENT_WRITE, vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE),
    ];
    mapping.iter()
        .filter(|(engine, _)| access.contains(*engine))
        .fold(vk::AccessFlags::empty(), |flags, (_, vk_flag)| flags | *vk_flag)
}

pub fn subpass_index_to_vk(index: SubpassIndex) -> u32 {
    match index {
        SubpassIndex::External => vk::SUBPASS_EXTERNAL,
        SubpassIndex::Index(index) => index,
    }
}

pub fn index_type_to_vk(index_type: IndexType) -> vk::IndexType {
    match index_type {
        IndexType::U16 => vk::IndexType::UINT16,
        IndexType::U32 => vk::IndexType::UINT32,
    }
}

pub fn shader_stages_to_vk(stages: &[ShaderStage]) -> vk::ShaderStageFlags {
    stages.iter().fold(vk::ShaderStageFlags::empty(), |flags, stage| {
        flags | match stage {
            ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
            ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
        }
    })
}

pub fn buffer_usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    let usage = match usage {
        BufferUsage::Vertex => vk::BufferUsageFlags::VERTEX_BUFFER,
        BufferUsage::Index => vk::BufferUsageFlags::INDEX_BUFFER,
        BufferUsage::Uniform => vk::BufferUsageFlags::UNIFORM_BUFFER,
        BufferUsage::Storage => vk::BufferUsageFlags::STORAGE_BUFFER,
    };
    usage | vk::BufferUsageFlags::TRANSFER_DST
}

pub fn clear_value_to_vk(value: ClearValue) -> vk::ClearValue {
    match value {
        ClearValue::Color(color) => vk::ClearValue {
            color: vk::ClearColorValue { float32: color },
        },
        ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
        },
    }
}

/// Descriptor type a binding resource is written as
pub fn descriptor_type(resource: &BindingResource) -> vk::DescriptorType {
    match resource {
        BindingResource::UniformBuffer(_) => vk::DescriptorType::UNIFORM_BUFFER,
        BindingResource::SampledTexture(_) | BindingResource::DepthTexture(_) =>
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        BindingResource::InputAttachment(_) => vk::DescriptorType::INPUT_ATTACHMENT,
    }
}

// ===== RENDER PASS PIECES =====

pub fn attachment_to_vk(attachment: &AttachmentDesc) -> vk::AttachmentDescription {
    vk::AttachmentDescription::default()
        .format(format_to_vk(attachment.format))
        .samples(sample_count_to_vk(attachment.samples))
        .load_op(load_op_to_vk(attachment.load_op))
        .store_op(store_op_to_vk(attachment.store_op))
        .stencil_load_op(load_op_to_vk(attachment.stencil_load_op))
        .stencil_store_op(store_op_to_vk(attachment.stencil_store_op))
        .initial_layout(image_layout_to_vk(attachment.initial_layout))
        .final_layout(image_layout_to_vk(attachment.final_layout))
}

pub fn attachment_ref_to_vk(reference: &AttachmentRef) -> vk::AttachmentReference {
    vk::AttachmentReference::default()
        .attachment(reference.attachment)
        .layout(image_layout_to_vk(reference.layout))
}

pub fn dependency_to_vk(dependency: &SubpassDependency) -> vk::SubpassDependency {
    let flags = if dependency.by_region {
        vk::DependencyFlags::BY_REGION
    } else {
        vk::DependencyFlags::empty()
    };
    vk::SubpassDependency::default()
        .src_subpass(subpass_index_to_vk(dependency.src_subpass))
        .dst_subpass(subpass_index_to_vk(dependency.dst_subpass))
        .src_stage_mask(pipeline_stage_to_vk(dependency.src_stage))
        .dst_stage_mask(pipeline_stage_to_vk(dependency.dst_stage))
        .src_access_mask(access_to_vk(dependency.src_access))
        .dst_access_mask(access_to_vk(dependency.dst_access))
        .dependency_flags(flags)
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
