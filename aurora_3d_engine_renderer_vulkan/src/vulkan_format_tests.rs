//! Unit tests for Vulkan conversion functions
//!
//! Pure conversions, no GPU required.

use super::*;

// ============================================================================
// FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_format_to_vk_color_formats() {
    assert_eq!(format_to_vk(TextureFormat::R8G8B8A8_SRGB), vk::Format::R8G8B8A8_SRGB);
    assert_eq!(format_to_vk(TextureFormat::B8G8R8A8_UNORM), vk::Format::B8G8R8A8_UNORM);
    assert_eq!(format_to_vk(TextureFormat::R16G16B16A16_SFLOAT), vk::Format::R16G16B16A16_SFLOAT);
    assert_eq!(format_to_vk(TextureFormat::R32G32B32A32_SFLOAT), vk::Format::R32G32B32A32_SFLOAT);
}

#[test]
fn test_format_to_vk_depth_formats() {
    // Engine naming drops the S of SFLOAT
    assert_eq!(format_to_vk(TextureFormat::D32_FLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(format_to_vk(TextureFormat::D32_FLOAT_S8_UINT), vk::Format::D32_SFLOAT_S8_UINT);
    assert_eq!(format_to_vk(TextureFormat::D24_UNORM_S8_UINT), vk::Format::D24_UNORM_S8_UINT);
    assert_eq!(format_to_vk(TextureFormat::D16_UNORM), vk::Format::D16_UNORM);
}

#[test]
fn test_format_from_vk_inverts_format_to_vk() {
    let formats = [
        TextureFormat::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM,
        TextureFormat::R16G16B16A16_SFLOAT,
        TextureFormat::R32G32B32A32_SFLOAT,
        TextureFormat::D16_UNORM,
        TextureFormat::D32_FLOAT,
        TextureFormat::D24_UNORM_S8_UINT,
        TextureFormat::D32_FLOAT_S8_UINT,
    ];
    for format in formats {
        assert_eq!(format_from_vk(format_to_vk(format)), Some(format));
    }
}

#[test]
fn test_format_from_vk_unsupported() {
    assert_eq!(format_from_vk(vk::Format::A2B10G10R10_UNORM_PACK32), None);
    assert_eq!(format_from_vk(vk::Format::UNDEFINED), None);
}

// ============================================================================
// ATTACHMENT CONVERSION TESTS
// ============================================================================

#[test]
fn test_image_layout_to_vk() {
    assert_eq!(image_layout_to_vk(ImageLayout::Undefined), vk::ImageLayout::UNDEFINED);
    assert_eq!(image_layout_to_vk(ImageLayout::DepthStencilReadOnly), vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL);
    assert_eq!(image_layout_to_vk(ImageLayout::ShaderReadOnly), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    assert_eq!(image_layout_to_vk(ImageLayout::PresentSrc), vk::ImageLayout::PRESENT_SRC_KHR);
}

#[test]
fn test_sample_count_fallback() {
    assert_eq!(sample_count_to_vk(1), vk::SampleCountFlags::TYPE_1);
    assert_eq!(sample_count_to_vk(4), vk::SampleCountFlags::TYPE_4);
    assert_eq!(sample_count_to_vk(3), vk::SampleCountFlags::TYPE_1);
    assert_eq!(sample_count_to_vk(0), vk::SampleCountFlags::TYPE_1);
}

#[test]
fn test_attachment_to_vk() {
    let desc = AttachmentDesc {
        format: TextureFormat::D32_FLOAT,
        samples: 1,
        load_op: LoadOp::Clear,
        store_op: StoreOp::Store,
        stencil_load_op: LoadOp::DontCare,
        stencil_store_op: StoreOp::DontCare,
        initial_layout: ImageLayout::Undefined,
        final_layout: ImageLayout::DepthStencilReadOnly,
    };
    let vk_desc = attachment_to_vk(&desc);

    assert_eq!(vk_desc.format, vk::Format::D32_SFLOAT);
    assert_eq!(vk_desc.load_op, vk::AttachmentLoadOp::CLEAR);
    assert_eq!(vk_desc.store_op, vk::AttachmentStoreOp::STORE);
    assert_eq!(vk_desc.stencil_load_op, vk::AttachmentLoadOp::DONT_CARE);
    assert_eq!(vk_desc.final_layout, vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL);
}

#[test]
fn test_attachment_ref_to_vk() {
    let reference = attachment_ref_to_vk(&AttachmentRef { attachment: 3, layout: ImageLayout::ShaderReadOnly });
    assert_eq!(reference.attachment, 3);
    assert_eq!(reference.layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
}

// ============================================================================
// BARRIER CONVERSION TESTS
// ============================================================================

#[test]
fn test_pipeline_stage_combined_flags() {
    let stage = PipelineStage::COLOR_ATTACHMENT_OUTPUT | PipelineStage::EARLY_FRAGMENT_TESTS;
    assert_eq!(
        pipeline_stage_to_vk(stage),
        vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
    );
    assert_eq!(pipeline_stage_to_vk(PipelineStage::empty()), vk::PipelineStageFlags::empty());
}

#[test]
fn test_access_combined_flags() {
    let access = Access::COLOR_ATTACHMENT_READ | Access::COLOR_ATTACHMENT_WRITE | Access::INPUT_ATTACHMENT_READ;
    assert_eq!(
        access_to_vk(access),
        vk::AccessFlags::COLOR_ATTACHMENT_READ
            | vk::AccessFlags::COLOR_ATTACHMENT_WRITE
            | vk::AccessFlags::INPUT_ATTACHMENT_READ
    );
}

#[test]
fn test_dependency_external_to_first_subpass() {
    let dependency = SubpassDependency {
        src_subpass: SubpassIndex::External,
        dst_subpass: SubpassIndex::Index(0),
        src_stage: PipelineStage::COLOR_ATTACHMENT_OUTPUT,
        dst_stage: PipelineStage::COLOR_ATTACHMENT_OUTPUT,
        src_access: Access::empty(),
        dst_access: Access::COLOR_ATTACHMENT_WRITE,
        by_region: false,
    };
    let vk_dependency = dependency_to_vk(&dependency);

    assert_eq!(vk_dependency.src_subpass, vk::SUBPASS_EXTERNAL);
    assert_eq!(vk_dependency.dst_subpass, 0);
    assert_eq!(vk_dependency.src_access_mask, vk::AccessFlags::empty());
    assert_eq!(vk_dependency.dependency_flags, vk::DependencyFlags::empty());
}

#[test]
fn test_dependency_by_region() {
    let dependency = SubpassDependency {
        src_subpass: SubpassIndex::Index(0),
        dst_subpass: SubpassIndex::Index(1),
        src_stage: PipelineStage::COLOR_ATTACHMENT_OUTPUT,
        dst_stage: PipelineStage::FRAGMENT_SHADER,
        src_access: Access::COLOR_ATTACHMENT_WRITE,
        dst_access: Access::INPUT_ATTACHMENT_READ,
        by_region: true,
    };
    let vk_dependency = dependency_to_vk(&dependency);

    assert_eq!(vk_dependency.src_subpass, 0);
    assert_eq!(vk_dependency.dst_subpass, 1);
    assert_eq!(vk_dependency.dst_stage_mask, vk::PipelineStageFlags::FRAGMENT_SHADER);
    assert_eq!(vk_dependency.dependency_flags, vk::DependencyFlags::BY_REGION);
}

// ============================================================================
// MISC CONVERSION TESTS
// ============================================================================

#[test]
fn test_image_usage_to_vk() {
    let usage = ImageUsage::COLOR_ATTACHMENT | ImageUsage::INPUT_ATTACHMENT;
    assert_eq!(
        image_usage_to_vk(usage),
        vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::INPUT_ATTACHMENT
    );
}

#[test]
fn test_image_aspect_depth_stencil() {
    let aspect = ImageAspect::from_format(TextureFormat::D24_UNORM_S8_UINT);
    assert_eq!(image_aspect_to_vk(aspect), vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL);
}

#[test]
fn test_index_type_to_vk() {
    assert_eq!(index_type_to_vk(IndexType::U16), vk::IndexType::UINT16);
    assert_eq!(index_type_to_vk(IndexType::U32), vk::IndexType::UINT32);
}

#[test]
fn test_shader_stages_to_vk() {
    assert_eq!(shader_stages_to_vk(&[]), vk::ShaderStageFlags::empty());
    assert_eq!(
        shader_stages_to_vk(&[ShaderStage::Vertex, ShaderStage::Fragment]),
        vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT
    );
}

#[test]
fn test_buffer_usage_allows_transfer() {
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::Uniform),
        vk::BufferUsageFlags::UNIFORM_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
    );
}

#[test]
fn test_clear_value_to_vk() {
    let color = clear_value_to_vk(ClearValue::Color([0.1, 0.2, 0.3, 1.0]));
    let depth = clear_value_to_vk(ClearValue::DepthStencil { depth: 1.0, stencil: 7 });
    unsafe {
        assert_eq!(color.color.float32, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(depth.depth_stencil.depth, 1.0);
        assert_eq!(depth.depth_stencil.stencil, 7);
    }
}
