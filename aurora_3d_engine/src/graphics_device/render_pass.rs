/// Render pass objects - attachments, subpasses, and the barriers between them

use std::any::Any;
use bitflags::bitflags;
use crate::graphics_device::TextureFormat;

/// Load operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    /// Load existing content
    Load,
    /// Clear the content
    Clear,
    /// Don't care about existing content
    DontCare,
}

/// Store operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Store the rendered content
    Store,
    /// Don't care about storing the content
    DontCare,
}

/// Image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    /// Undefined layout (initial state)
    Undefined,
    General,
    /// Layout for color attachment
    ColorAttachment,
    /// Layout for depth/stencil attachment
    DepthStencilAttachment,
    /// Depth/stencil readable from shaders
    DepthStencilReadOnly,
    /// Layout for shader read-only access
    ShaderReadOnly,
    TransferSrc,
    TransferDst,
    /// Layout for presenting to swapchain
    PresentSrc,
}

/// Descriptor for a single attachment in a render pass
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentDesc {
    pub format: TextureFormat,
    /// Number of samples (1 = no MSAA)
    pub samples: u32,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

/// Reference from a subpass to an attachment of its render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentRef {
    /// Index into `RenderPassDesc::attachments`
    pub attachment: u32,
    /// Layout the attachment is in during the subpass
    pub layout: ImageLayout,
}

/// Attachment usage of one subpass
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SubpassDesc {
    pub input_attachments: Vec<AttachmentRef>,
    pub color_attachments: Vec<AttachmentRef>,
    pub depth_stencil_attachment: Option<AttachmentRef>,
}

/// Source or destination of a subpass dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubpassIndex {
    /// Commands before (or after) the render pass
    External,
    Index(u32),
}

bitflags! {
    /// Pipeline stages a barrier waits on or blocks
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStage: u32 {
        const TOP_OF_PIPE = 1 << 0;
        const FRAGMENT_SHADER = 1 << 1;
        const EARLY_FRAGMENT_TESTS = 1 << 2;
        const LATE_FRAGMENT_TESTS = 1 << 3;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 4;
        const BOTTOM_OF_PIPE = 1 << 5;
    }
}

bitflags! {
    /// Memory accesses made visible by a barrier
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Access: u32 {
        const INPUT_ATTACHMENT_READ = 1 << 0;
        const SHADER_READ = 1 << 1;
        const COLOR_ATTACHMENT_READ = 1 << 2;
        const COLOR_ATTACHMENT_WRITE = 1 << 3;
        const DEPTH_STENCIL_ATTACHMENT_READ = 1 << 4;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 5;
    }
}

/// Execution/memory barrier between two subpasses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubpassDependency {
    pub src_subpass: SubpassIndex,
    pub dst_subpass: SubpassIndex,
    pub src_stage: PipelineStage,
    pub dst_stage: PipelineStage,
    pub src_access: Access,
    pub dst_access: Access,
    /// Framebuffer-local dependency
    pub by_region: bool,
}

/// Descriptor for creating a render pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RenderPassDesc {
    pub attachments: Vec<AttachmentDesc>,
    pub subpasses: Vec<SubpassDesc>,
    pub dependencies: Vec<SubpassDependency>,
}

/// Compiled GPU render pass
///
/// Destroyed when the last reference is dropped.
pub trait RenderPass: Send + Sync {
    /// Number of subpasses
    fn subpass_count(&self) -> u32;

    fn as_any(&self) -> &dyn Any;
}
