/// Attachment images - GPU images allocated for render graph targets
///
/// Unlike textures, images are created from an `ImageDesc` computed by
/// the render graph builder and come with a single full view used as a
/// framebuffer attachment or input attachment.

use std::any::Any;
use std::sync::Arc;
use bitflags::bitflags;
use crate::graphics_device::TextureFormat;

bitflags! {
    /// How an image will be used
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const COLOR_ATTACHMENT = 1 << 0;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 1;
        const INPUT_ATTACHMENT = 1 << 2;
        const SAMPLED = 1 << 3;
        const TRANSFER_SRC = 1 << 4;
        const TRANSFER_DST = 1 << 5;
    }
}

bitflags! {
    /// Aspects of an image covered by its view
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageAspect: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

impl ImageAspect {
    /// Aspect mask matching a format
    pub fn from_format(format: TextureFormat) -> Self {
        if format.has_stencil() {
            ImageAspect::DEPTH | ImageAspect::STENCIL
        } else if format.is_depth() {
            ImageAspect::DEPTH
        } else {
            ImageAspect::COLOR
        }
    }
}

/// Preferred memory location for an allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryLocation {
    /// Device-local memory, not CPU-accessible
    GpuOnly,
    /// Host-visible memory written by the CPU each frame
    CpuToGpu,
}

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Allocation requirements for an attachment image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageDesc {
    pub usage: ImageUsage,
    pub format: TextureFormat,
    pub extent: Extent2D,
    pub array_layers: u32,
    pub samples: u32,
    pub aspect: ImageAspect,
    pub memory: MemoryLocation,
}

/// GPU image with its default view
///
/// Memory is released when the last reference is dropped.
pub trait Image: Send + Sync {
    /// The descriptor the image was created from
    fn desc(&self) -> &ImageDesc;

    /// Full view over the image
    fn view(&self) -> Arc<dyn ImageView>;

    fn as_any(&self) -> &dyn Any;
}

/// View over an image, usable as an attachment or input attachment
pub trait ImageView: Send + Sync {
    /// Identity of the view, stable for its lifetime and unique among live views
    ///
    /// Used as the framebuffer cache key.
    fn id(&self) -> u64;

    fn format(&self) -> TextureFormat;

    fn extent(&self) -> Extent2D;

    fn as_any(&self) -> &dyn Any;
}
