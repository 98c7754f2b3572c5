/// Framebuffer trait - binds attachment views to a render pass
///
/// Created once per (render pass, target view) pair and reused each frame.
/// Must be recreated only when attachments change (e.g., window resize).

use std::any::Any;
use std::sync::Arc;
use crate::graphics_device::{RenderPass, ImageView};

/// Framebuffer, the attachment set a render pass renders into
pub trait Framebuffer: Send + Sync {
    /// Get the width in pixels
    fn width(&self) -> u32;

    /// Get the height in pixels
    fn height(&self) -> u32;

    fn as_any(&self) -> &dyn Any;
}

/// Descriptor for creating a framebuffer
pub struct FramebufferDesc<'a> {
    /// The render pass this framebuffer is compatible with
    pub render_pass: &'a Arc<dyn RenderPass>,
    /// One view per render pass attachment, in attachment index order
    pub attachments: Vec<Arc<dyn ImageView>>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    pub layers: u32,
}
