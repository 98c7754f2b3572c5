/// GraphicsDevice trait - factory for the GPU objects the engine core needs
///
/// Implemented by backend-specific devices (e.g., VulkanGraphicsDevice).
/// Every returned object releases its GPU memory when the last `Arc` is
/// dropped, so "destroying" a handle means dropping it.

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    Image, ImageDesc, RenderPass, RenderPassDesc, Framebuffer, FramebufferDesc,
    Buffer, BufferDesc, Texture, TextureView, Pipeline, BindingGroup, BindingResource,
};

pub trait GraphicsDevice: Send + Sync {
    /// Allocate an image and its default view
    fn create_image(&self, desc: &ImageDesc) -> Result<Arc<dyn Image>>;

    /// Create a render pass with its subpasses and dependencies
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    /// Create a framebuffer over attachment views
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Create a host-visible buffer
    fn create_buffer(&self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a sampled view over a texture
    fn create_texture_view(&self, texture: &Arc<dyn Texture>) -> Result<Arc<dyn TextureView>>;

    /// Allocate a binding group against one set layout of `pipeline`
    ///
    /// `resources` are written to bindings 0..n in order.
    fn create_binding_group(
        &self,
        pipeline: &Arc<dyn Pipeline>,
        set_index: u32,
        resources: &[BindingResource],
    ) -> Result<Arc<dyn BindingGroup>>;

    /// Rewrite the bindings of an existing group
    ///
    /// The caller must guarantee the group is not in use by in-flight frames.
    fn update_binding_group(
        &self,
        binding_group: &Arc<dyn BindingGroup>,
        resources: &[BindingResource],
    ) -> Result<()>;

    /// Wait for all GPU operations to complete
    fn wait_idle(&self) -> Result<()>;
}
