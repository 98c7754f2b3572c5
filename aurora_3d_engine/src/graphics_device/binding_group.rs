/// BindingGroup trait and binding resources
///
/// A BindingGroup is a set of GPU resource bindings (uniform buffers,
/// sampled textures, input attachments) allocated against one set layout
/// of a pipeline. It maps onto a Vulkan descriptor set.
///
/// Groups can be rewritten in place with `GraphicsDevice::update_binding_group`,
/// which is how dirty components refresh their texture bindings without
/// reallocating.

use std::any::Any;
use crate::graphics_device::{Buffer, TextureView, ImageView};

/// A concrete resource to bind, one per binding slot in slot order
pub enum BindingResource<'a> {
    /// Uniform buffer binding
    UniformBuffer(&'a dyn Buffer),
    /// Sampled texture (combined image sampler)
    SampledTexture(&'a dyn TextureView),
    /// Subpass input attachment
    InputAttachment(&'a dyn ImageView),
    /// Depth image sampled as a texture (shadow maps)
    DepthTexture(&'a dyn ImageView),
}

impl BindingResource<'_> {
    /// Short name of the binding kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            BindingResource::UniformBuffer(_) => "uniform_buffer",
            BindingResource::SampledTexture(_) => "sampled_texture",
            BindingResource::InputAttachment(_) => "input_attachment",
            BindingResource::DepthTexture(_) => "depth_texture",
        }
    }
}

/// Allocated set of resource bindings
pub trait BindingGroup: Send + Sync {
    /// Returns the set index this BindingGroup was created for
    fn set_index(&self) -> u32;

    fn as_any(&self) -> &dyn Any;
}
