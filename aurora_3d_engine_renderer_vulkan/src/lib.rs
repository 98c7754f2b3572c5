/*!
# Aurora 3D Engine - Vulkan Backend

Vulkan implementation of the `aurora_3d_engine` device traits, using Ash
for the Vulkan bindings and gpu-allocator for memory management.

The host application creates the instance, picks the physical device,
creates the logical device, surface, and swapchain, and drives the frame
loop (acquire, submit, present). This crate turns those objects into a
`GraphicsDevice` the render graph and deferred renderer can use:

```no_run
use aurora_3d_engine_renderer_vulkan::{VulkanGraphicsDevice, VulkanHostDevice, VulkanDeviceConfig};
# fn host() -> VulkanHostDevice<'static> { unimplemented!() }

let device = VulkanGraphicsDevice::new(host(), VulkanDeviceConfig::default())?;
# Ok::<(), aurora_3d_engine::aurora3d::Error>(())
```
*/

mod vulkan_context;
mod vulkan_format;
mod vulkan_device;
mod vulkan_image;
mod vulkan_texture;
mod vulkan_buffer;
mod vulkan_render_pass;
mod vulkan_frame_buffer;
mod vulkan_pipeline;
mod vulkan_binding_group;
mod vulkan_sampler;
mod vulkan_command_list;
mod vulkan_swapchain;

pub use vulkan_context::GpuContext;
pub use vulkan_device::{VulkanGraphicsDevice, VulkanHostDevice, VulkanDeviceConfig};
pub use vulkan_image::{VulkanImage, VulkanImageView};
pub use vulkan_texture::{VulkanTexture, VulkanTextureView};
pub use vulkan_buffer::VulkanBuffer;
pub use vulkan_render_pass::VulkanRenderPass;
pub use vulkan_frame_buffer::VulkanFramebuffer;
pub use vulkan_pipeline::VulkanPipeline;
pub use vulkan_binding_group::VulkanBindingGroup;
pub use vulkan_command_list::VulkanCommandList;
pub use vulkan_swapchain::VulkanSwapchain;

/// Pure descriptor conversions, usable by hosts building their own pipelines
pub mod format {
    pub use crate::vulkan_format::*;
}
