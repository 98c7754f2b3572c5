/// Graphics device module - GPU capability traits consumed by the engine core

pub mod graphics_device;
pub mod texture;
pub mod image;
pub mod buffer;
pub mod pipeline;
pub mod command_list;
pub mod render_pass;
pub mod swapchain;
pub mod binding_group;
pub mod frame_buffer;

pub use graphics_device::*;
pub use texture::*;
pub use image::*;
pub use buffer::*;
pub use pipeline::*;
pub use command_list::*;
pub use render_pass::*;
pub use swapchain::*;
pub use binding_group::*;
pub use frame_buffer::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
