/// Buffer - Vulkan implementation of the Buffer trait
///
/// Buffers live in host-visible memory and are written through their
/// persistent mapping, which is all per-frame uniforms and meshes need.

use aurora_3d_engine::aurora3d::{
    Result,
    Error,
    render::Buffer as EngineBuffer,
};
use aurora_3d_engine::engine_error;
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::any::Any;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan buffer implementation
pub struct VulkanBuffer {
    ctx: Arc<GpuContext>,
    pub(crate) buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: u64,
}

impl VulkanBuffer {
    pub fn new(ctx: Arc<GpuContext>, buffer: vk::Buffer, allocation: Allocation, size: u64) -> Self {
        Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            size,
        }
    }

    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }
}

impl EngineBuffer for VulkanBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > self.size) {
            engine_error!("aurora3d::vulkan", "Buffer update out of bounds: offset {} + {} bytes > size {}",
                offset, data.len(), self.size);
            return Err(Error::InvalidResource(format!(
                "Buffer update of {} bytes at offset {} exceeds size {}", data.len(), offset, self.size
            )));
        }

        let Some(allocation) = &self.allocation else {
            engine_error!("aurora3d::vulkan", "Buffer update failed: no GPU allocation");
            return Err(Error::BackendError("Buffer has no allocation".to_string()));
        };

        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::BackendError("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;

        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr.add(offset as usize), data.len());
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            self.ctx.free(allocation);
        }
        unsafe {
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
