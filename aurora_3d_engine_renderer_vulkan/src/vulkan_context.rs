/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Contains everything a resource needs to allocate or release itself:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue and transient command pool for one-shot uploads
///
/// The instance and logical device are owned by the host application and
/// must outlive every object created through the backend.

use aurora_3d_engine::aurora3d::{Result, Error};
use aurora_3d_engine::{engine_err, engine_error};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::any::Any;
use std::sync::{Mutex, MutexGuard};

/// Shared GPU context
///
/// Held through an `Arc` by every resource, so the allocator is only
/// dropped once the last image or buffer has returned its memory.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    allocator: Mutex<Allocator>,

    /// Graphics queue used for upload submissions
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Command pool for one-shot upload operations
    upload_command_pool: Mutex<vk::CommandPool>,
}

impl GpuContext {
    pub fn new(
        device: ash::Device,
        allocator: Allocator,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        upload_command_pool: vk::CommandPool,
    ) -> Self {
        Self {
            device,
            allocator: Mutex::new(allocator),
            graphics_queue,
            graphics_queue_family,
            upload_command_pool: Mutex::new(upload_command_pool),
        }
    }

    fn allocator(&self) -> Result<MutexGuard<'_, Allocator>> {
        self.allocator.lock()
            .map_err(|_| engine_err!("aurora3d::vulkan", "GPU allocator lock poisoned"))
    }

    /// Allocate memory matching `requirements`
    pub fn allocate(
        &self,
        name: &str,
        requirements: vk::MemoryRequirements,
        location: MemoryLocation,
        linear: bool,
    ) -> Result<Allocation> {
        self.allocator()?
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|e| {
                let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                engine_error!("aurora3d::vulkan", "Out of GPU memory for {} ({:.2} MB): {:?}", name, size_mb, e);
                Error::OutOfMemory
            })
    }

    /// Return an allocation to the allocator
    ///
    /// Used from `Drop` impls, so failures are ignored.
    pub fn free(&self, allocation: Allocation) {
        if let Ok(mut allocator) = self.allocator.lock() {
            allocator.free(allocation).ok();
        }
    }

    /// Record commands into a one-shot command buffer and wait for them
    pub fn submit_one_shot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(vk::CommandBuffer),
    {
        let pool = self.upload_command_pool.lock()
            .map_err(|_| engine_err!("aurora3d::vulkan", "Upload command pool lock poisoned"))?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = self.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to allocate upload command buffer: {:?}", e))?[0];

            let result = self.run_one_shot(command_buffer, record);
            self.device.free_command_buffers(*pool, &[command_buffer]);
            result
        }
    }

    unsafe fn run_one_shot<F>(&self, command_buffer: vk::CommandBuffer, record: F) -> Result<()>
    where
        F: FnOnce(vk::CommandBuffer),
    {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        self.device.begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to begin upload command buffer: {:?}", e))?;

        record(command_buffer);

        self.device.end_command_buffer(command_buffer)
            .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to end upload command buffer: {:?}", e))?;

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        self.device.queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
            .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to submit upload: {:?}", e))?;
        self.device.queue_wait_idle(self.graphics_queue)
            .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to wait for upload: {:?}", e))
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        if let Ok(pool) = self.upload_command_pool.get_mut() {
            if *pool != vk::CommandPool::null() {
                unsafe { self.device.destroy_command_pool(*pool, None); }
                *pool = vk::CommandPool::null();
            }
        }
    }
}

/// Downcast an engine trait object to its Vulkan implementation
pub(crate) fn backend<'a, T: 'static>(object: &'a dyn Any, what: &str) -> Result<&'a T> {
    object.downcast_ref::<T>()
        .ok_or_else(|| Error::InvalidResource(format!("{} was not created by the Vulkan backend", what)))
}
