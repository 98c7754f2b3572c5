/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait
///
/// Built on top of a logical device the host application created (the
/// host also owns the instance, surface, and swapchain). The device owns
/// the GPU allocator, the descriptor pools binding groups come from, and
/// the sampler cache.

use aurora_3d_engine::aurora3d::{Result, Error, GraphicsDevice};
use aurora_3d_engine::aurora3d::render::{
    Image as EngineImage, ImageDesc, MemoryLocation,
    RenderPass as EngineRenderPass, RenderPassDesc,
    Framebuffer as EngineFramebuffer, FramebufferDesc,
    Buffer as EngineBuffer, BufferDesc, BufferUsage,
    Texture as EngineTexture, TextureView as EngineTextureView, TextureInfo,
    Pipeline as EnginePipeline,
    BindingGroup as EngineBindingGroup, BindingResource,
};
use aurora_3d_engine::{engine_bail, engine_err, engine_error, engine_info};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::vulkan_binding_group::{VulkanBindingGroup, write_descriptors};
use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_context::{GpuContext, backend};
use crate::vulkan_format::{buffer_usage_to_vk, format_to_vk, image_usage_to_vk, sample_count_to_vk};
use crate::vulkan_frame_buffer::VulkanFramebuffer;
use crate::vulkan_image::{ImageMemory, VulkanImage};
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_render_pass::VulkanRenderPass;
use crate::vulkan_sampler::SamplerCache;
use crate::vulkan_texture::{VulkanTexture, VulkanTextureView};

/// Tuning of the Vulkan device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VulkanDeviceConfig {
    /// Descriptor sets per descriptor pool; a new pool is added when one runs out
    pub descriptor_sets_per_pool: u32,
}

impl Default for VulkanDeviceConfig {
    fn default() -> Self {
        Self {
            descriptor_sets_per_pool: 1024,
        }
    }
}

/// Host Vulkan objects the device is built on
pub struct VulkanHostDevice<'a> {
    pub instance: &'a ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,
    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,
}

/// Vulkan graphics device
pub struct VulkanGraphicsDevice {
    config: VulkanDeviceConfig,
    ctx: Arc<GpuContext>,
    /// Descriptor pools, the last one is allocated from
    descriptor_pools: Mutex<Vec<vk::DescriptorPool>>,
    samplers: Mutex<SamplerCache>,
}

impl VulkanGraphicsDevice {
    pub fn new(host: VulkanHostDevice, config: VulkanDeviceConfig) -> Result<Self> {
        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: host.instance.clone(),
            device: host.device.clone(),
            physical_device: host.physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| {
            engine_error!("aurora3d::vulkan", "Failed to create GPU allocator: {:?}", e);
            Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
        })?;

        // TRANSIENT + RESET for reusable one-shot uploads
        let upload_pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(host.graphics_queue_family)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let upload_command_pool = unsafe {
            host.device.create_command_pool(&upload_pool_info, None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create upload command pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create upload command pool: {:?}", e))
                })?
        };

        let ctx = Arc::new(GpuContext::new(
            host.device,
            allocator,
            host.graphics_queue,
            host.graphics_queue_family,
            upload_command_pool,
        ));

        let descriptor_pool = Self::create_descriptor_pool(&ctx.device, config.descriptor_sets_per_pool)?;

        engine_info!("aurora3d::vulkan", "Vulkan device ready (queue family {}, {} sets per descriptor pool)",
            ctx.graphics_queue_family, config.descriptor_sets_per_pool);

        Ok(Self {
            config,
            samplers: Mutex::new(SamplerCache::new(Arc::clone(&ctx))),
            descriptor_pools: Mutex::new(vec![descriptor_pool]),
            ctx,
        })
    }

    /// Shared context, for building pipelines, command lists, and swapchains
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    pub fn config(&self) -> &VulkanDeviceConfig {
        &self.config
    }

    fn create_descriptor_pool(device: &ash::Device, max_sets: u32) -> Result<vk::DescriptorPool> {
        let pool_sizes = [
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: max_sets * 2,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER,
                descriptor_count: max_sets,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::STORAGE_BUFFER,
                descriptor_count: max_sets,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::INPUT_ATTACHMENT,
                descriptor_count: max_sets,
            },
        ];
        let info = vk::DescriptorPoolCreateInfo::default()
            .pool_sizes(&pool_sizes)
            .max_sets(max_sets);

        unsafe {
            device.create_descriptor_pool(&info, None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create descriptor pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create descriptor pool: {:?}", e))
                })
        }
    }

    fn samplers(&self) -> Result<MutexGuard<'_, SamplerCache>> {
        self.samplers.lock()
            .map_err(|_| engine_err!("aurora3d::vulkan", "Sampler cache lock poisoned"))
    }

    /// Allocate a descriptor set, adding a pool when the current one is exhausted
    fn allocate_descriptor_set(&self, layout: vk::DescriptorSetLayout) -> Result<vk::DescriptorSet> {
        let mut pools = self.descriptor_pools.lock()
            .map_err(|_| engine_err!("aurora3d::vulkan", "Descriptor pool lock poisoned"))?;
        let layouts = [layout];

        let current_pool = match pools.last() {
            Some(&pool) => pool,
            None => engine_bail!("aurora3d::vulkan", "No descriptor pool available"),
        };
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(current_pool)
            .set_layouts(&layouts);

        let sets = unsafe {
            match self.ctx.device.allocate_descriptor_sets(&allocate_info) {
                Ok(sets) => sets,
                Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY) | Err(vk::Result::ERROR_FRAGMENTED_POOL) => {
                    let new_pool = Self::create_descriptor_pool(&self.ctx.device, self.config.descriptor_sets_per_pool)?;
                    pools.push(new_pool);
                    engine_info!("aurora3d::vulkan", "Descriptor pool exhausted, created new pool (total: {})", pools.len());

                    let retry_info = vk::DescriptorSetAllocateInfo::default()
                        .descriptor_pool(new_pool)
                        .set_layouts(&layouts);
                    self.ctx.device.allocate_descriptor_sets(&retry_info)
                        .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to allocate descriptor set after pool growth: {:?}", e))?
                }
                Err(e) => engine_bail!("aurora3d::vulkan", "Failed to allocate descriptor set: {:?}", e),
            }
        };

        sets.first().copied()
            .ok_or_else(|| engine_err!("aurora3d::vulkan", "Descriptor set allocation returned nothing"))
    }

    /// Create a vk::Image and bind freshly allocated memory to it
    fn allocate_image(&self, name: &str, create_info: &vk::ImageCreateInfo) -> Result<ImageMemory> {
        unsafe {
            let image = self.ctx.device.create_image(create_info, None)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to create {} image: {:?}", name, e))?;

            let requirements = self.ctx.device.get_image_memory_requirements(image);
            let allocation = match self.ctx.allocate(name, requirements, gpu_allocator::MemoryLocation::GpuOnly, false) {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.ctx.device.destroy_image(image, None);
                    return Err(e);
                }
            };

            // From here on ImageMemory releases both on failure
            let memory = ImageMemory::new(Arc::clone(&self.ctx), image, allocation);
            let allocation = memory.allocation().ok_or_else(|| engine_err!("aurora3d::vulkan", "Image memory missing"))?;
            self.ctx.device.bind_image_memory(image, allocation.memory(), allocation.offset())
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to bind {} image memory: {:?}", name, e))?;
            Ok(memory)
        }
    }

    /// Create a host-visible buffer with its memory bound
    fn allocate_buffer(&self, name: &str, size: u64, usage: vk::BufferUsageFlags) -> Result<VulkanBuffer> {
        if size == 0 {
            engine_bail!("aurora3d::vulkan", "Cannot create a zero-sized {} buffer", name);
        }

        unsafe {
            let create_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = self.ctx.device.create_buffer(&create_info, None)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to create {} buffer of {} bytes: {:?}", name, size, e))?;

            let requirements = self.ctx.device.get_buffer_memory_requirements(buffer);
            let allocation = match self.ctx.allocate(name, requirements, gpu_allocator::MemoryLocation::CpuToGpu, true) {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.ctx.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            if let Err(e) = self.ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
                self.ctx.free(allocation);
                self.ctx.device.destroy_buffer(buffer, None);
                engine_bail!("aurora3d::vulkan", "Failed to bind {} buffer memory: {:?}", name, e);
            }

            Ok(VulkanBuffer::new(Arc::clone(&self.ctx), buffer, allocation, size))
        }
    }

    /// Create a sampled texture and upload its pixels
    ///
    /// `data` holds every layer back to back, tightly packed. Six layers
    /// with `info.cubemap` set make a cubemap.
    pub fn create_texture(&self, info: TextureInfo, data: &[u8]) -> Result<Arc<dyn EngineTexture>> {
        let array_layers = info.array_layers.max(1);
        if info.cubemap && array_layers != 6 {
            engine_bail!("aurora3d::vulkan", "Cubemap texture needs 6 layers, got {}", array_layers);
        }
        if info.format.is_depth() {
            engine_bail!("aurora3d::vulkan", "Depth format {:?} cannot be uploaded as a texture", info.format);
        }

        let layer_size = info.width as u64 * info.height as u64 * info.format.bytes_per_pixel() as u64;
        let expected = layer_size * array_layers as u64;
        if data.len() as u64 != expected {
            engine_bail!("aurora3d::vulkan", "Texture data is {} bytes, expected {} ({}x{} x {} layers)",
                data.len(), expected, info.width, info.height, array_layers);
        }

        let flags = if info.cubemap {
            vk::ImageCreateFlags::CUBE_COMPATIBLE
        } else {
            vk::ImageCreateFlags::empty()
        };
        let create_info = vk::ImageCreateInfo::default()
            .flags(flags)
            .image_type(vk::ImageType::TYPE_2D)
            .format(format_to_vk(info.format))
            .extent(vk::Extent3D { width: info.width, height: info.height, depth: 1 })
            .mip_levels(1)
            .array_layers(array_layers)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);
        let memory = self.allocate_image("texture", &create_info)?;

        let staging = self.allocate_buffer("texture_staging", expected, vk::BufferUsageFlags::TRANSFER_SRC)?;
        EngineBuffer::update(&staging, 0, data)?;

        let image = memory.image;
        let device = &self.ctx.device;
        let range = vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: array_layers,
        };

        self.ctx.submit_one_shot(|command_buffer| unsafe {
            // UNDEFINED -> TRANSFER_DST_OPTIMAL
            let to_transfer = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::UNDEFINED)
                .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(range)
                .src_access_mask(vk::AccessFlags::empty())
                .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE);
            device.cmd_pipeline_barrier(
                command_buffer,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_transfer],
            );

            let regions: Vec<vk::BufferImageCopy> = (0..array_layers)
                .map(|layer| vk::BufferImageCopy::default()
                    .buffer_offset(layer as u64 * layer_size)
                    .buffer_row_length(0)
                    .buffer_image_height(0)
                    .image_subresource(vk::ImageSubresourceLayers {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        mip_level: 0,
                        base_array_layer: layer,
                        layer_count: 1,
                    })
                    .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
                    .image_extent(vk::Extent3D { width: info.width, height: info.height, depth: 1 }))
                .collect();
            device.cmd_copy_buffer_to_image(
                command_buffer,
                staging.handle(),
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &regions,
            );

            // TRANSFER_DST_OPTIMAL -> SHADER_READ_ONLY_OPTIMAL
            let to_shader = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(range)
                .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .dst_access_mask(vk::AccessFlags::SHADER_READ);
            device.cmd_pipeline_barrier(
                command_buffer,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_shader],
            );
        })?;

        Ok(Arc::new(VulkanTexture::new(memory, TextureInfo { array_layers, ..info })))
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_image(&self, desc: &ImageDesc) -> Result<Arc<dyn EngineImage>> {
        if desc.extent.width == 0 || desc.extent.height == 0 {
            engine_bail!("aurora3d::vulkan", "Cannot create a {}x{} image", desc.extent.width, desc.extent.height);
        }
        if desc.memory != MemoryLocation::GpuOnly {
            engine_bail!("aurora3d::vulkan", "Attachment images must live in GPU-only memory");
        }

        let create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format_to_vk(desc.format))
            .extent(vk::Extent3D { width: desc.extent.width, height: desc.extent.height, depth: 1 })
            .mip_levels(1)
            .array_layers(desc.array_layers.max(1))
            .samples(sample_count_to_vk(desc.samples))
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(image_usage_to_vk(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let memory = self.allocate_image("attachment", &create_info)?;
        Ok(Arc::new(VulkanImage::new(&self.ctx, desc.clone(), memory)?))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn EngineRenderPass>> {
        Ok(Arc::new(VulkanRenderPass::create(&self.ctx, desc)?))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn EngineFramebuffer>> {
        Ok(Arc::new(VulkanFramebuffer::create(&self.ctx, desc)?))
    }

    fn create_buffer(&self, desc: BufferDesc) -> Result<Arc<dyn EngineBuffer>> {
        let name = match desc.usage {
            BufferUsage::Vertex => "vertex",
            BufferUsage::Index => "index",
            BufferUsage::Uniform => "uniform",
            BufferUsage::Storage => "storage",
        };
        Ok(Arc::new(self.allocate_buffer(name, desc.size, buffer_usage_to_vk(desc.usage))?))
    }

    fn create_texture_view(&self, texture: &Arc<dyn EngineTexture>) -> Result<Arc<dyn EngineTextureView>> {
        let vk_texture = backend::<VulkanTexture>(texture.as_any(), "Texture")?;
        Ok(Arc::new(VulkanTextureView::create(&self.ctx, vk_texture)?))
    }

    fn create_binding_group(
        &self,
        pipeline: &Arc<dyn EnginePipeline>,
        set_index: u32,
        resources: &[BindingResource],
    ) -> Result<Arc<dyn EngineBindingGroup>> {
        let vk_pipeline = backend::<VulkanPipeline>(pipeline.as_any(), "Pipeline")?;
        let Some(layout) = vk_pipeline.set_layout(set_index) else {
            engine_bail!("aurora3d::vulkan",
                "create_binding_group: set_index {} out of range (pipeline has {} layouts)",
                set_index, vk_pipeline.binding_group_layout_count());
        };

        let descriptor_set = self.allocate_descriptor_set(layout)?;
        write_descriptors(&self.ctx.device, descriptor_set, resources, &mut *self.samplers()?)?;
        Ok(Arc::new(VulkanBindingGroup::new(descriptor_set, set_index)))
    }

    fn update_binding_group(&self, binding_group: &Arc<dyn EngineBindingGroup>, resources: &[BindingResource]) -> Result<()> {
        let vk_group = backend::<VulkanBindingGroup>(binding_group.as_any(), "Binding group")?;
        write_descriptors(&self.ctx.device, vk_group.descriptor_set, resources, &mut *self.samplers()?)
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx.device
                .device_wait_idle()
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to wait idle: {:?}", e))
        }
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();

            // Samplers first, while the device is alive
            if let Ok(samplers) = self.samplers.get_mut() {
                samplers.shutdown();
            }

            if let Ok(pools) = self.descriptor_pools.get_mut() {
                for pool in pools.drain(..) {
                    self.ctx.device.destroy_descriptor_pool(pool, None);
                }
            }
        }
    }
}
