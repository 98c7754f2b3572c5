/// Image - Vulkan implementation of the Image and ImageView traits
///
/// Attachment images are allocated from `ImageDesc`s the render graph
/// computes. Each image comes with one full view. A view keeps the image
/// memory alive, so a framebuffer cache holding only views never points
/// at destroyed images.

use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::aurora3d::render::{
    Image as EngineImage, ImageView as EngineImageView, ImageDesc, Extent2D, TextureFormat,
};
use aurora_3d_engine::engine_err;
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{format_to_vk, image_aspect_to_vk};

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// A vk::Image together with the memory bound to it
pub(crate) struct ImageMemory {
    ctx: Arc<GpuContext>,
    pub(crate) image: vk::Image,
    allocation: Option<Allocation>,
}

impl ImageMemory {
    pub(crate) fn new(ctx: Arc<GpuContext>, image: vk::Image, allocation: Allocation) -> Self {
        Self { ctx, image, allocation: Some(allocation) }
    }

    pub(crate) fn allocation(&self) -> Option<&Allocation> {
        self.allocation.as_ref()
    }
}

impl Drop for ImageMemory {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            self.ctx.free(allocation);
        }
        unsafe {
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}

/// Parameters of a view over an image
pub(crate) struct ViewParams {
    pub format: TextureFormat,
    pub extent: Extent2D,
    pub aspect: vk::ImageAspectFlags,
    pub view_type: vk::ImageViewType,
    pub array_layers: u32,
}

/// Vulkan image view
///
/// Views over swapchain images have no memory: the presentation engine
/// owns those images.
pub struct VulkanImageView {
    ctx: Arc<GpuContext>,
    pub(crate) view: vk::ImageView,
    id: u64,
    format: TextureFormat,
    extent: Extent2D,
    _memory: Option<Arc<ImageMemory>>,
}

impl VulkanImageView {
    pub(crate) fn create(
        ctx: &Arc<GpuContext>,
        image: vk::Image,
        memory: Option<Arc<ImageMemory>>,
        params: ViewParams,
    ) -> Result<Self> {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(params.view_type)
            .format(format_to_vk(params.format))
            .components(vk::ComponentMapping::default())
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: params.aspect,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: params.array_layers,
            });

        let view = unsafe {
            ctx.device.create_image_view(&create_info, None)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to create image view: {:?}", e))?
        };

        Ok(Self {
            ctx: Arc::clone(ctx),
            view,
            id: NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed),
            format: params.format,
            extent: params.extent,
            _memory: memory,
        })
    }

    pub fn handle(&self) -> vk::ImageView {
        self.view
    }
}

impl EngineImageView for VulkanImageView {
    fn id(&self) -> u64 {
        self.id
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanImageView {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_image_view(self.view, None);
        }
    }
}

/// Vulkan attachment image
pub struct VulkanImage {
    desc: ImageDesc,
    memory: Arc<ImageMemory>,
    view: Arc<VulkanImageView>,
}

impl VulkanImage {
    pub(crate) fn new(ctx: &Arc<GpuContext>, desc: ImageDesc, memory: ImageMemory) -> Result<Self> {
        let memory = Arc::new(memory);
        let view_type = if desc.array_layers > 1 {
            vk::ImageViewType::TYPE_2D_ARRAY
        } else {
            vk::ImageViewType::TYPE_2D
        };
        let view = VulkanImageView::create(ctx, memory.image, Some(Arc::clone(&memory)), ViewParams {
            format: desc.format,
            extent: desc.extent,
            aspect: image_aspect_to_vk(desc.aspect),
            view_type,
            array_layers: desc.array_layers.max(1),
        })?;

        Ok(Self { desc, memory, view: Arc::new(view) })
    }

    pub fn handle(&self) -> vk::Image {
        self.memory.image
    }
}

impl EngineImage for VulkanImage {
    fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    fn view(&self) -> Arc<dyn EngineImageView> {
        Arc::clone(&self.view) as Arc<dyn EngineImageView>
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
