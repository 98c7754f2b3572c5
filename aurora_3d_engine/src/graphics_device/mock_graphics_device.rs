/// Mock graphics device for unit tests (no GPU required)
///
/// Every factory call is recorded by name so tests can assert on what the
/// render graph and frame assembly asked the device to do. Texture views
/// track how many are alive so rebuild paths can be checked for leaks.

use std::any::Any;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::graphics_device::{
    GraphicsDevice, Image, ImageView, ImageDesc, Extent2D, RenderPass, RenderPassDesc,
    Framebuffer, FramebufferDesc, Buffer, BufferDesc, Texture, TextureView, TextureInfo,
    TextureFormat, Pipeline, BindingGroup, BindingResource, CommandList, Swapchain,
    ClearValue, Viewport, Rect2D, IndexType, ShaderStage,
};
use crate::error::Result;
use crate::engine_bail;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

fn next_view_id() -> u64 {
    NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// Mock Image / ImageView
// ============================================================================

#[derive(Debug)]
pub struct MockImageView {
    pub id: u64,
    pub format: TextureFormat,
    pub extent: Extent2D,
}

impl MockImageView {
    pub fn new(format: TextureFormat, extent: Extent2D) -> Self {
        Self { id: next_view_id(), format, extent }
    }
}

impl ImageView for MockImageView {
    fn id(&self) -> u64 { self.id }
    fn format(&self) -> TextureFormat { self.format }
    fn extent(&self) -> Extent2D { self.extent }
    fn as_any(&self) -> &dyn Any { self }
}

pub struct MockImage {
    pub desc: ImageDesc,
    pub view: Arc<MockImageView>,
}

impl Image for MockImage {
    fn desc(&self) -> &ImageDesc { &self.desc }
    fn view(&self) -> Arc<dyn ImageView> { self.view.clone() }
    fn as_any(&self) -> &dyn Any { self }
}

// ============================================================================
// Mock RenderPass / Framebuffer
// ============================================================================

#[derive(Debug)]
pub struct MockRenderPass {
    pub desc: RenderPassDesc,
}

impl RenderPass for MockRenderPass {
    fn subpass_count(&self) -> u32 { self.desc.subpasses.len() as u32 }
    fn as_any(&self) -> &dyn Any { self }
}

#[derive(Debug)]
pub struct MockFramebuffer {
    pub width: u32,
    pub height: u32,
    pub attachment_ids: Vec<u64>,
}

impl Framebuffer for MockFramebuffer {
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }
    fn as_any(&self) -> &dyn Any { self }
}

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub data: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(size: u64) -> Self {
        Self { size, data: Mutex::new(vec![0; size as usize]) }
    }

    /// Copy of the current buffer contents
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 { self.size }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset as usize + data.len();
        if end > self.size as usize {
            engine_bail!("aurora3d::MockBuffer", "write of {} bytes at {} overflows {} byte buffer",
                data.len(), offset, self.size);
        }
        self.data.lock().unwrap()[offset as usize..end].copy_from_slice(data);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any { self }
}

// ============================================================================
// Mock Texture / TextureView
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
}

impl MockTexture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            info: TextureInfo {
                width,
                height,
                format: TextureFormat::R8G8B8A8_SRGB,
                array_layers: 1,
                cubemap: false,
            },
        }
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo { &self.info }
    fn as_any(&self) -> &dyn Any { self }
}

pub struct MockTextureView {
    pub info: TextureInfo,
    live: Arc<AtomicUsize>,
}

impl TextureView for MockTextureView {
    fn info(&self) -> &TextureInfo { &self.info }
    fn as_any(&self) -> &dyn Any { self }
}

impl Drop for MockTextureView {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Pipeline / BindingGroup
// ============================================================================

#[derive(Debug)]
pub struct MockPipeline {
    pub name: String,
    pub layout_count: u32,
}

impl MockPipeline {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), layout_count: 2 }
    }
}

impl Pipeline for MockPipeline {
    fn binding_group_layout_count(&self) -> u32 { self.layout_count }
    fn as_any(&self) -> &dyn Any { self }
}

#[derive(Debug)]
pub struct MockBindingGroup {
    pub set_index: u32,
    /// Binding kinds of the latest write
    pub resource_kinds: Mutex<Vec<&'static str>>,
    pub update_count: AtomicUsize,
}

impl MockBindingGroup {
    pub fn updates(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }
}

impl BindingGroup for MockBindingGroup {
    fn set_index(&self) -> u32 { self.set_index }
    fn as_any(&self) -> &dyn Any { self }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

#[derive(Default)]
pub struct MockGraphicsDevice {
    /// Names of the device methods called, in call order
    pub calls: Mutex<Vec<String>>,
    pub render_pass_descs: Mutex<Vec<RenderPassDesc>>,
    pub image_descs: Mutex<Vec<ImageDesc>>,
    live_texture_views: Arc<AtomicUsize>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    /// Number of recorded calls to `name`
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == name).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Texture views created and not yet dropped
    pub fn live_texture_views(&self) -> usize {
        self.live_texture_views.load(Ordering::SeqCst)
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_image(&self, desc: &ImageDesc) -> Result<Arc<dyn Image>> {
        self.record("create_image");
        self.image_descs.lock().unwrap().push(desc.clone());
        Ok(Arc::new(MockImage {
            desc: desc.clone(),
            view: Arc::new(MockImageView::new(desc.format, desc.extent)),
        }))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        self.record("create_render_pass");
        self.render_pass_descs.lock().unwrap().push(desc.clone());
        Ok(Arc::new(MockRenderPass { desc: desc.clone() }))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        self.record("create_framebuffer");
        Ok(Arc::new(MockFramebuffer {
            width: desc.width,
            height: desc.height,
            attachment_ids: desc.attachments.iter().map(|view| view.id()).collect(),
        }))
    }

    fn create_buffer(&self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        self.record("create_buffer");
        Ok(Arc::new(MockBuffer::new(desc.size)))
    }

    fn create_texture_view(&self, texture: &Arc<dyn Texture>) -> Result<Arc<dyn TextureView>> {
        self.record("create_texture_view");
        self.live_texture_views.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockTextureView {
            info: texture.info().clone(),
            live: Arc::clone(&self.live_texture_views),
        }))
    }

    fn create_binding_group(
        &self,
        _pipeline: &Arc<dyn Pipeline>,
        set_index: u32,
        resources: &[BindingResource],
    ) -> Result<Arc<dyn BindingGroup>> {
        self.record("create_binding_group");
        Ok(Arc::new(MockBindingGroup {
            set_index,
            resource_kinds: Mutex::new(resources.iter().map(|r| r.kind()).collect()),
            update_count: AtomicUsize::new(0),
        }))
    }

    fn update_binding_group(
        &self,
        binding_group: &Arc<dyn BindingGroup>,
        resources: &[BindingResource],
    ) -> Result<()> {
        self.record("update_binding_group");
        let Some(group) = binding_group.as_any().downcast_ref::<MockBindingGroup>() else {
            engine_bail!("aurora3d::MockGraphicsDevice", "binding group is not a MockBindingGroup");
        };
        *group.resource_kinds.lock().unwrap() = resources.iter().map(|r| r.kind()).collect();
        group.update_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.record("wait_idle");
        Ok(())
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[derive(Debug, Default)]
pub struct MockCommandList {
    pub commands: Vec<String>,
}

impl MockCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, name: &str) -> usize {
        self.commands.iter().filter(|c| c.starts_with(name)).count()
    }
}

impl CommandList for MockCommandList {
    fn begin_render_pass(
        &mut self,
        _render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        _render_area: Rect2D,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        self.commands.push(format!(
            "begin_render_pass {}x{} clears={}",
            framebuffer.width(), framebuffer.height(), clear_values.len()
        ));
        Ok(())
    }

    fn next_subpass(&mut self) -> Result<()> {
        self.commands.push("next_subpass".to_string());
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.commands.push("end_render_pass".to_string());
        Ok(())
    }

    fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
        self.commands.push("set_viewport".to_string());
        Ok(())
    }

    fn set_scissor(&mut self, _scissor: Rect2D) -> Result<()> {
        self.commands.push("set_scissor".to_string());
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        let name = pipeline.as_any().downcast_ref::<MockPipeline>()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.commands.push(format!("bind_pipeline {}", name));
        Ok(())
    }

    fn bind_binding_group(
        &mut self,
        _pipeline: &Arc<dyn Pipeline>,
        set_index: u32,
        _binding_group: &Arc<dyn BindingGroup>,
    ) -> Result<()> {
        self.commands.push(format!("bind_binding_group {}", set_index));
        Ok(())
    }

    fn push_constants(
        &mut self,
        _pipeline: &Arc<dyn Pipeline>,
        _stages: &[ShaderStage],
        _offset: u32,
        data: &[u8],
    ) -> Result<()> {
        self.commands.push(format!("push_constants {}", data.len()));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, _buffer: &Arc<dyn Buffer>, _offset: u64) -> Result<()> {
        self.commands.push("bind_vertex_buffer".to_string());
        Ok(())
    }

    fn bind_index_buffer(&mut self, _buffer: &Arc<dyn Buffer>, _offset: u64, _index_type: IndexType) -> Result<()> {
        self.commands.push("bind_index_buffer".to_string());
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, _first_vertex: u32) -> Result<()> {
        self.commands.push(format!("draw {}", vertex_count));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, _first_index: u32, _vertex_offset: i32) -> Result<()> {
        self.commands.push(format!("draw_indexed {}", index_count));
        Ok(())
    }
}

// ============================================================================
// Mock Swapchain
// ============================================================================

pub struct MockSwapchain {
    pub extent: Extent2D,
    pub format: TextureFormat,
    pub views: Vec<Arc<dyn ImageView>>,
}

impl MockSwapchain {
    pub fn new(width: u32, height: u32, format: TextureFormat, image_count: usize) -> Self {
        let extent = Extent2D::new(width, height);
        Self {
            extent,
            format,
            views: Self::make_views(format, extent, image_count),
        }
    }

    fn make_views(format: TextureFormat, extent: Extent2D, count: usize) -> Vec<Arc<dyn ImageView>> {
        (0..count)
            .map(|_| Arc::new(MockImageView::new(format, extent)) as Arc<dyn ImageView>)
            .collect()
    }

    /// Simulate swapchain recreation: new extent/format, fresh views
    pub fn recreate(&mut self, width: u32, height: u32, format: TextureFormat) {
        self.extent = Extent2D::new(width, height);
        self.format = format;
        self.views = Self::make_views(format, self.extent, self.views.len());
    }
}

impl Swapchain for MockSwapchain {
    fn image_count(&self) -> usize { self.views.len() }
    fn extent(&self) -> Extent2D { self.extent }
    fn format(&self) -> TextureFormat { self.format }

    fn image_view(&self, index: u32) -> Option<Arc<dyn ImageView>> {
        self.views.get(index as usize).cloned()
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
