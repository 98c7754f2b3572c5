/// CommandList trait - for recording rendering commands
///
/// Command buffers are allocated, begun, submitted, and fenced by the host
/// frame loop. The engine core only records into them.

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    RenderPass, Framebuffer, Pipeline, Buffer,
    BindingGroup, IndexType, ShaderStage,
};

/// Command list for recording rendering commands
pub trait CommandList: Send + Sync {
    /// Begin a render pass, entering its first subpass
    ///
    /// # Arguments
    ///
    /// * `render_pass` - The render pass to begin
    /// * `framebuffer` - Framebuffer holding one view per attachment
    /// * `render_area` - Area of the framebuffer rendered to
    /// * `clear_values` - Clear values, ordered by attachment index
    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        render_area: Rect2D,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    /// Advance to the next subpass of the current render pass
    fn next_subpass(&mut self) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Bind a binding group at a set index of the pipeline layout
    fn bind_binding_group(
        &mut self,
        pipeline: &Arc<dyn Pipeline>,
        set_index: u32,
        binding_group: &Arc<dyn BindingGroup>,
    ) -> Result<()>;

    /// Push constants to the pipeline
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Pipeline whose layout declares the push constant range
    /// * `stages` - Shader stages that will access the push constants
    /// * `offset` - Offset in bytes into push constant range
    /// * `data` - Data to push
    fn push_constants(
        &mut self,
        pipeline: &Arc<dyn Pipeline>,
        stages: &[ShaderStage],
        offset: u32,
        data: &[u8],
    ) -> Result<()>;

    /// Bind a vertex buffer at binding 0
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Bind an index buffer
    fn bind_index_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64, index_type: IndexType) -> Result<()>;

    /// Draw vertices
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Draw indexed vertices
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()>;
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-area viewport with a [0, 1] depth range
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}
