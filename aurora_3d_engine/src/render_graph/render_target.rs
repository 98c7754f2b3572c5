/// Render target in a render graph.
///
/// Declarative description of one attachment of a subgraph: who writes
/// it, how it is used, where its image comes from, and how it is loaded,
/// stored, and cleared.
///
/// Every target has exactly one producing pass (`input.pass_ref`). A
/// target may be used several ways at once (e.g. a G-buffer color that is
/// also read as an input attachment by a later pass).

use bitflags::bitflags;
use crate::graphics_device::{TextureFormat, LoadOp, StoreOp, ImageLayout, ClearValue};
use crate::render_graph::PassRef;

bitflags! {
    /// How a target is used by the passes of its subgraph
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TargetType: u32 {
        /// Read as an input attachment by another pass
        const INPUT = 1 << 0;
        /// Written as a color attachment by its producer
        const COLOR = 1 << 1;
        /// Written as the depth-stencil attachment of its producer
        const DEPTH_STENCIL = 1 << 2;
    }
}

/// Where the target's image comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSource {
    /// Allocated by the render graph from the compiled image requirements
    Allocated,
    /// Supplied at record time through `RenderGraph::set_target_image_view`
    /// (swapchain images, shadow maps owned by the renderer)
    External,
}

/// Symbolic or concrete target format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    /// Live swapchain color format
    DefaultColor,
    /// Engine depth format
    DefaultDepth,
    Explicit(TextureFormat),
}

/// Producer of a target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetInput {
    pub pass_ref: PassRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub input: TargetInput,
    pub target_type: TargetType,
    pub source: TargetSource,
    pub format: TargetFormat,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
    pub clear_value: ClearValue,
    /// Samples per pixel (1 = no MSAA)
    pub samples: u32,
    pub array_layers: u32,
}

impl RenderTarget {
    /// Color target written by `pass`, cleared to opaque black and stored
    pub fn color(pass: impl Into<PassRef>) -> Self {
        Self {
            input: TargetInput { pass_ref: pass.into() },
            target_type: TargetType::COLOR,
            source: TargetSource::Allocated,
            format: TargetFormat::DefaultColor,
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            stencil_load_op: LoadOp::DontCare,
            stencil_store_op: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::ColorAttachment,
            clear_value: ClearValue::Color([0.0, 0.0, 0.0, 1.0]),
            samples: 1,
            array_layers: 1,
        }
    }

    /// Depth target written by `pass`, cleared to 1.0
    pub fn depth(pass: impl Into<PassRef>) -> Self {
        Self {
            input: TargetInput { pass_ref: pass.into() },
            target_type: TargetType::DEPTH_STENCIL,
            source: TargetSource::Allocated,
            format: TargetFormat::DefaultDepth,
            load_op: LoadOp::Clear,
            store_op: StoreOp::DontCare,
            stencil_load_op: LoadOp::DontCare,
            stencil_store_op: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::DepthStencilAttachment,
            clear_value: ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
            samples: 1,
            array_layers: 1,
        }
    }

    /// Add usage flags (e.g. `TargetType::INPUT` for G-buffer targets)
    pub fn with_type(mut self, target_type: TargetType) -> Self {
        self.target_type |= target_type;
        self
    }

    pub fn with_source(mut self, source: TargetSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_format(mut self, format: TargetFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_ops(mut self, load_op: LoadOp, store_op: StoreOp) -> Self {
        self.load_op = load_op;
        self.store_op = store_op;
        self
    }

    pub fn with_stencil_ops(mut self, load_op: LoadOp, store_op: StoreOp) -> Self {
        self.stencil_load_op = load_op;
        self.stencil_store_op = store_op;
        self
    }

    pub fn with_layouts(mut self, initial: ImageLayout, final_layout: ImageLayout) -> Self {
        self.initial_layout = initial;
        self.final_layout = final_layout;
        self
    }

    pub fn with_clear_value(mut self, clear_value: ClearValue) -> Self {
        self.clear_value = clear_value;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_array_layers(mut self, array_layers: u32) -> Self {
        self.array_layers = array_layers;
        self
    }

    /// Pass that writes this target
    pub fn producer(&self) -> &PassRef {
        &self.input.pass_ref
    }
}
