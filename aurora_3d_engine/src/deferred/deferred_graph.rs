/// Render graph declaration of the deferred pipeline.
///
/// ```text
/// shadow:  [shadow] ──> shadow_map (external, one renderer-owned image per slot)
///
/// scene:   [gbuffer] ──> albedo, normal, position, depth
///              │ input attachments
///              v
///          [composition] ──> swapchain (external)
/// ```
///
/// `scene` depends on `shadow`, so the shadow maps are written before
/// the composition pass samples them.

use crate::error::Result;
use crate::graphics_device::{Extent2D, LoadOp, StoreOp, ImageLayout, ClearValue};
use crate::render_graph::{
    RenderGraphBuilder, RenderSubgraph, RenderTarget, RenderPass, TargetType, TargetSource,
    TargetFormat, SubgraphExtent,
};
use crate::deferred::RendererConfig;

pub const SHADOW_SUBGRAPH: &str = "shadow";
pub const SCENE_SUBGRAPH: &str = "scene";

pub const SHADOW_PASS: &str = "shadow";
pub const GBUFFER_PASS: &str = "gbuffer";
pub const COMPOSITION_PASS: &str = "composition";

pub const SHADOW_MAP_TARGET: &str = "shadow_map";
pub const ALBEDO_TARGET: &str = "albedo";
pub const NORMAL_TARGET: &str = "normal";
pub const POSITION_TARGET: &str = "position";
pub const DEPTH_TARGET: &str = "depth";
pub const SWAPCHAIN_TARGET: &str = "swapchain";

/// G-buffer targets read by the composition pass, in binding order
pub const GBUFFER_INPUTS: [&str; 3] = [ALBEDO_TARGET, NORMAL_TARGET, POSITION_TARGET];

/// Shadow subgraph: one depth-only pass into an externally bound map
pub fn shadow_subgraph(config: &RendererConfig) -> RenderSubgraph {
    let shadow_map = RenderTarget::depth(SHADOW_PASS)
        .with_source(TargetSource::External)
        .with_ops(LoadOp::Clear, StoreOp::Store)
        .with_layouts(ImageLayout::Undefined, ImageLayout::DepthStencilReadOnly);

    RenderSubgraph::new()
        .with_target(SHADOW_MAP_TARGET, shadow_map)
        .with_pass(SHADOW_PASS, RenderPass::new())
        .with_extent(SubgraphExtent::Fixed(Extent2D::new(config.shadow_map_size, config.shadow_map_size)))
}

/// Scene subgraph: G-buffer fill then fullscreen composition to the swapchain
pub fn scene_subgraph(config: &RendererConfig) -> RenderSubgraph {
    let gbuffer = |format| {
        RenderTarget::color(GBUFFER_PASS)
            .with_type(TargetType::INPUT)
            .with_format(TargetFormat::Explicit(format))
            .with_ops(LoadOp::Clear, StoreOp::DontCare)
            .with_clear_value(ClearValue::Color([0.0; 4]))
    };

    let swapchain = RenderTarget::color(COMPOSITION_PASS)
        .with_source(TargetSource::External)
        .with_layouts(ImageLayout::Undefined, ImageLayout::PresentSrc)
        .with_clear_value(ClearValue::Color(config.clear_color));

    RenderSubgraph::new()
        .with_target(ALBEDO_TARGET, gbuffer(config.gbuffer_albedo_format))
        .with_target(NORMAL_TARGET, gbuffer(config.gbuffer_normal_format))
        .with_target(POSITION_TARGET, gbuffer(config.gbuffer_position_format))
        .with_target(DEPTH_TARGET, RenderTarget::depth(GBUFFER_PASS))
        .with_target(SWAPCHAIN_TARGET, swapchain)
        .with_pass(GBUFFER_PASS, RenderPass::new())
        .with_pass(COMPOSITION_PASS, RenderPass::with_inputs(GBUFFER_INPUTS))
        .with_dependency(SHADOW_SUBGRAPH)
}

/// Builder holding both subgraphs of the deferred pipeline
pub fn deferred_render_graph(config: &RendererConfig) -> Result<RenderGraphBuilder> {
    let mut builder = RenderGraphBuilder::new().with_depth_format(config.depth_format);
    builder.add_subgraph(SHADOW_SUBGRAPH, shadow_subgraph(config))?;
    builder.add_subgraph(SCENE_SUBGRAPH, scene_subgraph(config))?;
    Ok(builder)
}

#[cfg(test)]
#[path = "deferred_graph_tests.rs"]
mod tests;
