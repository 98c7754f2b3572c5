/// Deferred renderer - shadow maps, G-buffer fill, and composition
/// recorded through the render graph

mod renderer_config;
mod deferred_graph;
mod deferred_renderer;

pub use renderer_config::{RendererConfig, RendererStats};
pub use deferred_graph::{
    deferred_render_graph, shadow_subgraph, scene_subgraph,
    SHADOW_SUBGRAPH, SCENE_SUBGRAPH, SHADOW_PASS, GBUFFER_PASS, COMPOSITION_PASS,
    SHADOW_MAP_TARGET, ALBEDO_TARGET, NORMAL_TARGET, POSITION_TARGET, DEPTH_TARGET,
    SWAPCHAIN_TARGET, GBUFFER_INPUTS,
};
pub use deferred_renderer::{DeferredRenderer, DeferredPipelines, ShadowPushConstants, SCENE_SET};
