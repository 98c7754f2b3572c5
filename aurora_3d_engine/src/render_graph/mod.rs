//! Render graph module
//!
//! A frame is described as named subgraphs. Each subgraph becomes one GPU
//! render pass: its targets are the attachments, its passes the subpasses.
//! Subgraphs declare dependencies on each other and execute in dependency
//! order.
//!
//! `RenderGraphBuilder` validates and compiles the declarations,
//! `RenderGraph` owns the resulting GPU objects and records frames.

mod refs;
mod build_error;
mod render_target;
mod render_pass;
mod render_subgraph;
mod compiled_subgraph;
mod render_graph_builder;
mod render_graph;
mod pass_action;

pub use refs::{TargetRef, PassRef, SubgraphRef};
pub use build_error::BuildError;
pub use render_target::{RenderTarget, TargetType, TargetSource, TargetFormat, TargetInput};
pub use render_pass::RenderPass;
pub use render_subgraph::{RenderSubgraph, SubgraphExtent};
pub use compiled_subgraph::CompiledSubgraph;
pub use render_graph_builder::{RenderGraphBuilder, image_requirements};
pub use render_graph::RenderGraph;
pub use pass_action::{PassAction, FullscreenAction, CustomAction};
