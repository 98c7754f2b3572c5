/// Render subgraph - one GPU render pass with several subpasses.
///
/// All passes of a subgraph share one attachment set (one framebuffer
/// layout). Ordering between subgraphs is declared with `dependencies`,
/// never through pass inputs.
///
/// Targets and passes live in ordered maps: attachment indices and the
/// tie-breaking order of independent passes follow name order.

use std::collections::BTreeMap;
use crate::graphics_device::Extent2D;
use crate::render_graph::{TargetRef, PassRef, SubgraphRef, RenderTarget, RenderPass};

/// Size of the attachments of a subgraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubgraphExtent {
    /// Follows the swapchain, reallocated on resize
    #[default]
    Swapchain,
    /// Fixed size (e.g. shadow maps)
    Fixed(Extent2D),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSubgraph {
    pub targets: BTreeMap<TargetRef, RenderTarget>,
    pub passes: BTreeMap<PassRef, RenderPass>,
    /// Subgraphs that must execute before this one
    pub dependencies: Vec<SubgraphRef>,
    pub extent: SubgraphExtent,
}

impl RenderSubgraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target_ref: impl Into<TargetRef>, target: RenderTarget) -> Self {
        self.targets.insert(target_ref.into(), target);
        self
    }

    pub fn with_pass(mut self, pass_ref: impl Into<PassRef>, pass: RenderPass) -> Self {
        self.passes.insert(pass_ref.into(), pass);
        self
    }

    pub fn with_dependency(mut self, subgraph: impl Into<SubgraphRef>) -> Self {
        self.dependencies.push(subgraph.into());
        self
    }

    pub fn with_extent(mut self, extent: SubgraphExtent) -> Self {
        self.extent = extent;
        self
    }

    /// Targets produced by `pass`, in target order
    pub fn outputs_of<'a>(&'a self, pass: &'a PassRef) -> impl Iterator<Item = (&'a TargetRef, &'a RenderTarget)> + 'a {
        self.targets.iter().filter(move |(_, target)| target.producer() == pass)
    }
}
