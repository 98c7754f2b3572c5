/// Render pass node in a render graph.
///
/// Declarative description of one subpass. This is a graph node, not
/// to be confused with `graphics_device::RenderPass` which is the
/// compiled GPU object.
///
/// A pass only lists the targets it reads. Its outputs are the targets
/// that name it as their producer (`RenderTarget::input`).

use crate::render_graph::TargetRef;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPass {
    /// Targets read as input attachments, in binding order
    pub inputs: Vec<TargetRef>,
}

impl RenderPass {
    /// Pass with no inputs
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass reading the given targets as input attachments
    pub fn with_inputs<I, T>(inputs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TargetRef>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }
}
