/// Pass action trait and implementations.
///
/// Defines how a render graph pass records its draw commands inside its
/// subpass. Registered with `RenderGraph::set_pass_action()` and run by
/// `RenderGraph::execute()`.

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{CommandList, Pipeline, BindingGroup};

/// Action executed by a render graph pass
pub trait PassAction: Send + Sync {
    /// Record draw commands into the command list
    fn execute(&mut self, cmd: &mut dyn CommandList) -> Result<()>;
}

/// Fullscreen pass action (data-driven, no closure)
///
/// Binds a pipeline and its binding group at set 0, then draws a
/// fullscreen triangle (3 vertices). Fits composition and
/// post-processing passes that read input attachments.
pub struct FullscreenAction {
    pipeline: Arc<dyn Pipeline>,
    binding_group: Arc<dyn BindingGroup>,
}

impl FullscreenAction {
    pub fn new(pipeline: Arc<dyn Pipeline>, binding_group: Arc<dyn BindingGroup>) -> Self {
        Self { pipeline, binding_group }
    }

    /// Swap the binding group (e.g. after the inputs were reallocated)
    pub fn set_binding_group(&mut self, binding_group: Arc<dyn BindingGroup>) {
        self.binding_group = binding_group;
    }
}

impl PassAction for FullscreenAction {
    fn execute(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        cmd.bind_pipeline(&self.pipeline)?;
        cmd.bind_binding_group(&self.pipeline, self.binding_group.set_index(), &self.binding_group)?;
        cmd.draw(3, 0)
    }
}

/// Custom pass action (closure-based)
///
/// Executes a user-provided closure for full control over draw command
/// recording (geometry passes, debug overlays).
pub struct CustomAction {
    callback: Box<dyn FnMut(&mut dyn CommandList) -> Result<()> + Send + Sync>,
}

impl CustomAction {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&mut dyn CommandList) -> Result<()> + Send + Sync + 'static,
    {
        Self { callback: Box::new(callback) }
    }
}

impl PassAction for CustomAction {
    fn execute(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        (self.callback)(cmd)
    }
}
