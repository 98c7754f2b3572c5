/// Compiled form of a `RenderSubgraph`.
///
/// Everything the GPU objects of one subgraph are created from: the
/// render pass descriptor, the dense attachment index of each target, the
/// subpass order, the image requirements of graph-allocated targets, and
/// the clear values in attachment order.

use std::collections::BTreeMap;
use crate::graphics_device::{RenderPassDesc, ImageDesc, ClearValue, Extent2D, TextureFormat};
use crate::render_graph::{TargetRef, PassRef};

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSubgraph {
    pub(crate) render_pass_desc: RenderPassDesc,
    pub(crate) attachment_indices: BTreeMap<TargetRef, u32>,
    /// Attachment index -> target
    pub(crate) attachment_targets: Vec<TargetRef>,
    pub(crate) producers: BTreeMap<TargetRef, PassRef>,
    pub(crate) pass_order: Vec<PassRef>,
    pub(crate) subpass_indices: BTreeMap<PassRef, u32>,
    /// Only targets with `TargetSource::Allocated`
    pub(crate) image_requirements: BTreeMap<TargetRef, ImageDesc>,
    pub(crate) external_targets: Vec<TargetRef>,
    pub(crate) clear_values: Vec<ClearValue>,
    pub(crate) extent: Extent2D,
    /// Swapchain color format the subgraph was compiled against
    pub(crate) color_format: TextureFormat,
    pub(crate) follows_swapchain: bool,
}

impl CompiledSubgraph {
    pub fn render_pass_desc(&self) -> &RenderPassDesc {
        &self.render_pass_desc
    }

    pub fn attachment_index(&self, target: &TargetRef) -> Option<u32> {
        self.attachment_indices.get(target).copied()
    }

    pub fn attachment_count(&self) -> usize {
        self.attachment_targets.len()
    }

    /// Targets in attachment index order
    pub fn attachment_targets(&self) -> &[TargetRef] {
        &self.attachment_targets
    }

    /// Pass producing `target`
    pub fn producer(&self, target: &TargetRef) -> Option<&PassRef> {
        self.producers.get(target)
    }

    /// Passes in subpass order
    pub fn pass_order(&self) -> &[PassRef] {
        &self.pass_order
    }

    pub fn subpass_index(&self, pass: &PassRef) -> Option<u32> {
        self.subpass_indices.get(pass).copied()
    }

    pub fn image_requirements(&self, target: &TargetRef) -> Option<&ImageDesc> {
        self.image_requirements.get(target)
    }

    /// Graph-allocated targets with their requirements
    pub fn allocated_targets(&self) -> impl Iterator<Item = (&TargetRef, &ImageDesc)> {
        self.image_requirements.iter()
    }

    /// Targets bound with `RenderGraph::set_target_image_view`
    pub fn external_targets(&self) -> &[TargetRef] {
        &self.external_targets
    }

    /// Clear values ordered by attachment index
    pub fn clear_values(&self) -> &[ClearValue] {
        &self.clear_values
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    pub fn color_format(&self) -> TextureFormat {
        self.color_format
    }

    /// Whether the attachments follow the swapchain extent
    pub fn follows_swapchain(&self) -> bool {
        self.follows_swapchain
    }

    /// Format of the attachment backing `target`
    pub fn attachment_format(&self, target: &TargetRef) -> Option<TextureFormat> {
        let index = self.attachment_index(target)?;
        self.render_pass_desc.attachments.get(index as usize).map(|a| a.format)
    }

    /// Follow a new swapchain extent without recompiling
    pub(crate) fn set_extent(&mut self, extent: Extent2D) {
        if !self.follows_swapchain {
            return;
        }
        self.extent = extent;
        for desc in self.image_requirements.values_mut() {
            desc.extent = extent;
        }
    }
}
