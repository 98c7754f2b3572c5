/// Render graph - compiled subgraphs and their GPU objects.
///
/// Produced by `RenderGraphBuilder::build()`. Lifecycle:
/// - `create_graph()` / `destroy_graph()`: GPU render pass objects
/// - `allocate_images()` / `destroy_images()`: images of graph-allocated targets
/// - `create_framebuffers()` / `destroy_framebuffers()`: framebuffer cache
/// - `resize()`: stop-the-world rebuild of images and framebuffers after a
///   swapchain change; render passes are only recreated if a format changed
///
/// Framebuffers are cached per subgraph, keyed by the identity of the
/// attachment views. A swapchain image or shadow map seen before reuses
/// its framebuffer.

use std::collections::BTreeMap;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, Swapchain, CommandList, RenderPass, Framebuffer, FramebufferDesc,
    Image, ImageView, ClearValue, Extent2D, TextureFormat, Viewport, Rect2D,
};
use crate::render_graph::{
    BuildError, TargetRef, PassRef, SubgraphRef, RenderSubgraph, TargetFormat,
    CompiledSubgraph, PassAction,
};
use crate::render_graph::render_graph_builder::compile_subgraph;
use crate::{engine_bail, engine_err, engine_debug, engine_info};

struct CachedFramebuffer {
    framebuffer: Arc<dyn Framebuffer>,
    /// Keeps the key's view ids from being reused while cached
    _views: Vec<Arc<dyn ImageView>>,
}

#[derive(Default)]
struct SubgraphResources {
    render_pass: Option<Arc<dyn RenderPass>>,
    images: BTreeMap<TargetRef, Arc<dyn Image>>,
    bound_views: BTreeMap<TargetRef, Arc<dyn ImageView>>,
    framebuffers: FxHashMap<Vec<u64>, CachedFramebuffer>,
}

/// Everything needed to record one subgraph, detached from the graph borrow
struct RecordPlan {
    render_pass: Arc<dyn RenderPass>,
    framebuffer: Arc<dyn Framebuffer>,
    extent: Extent2D,
    clear_values: Vec<ClearValue>,
    passes: Vec<PassRef>,
}

pub struct RenderGraph {
    declarations: BTreeMap<SubgraphRef, RenderSubgraph>,
    depth_format: TextureFormat,
    compiled: BTreeMap<SubgraphRef, CompiledSubgraph>,
    order: Vec<SubgraphRef>,
    resources: BTreeMap<SubgraphRef, SubgraphResources>,
    actions: FxHashMap<SubgraphRef, FxHashMap<PassRef, Box<dyn PassAction>>>,
    device: Option<Arc<dyn GraphicsDevice>>,
}

impl RenderGraph {
    /// Internal only - created via RenderGraphBuilder::build()
    pub(crate) fn new(
        declarations: BTreeMap<SubgraphRef, RenderSubgraph>,
        depth_format: TextureFormat,
        compiled: BTreeMap<SubgraphRef, CompiledSubgraph>,
        order: Vec<SubgraphRef>,
    ) -> Self {
        let resources = compiled.keys()
            .map(|subgraph| (subgraph.clone(), SubgraphResources::default()))
            .collect();
        Self {
            declarations,
            depth_format,
            compiled,
            order,
            resources,
            actions: FxHashMap::default(),
            device: None,
        }
    }

    fn device(&self) -> Result<Arc<dyn GraphicsDevice>> {
        self.device.clone()
            .ok_or_else(|| engine_err!("aurora3d::RenderGraph", "Render graph has no device. Call create_graph() first."))
    }

    // ===== RENDER PASS OBJECTS =====

    /// Create the GPU render pass of every subgraph
    pub fn create_graph(&mut self, device: Arc<dyn GraphicsDevice>) -> Result<()> {
        for subgraph_ref in &self.order {
            let Some(compiled) = self.compiled.get(subgraph_ref) else { continue };
            let resources = self.resources.entry(subgraph_ref.clone()).or_default();
            if resources.render_pass.is_none() {
                resources.render_pass = Some(device.create_render_pass(&compiled.render_pass_desc)?);
                engine_debug!("aurora3d::RenderGraph", "Created render pass for '{}' ({} subpasses, {} attachments)",
                    subgraph_ref, compiled.pass_order.len(), compiled.attachment_count());
            }
        }
        self.device = Some(device);
        Ok(())
    }

    /// Release every GPU object held by the graph
    pub fn destroy_graph(&mut self) {
        self.destroy_framebuffers();
        self.destroy_images();
        for resources in self.resources.values_mut() {
            resources.bound_views.clear();
            resources.render_pass = None;
        }
        self.device = None;
    }

    pub fn is_created(&self) -> bool {
        self.device.is_some()
    }

    // ===== IMAGES =====

    /// Allocate the images of every graph-allocated target that has none
    pub fn allocate_images(&mut self) -> Result<()> {
        let device = self.device()?;
        let mut allocated = 0usize;
        for (subgraph_ref, compiled) in &self.compiled {
            let resources = self.resources.entry(subgraph_ref.clone()).or_default();
            for (target_ref, desc) in compiled.allocated_targets() {
                if resources.images.contains_key(target_ref) {
                    continue;
                }
                let image = device.create_image(desc)?;
                resources.images.insert(target_ref.clone(), image);
                allocated += 1;
            }
        }
        engine_debug!("aurora3d::RenderGraph", "Allocated {} attachment images", allocated);
        Ok(())
    }

    /// Drop every graph-allocated image (and the framebuffers using them)
    pub fn destroy_images(&mut self) {
        self.destroy_framebuffers();
        for resources in self.resources.values_mut() {
            resources.images.clear();
        }
    }

    // ===== FRAMEBUFFERS =====

    /// Pre-create framebuffers for every swapchain image
    ///
    /// Subgraphs with external targets that are neither bound nor
    /// swapchain-compatible are skipped; their framebuffers are created on
    /// first use.
    pub fn create_framebuffers(&mut self, swapchain: &dyn Swapchain) -> Result<()> {
        for subgraph_ref in self.order.clone() {
            for image_idx in 0..swapchain.image_count() as u32 {
                if let Ok(views) = self.collect_views(&subgraph_ref, Some(swapchain), image_idx) {
                    self.framebuffer(&subgraph_ref, views)?;
                }
            }
        }
        Ok(())
    }

    /// Drop every cached framebuffer
    pub fn destroy_framebuffers(&mut self) {
        for resources in self.resources.values_mut() {
            resources.framebuffers.clear();
        }
    }

    pub fn framebuffer_count(&self, subgraph: &SubgraphRef) -> usize {
        self.resources.get(subgraph).map(|r| r.framebuffers.len()).unwrap_or(0)
    }

    /// Bind the image view used for an external target
    ///
    /// If every attachment of the subgraph can now be resolved, the matching
    /// framebuffer is created (first use) or found in the cache.
    pub fn set_target_image_view(
        &mut self,
        subgraph: &SubgraphRef,
        target: &TargetRef,
        view: Arc<dyn ImageView>,
    ) -> Result<()> {
        let Some(compiled) = self.compiled.get(subgraph) else {
            engine_bail!("aurora3d::RenderGraph", "Unknown subgraph '{}'", subgraph);
        };
        if !compiled.external_targets.contains(target) {
            engine_bail!("aurora3d::RenderGraph",
                "Target '{}' of subgraph '{}' is not an external target", target, subgraph);
        }

        self.resources.entry(subgraph.clone()).or_default()
            .bound_views.insert(target.clone(), view);

        if self.device.is_some() {
            if let Ok(views) = self.collect_views(subgraph, None, 0) {
                self.framebuffer(subgraph, views)?;
            }
        }
        Ok(())
    }

    /// Currently bound view of an external target
    pub fn target_image_view(&self, subgraph: &SubgraphRef, target: &TargetRef) -> Option<&Arc<dyn ImageView>> {
        self.resources.get(subgraph)?.bound_views.get(target)
    }

    /// Attachment views in attachment order, or the first target with none
    fn collect_views(
        &self,
        subgraph: &SubgraphRef,
        swapchain: Option<&dyn Swapchain>,
        image_idx: u32,
    ) -> std::result::Result<Vec<Arc<dyn ImageView>>, TargetRef> {
        let empty = SubgraphResources::default();
        let resources = self.resources.get(subgraph).unwrap_or(&empty);
        let (Some(compiled), Some(declaration)) = (self.compiled.get(subgraph), self.declarations.get(subgraph)) else {
            return Ok(Vec::new());
        };

        let mut views = Vec::with_capacity(compiled.attachment_count());
        for target_ref in compiled.attachment_targets() {
            if let Some(image) = resources.images.get(target_ref) {
                views.push(image.view());
            } else if let Some(view) = resources.bound_views.get(target_ref) {
                views.push(Arc::clone(view));
            } else {
                let swapchain_compatible = compiled.external_targets.contains(target_ref)
                    && declaration.targets.get(target_ref).map(|t| t.format) == Some(TargetFormat::DefaultColor);
                match swapchain.filter(|_| swapchain_compatible).and_then(|s| s.image_view(image_idx)) {
                    Some(view) => views.push(view),
                    None => return Err(target_ref.clone()),
                }
            }
        }
        Ok(views)
    }

    /// Cached framebuffer for these views, created on first use
    fn framebuffer(&mut self, subgraph: &SubgraphRef, views: Vec<Arc<dyn ImageView>>) -> Result<Arc<dyn Framebuffer>> {
        let device = self.device()?;
        let Some(compiled) = self.compiled.get(subgraph) else {
            engine_bail!("aurora3d::RenderGraph", "Unknown subgraph '{}'", subgraph);
        };
        let extent = compiled.extent;
        let resources = self.resources.entry(subgraph.clone()).or_default();

        let key: Vec<u64> = views.iter().map(|view| view.id()).collect();
        if let Some(cached) = resources.framebuffers.get(&key) {
            return Ok(Arc::clone(&cached.framebuffer));
        }

        let Some(render_pass) = resources.render_pass.clone() else {
            engine_bail!("aurora3d::RenderGraph", "Subgraph '{}' has no render pass. Call create_graph() first.", subgraph);
        };

        let framebuffer = device.create_framebuffer(&FramebufferDesc {
            render_pass: &render_pass,
            attachments: views.clone(),
            width: extent.width,
            height: extent.height,
            layers: 1,
        })?;
        engine_debug!("aurora3d::RenderGraph", "Created framebuffer {}x{} for '{}' (cache size {})",
            extent.width, extent.height, subgraph, resources.framebuffers.len() + 1);

        resources.framebuffers.insert(key, CachedFramebuffer {
            framebuffer: Arc::clone(&framebuffer),
            _views: views,
        });
        Ok(framebuffer)
    }

    // ===== EXECUTION =====

    /// Register the action recording `pass` of `subgraph`
    pub fn set_pass_action(
        &mut self,
        subgraph: &SubgraphRef,
        pass: &PassRef,
        action: Box<dyn PassAction>,
    ) -> Result<()> {
        let known = self.compiled.get(subgraph).is_some_and(|c| c.subpass_indices.contains_key(pass));
        if !known {
            engine_bail!("aurora3d::RenderGraph", "Unknown pass '{}' in subgraph '{}'", pass, subgraph);
        }
        self.actions.entry(subgraph.clone()).or_default().insert(pass.clone(), action);
        Ok(())
    }

    /// Record every subgraph, in subgraph order, with the registered actions
    ///
    /// Passes without an action record an empty subpass.
    pub fn execute(&mut self, swapchain: &dyn Swapchain, image_idx: u32, cmd: &mut dyn CommandList) -> Result<()> {
        for subgraph in self.order.clone() {
            let plan = self.prepare(&subgraph, swapchain, image_idx)?;
            let mut actions = self.actions.get_mut(&subgraph);
            Self::record(&plan, cmd, &mut |pass, cmd| {
                match actions.as_mut().and_then(|a| a.get_mut(pass)) {
                    Some(action) => action.execute(cmd),
                    None => Ok(()),
                }
            })?;
        }
        Ok(())
    }

    /// Record a single subgraph with a caller-provided recorder per pass
    ///
    /// Used to run the same subgraph several times per frame with different
    /// bound targets (one shadow map per light slot).
    pub fn execute_subgraph_with(
        &mut self,
        subgraph: &SubgraphRef,
        swapchain: &dyn Swapchain,
        image_idx: u32,
        cmd: &mut dyn CommandList,
        recorder: &mut dyn FnMut(&PassRef, &mut dyn CommandList) -> Result<()>,
    ) -> Result<()> {
        let plan = self.prepare(subgraph, swapchain, image_idx)?;
        Self::record(&plan, cmd, recorder)
    }

    fn prepare(&mut self, subgraph: &SubgraphRef, swapchain: &dyn Swapchain, image_idx: u32) -> Result<RecordPlan> {
        let views = self.collect_views(subgraph, Some(swapchain), image_idx)
            .map_err(|target| engine_err!("aurora3d::RenderGraph",
                "No image view for target '{}' of subgraph '{}'", target, subgraph))?;
        let framebuffer = self.framebuffer(subgraph, views)?;

        let (Some(compiled), Some(resources)) = (self.compiled.get(subgraph), self.resources.get(subgraph)) else {
            engine_bail!("aurora3d::RenderGraph", "Unknown subgraph '{}'", subgraph);
        };
        let Some(render_pass) = resources.render_pass.clone() else {
            engine_bail!("aurora3d::RenderGraph", "Subgraph '{}' has no render pass", subgraph);
        };

        Ok(RecordPlan {
            render_pass,
            framebuffer,
            extent: compiled.extent,
            clear_values: compiled.clear_values.clone(),
            passes: compiled.pass_order.clone(),
        })
    }

    fn record(
        plan: &RecordPlan,
        cmd: &mut dyn CommandList,
        recorder: &mut dyn FnMut(&PassRef, &mut dyn CommandList) -> Result<()>,
    ) -> Result<()> {
        let Extent2D { width, height } = plan.extent;
        cmd.begin_render_pass(
            &plan.render_pass,
            &plan.framebuffer,
            Rect2D::from_size(width, height),
            &plan.clear_values,
        )?;
        for (index, pass) in plan.passes.iter().enumerate() {
            if index > 0 {
                cmd.next_subpass()?;
            }
            cmd.set_viewport(Viewport::full(width, height))?;
            cmd.set_scissor(Rect2D::from_size(width, height))?;
            recorder(pass, cmd)?;
        }
        cmd.end_render_pass()
    }

    // ===== RESIZE =====

    /// Rebuild size-dependent GPU state after a swapchain change
    ///
    /// Waits for the device to go idle, drops framebuffers, images, and
    /// bound external views, then reallocates images at the new extent.
    /// Subgraphs are recompiled, and their render passes recreated, only
    /// when the swapchain color format changed.
    pub fn resize(&mut self, swapchain: &dyn Swapchain) -> Result<()> {
        let device = self.device()?;
        device.wait_idle()?;

        self.destroy_images();
        for resources in self.resources.values_mut() {
            resources.bound_views.clear();
        }

        let extent = swapchain.extent();
        let format = swapchain.format();
        for (subgraph_ref, compiled) in self.compiled.iter_mut() {
            if compiled.color_format == format {
                compiled.set_extent(extent);
                continue;
            }

            let Some(declaration) = self.declarations.get(subgraph_ref) else { continue };
            let recompiled = compile_subgraph(declaration, format, self.depth_format, extent)
                .map_err(|source| Error::Build(BuildError::Subgraph {
                    subgraph: subgraph_ref.clone(),
                    source: Box::new(source),
                }))?;

            if recompiled.render_pass_desc != compiled.render_pass_desc {
                let render_pass = device.create_render_pass(&recompiled.render_pass_desc)?;
                self.resources.entry(subgraph_ref.clone()).or_default().render_pass = Some(render_pass);
                engine_info!("aurora3d::RenderGraph", "Swapchain format changed to {:?}, recreated render pass for '{}'",
                    format, subgraph_ref);
            }
            *compiled = recompiled;
        }

        self.allocate_images()?;
        engine_info!("aurora3d::RenderGraph", "Resized to {}x{}", extent.width, extent.height);
        Ok(())
    }

    // ===== INTROSPECTION =====

    /// Subgraphs in execution order
    pub fn subgraph_order(&self) -> &[SubgraphRef] {
        &self.order
    }

    pub fn subgraph(&self, subgraph: &SubgraphRef) -> Option<&CompiledSubgraph> {
        self.compiled.get(subgraph)
    }

    pub fn render_pass(&self, subgraph: &SubgraphRef) -> Option<&Arc<dyn RenderPass>> {
        self.resources.get(subgraph)?.render_pass.as_ref()
    }

    /// Image allocated for a graph-allocated target
    pub fn image(&self, subgraph: &SubgraphRef, target: &TargetRef) -> Option<&Arc<dyn Image>> {
        self.resources.get(subgraph)?.images.get(target)
    }
}

#[cfg(test)]
#[path = "render_graph_tests.rs"]
mod tests;
