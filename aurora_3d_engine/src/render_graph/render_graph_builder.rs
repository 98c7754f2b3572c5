/// Render graph builder - validates and compiles declarative subgraphs.
///
/// Per subgraph, compilation:
/// 1. resolves target formats and assigns dense attachment indices in
///    target order, recording the producer of each target
/// 2. builds input/color/depth attachment references per pass
/// 3. orders passes topologically (a pass comes after the producers of
///    its inputs)
/// 4. assigns subpass indices and the barriers between subpasses
/// 5. computes image requirements of graph-allocated targets
/// 6. collects clear values in attachment order
///
/// Subgraphs are then ordered topologically by their declared
/// dependencies. The first failure aborts the whole build.

use std::collections::BTreeMap;
use crate::error::{Error, Result};
use crate::graphics_device::{
    Swapchain, TextureFormat, Extent2D, AttachmentDesc, AttachmentRef, SubpassDesc,
    SubpassDependency, SubpassIndex, PipelineStage, Access, RenderPassDesc, ImageLayout,
    ImageDesc, ImageUsage, ImageAspect, MemoryLocation,
};
use crate::utils::TopologicalSort;
use crate::render_graph::{
    BuildError, TargetRef, PassRef, SubgraphRef, RenderTarget, RenderSubgraph,
    TargetType, TargetSource, TargetFormat, SubgraphExtent, CompiledSubgraph, RenderGraph,
};
use crate::{engine_debug, engine_error, engine_info};

pub struct RenderGraphBuilder {
    subgraphs: BTreeMap<SubgraphRef, RenderSubgraph>,
    depth_format: TextureFormat,
}

impl RenderGraphBuilder {
    /// Empty builder using `D32_FLOAT` for default depth targets
    pub fn new() -> Self {
        Self {
            subgraphs: BTreeMap::new(),
            depth_format: TextureFormat::D32_FLOAT,
        }
    }

    /// Format used for `TargetFormat::DefaultDepth`
    pub fn with_depth_format(mut self, depth_format: TextureFormat) -> Self {
        self.depth_format = depth_format;
        self
    }

    /// Register a subgraph
    ///
    /// # Errors
    ///
    /// `BuildError::DuplicateSubgraph` if `subgraph_ref` is already
    /// registered; the registered subgraph is left untouched.
    pub fn add_subgraph(&mut self, subgraph_ref: impl Into<SubgraphRef>, subgraph: RenderSubgraph) -> Result<()> {
        let subgraph_ref = subgraph_ref.into();
        if self.subgraphs.contains_key(&subgraph_ref) {
            return Err(Self::fail(BuildError::DuplicateSubgraph(subgraph_ref)));
        }

        engine_debug!("aurora3d::RenderGraphBuilder",
            "Registered subgraph '{}' ({} targets, {} passes)",
            subgraph_ref, subgraph.targets.len(), subgraph.passes.len());

        self.subgraphs.insert(subgraph_ref, subgraph);
        Ok(())
    }

    pub fn subgraph_count(&self) -> usize {
        self.subgraphs.len()
    }

    pub fn subgraph(&self, subgraph_ref: &SubgraphRef) -> Option<&RenderSubgraph> {
        self.subgraphs.get(subgraph_ref)
    }

    /// Compile every registered subgraph against the live swapchain
    ///
    /// The returned graph holds no GPU objects yet; see
    /// `RenderGraph::create_graph()`.
    pub fn build(&self, swapchain: &dyn Swapchain) -> Result<RenderGraph> {
        let color_format = swapchain.format();
        let extent = swapchain.extent();

        let mut compiled = BTreeMap::new();
        for (subgraph_ref, subgraph) in &self.subgraphs {
            let subgraph = compile_subgraph(subgraph, color_format, self.depth_format, extent)
                .map_err(|source| Self::fail(BuildError::Subgraph {
                    subgraph: subgraph_ref.clone(),
                    source: Box::new(source),
                }))?;
            compiled.insert(subgraph_ref.clone(), subgraph);
        }

        let order = subgraph_order(&self.subgraphs).map_err(Self::fail)?;

        engine_info!("aurora3d::RenderGraphBuilder", "Render graph built, subgraph order: [{}]",
            order.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", "));

        Ok(RenderGraph::new(self.subgraphs.clone(), self.depth_format, compiled, order))
    }

    fn fail(error: BuildError) -> Error {
        engine_error!("aurora3d::RenderGraphBuilder", "Build failed: {}", error);
        Error::Build(error)
    }
}

impl Default for RenderGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ===== COMPILATION =====

fn resolve_format(format: TargetFormat, color_format: TextureFormat, depth_format: TextureFormat) -> TextureFormat {
    match format {
        TargetFormat::DefaultColor => color_format,
        TargetFormat::DefaultDepth => depth_format,
        TargetFormat::Explicit(format) => format,
    }
}

/// Dependency of a pass without inputs on everything before the render pass
fn external_dependency(subpass: u32, writes_depth: bool) -> SubpassDependency {
    let mut stage = PipelineStage::COLOR_ATTACHMENT_OUTPUT;
    let mut dst_access = Access::COLOR_ATTACHMENT_WRITE;
    if writes_depth {
        stage |= PipelineStage::EARLY_FRAGMENT_TESTS | PipelineStage::LATE_FRAGMENT_TESTS;
        dst_access |= Access::DEPTH_STENCIL_ATTACHMENT_WRITE;
    }

    SubpassDependency {
        src_subpass: SubpassIndex::External,
        dst_subpass: SubpassIndex::Index(subpass),
        src_stage: stage,
        dst_stage: stage,
        src_access: Access::empty(),
        dst_access,
        by_region: false,
    }
}

/// Dependency of a pass on the subpass producing one of its inputs
fn input_dependency(producer: u32, consumer: u32, reads_depth: bool) -> SubpassDependency {
    let color_rw = Access::COLOR_ATTACHMENT_READ | Access::COLOR_ATTACHMENT_WRITE;

    let mut src_stage = PipelineStage::COLOR_ATTACHMENT_OUTPUT;
    let mut src_access = color_rw;
    if reads_depth {
        src_stage |= PipelineStage::LATE_FRAGMENT_TESTS;
        src_access |= Access::DEPTH_STENCIL_ATTACHMENT_WRITE;
    }

    SubpassDependency {
        src_subpass: SubpassIndex::Index(producer),
        dst_subpass: SubpassIndex::Index(consumer),
        src_stage,
        dst_stage: PipelineStage::COLOR_ATTACHMENT_OUTPUT | PipelineStage::FRAGMENT_SHADER,
        src_access,
        dst_access: color_rw | Access::INPUT_ATTACHMENT_READ,
        by_region: true,
    }
}

/// Allocation requirements of a graph-allocated target
///
/// # Errors
///
/// `BuildError::UnsupportedTargetSource` unless the target source is
/// `TargetSource::Allocated`; external images are never allocated by the graph.
pub fn image_requirements(
    target_ref: &TargetRef,
    target: &RenderTarget,
    format: TextureFormat,
    extent: Extent2D,
) -> std::result::Result<ImageDesc, BuildError> {
    if target.source != TargetSource::Allocated {
        return Err(BuildError::UnsupportedTargetSource { target: target_ref.clone() });
    }

    let mut usage = ImageUsage::empty();
    if target.target_type.contains(TargetType::INPUT) {
        usage |= ImageUsage::INPUT_ATTACHMENT;
    }
    if target.target_type.contains(TargetType::COLOR) {
        usage |= ImageUsage::COLOR_ATTACHMENT;
    }
    if target.target_type.contains(TargetType::DEPTH_STENCIL) {
        usage |= ImageUsage::DEPTH_STENCIL_ATTACHMENT;
    }

    Ok(ImageDesc {
        usage,
        format,
        extent,
        array_layers: target.array_layers,
        samples: target.samples,
        aspect: ImageAspect::from_format(format),
        memory: MemoryLocation::GpuOnly,
    })
}

pub(crate) fn compile_subgraph(
    subgraph: &RenderSubgraph,
    color_format: TextureFormat,
    depth_format: TextureFormat,
    swapchain_extent: Extent2D,
) -> std::result::Result<CompiledSubgraph, BuildError> {
    let (extent, follows_swapchain) = match subgraph.extent {
        SubgraphExtent::Swapchain => (swapchain_extent, true),
        SubgraphExtent::Fixed(extent) => (extent, false),
    };

    // 1. Attachments
    let mut attachments = Vec::with_capacity(subgraph.targets.len());
    let mut attachment_indices = BTreeMap::new();
    let mut attachment_targets = Vec::with_capacity(subgraph.targets.len());
    let mut producers = BTreeMap::new();
    for (index, (target_ref, target)) in subgraph.targets.iter().enumerate() {
        if !subgraph.passes.contains_key(target.producer()) {
            return Err(BuildError::UnknownProducer {
                target: target_ref.clone(),
                pass: target.producer().clone(),
            });
        }

        attachments.push(AttachmentDesc {
            format: resolve_format(target.format, color_format, depth_format),
            samples: target.samples,
            load_op: target.load_op,
            store_op: target.store_op,
            stencil_load_op: target.stencil_load_op,
            stencil_store_op: target.stencil_store_op,
            initial_layout: target.initial_layout,
            final_layout: target.final_layout,
        });
        attachment_indices.insert(target_ref.clone(), index as u32);
        attachment_targets.push(target_ref.clone());
        producers.insert(target_ref.clone(), target.producer().clone());
    }

    // 2. Attachment references per pass
    let mut subpass_descs: BTreeMap<&PassRef, SubpassDesc> = BTreeMap::new();
    for (pass_ref, pass) in &subgraph.passes {
        let mut desc = SubpassDesc::default();

        for input in &pass.inputs {
            let Some(&attachment) = attachment_indices.get(input) else {
                return Err(BuildError::MissingAttachment {
                    pass: pass_ref.clone(),
                    target: input.clone(),
                });
            };
            let layout = if attachments[attachment as usize].format.is_depth() {
                ImageLayout::DepthStencilReadOnly
            } else {
                ImageLayout::ShaderReadOnly
            };
            desc.input_attachments.push(AttachmentRef { attachment, layout });
        }

        for (index, (target_ref, target)) in subgraph.targets.iter().enumerate() {
            if target.producer() != pass_ref {
                continue;
            }
            let attachment = index as u32;
            let color = target.target_type.contains(TargetType::COLOR);
            let depth = target.target_type.contains(TargetType::DEPTH_STENCIL);
            match (color, depth) {
                (true, false) => desc.color_attachments.push(AttachmentRef {
                    attachment,
                    layout: ImageLayout::ColorAttachment,
                }),
                (false, true) => {
                    if desc.depth_stencil_attachment.is_some() {
                        return Err(BuildError::MultipleDepthOutputs { pass: pass_ref.clone() });
                    }
                    desc.depth_stencil_attachment = Some(AttachmentRef {
                        attachment,
                        layout: ImageLayout::DepthStencilAttachment,
                    });
                }
                _ => return Err(BuildError::UnsupportedTargetType { target: target_ref.clone() }),
            }
        }

        subpass_descs.insert(pass_ref, desc);
    }

    // 3. Pass order
    let mut sort = TopologicalSort::new();
    let pass_order = sort
        .sort(subgraph.passes.keys().cloned(), |pass: &PassRef| {
            subgraph.passes.get(pass)
                .map(|p| p.inputs.iter().filter_map(|input| producers.get(input).cloned()).collect())
                .unwrap_or_default()
        })
        .map_err(|cycle| BuildError::Cycle(format!("pass '{}'", cycle.item)))?
        .to_vec();

    // 4. Subpasses and barriers
    let mut subpass_indices = BTreeMap::new();
    let mut subpasses = Vec::with_capacity(pass_order.len());
    let mut dependencies = Vec::new();
    for (index, pass_ref) in pass_order.iter().enumerate() {
        let index = index as u32;
        subpass_indices.insert(pass_ref.clone(), index);

        let desc = subpass_descs.remove(pass_ref).unwrap_or_default();
        let inputs = subgraph.passes.get(pass_ref).map(|p| p.inputs.as_slice()).unwrap_or(&[]);

        if inputs.is_empty() {
            dependencies.push(external_dependency(index, desc.depth_stencil_attachment.is_some()));
        } else {
            // One barrier per producing subpass
            let mut reads: BTreeMap<u32, bool> = BTreeMap::new();
            for input in inputs {
                let producer = producers.get(input).and_then(|p| subpass_indices.get(p)).copied();
                let Some(producer) = producer else { continue };
                let reads_depth = attachment_indices.get(input)
                    .map(|&a| attachments[a as usize].format.is_depth())
                    .unwrap_or(false);
                *reads.entry(producer).or_insert(false) |= reads_depth;
            }
            dependencies.extend(reads.into_iter()
                .map(|(producer, reads_depth)| input_dependency(producer, index, reads_depth)));
        }

        subpasses.push(desc);
    }

    // 5. Image requirements
    let mut requirements = BTreeMap::new();
    let mut external_targets = Vec::new();
    for (index, (target_ref, target)) in subgraph.targets.iter().enumerate() {
        match target.source {
            TargetSource::Allocated => {
                let desc = image_requirements(target_ref, target, attachments[index].format, extent)?;
                requirements.insert(target_ref.clone(), desc);
            }
            TargetSource::External => external_targets.push(target_ref.clone()),
        }
    }

    // 6. Clear values
    let clear_values = subgraph.targets.values().map(|t| t.clear_value).collect();

    Ok(CompiledSubgraph {
        render_pass_desc: RenderPassDesc { attachments, subpasses, dependencies },
        attachment_indices,
        attachment_targets,
        producers,
        pass_order,
        subpass_indices,
        image_requirements: requirements,
        external_targets,
        clear_values,
        extent,
        color_format,
        follows_swapchain,
    })
}

/// Global subgraph execution order
pub(crate) fn subgraph_order(
    subgraphs: &BTreeMap<SubgraphRef, RenderSubgraph>,
) -> std::result::Result<Vec<SubgraphRef>, BuildError> {
    for (subgraph_ref, subgraph) in subgraphs {
        for dependency in &subgraph.dependencies {
            if !subgraphs.contains_key(dependency) {
                return Err(BuildError::UnknownSubgraph {
                    subgraph: subgraph_ref.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    let mut sort = TopologicalSort::new();
    sort.sort(subgraphs.keys().cloned(), |subgraph: &SubgraphRef| {
        subgraphs.get(subgraph).map(|s| s.dependencies.clone()).unwrap_or_default()
    })
    .map(|order| order.to_vec())
    .map_err(|cycle| BuildError::Cycle(format!("subgraph '{}'", cycle.item)))
}

#[cfg(test)]
#[path = "render_graph_builder_tests.rs"]
mod tests;
