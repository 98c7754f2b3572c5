/// Deferred renderer - records one frame of the deferred pipeline.
///
/// Per frame:
/// 1. assemble camera, shadow, light, and model data from the scene
/// 2. upload the scene uniforms into the frame slot's buffer
/// 3. run the shadow subgraph once per shadow-map slot; slots past the
///    assembled shadow count record an empty pass, which only clears
/// 4. bind the swapchain image and run the scene subgraph: G-buffer fill,
///    then fullscreen composition
///
/// The renderer owns the render graph, the shadow-map images, and the
/// per-slot uniform buffers and set-0 binding groups. Pipelines come from
/// the host, which also owns fencing between frame slots.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use crate::error::Result;
use crate::{engine_bail, engine_err, engine_debug, engine_info};
use crate::event::{EventBus, EventReceiver, EngineEvent};
use crate::graphics_device::{
    GraphicsDevice, Swapchain, CommandList, Pipeline, BindingGroup, BindingResource, Buffer,
    BufferDesc, BufferUsage, Image, ImageView, ImageDesc, ImageUsage, ImageAspect, Extent2D,
    MemoryLocation, ShaderStage,
};
use crate::render_graph::{RenderGraph, SubgraphRef, TargetRef, PassAction, FullscreenAction};
use crate::resource::ResourceManager;
use crate::scene::Scene;
use crate::frame::{FrameAssembler, AssemblyContext, FrameData, ModelData, SkyboxData};
use crate::deferred::{
    RendererConfig, RendererStats, deferred_render_graph, SHADOW_SUBGRAPH, SCENE_SUBGRAPH,
    SHADOW_MAP_TARGET, SWAPCHAIN_TARGET, GBUFFER_PASS, COMPOSITION_PASS, GBUFFER_INPUTS,
};

/// Set index of the per-frame scene uniforms in every pipeline
pub const SCENE_SET: u32 = 0;

/// Pipelines supplied by the host application
///
/// Set 0 of each layout holds the scene uniform buffer. The G-buffer and
/// skybox pipelines read their textures from set 1; the composition
/// pipeline reads the G-buffer input attachments and shadow maps from set 0.
#[derive(Clone)]
pub struct DeferredPipelines {
    pub shadow: Arc<dyn Pipeline>,
    pub gbuffer: Arc<dyn Pipeline>,
    pub skybox: Arc<dyn Pipeline>,
    pub composition: Arc<dyn Pipeline>,
}

/// Push constants of the shadow pipeline
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowPushConstants {
    pub model: Mat4,
    /// Entry of the shadow array rendered by this pass
    pub shadow_index: u32,
    pub _padding: [u32; 3],
}

/// GPU resources of one in-flight frame slot
struct FrameSlot {
    uniform_buffer: Arc<dyn Buffer>,
    shadow_group: Arc<dyn BindingGroup>,
    gbuffer_group: Arc<dyn BindingGroup>,
    skybox_group: Arc<dyn BindingGroup>,
    composition_group: Arc<dyn BindingGroup>,
    composition: FullscreenAction,
}

pub struct DeferredRenderer {
    device: Arc<dyn GraphicsDevice>,
    config: RendererConfig,
    pipelines: DeferredPipelines,
    assembler: FrameAssembler,
    graph: RenderGraph,
    shadow_maps: Vec<Arc<dyn Image>>,
    slots: Vec<FrameSlot>,
    frame_slot: usize,
    events: Option<EventReceiver>,
    stats: RendererStats,
}

impl DeferredRenderer {
    /// Build the render graph against `swapchain` and allocate every
    /// per-renderer GPU resource
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        config: RendererConfig,
        pipelines: DeferredPipelines,
        swapchain: &dyn Swapchain,
    ) -> Result<Self> {
        let graph = Self::create_graph(&device, &config, swapchain)?;
        let shadow_maps = Self::create_shadow_maps(device.as_ref(), &config)?;
        let slots = Self::create_slots(device.as_ref(), &config, &pipelines, &graph, &shadow_maps)?;

        engine_info!("aurora3d::DeferredRenderer", "Deferred renderer created ({} frame slots, {} shadow maps {}x{})",
            slots.len(), shadow_maps.len(), config.shadow_map_size, config.shadow_map_size);

        Ok(Self {
            assembler: FrameAssembler::new(config.frames_in_flight, config.max_shadow_maps, config.max_lights),
            device,
            config,
            pipelines,
            graph,
            shadow_maps,
            slots,
            frame_slot: 0,
            events: None,
            stats: RendererStats::default(),
        })
    }

    // ===== SETUP =====

    fn create_graph(
        device: &Arc<dyn GraphicsDevice>,
        config: &RendererConfig,
        swapchain: &dyn Swapchain,
    ) -> Result<RenderGraph> {
        let mut graph = deferred_render_graph(config)?.build(swapchain)?;
        graph.create_graph(Arc::clone(device))?;
        graph.allocate_images()?;
        Ok(graph)
    }

    fn create_shadow_maps(device: &dyn GraphicsDevice, config: &RendererConfig) -> Result<Vec<Arc<dyn Image>>> {
        let desc = ImageDesc {
            usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT | ImageUsage::SAMPLED,
            format: config.depth_format,
            extent: Extent2D::new(config.shadow_map_size, config.shadow_map_size),
            array_layers: 1,
            samples: 1,
            aspect: ImageAspect::from_format(config.depth_format),
            memory: MemoryLocation::GpuOnly,
        };
        (0..config.max_shadow_maps).map(|_| device.create_image(&desc)).collect()
    }

    fn create_slots(
        device: &dyn GraphicsDevice,
        config: &RendererConfig,
        pipelines: &DeferredPipelines,
        graph: &RenderGraph,
        shadow_maps: &[Arc<dyn Image>],
    ) -> Result<Vec<FrameSlot>> {
        let composition_views = Self::composition_views(graph, shadow_maps)?;
        let uniform_size = FrameData::uniform_size(config.max_shadow_maps, config.max_lights);

        (0..config.frames_in_flight.max(1)).map(|_| -> Result<FrameSlot> {
            let uniform_buffer = device.create_buffer(BufferDesc { size: uniform_size, usage: BufferUsage::Uniform })?;
            let uniforms = [BindingResource::UniformBuffer(uniform_buffer.as_ref())];
            let composition_group = device.create_binding_group(
                &pipelines.composition,
                SCENE_SET,
                &Self::composition_bindings(uniform_buffer.as_ref(), &composition_views, shadow_maps.len()),
            )?;

            Ok(FrameSlot {
                shadow_group: device.create_binding_group(&pipelines.shadow, SCENE_SET, &uniforms)?,
                gbuffer_group: device.create_binding_group(&pipelines.gbuffer, SCENE_SET, &uniforms)?,
                skybox_group: device.create_binding_group(&pipelines.skybox, SCENE_SET, &uniforms)?,
                composition: FullscreenAction::new(Arc::clone(&pipelines.composition), Arc::clone(&composition_group)),
                composition_group,
                uniform_buffer,
            })
        }).collect()
    }

    /// G-buffer input views in binding order, followed by the shadow maps
    fn composition_views(graph: &RenderGraph, shadow_maps: &[Arc<dyn Image>]) -> Result<Vec<Arc<dyn ImageView>>> {
        let scene = SubgraphRef::from(SCENE_SUBGRAPH);
        let mut views = Vec::with_capacity(GBUFFER_INPUTS.len() + shadow_maps.len());
        for target in GBUFFER_INPUTS {
            let Some(image) = graph.image(&scene, &TargetRef::from(target)) else {
                engine_bail!("aurora3d::DeferredRenderer", "G-buffer target '{}' has no image", target);
            };
            views.push(image.view());
        }
        views.extend(shadow_maps.iter().map(|image| image.view()));
        Ok(views)
    }

    fn composition_bindings<'a>(
        uniform_buffer: &'a dyn Buffer,
        views: &'a [Arc<dyn ImageView>],
        shadow_map_count: usize,
    ) -> Vec<BindingResource<'a>> {
        let (gbuffer, shadow_maps) = views.split_at(views.len() - shadow_map_count);
        std::iter::once(BindingResource::UniformBuffer(uniform_buffer))
            .chain(gbuffer.iter().map(|view| BindingResource::InputAttachment(view.as_ref())))
            .chain(shadow_maps.iter().map(|view| BindingResource::DepthTexture(view.as_ref())))
            .collect()
    }

    /// Point the composition groups of every slot at the current G-buffer
    fn write_composition_bindings(&self) -> Result<()> {
        let views = Self::composition_views(&self.graph, &self.shadow_maps)?;
        for slot in &self.slots {
            let bindings = Self::composition_bindings(slot.uniform_buffer.as_ref(), &views, self.shadow_maps.len());
            self.device.update_binding_group(&slot.composition_group, &bindings)?;
        }
        Ok(())
    }

    // ===== FRAME =====

    /// Record one frame into `cmd`, presenting to swapchain image `image_idx`
    ///
    /// Advances to the next frame slot on success.
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        resources: &ResourceManager,
        swapchain: &dyn Swapchain,
        image_idx: u32,
        cmd: &mut dyn CommandList,
    ) -> Result<RendererStats> {
        let slot_index = self.frame_slot;
        let Extent2D { width, height } = swapchain.extent();
        let aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };

        let frame = self.assembler.assemble(scene, &AssemblyContext {
            device: self.device.as_ref(),
            resources,
            model_pipeline: &self.pipelines.gbuffer,
            skybox_pipeline: &self.pipelines.skybox,
            frame_slot: slot_index,
            aspect,
        })?;

        let Some(slot) = self.slots.get_mut(slot_index) else {
            engine_bail!("aurora3d::DeferredRenderer", "Frame slot {} out of range", slot_index);
        };
        slot.uniform_buffer.update(0, &frame.uniform_bytes(self.config.max_shadow_maps, self.config.max_lights))?;

        let mut stats = RendererStats {
            shadow_casters: frame.shadows.len() as u32,
            lights: frame.lights.len() as u32,
            ..RendererStats::default()
        };

        // Shadow maps
        let shadow_subgraph = SubgraphRef::from(SHADOW_SUBGRAPH);
        let shadow_target = TargetRef::from(SHADOW_MAP_TARGET);
        for (index, shadow_map) in self.shadow_maps.iter().enumerate() {
            self.graph.set_target_image_view(&shadow_subgraph, &shadow_target, shadow_map.view())?;
            let casts = index < frame.shadows.len();
            let pipeline = &self.pipelines.shadow;
            let group = &slot.shadow_group;
            self.graph.execute_subgraph_with(&shadow_subgraph, swapchain, image_idx, cmd, &mut |_, cmd| {
                if casts {
                    record_shadow(cmd, pipeline, group, &frame.models, index as u32, &mut stats)?;
                }
                Ok(())
            })?;
        }

        // G-buffer and composition
        let scene_subgraph = SubgraphRef::from(SCENE_SUBGRAPH);
        let swapchain_view = swapchain.image_view(image_idx)
            .ok_or_else(|| engine_err!("aurora3d::DeferredRenderer", "Swapchain has no image {}", image_idx))?;
        self.graph.set_target_image_view(&scene_subgraph, &TargetRef::from(SWAPCHAIN_TARGET), swapchain_view)?;

        let pipelines = &self.pipelines;
        self.graph.execute_subgraph_with(&scene_subgraph, swapchain, image_idx, cmd, &mut |pass, cmd| {
            match pass.as_str() {
                GBUFFER_PASS => record_gbuffer(cmd, pipelines, &*slot, &frame, &mut stats),
                COMPOSITION_PASS => {
                    slot.composition.execute(cmd)?;
                    stats.draw_calls += 1;
                    Ok(())
                }
                _ => Ok(()),
            }
        })?;

        self.frame_slot = (slot_index + 1) % self.slots.len();
        self.stats = stats;
        Ok(stats)
    }

    // ===== EVENTS =====

    /// Listen to `bus` for resize notifications
    pub fn subscribe(&mut self, bus: &EventBus) {
        self.events = Some(bus.subscribe());
    }

    /// Drain pending events; returns true if a resize was handled
    pub fn handle_events(&mut self, swapchain: &dyn Swapchain) -> Result<bool> {
        let Some(events) = self.events.as_ref().map(EventReceiver::drain) else {
            return Ok(false);
        };
        let resized = events.iter().any(|event| matches!(event, EngineEvent::Resized { .. }));
        if resized {
            self.resize(swapchain)?;
        }
        Ok(resized)
    }

    /// Reallocate the G-buffer at the swapchain extent and rebind it
    ///
    /// A zero-sized swapchain (minimized window) is ignored.
    pub fn resize(&mut self, swapchain: &dyn Swapchain) -> Result<()> {
        let extent = swapchain.extent();
        if extent.width == 0 || extent.height == 0 {
            engine_debug!("aurora3d::DeferredRenderer", "Ignoring resize to {}x{}", extent.width, extent.height);
            return Ok(());
        }
        self.graph.resize(swapchain)?;
        self.write_composition_bindings()
    }

    /// Rebuild the render graph and every renderer-owned resource
    pub fn reload(&mut self, swapchain: &dyn Swapchain) -> Result<()> {
        self.device.wait_idle()?;
        self.graph.destroy_graph();
        self.slots.clear();
        self.shadow_maps.clear();

        self.graph = Self::create_graph(&self.device, &self.config, swapchain)?;
        self.shadow_maps = Self::create_shadow_maps(self.device.as_ref(), &self.config)?;
        self.slots = Self::create_slots(self.device.as_ref(), &self.config, &self.pipelines, &self.graph, &self.shadow_maps)?;
        self.frame_slot = 0;

        engine_info!("aurora3d::DeferredRenderer", "Renderer reloaded");
        Ok(())
    }

    /// Apply a new configuration, then reload
    ///
    /// Model binding groups sized for the previous slot count are
    /// recreated by the frame assembler on their next rebuild.
    pub fn reconfigure(&mut self, config: RendererConfig, swapchain: &dyn Swapchain) -> Result<()> {
        self.assembler = FrameAssembler::new(config.frames_in_flight, config.max_shadow_maps, config.max_lights);
        self.config = config;
        self.reload(swapchain)
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    /// Slot the next frame will be recorded into
    pub fn frame_slot(&self) -> usize {
        self.frame_slot
    }

    pub fn frame_slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn shadow_maps(&self) -> &[Arc<dyn Image>] {
        &self.shadow_maps
    }

    pub fn uniform_buffer(&self, slot: usize) -> Option<&Arc<dyn Buffer>> {
        self.slots.get(slot).map(|s| &s.uniform_buffer)
    }

    /// Statistics of the last recorded frame
    pub fn stats(&self) -> RendererStats {
        self.stats
    }
}

fn record_shadow(
    cmd: &mut dyn CommandList,
    pipeline: &Arc<dyn Pipeline>,
    scene_group: &Arc<dyn BindingGroup>,
    models: &[ModelData],
    shadow_index: u32,
    stats: &mut RendererStats,
) -> Result<()> {
    cmd.bind_pipeline(pipeline)?;
    cmd.bind_binding_group(pipeline, SCENE_SET, scene_group)?;
    for model in models {
        let constants = ShadowPushConstants { model: model.model, shadow_index, _padding: [0; 3] };
        cmd.push_constants(pipeline, &[ShaderStage::Vertex], 0, bytemuck::bytes_of(&constants))?;
        draw_mesh(cmd, &model.vertex_buffer, &model.index_buffer, model.index_count, model.index_type, stats)?;
    }
    Ok(())
}

fn record_gbuffer(
    cmd: &mut dyn CommandList,
    pipelines: &DeferredPipelines,
    slot: &FrameSlot,
    frame: &FrameData,
    stats: &mut RendererStats,
) -> Result<()> {
    if let Some(skybox) = &frame.skybox {
        record_skybox(cmd, &pipelines.skybox, &slot.skybox_group, skybox, stats)?;
    }

    let pipeline = &pipelines.gbuffer;
    cmd.bind_pipeline(pipeline)?;
    cmd.bind_binding_group(pipeline, SCENE_SET, &slot.gbuffer_group)?;
    for model in &frame.models {
        cmd.bind_binding_group(pipeline, model.binding_group.set_index(), &model.binding_group)?;
        cmd.push_constants(pipeline, &[ShaderStage::Vertex], 0, bytemuck::bytes_of(&model.push_constants()))?;
        draw_mesh(cmd, &model.vertex_buffer, &model.index_buffer, model.index_count, model.index_type, stats)?;
    }
    Ok(())
}

fn record_skybox(
    cmd: &mut dyn CommandList,
    pipeline: &Arc<dyn Pipeline>,
    scene_group: &Arc<dyn BindingGroup>,
    skybox: &SkyboxData,
    stats: &mut RendererStats,
) -> Result<()> {
    cmd.bind_pipeline(pipeline)?;
    cmd.bind_binding_group(pipeline, SCENE_SET, scene_group)?;
    cmd.bind_binding_group(pipeline, skybox.binding_group.set_index(), &skybox.binding_group)?;
    draw_mesh(cmd, &skybox.vertex_buffer, &skybox.index_buffer, skybox.index_count, skybox.index_type, stats)
}

fn draw_mesh(
    cmd: &mut dyn CommandList,
    vertex_buffer: &Arc<dyn Buffer>,
    index_buffer: &Arc<dyn Buffer>,
    index_count: u32,
    index_type: crate::graphics_device::IndexType,
    stats: &mut RendererStats,
) -> Result<()> {
    cmd.bind_vertex_buffer(vertex_buffer, 0)?;
    cmd.bind_index_buffer(index_buffer, 0, index_type)?;
    cmd.draw_indexed(index_count, 0, 0)?;
    stats.draw_calls += 1;
    stats.triangles += index_count / 3;
    Ok(())
}

#[cfg(test)]
#[path = "deferred_renderer_tests.rs"]
mod tests;
