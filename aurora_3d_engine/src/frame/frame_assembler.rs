/// Per-frame scene assembly.
///
/// One linear pass over the scene per frame:
/// 1. resolve the bound camera (identity data when there is none)
/// 2. walk the tree in pre-order and dispatch on each object's variant:
///    enabled lights emit shadow and light entries (six for a point
///    light), props with a resolved mesh emit a model entry after
///    rebuilding stale texture bindings, a world object sets the skybox
/// 3. truncate shadows and lights to the configured maxima, keeping
///    traversal order
///
/// Recording the shadow and composition passes from the result is the
/// renderer's job.

use std::sync::Arc;
use glam::Vec4;
use crate::error::Result;
use crate::{engine_debug, engine_trace, engine_warn};
use crate::graphics_device::{GraphicsDevice, Pipeline, BindingGroup, BindingResource};
use crate::resource::ResourceManager;
use crate::scene::{
    Scene, Object, ObjectVariant, LightKind, LightParams, ModelComponent, ModelGpuState,
    SkyboxComponent, SkyboxGpuState, PositionComponent,
};
use crate::frame::{
    FrameData, CameraData, ShadowData, LightData, ModelData, SkyboxData,
    point_light_view_projections, cone_light_view_projection, rectangle_light_view_projection,
    camera_data,
};

/// Binding group set of model textures (set 0 holds the scene uniforms)
pub const MODEL_TEXTURE_SET: u32 = 1;
/// Binding group set of the skybox cubemap
pub const SKYBOX_TEXTURE_SET: u32 = 1;

/// GPU collaborators of one assembly
pub struct AssemblyContext<'a> {
    pub device: &'a dyn GraphicsDevice,
    pub resources: &'a ResourceManager,
    pub model_pipeline: &'a Arc<dyn Pipeline>,
    pub skybox_pipeline: &'a Arc<dyn Pipeline>,
    /// In-flight frame slot being recorded
    pub frame_slot: usize,
    /// Viewport width / height
    pub aspect: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAssembler {
    frames_in_flight: usize,
    max_shadows: usize,
    max_lights: usize,
}

impl FrameAssembler {
    pub fn new(frames_in_flight: usize, max_shadows: usize, max_lights: usize) -> Self {
        Self {
            frames_in_flight: frames_in_flight.max(1),
            max_shadows,
            max_lights,
        }
    }

    pub fn max_shadows(&self) -> usize {
        self.max_shadows
    }

    pub fn max_lights(&self) -> usize {
        self.max_lights
    }

    pub fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    /// Assemble the frame data of `scene`
    ///
    /// Only fails on device errors while rebuilding texture bindings.
    pub fn assemble(&self, scene: &mut Scene, ctx: &AssemblyContext) -> Result<FrameData> {
        let mut frame = FrameData {
            camera: Self::camera(scene, ctx.aspect),
            ..FrameData::default()
        };

        for (_, object_key) in scene.objects_in_order() {
            let Some(object) = scene.object_mut(object_key) else { continue };
            let variant = *object.variant();
            match variant {
                ObjectVariant::LightSource(params) => {
                    let position = object.components().position().copied().unwrap_or_default();
                    Self::emit_light(&params, &position, &mut frame);
                }
                ObjectVariant::Prop => {
                    if let Some(model) = self.prop(object, ctx)? {
                        frame.models.push(model);
                    }
                }
                ObjectVariant::World => {
                    if let Some(skybox) = self.world(object, ctx)? {
                        frame.skybox = Some(skybox);
                    }
                }
                ObjectVariant::Camera(_) => {}
            }
        }

        self.truncate(&mut frame);
        Ok(frame)
    }

    fn camera(scene: &Scene, aspect: f32) -> CameraData {
        let Some(camera) = scene.camera() else {
            return CameraData::identity();
        };
        match camera.variant() {
            ObjectVariant::Camera(params) => {
                let position = camera.components().position().copied().unwrap_or_default();
                camera_data(&position, params, aspect)
            }
            _ => CameraData::identity(),
        }
    }

    /// Shadow and light entries of an enabled light
    pub fn emit_light(params: &LightParams, position: &PositionComponent, frame: &mut FrameData) {
        if !params.enabled {
            return;
        }

        let origin = position.translation;
        let direction = position.forward();
        let view_projections = match params.kind {
            LightKind::Point => point_light_view_projections(origin, params.range).to_vec(),
            LightKind::Cone { angle } => vec![cone_light_view_projection(origin, direction, angle, params.range)],
            LightKind::Rectangle { width, height } =>
                vec![rectangle_light_view_projection(origin, direction, width, height, params.range)],
        };

        let world_position = Vec4::from((origin, params.range));
        let color = Vec4::from((params.color, 1.0));
        for view_projection in view_projections {
            frame.shadows.push(ShadowData { view_projection, position: world_position });
            frame.lights.push(LightData { view_projection, position: world_position, color });
        }
    }

    fn prop(&self, object: &mut Object, ctx: &AssemblyContext) -> Result<Option<ModelData>> {
        let transform = object.components().position().copied().unwrap_or_default();
        let name = object.display_name().to_string();
        let Some(model) = object.components_mut().model_mut() else { return Ok(None) };
        let Some(mesh) = model.mesh().and_then(|key| ctx.resources.mesh(key)) else { return Ok(None) };

        if model.is_dirty() || model.gpu_state().is_none() {
            engine_trace!("aurora3d::FrameAssembler", "Rebuilding texture bindings of '{}'", name);
            if !self.rebuild_model(model, ctx)? {
                engine_warn!("aurora3d::FrameAssembler", "No texture for '{}' and no default texture, skipped", name);
                return Ok(None);
            }
        }

        let Some(binding_group) = Self::slot_group(model.gpu_state().map(|s| s.binding_groups.as_slice()), ctx.frame_slot) else {
            return Ok(None);
        };

        Ok(Some(ModelData {
            model: transform.model_matrix(),
            rotation: transform.rotation_matrix(),
            vertex_buffer: Arc::clone(mesh.vertex_buffer()),
            index_buffer: Arc::clone(mesh.index_buffer()),
            index_count: mesh.index_count(),
            index_type: mesh.index_type(),
            binding_group,
        }))
    }

    /// Rebuild the texture views and binding groups of a model
    ///
    /// The previous views are released before new ones are created. Bound
    /// groups are rewritten in place, one per frame slot. Returns false if
    /// a texture resolves to nothing, leaving the model dirty.
    pub fn rebuild_model(&self, model: &mut ModelComponent, ctx: &AssemblyContext) -> Result<bool> {
        let previous_groups = model.take_gpu_state().map(|state| state.binding_groups);

        let (Some(albedo), Some(specular)) = (
            ctx.resources.resolve_texture(model.albedo()),
            ctx.resources.resolve_texture(model.specular()),
        ) else {
            model.mark_dirty();
            return Ok(false);
        };

        let albedo_view = ctx.device.create_texture_view(albedo.texture())?;
        let specular_view = ctx.device.create_texture_view(specular.texture())?;
        let bindings = [
            BindingResource::SampledTexture(albedo_view.as_ref()),
            BindingResource::SampledTexture(specular_view.as_ref()),
        ];
        let binding_groups = self.write_groups(ctx, ctx.model_pipeline, MODEL_TEXTURE_SET, previous_groups, &bindings)?;

        model.set_gpu_state(ModelGpuState { albedo_view, specular_view, binding_groups });
        Ok(true)
    }

    fn world(&self, object: &mut Object, ctx: &AssemblyContext) -> Result<Option<SkyboxData>> {
        let Some(skybox) = object.components_mut().skybox_mut() else { return Ok(None) };
        let Some(mesh) = skybox.mesh().and_then(|key| ctx.resources.mesh(key)) else { return Ok(None) };

        if (skybox.is_dirty() || skybox.gpu_state().is_none()) && !self.rebuild_skybox(skybox, ctx)? {
            return Ok(None);
        }

        let Some(binding_group) = Self::slot_group(skybox.gpu_state().map(|s| s.binding_groups.as_slice()), ctx.frame_slot) else {
            return Ok(None);
        };

        Ok(Some(SkyboxData {
            vertex_buffer: Arc::clone(mesh.vertex_buffer()),
            index_buffer: Arc::clone(mesh.index_buffer()),
            index_count: mesh.index_count(),
            index_type: mesh.index_type(),
            binding_group,
        }))
    }

    fn rebuild_skybox(&self, skybox: &mut SkyboxComponent, ctx: &AssemblyContext) -> Result<bool> {
        let previous_groups = skybox.take_gpu_state().map(|state| state.binding_groups);
        let Some(cubemap) = ctx.resources.resolve_texture(skybox.cubemap()) else {
            return Ok(false);
        };

        let cubemap_view = ctx.device.create_texture_view(cubemap.texture())?;
        let bindings = [BindingResource::SampledTexture(cubemap_view.as_ref())];
        let binding_groups = self.write_groups(ctx, ctx.skybox_pipeline, SKYBOX_TEXTURE_SET, previous_groups, &bindings)?;

        skybox.set_gpu_state(SkyboxGpuState { cubemap_view, binding_groups });
        Ok(true)
    }

    /// Update existing per-slot groups, or create them
    fn write_groups(
        &self,
        ctx: &AssemblyContext,
        pipeline: &Arc<dyn Pipeline>,
        set_index: u32,
        previous: Option<Vec<Arc<dyn BindingGroup>>>,
        bindings: &[BindingResource],
    ) -> Result<Vec<Arc<dyn BindingGroup>>> {
        match previous {
            Some(groups) if groups.len() == self.frames_in_flight => {
                for group in &groups {
                    ctx.device.update_binding_group(group, bindings)?;
                }
                Ok(groups)
            }
            _ => (0..self.frames_in_flight)
                .map(|_| ctx.device.create_binding_group(pipeline, set_index, bindings))
                .collect(),
        }
    }

    fn slot_group(groups: Option<&[Arc<dyn BindingGroup>]>, frame_slot: usize) -> Option<Arc<dyn BindingGroup>> {
        let groups = groups?;
        groups.get(frame_slot % groups.len().max(1)).cloned()
    }

    /// Drop entries beyond the maxima, first come first kept
    pub fn truncate(&self, frame: &mut FrameData) {
        if frame.shadows.len() > self.max_shadows || frame.lights.len() > self.max_lights {
            engine_debug!("aurora3d::FrameAssembler", "Dropping {} shadows and {} lights over the limits",
                frame.shadows.len().saturating_sub(self.max_shadows),
                frame.lights.len().saturating_sub(self.max_lights));
        }
        frame.shadows.truncate(self.max_shadows);
        frame.lights.truncate(self.max_lights);
    }
}

#[cfg(test)]
#[path = "frame_assembler_tests.rs"]
mod tests;
