/// Tests for DeferredRenderer
///
/// Frames are recorded into a MockCommandList against a
/// MockGraphicsDevice, so recorded commands and device calls can be
/// counted without a GPU.

use super::*;
use glam::Vec3;
use crate::graphics_device::{Texture, TextureFormat};
use crate::graphics_device::mock_graphics_device::{
    MockGraphicsDevice, MockSwapchain, MockCommandList, MockPipeline, MockTexture, MockBuffer,
    MockBindingGroup,
};
use crate::frame::SceneData;
use crate::resource::{MeshDesc, IndexData, MeshKey};
use crate::scene::{Object, LightParams, LightKind, CameraParams, SkyboxComponent};

struct Fixture {
    device: Arc<MockGraphicsDevice>,
    swapchain: MockSwapchain,
    resources: ResourceManager,
    mesh: MeshKey,
}

impl Fixture {
    fn new() -> Self {
        let device = Arc::new(MockGraphicsDevice::new());
        let mut resources = ResourceManager::new();
        let mesh = resources.create_mesh(device.as_ref(), MeshDesc {
            name: "cube".to_string(),
            vertices: vec![0u8; 24 * 32],
            indices: IndexData::U16((0..36).collect()),
        }).unwrap();
        let default_texture = resources.add_texture("default", Arc::new(MockTexture::new(1, 1)) as Arc<dyn Texture>);
        resources.set_default_texture(default_texture);

        Self {
            device,
            swapchain: MockSwapchain::new(800, 600, TextureFormat::B8G8R8A8_SRGB, 3),
            resources,
            mesh,
        }
    }

    fn renderer(&self, config: RendererConfig) -> DeferredRenderer {
        let device: Arc<dyn GraphicsDevice> = self.device.clone();
        DeferredRenderer::new(device, config, pipelines(), &self.swapchain).unwrap()
    }

    fn prop(&self) -> Object {
        let mut object = Object::prop("crate");
        if let Some(model) = object.components_mut().model_mut() {
            model.set_mesh(Some(self.mesh));
        }
        object
    }
}

fn pipelines() -> DeferredPipelines {
    DeferredPipelines {
        shadow: Arc::new(MockPipeline::new("shadow")),
        gbuffer: Arc::new(MockPipeline::new("gbuffer")),
        skybox: Arc::new(MockPipeline::new("skybox")),
        composition: Arc::new(MockPipeline::new("composition")),
    }
}

/// Camera, one point light, and one prop
fn lit_scene(f: &Fixture) -> Scene {
    let mut scene = Scene::new();
    let root = scene.root();
    let camera = scene.insert_object(root, Object::camera("eye", CameraParams::default()).at(Vec3::new(0.0, 2.0, 8.0))).unwrap();
    let camera = scene.node(camera).unwrap().object().unwrap();
    scene.set_camera(camera).unwrap();
    scene.insert_object(root, Object::light("bulb", LightParams::new(LightKind::Point)).at(Vec3::new(0.0, 5.0, 0.0))).unwrap();
    scene.insert_object(root, f.prop()).unwrap();
    scene
}

fn header(buffer: &Arc<dyn Buffer>) -> SceneData {
    let contents = buffer.as_any().downcast_ref::<MockBuffer>().unwrap().contents();
    bytemuck::pod_read_unaligned(&contents[..std::mem::size_of::<SceneData>()])
}

// ============================================================================
// Tests: Creation
// ============================================================================

#[test]
fn test_new_allocates_gbuffer_shadow_maps_and_slots() {
    let f = Fixture::new();
    f.device.clear_calls();
    let renderer = f.renderer(RendererConfig::default());

    assert_eq!(f.device.call_count("create_render_pass"), 2);
    // 3 G-buffer colors + depth, then 8 shadow maps
    assert_eq!(f.device.call_count("create_image"), 4 + 8);
    assert_eq!(f.device.call_count("create_buffer"), 2);
    assert_eq!(f.device.call_count("create_binding_group"), 2 * 4);

    assert_eq!(renderer.frame_slot_count(), 2);
    assert_eq!(renderer.shadow_maps().len(), 8);
    assert_eq!(renderer.uniform_buffer(0).unwrap().size(), FrameData::uniform_size(8, 16));
}

#[test]
fn test_composition_binds_gbuffer_and_shadow_maps() {
    let f = Fixture::new();
    let config = RendererConfig { frames_in_flight: 1, max_shadow_maps: 2, ..RendererConfig::default() };
    let renderer = f.renderer(config);

    let group = renderer.slots[0].composition_group.as_any().downcast_ref::<MockBindingGroup>().unwrap();
    assert_eq!(group.set_index, SCENE_SET);
    assert_eq!(*group.resource_kinds.lock().unwrap(), vec![
        "uniform_buffer", "input_attachment", "input_attachment", "input_attachment",
        "depth_texture", "depth_texture",
    ]);
}

// ============================================================================
// Tests: Frame recording
// ============================================================================

#[test]
fn test_render_frame_records_every_shadow_slot() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    let mut scene = lit_scene(&f);
    let mut cmd = MockCommandList::new();

    let stats = renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 0, &mut cmd).unwrap();

    // 8 shadow slots + scene subgraph
    assert_eq!(cmd.count("begin_render_pass"), 9);
    assert_eq!(cmd.count("begin_render_pass 2048x2048"), 8);
    assert_eq!(cmd.count("begin_render_pass 800x600 clears=5"), 1);
    assert_eq!(cmd.count("next_subpass"), 1);
    assert_eq!(cmd.count("end_render_pass"), 9);

    // Six cube faces draw the prop, the last two slots only clear
    assert_eq!(cmd.count("bind_pipeline shadow"), 6);
    assert_eq!(cmd.count("draw_indexed 36"), 6 + 1);
    assert_eq!(cmd.count("draw 3"), 1);

    assert_eq!(stats.shadow_casters, 6);
    assert_eq!(stats.lights, 6);
    assert_eq!(stats.draw_calls, 8);
    assert_eq!(stats.triangles, 7 * 12);
    assert_eq!(renderer.stats(), stats);
}

#[test]
fn test_render_frame_order_within_scene_pass() {
    let f = Fixture::new();
    let config = RendererConfig { max_shadow_maps: 1, ..RendererConfig::default() };
    let mut renderer = f.renderer(config);
    let mut scene = lit_scene(&f);
    let mut cmd = MockCommandList::new();

    renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 1, &mut cmd).unwrap();

    let scene_start = cmd.commands.iter().rposition(|c| c.starts_with("begin_render_pass")).unwrap();
    let recorded: Vec<&str> = cmd.commands[scene_start..].iter().map(String::as_str).collect();
    assert_eq!(recorded, vec![
        "begin_render_pass 800x600 clears=5",
        "set_viewport",
        "set_scissor",
        "bind_pipeline gbuffer",
        "bind_binding_group 0",
        "bind_binding_group 1",
        "push_constants 128",
        "bind_vertex_buffer",
        "bind_index_buffer",
        "draw_indexed 36",
        "next_subpass",
        "set_viewport",
        "set_scissor",
        "bind_pipeline composition",
        "bind_binding_group 0",
        "draw 3",
        "end_render_pass",
    ]);
}

#[test]
fn test_shadow_pass_pushes_model_and_index() {
    let f = Fixture::new();
    let config = RendererConfig { max_shadow_maps: 1, ..RendererConfig::default() };
    let mut renderer = f.renderer(config);
    let mut scene = lit_scene(&f);
    let mut cmd = MockCommandList::new();

    renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 0, &mut cmd).unwrap();

    let size = std::mem::size_of::<ShadowPushConstants>();
    assert_eq!(cmd.count(&format!("push_constants {}", size)), 1);
}

#[test]
fn test_empty_scene_still_clears_shadow_maps() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    let mut scene = Scene::new();
    let mut cmd = MockCommandList::new();

    let stats = renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 0, &mut cmd).unwrap();

    assert_eq!(cmd.count("begin_render_pass 2048x2048"), 8);
    assert_eq!(cmd.count("draw_indexed"), 0);
    assert_eq!(cmd.count("draw 3"), 1);
    assert_eq!(stats.shadow_casters, 0);
}

#[test]
fn test_skybox_drawn_before_models() {
    let f = Fixture::new();
    let config = RendererConfig { max_shadow_maps: 0, ..RendererConfig::default() };
    let mut renderer = f.renderer(config);
    let mut scene = Scene::new();
    let root = scene.root();
    scene.insert_object(root, Object::world("sky", SkyboxComponent::new(Some(f.mesh), None))).unwrap();
    scene.insert_object(root, f.prop()).unwrap();
    let mut cmd = MockCommandList::new();

    renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 0, &mut cmd).unwrap();

    let skybox = cmd.commands.iter().position(|c| c == "bind_pipeline skybox").unwrap();
    let gbuffer = cmd.commands.iter().position(|c| c == "bind_pipeline gbuffer").unwrap();
    assert!(skybox < gbuffer);
    assert_eq!(cmd.count("draw_indexed 36"), 2);
}

#[test]
fn test_uniforms_uploaded_to_current_slot() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    let mut scene = lit_scene(&f);
    let mut cmd = MockCommandList::new();

    renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 0, &mut cmd).unwrap();

    let uploaded = header(renderer.uniform_buffer(0).unwrap());
    assert_eq!(uploaded.shadow_count, 6);
    assert_eq!(uploaded.light_count, 6);
    assert_eq!(uploaded.camera.position, glam::Vec4::new(0.0, 2.0, 8.0, 1.0));

    // Slot 1 untouched so far
    assert_eq!(header(renderer.uniform_buffer(1).unwrap()).light_count, 0);
}

#[test]
fn test_frame_slot_wraps() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    let mut scene = Scene::new();

    let mut slots = Vec::new();
    for image in 0..3 {
        slots.push(renderer.frame_slot());
        renderer.render_frame(&mut scene, &f.resources, &f.swapchain, image, &mut MockCommandList::new()).unwrap();
    }
    assert_eq!(slots, vec![0, 1, 0]);
    assert_eq!(renderer.frame_slot(), 1);
}

#[test]
fn test_framebuffers_reused_across_frames() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    let mut scene = lit_scene(&f);

    renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 0, &mut MockCommandList::new()).unwrap();
    let created = f.device.call_count("create_framebuffer");
    assert_eq!(created, 8 + 1);

    f.device.clear_calls();
    renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 0, &mut MockCommandList::new()).unwrap();
    assert_eq!(f.device.call_count("create_framebuffer"), 0);
    // Models were clean, nothing rebuilt
    assert_eq!(f.device.call_count("create_texture_view"), 0);
    assert_eq!(f.device.call_count("update_binding_group"), 0);

    assert_eq!(renderer.graph().framebuffer_count(&SubgraphRef::from(SHADOW_SUBGRAPH)), 8);
}

#[test]
fn test_unknown_swapchain_image_fails() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    let mut scene = Scene::new();

    let result = renderer.render_frame(&mut scene, &f.resources, &f.swapchain, 7, &mut MockCommandList::new());
    assert!(result.is_err());
    assert_eq!(renderer.frame_slot(), 0);
}

// ============================================================================
// Tests: Resize and reload
// ============================================================================

#[test]
fn test_resize_event_rebuilds_gbuffer() {
    let mut f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    let bus = EventBus::new();
    renderer.subscribe(&bus);

    assert!(!renderer.handle_events(&f.swapchain).unwrap());

    f.swapchain.recreate(1280, 720, TextureFormat::B8G8R8A8_SRGB);
    bus.publish(EngineEvent::Resized { width: 1280, height: 720 });
    f.device.clear_calls();

    assert!(renderer.handle_events(&f.swapchain).unwrap());
    assert_eq!(f.device.call_count("wait_idle"), 1);
    assert_eq!(f.device.call_count("create_image"), 4);
    assert_eq!(f.device.call_count("create_render_pass"), 0);
    assert_eq!(f.device.call_count("update_binding_group"), 2);

    let albedo = renderer.graph().image(&SubgraphRef::from(SCENE_SUBGRAPH), &TargetRef::from(crate::deferred::ALBEDO_TARGET)).unwrap();
    assert_eq!(albedo.desc().extent, Extent2D::new(1280, 720));

    let mut cmd = MockCommandList::new();
    renderer.render_frame(&mut Scene::new(), &f.resources, &f.swapchain, 0, &mut cmd).unwrap();
    assert_eq!(cmd.count("begin_render_pass 1280x720"), 1);
    assert_eq!(cmd.count("begin_render_pass 2048x2048"), 8);
}

#[test]
fn test_zero_sized_resize_is_ignored() {
    let mut f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    f.swapchain.recreate(0, 0, TextureFormat::B8G8R8A8_SRGB);
    f.device.clear_calls();

    renderer.resize(&f.swapchain).unwrap();
    assert_eq!(f.device.call_count("wait_idle"), 0);
    assert_eq!(f.device.call_count("create_image"), 0);
}

#[test]
fn test_handle_events_without_subscription() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    assert!(!renderer.handle_events(&f.swapchain).unwrap());
}

#[test]
fn test_reload_rebuilds_everything() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    renderer.render_frame(&mut Scene::new(), &f.resources, &f.swapchain, 0, &mut MockCommandList::new()).unwrap();
    f.device.clear_calls();

    renderer.reload(&f.swapchain).unwrap();

    assert_eq!(f.device.call_count("wait_idle"), 1);
    assert_eq!(f.device.call_count("create_render_pass"), 2);
    assert_eq!(f.device.call_count("create_image"), 4 + 8);
    assert_eq!(renderer.frame_slot(), 0);
    assert_eq!(renderer.graph().framebuffer_count(&SubgraphRef::from(SHADOW_SUBGRAPH)), 0);
}

#[test]
fn test_reconfigure_changes_slot_and_shadow_counts() {
    let f = Fixture::new();
    let mut renderer = f.renderer(RendererConfig::default());
    let config = RendererConfig { frames_in_flight: 3, max_shadow_maps: 2, ..RendererConfig::default() };

    renderer.reconfigure(config.clone(), &f.swapchain).unwrap();

    assert_eq!(renderer.config(), &config);
    assert_eq!(renderer.frame_slot_count(), 3);
    assert_eq!(renderer.shadow_maps().len(), 2);

    let mut cmd = MockCommandList::new();
    renderer.render_frame(&mut lit_scene(&f), &f.resources, &f.swapchain, 0, &mut cmd).unwrap();
    assert_eq!(cmd.count("begin_render_pass 2048x2048"), 2);
}
