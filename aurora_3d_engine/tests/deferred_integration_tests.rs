//! Integration tests for the deferred renderer
//!
//! Frames are recorded end to end against the headless device: scene
//! assembly, shadow maps, G-buffer fill, and composition.
//!
//! Run with: cargo test --test deferred_integration_tests


use std::sync::Arc;
use aurora_3d_engine::aurora3d::GraphicsDevice;
use aurora_3d_engine::aurora3d::event::{EventBus, EngineEvent};
use aurora_3d_engine::aurora3d::frame::{FrameData, SceneData};
use aurora_3d_engine::aurora3d::render::Buffer;
use aurora_3d_engine::aurora3d::resource::{ResourceManager, MeshDesc, IndexData, MeshKey, TextureKey};
use aurora_3d_engine::aurora3d::scene::{
    Scene, Object, CameraParams, LightParams, LightKind, SkyboxComponent,
};
use aurora_3d_engine::aurora3d::deferred::{DeferredRenderer, DeferredPipelines, RendererConfig};
use aurora_3d_engine::glam::Vec3;
use headless_device::{
    HeadlessDevice, HeadlessSwapchain, HeadlessPipeline, HeadlessTexture, HeadlessBuffer,
    RecordingCommandList,
};

struct World {
    device: Arc<HeadlessDevice>,
    swapchain: HeadlessSwapchain,
    resources: ResourceManager,
    cube: MeshKey,
    brick: TextureKey,
}

impl World {
    fn new() -> Self {
        let device = HeadlessDevice::new();
        let mut resources = ResourceManager::new();
        let cube = resources.create_mesh(device.as_ref(), MeshDesc {
            name: "cube".to_string(),
            vertices: vec![0u8; 24 * 32],
            indices: IndexData::U32((0..36).collect()),
        }).unwrap();
        let white = resources.add_texture("white", HeadlessTexture::new(1, 1));
        resources.set_default_texture(white);
        let brick = resources.add_texture("brick", HeadlessTexture::new(256, 256));

        Self {
            device,
            swapchain: HeadlessSwapchain::new(1280, 720, 3),
            resources,
            cube,
            brick,
        }
    }

    fn renderer(&self, config: RendererConfig) -> DeferredRenderer {
        let device: Arc<dyn GraphicsDevice> = self.device.clone();
        let pipelines = DeferredPipelines {
            shadow: HeadlessPipeline::new("shadow"),
            gbuffer: HeadlessPipeline::new("gbuffer"),
            skybox: HeadlessPipeline::new("skybox"),
            composition: HeadlessPipeline::new("composition"),
        };
        DeferredRenderer::new(device, config, pipelines, &self.swapchain).unwrap()
    }

    fn crate_at(&self, name: &str, position: Vec3) -> Object {
        let mut object = Object::prop(name).at(position);
        if let Some(model) = object.components_mut().model_mut() {
            model.set_mesh(Some(self.cube));
            model.set_albedo(Some(self.brick));
        }
        object
    }

    /// Camera, two spot lights, three crates
    fn courtyard(&self) -> Scene {
        let mut scene = Scene::new();
        let root = scene.root();
        let eye = scene.insert_object(root, Object::camera("eye", CameraParams::default()).at(Vec3::new(0.0, 3.0, 10.0))).unwrap();
        let eye = scene.node(eye).unwrap().object().unwrap();
        scene.set_camera(eye).unwrap();

        let spot = LightParams::new(LightKind::Cone { angle: 0.8 }).with_range(40.0);
        scene.insert_object(root, Object::light("spot_a", spot).at(Vec3::new(-4.0, 6.0, 0.0))).unwrap();
        scene.insert_object(root, Object::light("spot_b", spot).at(Vec3::new(4.0, 6.0, 0.0))).unwrap();

        let pile = scene.insert_object(root, self.crate_at("crate_0", Vec3::ZERO)).unwrap();
        scene.insert_object(pile, self.crate_at("crate_1", Vec3::new(0.0, 1.0, 0.0))).unwrap();
        scene.insert_object(pile, self.crate_at("crate_2", Vec3::new(0.0, 2.0, 0.0))).unwrap();
        scene
    }
}

fn scene_header(buffer: &Arc<dyn Buffer>) -> SceneData {
    let headless = buffer.as_any().downcast_ref::<HeadlessBuffer>().unwrap();
    let contents = headless.data.lock().unwrap();
    bytemuck::pod_read_unaligned(&contents[..std::mem::size_of::<SceneData>()])
}

// ============================================================================
// FRAME TESTS
// ============================================================================

#[test]
fn test_integration_courtyard_frame() {
    let world = World::new();
    let config = RendererConfig { max_shadow_maps: 4, ..RendererConfig::default() };
    let mut renderer = world.renderer(config);
    let mut scene = world.courtyard();
    let mut cmd = RecordingCommandList::default();

    let stats = renderer.render_frame(&mut scene, &world.resources, &world.swapchain, 0, &mut cmd).unwrap();

    assert_eq!(stats.shadow_casters, 2);
    assert_eq!(stats.lights, 2);
    // 2 shadow slots x 3 crates, 3 G-buffer crates, 1 composition triangle
    assert_eq!(stats.draw_calls, 10);
    assert_eq!(stats.triangles, 9 * 12);

    assert_eq!(cmd.count("begin 2048x2048"), 4);
    assert_eq!(cmd.count("begin 1280x720"), 1);
    assert_eq!(cmd.count("draw_indexed 36"), 9);
    assert_eq!(cmd.count("draw 3"), 1);

    let tail: Vec<&str> = cmd.commands.iter().rev().take(3).rev().map(String::as_str).collect();
    assert_eq!(tail, vec!["pipeline composition", "draw 3", "end"]);

    let header = scene_header(renderer.uniform_buffer(0).unwrap());
    assert_eq!(header.shadow_count, 2);
    assert_eq!(header.light_count, 2);
    assert_eq!(renderer.uniform_buffer(0).unwrap().size(), FrameData::uniform_size(4, 16));
}

#[test]
fn test_integration_textures_built_once_across_frames() {
    let world = World::new();
    let mut renderer = world.renderer(RendererConfig::default());
    let mut scene = world.courtyard();

    world.device.clear();
    for image_idx in 0..3 {
        let mut cmd = RecordingCommandList::default();
        renderer.render_frame(&mut scene, &world.resources, &world.swapchain, image_idx, &mut cmd).unwrap();
    }

    // Two views and one group per frame slot for each crate, first frame only
    assert_eq!(world.device.count("create_texture_view"), 3 * 2);
    assert_eq!(world.device.count("create_binding_group"), 3 * 2);
    assert_eq!(world.device.count("update_binding_group"), 0);
    assert_eq!(renderer.frame_slot(), 1);
}

#[test]
fn test_integration_texture_swap_updates_in_place() {
    let world = World::new();
    let mut renderer = world.renderer(RendererConfig::default());
    let mut scene = world.courtyard();
    let mut cmd = RecordingCommandList::default();
    renderer.render_frame(&mut scene, &world.resources, &world.swapchain, 0, &mut cmd).unwrap();

    let target = scene.find_object("crate_1").unwrap();
    let model = scene.object_mut(target).unwrap().components_mut().model_mut().unwrap();
    model.set_specular(Some(world.brick));

    world.device.clear();
    let mut cmd = RecordingCommandList::default();
    renderer.render_frame(&mut scene, &world.resources, &world.swapchain, 1, &mut cmd).unwrap();

    assert_eq!(world.device.count("create_texture_view"), 2);
    assert_eq!(world.device.count("update_binding_group"), 2);
    assert_eq!(world.device.count("create_binding_group"), 0);
}

#[test]
fn test_integration_skybox_drawn_before_geometry() {
    let world = World::new();
    let mut renderer = world.renderer(RendererConfig::default());
    let mut scene = world.courtyard();
    let root = scene.root();
    scene.insert_object(root, Object::world("sky", SkyboxComponent::new(Some(world.cube), Some(world.brick)))).unwrap();

    let mut cmd = RecordingCommandList::default();
    let stats = renderer.render_frame(&mut scene, &world.resources, &world.swapchain, 0, &mut cmd).unwrap();

    let skybox = cmd.commands.iter().position(|c| c == "pipeline skybox").unwrap();
    let gbuffer = cmd.commands.iter().position(|c| c == "pipeline gbuffer").unwrap();
    assert!(skybox < gbuffer);
    assert_eq!(stats.draw_calls, 11);
}

// ============================================================================
// RESIZE TESTS
// ============================================================================

#[test]
fn test_integration_resize_event_then_frame() {
    let mut world = World::new();
    let bus = EventBus::new();
    let mut renderer = world.renderer(RendererConfig::default());
    renderer.subscribe(&bus);
    let mut scene = world.courtyard();

    world.swapchain.resize(1920, 1080, 3);
    bus.publish(EngineEvent::Resized { width: 1920, height: 1080 });
    assert!(renderer.handle_events(&world.swapchain).unwrap());
    assert!(!renderer.handle_events(&world.swapchain).unwrap());

    let mut cmd = RecordingCommandList::default();
    renderer.render_frame(&mut scene, &world.resources, &world.swapchain, 2, &mut cmd).unwrap();
    assert_eq!(cmd.count("begin 1920x1080"), 1);
    assert_eq!(cmd.count("begin 2048x2048"), 8);
}

#[test]
fn test_integration_reload_restarts_slots() {
    let world = World::new();
    let mut renderer = world.renderer(RendererConfig::default());
    let mut scene = world.courtyard();
    let mut cmd = RecordingCommandList::default();
    renderer.render_frame(&mut scene, &world.resources, &world.swapchain, 0, &mut cmd).unwrap();
    assert_eq!(renderer.frame_slot(), 1);

    world.device.clear();
    renderer.reload(&world.swapchain).unwrap();
    assert_eq!(renderer.frame_slot(), 0);
    assert_eq!(world.device.count("wait_idle"), 1);
    assert_eq!(world.device.count("create_render_pass"), 2);

    let mut cmd = RecordingCommandList::default();
    assert!(renderer.render_frame(&mut scene, &world.resources, &world.swapchain, 0, &mut cmd).is_ok());
}
