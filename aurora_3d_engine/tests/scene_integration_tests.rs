//! Integration tests for scene editing and traversal
//!
//! No GPU required.
//!
//! Run with: cargo test --test scene_integration_tests

use std::sync::Arc;
use aurora_3d_engine::aurora3d::event::{EventBus, EngineEvent};
use aurora_3d_engine::aurora3d::scene::{
    Scene, SceneManager, SceneIterator, Object, NodeKey, CameraParams, EMPTY_NODE_NAME,
};

fn recursive_preorder(scene: &Scene, node: NodeKey, out: &mut Vec<NodeKey>) {
    out.push(node);
    for &child in scene.node(node).unwrap().children() {
        recursive_preorder(scene, child, out);
    }
}

/// Tree of `depth` levels with `fanout` children per node
fn grow(scene: &mut Scene, parent: NodeKey, depth: usize, fanout: usize) {
    if depth == 0 {
        return;
    }
    for index in 0..fanout {
        let child = scene.insert_object(parent, Object::prop(format!("n{}_{}", depth, index))).unwrap();
        grow(scene, child, depth - 1, fanout);
    }
}

// ============================================================================
// TRAVERSAL TESTS
// ============================================================================

#[test]
fn test_integration_traversal_matches_recursive_preorder() {
    let mut scene = Scene::new();
    let root = scene.root();
    grow(&mut scene, root, 4, 3);

    let visited: Vec<NodeKey> = scene.iter().collect();
    let mut expected = Vec::new();
    recursive_preorder(&scene, root, &mut expected);

    assert_eq!(visited.len(), 1 + 3 + 9 + 27 + 81);
    assert_eq!(visited, expected);
}

#[test]
fn test_integration_deep_chain_does_not_overflow() {
    let mut scene = Scene::new();
    let mut parent = scene.root();
    for index in 0..100_000 {
        parent = scene.insert_object(parent, Object::prop(format!("link{}", index))).unwrap();
    }

    assert_eq!(scene.iter().count(), 100_001);
    assert_eq!(scene.display_name(parent), "link99999");
}

#[test]
fn test_integration_deep_chain_remove_tip() {
    let mut scene = Scene::new();
    let mut parent = scene.root();
    let mut links = Vec::new();
    for index in 0..100_000 {
        parent = scene.insert_object(parent, Object::prop(format!("link{}", index))).unwrap();
        links.push(parent);
    }

    let destroyed = scene.remove_node(parent);

    assert_eq!(destroyed.len(), 1);
    assert!(scene.node(parent).is_none());
    assert!(scene.node(links[99_998]).unwrap().children().is_empty());
    assert_eq!(scene.iter().count(), 100_000);
}

#[test]
fn test_integration_deep_chain_remove_middle() {
    let mut scene = Scene::new();
    let mut parent = scene.root();
    let mut links = Vec::new();
    for index in 0..100_000 {
        parent = scene.insert_object(parent, Object::prop(format!("link{}", index))).unwrap();
        links.push(parent);
    }

    let destroyed = scene.remove_node(links[50_000]);

    assert_eq!(destroyed.len(), 50_000);
    assert!(scene.node(links[99_999]).is_none());
    assert_eq!(scene.object_count(), 50_000);
    assert_eq!(scene.iter().count(), 50_001);
}

#[test]
fn test_integration_manager_removes_deep_tip() {
    let bus = Arc::new(EventBus::new());
    let mut manager = SceneManager::new(Arc::clone(&bus));
    let mut parent = manager.add_object(Object::prop("link0")).unwrap();
    for index in 1..100_000 {
        parent = manager.scene_mut().insert_object(parent, Object::prop(format!("link{}", index))).unwrap();
    }

    let destroyed = manager.remove_node(parent);

    assert_eq!(destroyed.len(), 1);
    assert_eq!(manager.scene().object_count(), 99_999);
}

#[test]
fn test_integration_cursor_from_subtree() {
    let mut scene = Scene::new();
    let root = scene.root();
    let branch = scene.insert_object(root, Object::prop("branch")).unwrap();
    let leaf = scene.insert_object(branch, Object::prop("leaf")).unwrap();
    scene.insert_object(root, Object::prop("other")).unwrap();

    let mut cursor = SceneIterator::new(&scene, branch);
    assert_eq!(cursor.current(), None);
    assert!(cursor.move_next());
    assert_eq!(cursor.current(), Some(branch));
    assert!(cursor.move_next());
    assert_eq!(cursor.current(), Some(leaf));
    assert!(!cursor.move_next());
    assert_eq!(cursor.current(), None);
}

#[test]
fn test_integration_shared_node_survives_partial_removal() {
    let mut scene = Scene::new();
    let root = scene.root();
    let left = scene.insert_object(root, Object::prop("left")).unwrap();
    let right = scene.insert_object(root, Object::prop("right")).unwrap();
    let shared = scene.insert_object(left, Object::prop("shared")).unwrap();
    scene.insert(right, shared).unwrap();

    assert_eq!(scene.iter().filter(|&n| n == shared).count(), 1);

    let destroyed = scene.remove_node(left);
    assert_eq!(destroyed.len(), 1);
    assert!(scene.node(left).is_none());
    assert!(scene.node(shared).is_some());
    assert_eq!(scene.display_name(shared), "shared");

    let destroyed = scene.remove_node(right);
    assert_eq!(destroyed.len(), 2);
    assert_eq!(scene.object_count(), 0);
    assert_eq!(scene.node_count(), 1);
}

#[test]
fn test_integration_cycle_rejected() {
    let mut scene = Scene::new();
    let root = scene.root();
    let parent = scene.insert_object(root, Object::prop("parent")).unwrap();
    let child = scene.insert_object(parent, Object::prop("child")).unwrap();

    assert!(scene.insert(child, parent).is_err());
    assert!(scene.insert(child, root).is_err());
    assert!(scene.insert(child, child).is_err());
    assert_eq!(scene.iter().count(), 3);
}

#[test]
fn test_integration_empty_node_display_name() {
    let mut scene = Scene::new();
    let root = scene.root();
    let group = scene.create_node(None);
    scene.insert(root, group).unwrap();

    assert_eq!(scene.display_name(group), EMPTY_NODE_NAME);
    assert_eq!(scene.display_name(root), EMPTY_NODE_NAME);
}

// ============================================================================
// SCENE MANAGER TESTS
// ============================================================================

#[test]
fn test_integration_manager_camera_cleared_on_removal() {
    let bus = Arc::new(EventBus::new());
    let events = bus.subscribe();
    let mut manager = SceneManager::new(Arc::clone(&bus));

    let node = manager.add_object(Object::camera("eye", CameraParams::default())).unwrap();
    let camera = manager.scene().node(node).unwrap().object().unwrap();
    manager.set_camera(camera).unwrap();
    assert_eq!(manager.scene().camera_key(), Some(camera));

    let destroyed = manager.remove_node(node);
    assert_eq!(destroyed, vec![camera]);
    assert!(manager.scene().camera().is_none());

    let received = events.drain();
    assert_eq!(received.len(), 2);
    assert!(matches!(received[1], EngineEvent::ObjectDestroyed { object } if object == camera));
}

#[test]
fn test_integration_manager_rejects_non_camera() {
    let mut manager = SceneManager::new(Arc::new(EventBus::new()));
    let node = manager.add_object(Object::prop("crate")).unwrap();
    let prop = manager.scene().node(node).unwrap().object().unwrap();

    assert!(manager.set_camera(prop).is_err());
    assert!(manager.scene().camera_key().is_none());
}
