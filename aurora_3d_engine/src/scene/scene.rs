/// Scene - an arena-backed tree of objects.
///
/// Nodes and objects are stored in slot maps and addressed by stable
/// keys; a key whose entry was destroyed resolves to `None` instead of
/// dangling. The scene owns a root node (no object) and optionally a
/// bound camera object.
///
/// The tree stays acyclic: `insert` rejects an edge that would make a
/// node its own ancestor. A node may still appear under several parents.

use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::error::Result;
use crate::engine_bail;
use crate::scene::{
    SceneNode, NodeKey, Object, ObjectKey, SceneIterator, EMPTY_NODE_NAME,
};

pub struct Scene {
    nodes: SlotMap<NodeKey, SceneNode>,
    objects: SlotMap<ObjectKey, Object>,
    root: NodeKey,
    camera: Option<ObjectKey>,
}

impl Scene {
    /// Empty scene with a root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(None));
        Self {
            nodes,
            objects: SlotMap::with_key(),
            root,
            camera: None,
        }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    // ===== NODES =====

    /// Create a detached node holding `object`
    pub fn create_node(&mut self, object: Option<Object>) -> NodeKey {
        let object = object.map(|object| self.objects.insert(object));
        self.nodes.insert(SceneNode::new(object))
    }

    /// Create a node holding `object` and append it under `parent`
    pub fn insert_object(&mut self, parent: NodeKey, object: Object) -> Result<NodeKey> {
        if !self.nodes.contains_key(parent) {
            engine_bail!("aurora3d::Scene", "insert_object: unknown parent node");
        }
        let node = self.create_node(Some(object));
        self.insert(parent, node)?;
        Ok(node)
    }

    /// Append `child` to the children of `parent`
    pub fn insert(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(child) {
            engine_bail!("aurora3d::Scene", "insert: unknown child node");
        }
        if child == parent || self.is_reachable(child, parent) {
            engine_bail!("aurora3d::Scene", "insert: edge would create a cycle");
        }
        let Some(node) = self.nodes.get_mut(parent) else {
            engine_bail!("aurora3d::Scene", "insert: unknown parent node");
        };
        node.insert(child);
        Ok(())
    }

    /// Detach the first occurrence of `child` in the subtree of `parent`
    ///
    /// Direct children are searched first, then each child's subtree in
    /// order. The node itself is not destroyed.
    pub fn remove(&mut self, parent: NodeKey, child: NodeKey) -> bool {
        let mut stack = vec![parent];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get_mut(key) else { continue };
            if node.remove_child(child) {
                return true;
            }
            // Reversed so the first child's subtree is searched first
            stack.extend(node.children().iter().rev().copied());
        }
        false
    }

    /// Detach `node` from the tree and destroy what is no longer reachable
    ///
    /// Nodes of the detached subtree still reachable from the root through
    /// another parent survive, as do objects held by a surviving node.
    /// Returns the destroyed objects.
    pub fn remove_node(&mut self, node: NodeKey) -> Vec<ObjectKey> {
        if node == self.root || !self.nodes.contains_key(node) {
            return Vec::new();
        }
        self.remove(self.root, node);

        let live: FxHashSet<NodeKey> = self.iter().collect();
        let dead: Vec<NodeKey> = SceneIterator::new(self, node)
            .filter(|key| !live.contains(key))
            .collect();

        let mut candidates = Vec::new();
        for key in dead {
            if let Some(removed) = self.nodes.remove(key) {
                candidates.extend(removed.object());
            }
        }

        let held: FxHashSet<ObjectKey> = self.nodes.values().filter_map(SceneNode::object).collect();
        let mut destroyed = Vec::new();
        for object in candidates {
            if !held.contains(&object) && self.objects.remove(object).is_some() {
                if self.camera == Some(object) {
                    self.camera = None;
                }
                destroyed.push(object);
            }
        }
        destroyed
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `to` is `from` or one of its descendants
    pub fn is_reachable(&self, from: NodeKey, to: NodeKey) -> bool {
        SceneIterator::new(self, from).any(|key| key == to)
    }

    /// Object display name, or a fixed name for empty nodes
    pub fn display_name(&self, node: NodeKey) -> &str {
        self.node_object(node)
            .map(Object::display_name)
            .unwrap_or(EMPTY_NODE_NAME)
    }

    // ===== OBJECTS =====

    pub fn object(&self, key: ObjectKey) -> Option<&Object> {
        self.objects.get(key)
    }

    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut Object> {
        self.objects.get_mut(key)
    }

    pub fn node_object(&self, node: NodeKey) -> Option<&Object> {
        self.nodes.get(node)?.object().and_then(|key| self.objects.get(key))
    }

    pub fn node_object_mut(&mut self, node: NodeKey) -> Option<&mut Object> {
        let key = self.nodes.get(node)?.object()?;
        self.objects.get_mut(key)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Find the first object with this name, in traversal order
    pub fn find_object(&self, name: &str) -> Option<ObjectKey> {
        self.iter()
            .filter_map(|node| self.nodes.get(node)?.object())
            .find(|&key| self.objects.get(key).is_some_and(|o| o.name() == name))
    }

    // ===== CAMERA =====

    /// Bind the camera used for rendering
    ///
    /// Fails if `key` is not a camera object of this scene.
    pub fn set_camera(&mut self, key: ObjectKey) -> Result<()> {
        match self.objects.get(key) {
            Some(object) if object.is_camera() => {
                self.camera = Some(key);
                Ok(())
            }
            Some(object) => {
                engine_bail!("aurora3d::Scene", "set_camera: '{}' is not a camera", object.display_name());
            }
            None => {
                engine_bail!("aurora3d::Scene", "set_camera: unknown object");
            }
        }
    }

    pub fn clear_camera(&mut self) {
        self.camera = None;
    }

    pub fn camera_key(&self) -> Option<ObjectKey> {
        self.camera
    }

    pub fn camera(&self) -> Option<&Object> {
        self.camera.and_then(|key| self.objects.get(key))
    }

    // ===== TRAVERSAL =====

    /// Pre-order traversal from the root
    pub fn iter(&self) -> SceneIterator<'_> {
        SceneIterator::new(self, self.root)
    }

    /// Pre-order traversal of the nodes holding an object
    pub fn objects_in_order(&self) -> Vec<(NodeKey, ObjectKey)> {
        self.iter()
            .filter_map(|node| self.nodes.get(node)?.object().map(|object| (node, object)))
            .collect()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
