/// Scene tree node.
///
/// A node holds at most one object and an ordered list of children.
/// Child order is traversal order. Nodes live in the `Scene` arena and
/// refer to each other by key; structural edits that need the whole tree
/// (recursive removal, cycle checks) live on `Scene`.

use slotmap::new_key_type;
use crate::scene::ObjectKey;

new_key_type! {
    /// Stable key for a SceneNode within a Scene
    pub struct NodeKey;
}

/// Display name of a node without an object
pub const EMPTY_NODE_NAME: &str = "<empty node>";

#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    object: Option<ObjectKey>,
    children: Vec<NodeKey>,
}

impl SceneNode {
    pub fn new(object: Option<ObjectKey>) -> Self {
        Self { object, children: Vec::new() }
    }

    pub fn object(&self) -> Option<ObjectKey> {
        self.object
    }

    pub fn set_object(&mut self, object: Option<ObjectKey>) -> Option<ObjectKey> {
        std::mem::replace(&mut self.object, object)
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Append a child
    pub fn insert(&mut self, child: NodeKey) {
        self.children.push(child);
    }

    /// Remove the first occurrence of `child` among the direct children
    pub fn remove_child(&mut self, child: NodeKey) -> bool {
        match self.children.iter().position(|&c| c == child) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }
}
