/// Pre-order depth-first scene traversal.
///
/// Walks the tree with an explicit stack, so depth is bounded by memory
/// rather than the call stack. A node reachable through several parents
/// is visited once: its key goes into the discovered set on first visit
/// and later occurrences are skipped.
///
/// Usable cursor-style (`move_next` / `current`) or as an `Iterator`.

use rustc_hash::FxHashSet;
use crate::scene::{Scene, SceneNode, NodeKey};

pub struct SceneIterator<'a> {
    scene: &'a Scene,
    stack: Vec<NodeKey>,
    discovered: FxHashSet<NodeKey>,
    current: Option<NodeKey>,
}

impl<'a> SceneIterator<'a> {
    /// Traversal of the subtree rooted at `start`
    pub fn new(scene: &'a Scene, start: NodeKey) -> Self {
        Self {
            scene,
            stack: vec![start],
            discovered: FxHashSet::default(),
            current: None,
        }
    }

    /// Node under examination, `None` before the first `move_next` and
    /// after exhaustion
    pub fn current(&self) -> Option<NodeKey> {
        self.current
    }

    pub fn current_node(&self) -> Option<&'a SceneNode> {
        self.current.and_then(|key| self.scene.node(key))
    }

    /// Advance to the next node in pre-order
    ///
    /// Returns false, with `current()` reset to `None`, once exhausted.
    pub fn move_next(&mut self) -> bool {
        while let Some(key) = self.stack.pop() {
            if !self.discovered.insert(key) {
                continue;
            }
            let Some(node) = self.scene.node(key) else { continue };

            // Reversed so the first child is popped first
            self.stack.extend(node.children().iter().rev().copied());
            self.current = Some(key);
            return true;
        }
        self.current = None;
        false
    }
}

impl Iterator for SceneIterator<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        if self.move_next() {
            self.current
        } else {
            None
        }
    }
}
