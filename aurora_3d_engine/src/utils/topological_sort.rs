/// Dependency ordering with cycle detection.
///
/// Orders items so that every item comes after all of its dependencies.
/// Used by the render graph builder for pass order inside a subgraph and
/// for the global subgraph order.
///
/// Each item is in one of three states:
/// - absent from `marks`: not visited yet
/// - `false`: visit in progress (on the current DFS path)
/// - `true`: done, already appended to the result
///
/// Reaching an in-progress item again means the dependency relation has a
/// cycle; the sort stops and reports the revisited item.
///
/// # Example
///
/// ```
/// use aurora_3d_engine::aurora3d::utils::TopologicalSort;
///
/// let mut sort = TopologicalSort::new();
/// let order = sort.sort(["lighting", "gbuffer"], |item| match *item {
///     "lighting" => vec!["gbuffer"],
///     _ => vec![],
/// }).unwrap();
/// assert_eq!(order, &["gbuffer", "lighting"]);
/// ```

use std::fmt;
use std::hash::Hash;
use rustc_hash::FxHashMap;

/// A dependency cycle was found while sorting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<T> {
    /// Item reached twice on the same dependency path
    pub item: T,
}

impl<T: fmt::Debug> fmt::Display for CycleError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dependency cycle detected at {:?}", self.item)
    }
}

impl<T: fmt::Debug> std::error::Error for CycleError<T> {}

/// Reusable depth-first topological sorter
///
/// Marks and results persist across calls to `sort()` so several
/// disconnected item sets can be merged into one order; call `reset()`
/// to start over.
pub struct TopologicalSort<T> {
    marks: FxHashMap<T, bool>,
    result: Vec<T>,
}

impl<T: Clone + Eq + Hash> TopologicalSort<T> {
    pub fn new() -> Self {
        Self {
            marks: FxHashMap::default(),
            result: Vec::new(),
        }
    }

    /// Order `items` (and everything they transitively depend on)
    ///
    /// `dependencies` returns the direct dependencies of an item. Items are
    /// visited in the order given, dependencies in the order returned, so
    /// the output is deterministic for deterministic inputs.
    ///
    /// Returns the full accumulated order, dependencies first.
    pub fn sort<I, F>(&mut self, items: I, mut dependencies: F) -> Result<&[T], CycleError<T>>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> Vec<T>,
    {
        for item in items {
            self.visit(item, &mut dependencies)?;
        }
        Ok(&self.result)
    }

    fn visit<F>(&mut self, item: T, dependencies: &mut F) -> Result<(), CycleError<T>>
    where
        F: FnMut(&T) -> Vec<T>,
    {
        match self.marks.get(&item) {
            Some(true) => return Ok(()),
            Some(false) => return Err(CycleError { item }),
            None => {}
        }

        self.marks.insert(item.clone(), false);
        for dependency in dependencies(&item) {
            self.visit(dependency, dependencies)?;
        }
        self.marks.insert(item.clone(), true);
        self.result.push(item);

        Ok(())
    }

    /// Accumulated order so far
    pub fn result(&self) -> &[T] {
        &self.result
    }

    /// Whether `item` has been fully ordered
    pub fn is_sorted(&self, item: &T) -> bool {
        self.marks.get(item).copied().unwrap_or(false)
    }

    /// Forget all marks and results
    pub fn reset(&mut self) {
        self.marks.clear();
        self.result.clear();
    }

    /// Consume the sorter, returning the accumulated order
    pub fn into_result(self) -> Vec<T> {
        self.result
    }
}

impl<T: Clone + Eq + Hash> Default for TopologicalSort<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "topological_sort_tests.rs"]
mod tests;
