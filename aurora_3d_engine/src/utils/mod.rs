/// Generic utilities shared by engine subsystems

pub mod topological_sort;

pub use topological_sort::{TopologicalSort, CycleError};
