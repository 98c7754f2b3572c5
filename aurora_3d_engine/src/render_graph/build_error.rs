/// Render graph compilation errors
///
/// Every variant is fatal to `RenderGraphBuilder::build()`. Errors raised
/// while compiling one subgraph are wrapped in `BuildError::Subgraph` so
/// the offending subgraph is always named.

use std::fmt;
use crate::render_graph::{TargetRef, PassRef, SubgraphRef};

#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// A subgraph with this reference was already registered
    DuplicateSubgraph(SubgraphRef),

    /// A pass reads a target that the subgraph does not declare
    MissingAttachment { pass: PassRef, target: TargetRef },

    /// A target names a producing pass that the subgraph does not declare
    UnknownProducer { target: TargetRef, pass: PassRef },

    /// A produced target is neither a color nor a depth-stencil attachment
    UnsupportedTargetType { target: TargetRef },

    /// Image requirements were requested for a target that is not a
    /// freshly allocated image
    UnsupportedTargetSource { target: TargetRef },

    /// A pass produces more than one depth-stencil target
    MultipleDepthOutputs { pass: PassRef },

    /// A subgraph depends on a subgraph that was never registered
    UnknownSubgraph { subgraph: SubgraphRef, dependency: SubgraphRef },

    /// Passes or subgraphs depend on each other
    Cycle(String),

    /// Error raised while compiling one subgraph
    Subgraph { subgraph: SubgraphRef, source: Box<BuildError> },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::DuplicateSubgraph(subgraph) =>
                write!(f, "subgraph '{}' is already registered", subgraph),
            BuildError::MissingAttachment { pass, target } =>
                write!(f, "no attachment for input target '{}' of pass '{}'", target, pass),
            BuildError::UnknownProducer { target, pass } =>
                write!(f, "target '{}' is produced by unknown pass '{}'", target, pass),
            BuildError::UnsupportedTargetType { target } =>
                write!(f, "unsupported target type for '{}'", target),
            BuildError::UnsupportedTargetSource { target } =>
                write!(f, "target '{}' is not an allocated image", target),
            BuildError::MultipleDepthOutputs { pass } =>
                write!(f, "pass '{}' has more than one depth-stencil output", pass),
            BuildError::UnknownSubgraph { subgraph, dependency } =>
                write!(f, "subgraph '{}' depends on unknown subgraph '{}'", subgraph, dependency),
            BuildError::Cycle(what) =>
                write!(f, "dependency cycle at {}", what),
            BuildError::Subgraph { subgraph, source } =>
                write!(f, "subgraph '{}': {}", subgraph, source),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Subgraph { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
