/// Opaque names for targets, passes, and subgraphs.
///
/// Three distinct newtypes so a pass name can never be used where a
/// target name is expected. Ordering is lexical, which is what makes
/// attachment indices and pass order deterministic.

use std::fmt;

macro_rules! graph_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_string())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

graph_ref!(
    /// Name of a render target within its subgraph
    TargetRef
);

graph_ref!(
    /// Name of a pass (subpass) within its subgraph
    PassRef
);

graph_ref!(
    /// Name of a subgraph within the render graph
    SubgraphRef
);
