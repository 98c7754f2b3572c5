/// Graphics pipeline handle
///
/// Pipelines are built by the host application (shaders and fixed-function
/// state are outside the engine core). The core binds them and allocates
/// binding groups against their set layouts.

use std::any::Any;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

/// Index element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    /// Size of one index in bytes
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Graphics pipeline
pub trait Pipeline: Send + Sync {
    /// Number of descriptor set layouts (binding group slots) the pipeline declares
    fn binding_group_layout_count(&self) -> u32;

    fn as_any(&self) -> &dyn Any;
}
