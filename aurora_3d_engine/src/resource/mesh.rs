//! Resource-level mesh type.
//!
//! A `Mesh` is indexed geometry already uploaded to the GPU: one vertex
//! buffer, one index buffer, and what a draw call needs to consume them.

use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{GraphicsDevice, Buffer, BufferDesc, BufferUsage, IndexType};

/// Index data of a mesh, in the width it will be drawn with
#[derive(Debug, Clone, PartialEq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(indices) => indices.len(),
            IndexData::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index_type(&self) -> IndexType {
        match self {
            IndexData::U16(_) => IndexType::U16,
            IndexData::U32(_) => IndexType::U32,
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(indices) => bytemuck::cast_slice(indices),
            IndexData::U32(indices) => bytemuck::cast_slice(indices),
        }
    }
}

/// Mesh creation descriptor
///
/// `vertices` is raw interleaved vertex data in the layout expected by the
/// geometry pipeline.
#[derive(Debug, Clone)]
pub struct MeshDesc {
    pub name: String,
    pub vertices: Vec<u8>,
    pub indices: IndexData,
}

pub struct Mesh {
    name: String,
    vertex_buffer: Arc<dyn Buffer>,
    index_buffer: Arc<dyn Buffer>,
    index_count: u32,
    index_type: IndexType,
}

impl Mesh {
    /// Upload a mesh through the device
    pub fn from_desc(device: &dyn GraphicsDevice, desc: MeshDesc) -> Result<Self> {
        if desc.vertices.is_empty() || desc.indices.is_empty() {
            engine_bail!("aurora3d::Mesh", "Mesh '{}' has no vertices or no indices", desc.name);
        }

        let vertex_buffer = device.create_buffer(BufferDesc {
            size: desc.vertices.len() as u64,
            usage: BufferUsage::Vertex,
        })?;
        vertex_buffer.update(0, &desc.vertices)?;

        let index_bytes = desc.indices.bytes();
        let index_buffer = device.create_buffer(BufferDesc {
            size: index_bytes.len() as u64,
            usage: BufferUsage::Index,
        })?;
        index_buffer.update(0, index_bytes)?;

        Ok(Self {
            name: desc.name,
            vertex_buffer,
            index_buffer,
            index_count: desc.indices.len() as u32,
            index_type: desc.indices.index_type(),
        })
    }

    /// Wrap buffers that were uploaded elsewhere
    pub fn from_buffers(
        name: impl Into<String>,
        vertex_buffer: Arc<dyn Buffer>,
        index_buffer: Arc<dyn Buffer>,
        index_count: u32,
        index_type: IndexType,
    ) -> Self {
        Self {
            name: name.into(),
            vertex_buffer,
            index_buffer,
            index_count,
            index_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_buffer(&self) -> &Arc<dyn Buffer> {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &Arc<dyn Buffer> {
        &self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
