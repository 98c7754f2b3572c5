/// Tests for Mesh upload
///
/// These tests use MockGraphicsDevice to check buffer creation without a GPU.

use super::*;
use crate::graphics_device::mock_graphics_device::{MockGraphicsDevice, MockBuffer};

fn quad_desc() -> MeshDesc {
    MeshDesc {
        name: "quad".to_string(),
        vertices: vec![7u8; 4 * 32],
        indices: IndexData::U16(vec![0, 1, 2, 2, 3, 0]),
    }
}

// ============================================================================
// Upload
// ============================================================================

#[test]
fn test_from_desc_uploads_vertex_and_index_buffers() {
    let device = MockGraphicsDevice::new();
    let mesh = Mesh::from_desc(&device, quad_desc()).unwrap();

    assert_eq!(device.call_count("create_buffer"), 2);
    assert_eq!(mesh.name(), "quad");
    assert_eq!(mesh.index_count(), 6);
    assert_eq!(mesh.index_type(), IndexType::U16);
    assert_eq!(mesh.vertex_buffer().size(), 128);
    assert_eq!(mesh.index_buffer().size(), 12);

    let indices = mesh.index_buffer().as_any().downcast_ref::<MockBuffer>().unwrap();
    assert_eq!(indices.contents()[..4], [0, 0, 1, 0]);
}

#[test]
fn test_u32_indices() {
    let device = MockGraphicsDevice::new();
    let mut desc = quad_desc();
    desc.indices = IndexData::U32(vec![0, 1, 2]);

    let mesh = Mesh::from_desc(&device, desc).unwrap();
    assert_eq!(mesh.index_type(), IndexType::U32);
    assert_eq!(mesh.index_buffer().size(), 12);
}

#[test]
fn test_empty_mesh_fails() {
    let device = MockGraphicsDevice::new();
    let mut desc = quad_desc();
    desc.indices = IndexData::U16(vec![]);

    assert!(Mesh::from_desc(&device, desc).is_err());
    assert_eq!(device.call_count("create_buffer"), 0);
}
