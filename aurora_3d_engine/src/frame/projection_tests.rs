/// Tests for projection helpers

use super::*;
use crate::scene::{CameraParams, PositionComponent};

fn to_clip(matrix: Mat4, point: Vec3) -> Vec3 {
    let clip = matrix * Vec4::from((point, 1.0));
    clip.truncate() / clip.w
}

// ============================================================================
// Tests: Y flip
// ============================================================================

#[test]
fn test_perspective_flips_y() {
    let gl = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0);
    let vk = vulkan_perspective(1.0, 1.5, 0.1, 100.0);
    assert_eq!(vk.y_axis.y, -gl.y_axis.y);
    assert_eq!(vk.x_axis, gl.x_axis);

    // A point above the view axis lands in the upper half of the framebuffer
    let clip = to_clip(vk, Vec3::new(0.0, 1.0, -5.0));
    assert!(clip.y < 0.0);
    assert!(to_clip(gl, Vec3::new(0.0, 1.0, -5.0)).y > 0.0);
}

#[test]
fn test_orthographic_flips_y() {
    let vk = vulkan_orthographic(4.0, 2.0, 0.1, 10.0);
    let clip = to_clip(vk, Vec3::new(2.0, 1.0, -1.0));
    assert!((clip.x - 1.0).abs() < 1e-5);
    assert!((clip.y + 1.0).abs() < 1e-5);
}

// ============================================================================
// Tests: Light projections
// ============================================================================

#[test]
fn test_point_light_faces_are_distinct() {
    let faces = point_light_view_projections(Vec3::new(1.0, 2.0, 3.0), 20.0);
    for i in 0..6 {
        for j in (i + 1)..6 {
            assert_ne!(faces[i], faces[j], "faces {} and {} match", i, j);
        }
    }
}

#[test]
fn test_point_light_face_sees_its_direction() {
    let origin = Vec3::new(1.0, 2.0, 3.0);
    let faces = point_light_view_projections(origin, 20.0);
    for (face, (direction, _)) in faces.iter().zip(CUBE_FACES) {
        let clip = to_clip(*face, origin + direction * 5.0);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }
}

#[test]
fn test_light_range_is_far_plane() {
    let view_projection = cone_light_view_projection(Vec3::ZERO, Vec3::NEG_Z, 1.0, 10.0);
    let inside = to_clip(view_projection, Vec3::new(0.0, 0.0, -9.9));
    let outside = to_clip(view_projection, Vec3::new(0.0, 0.0, -10.1));
    assert!(inside.z <= 1.0);
    assert!(outside.z > 1.0);
}

#[test]
fn test_view_along_vertical_direction() {
    // Straight down must not degenerate
    let view = view_along(Vec3::ZERO, Vec3::NEG_Y);
    assert!(!view.is_nan());
    let rectangle = rectangle_light_view_projection(Vec3::Y * 5.0, Vec3::NEG_Y, 4.0, 4.0, 10.0);
    assert!(!rectangle.is_nan());
}

// ============================================================================
// Tests: Camera data
// ============================================================================

#[test]
fn test_camera_data_combines_view_and_projection() {
    let position = PositionComponent::new(Vec3::new(0.0, 1.0, 5.0));
    let data = camera_data(&position, &CameraParams::default(), 16.0 / 9.0);

    assert_eq!(data.view_projection, data.projection * data.view);
    assert_eq!(data.position, Vec4::new(0.0, 1.0, 5.0, 1.0));
    assert!(data.projection.y_axis.y < 0.0);
}
