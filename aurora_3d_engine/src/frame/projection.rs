/// Projection helpers for cameras and light-space shadow rendering.
///
/// Every matrix produced here is meant for a GPU pipeline and carries the
/// Vulkan Y flip (clip-space Y points down). Angles are radians.

use glam::{Mat4, Vec3, Vec4};
use crate::frame::CameraData;
use crate::scene::{CameraParams, PositionComponent};

/// Near plane of every shadow projection
pub const SHADOW_NEAR: f32 = 0.05;

/// Cube face directions and up vectors, in +X, -X, +Y, -Y, +Z, -Z order
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

fn flip_y(mut projection: Mat4) -> Mat4 {
    projection.y_axis.y = -projection.y_axis.y;
    projection
}

pub fn vulkan_perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    flip_y(Mat4::perspective_rh(fov_y, aspect, near, far))
}

/// Orthographic projection of a `width` x `height` window centered on the
/// view axis
pub fn vulkan_orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
    let (hw, hh) = (width * 0.5, height * 0.5);
    flip_y(Mat4::orthographic_rh(-hw, hw, -hh, hh, near, far))
}

/// View matrix looking along `direction`, with an up vector that is never
/// parallel to it
pub fn view_along(position: Vec3, direction: Vec3) -> Mat4 {
    let direction = direction.normalize_or(Vec3::NEG_Z);
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 { Vec3::Z } else { Vec3::Y };
    Mat4::look_to_rh(position, direction, up)
}

/// One view-projection per cube face (90 degree square frusta)
pub fn point_light_view_projections(position: Vec3, range: f32) -> [Mat4; 6] {
    let projection = vulkan_perspective(std::f32::consts::FRAC_PI_2, 1.0, SHADOW_NEAR, range);
    CUBE_FACES.map(|(direction, up)| projection * Mat4::look_to_rh(position, direction, up))
}

/// Cone light frustum; `angle` is the full opening angle
pub fn cone_light_view_projection(position: Vec3, direction: Vec3, angle: f32, range: f32) -> Mat4 {
    vulkan_perspective(angle, 1.0, SHADOW_NEAR, range) * view_along(position, direction)
}

pub fn rectangle_light_view_projection(
    position: Vec3,
    direction: Vec3,
    width: f32,
    height: f32,
    range: f32,
) -> Mat4 {
    vulkan_orthographic(width, height, SHADOW_NEAR, range) * view_along(position, direction)
}

/// Shader camera data for a camera object
pub fn camera_data(position: &PositionComponent, params: &CameraParams, aspect: f32) -> CameraData {
    let view = Mat4::look_to_rh(position.translation, position.forward(), position.up());
    let projection = vulkan_perspective(params.fov_y, aspect, params.near, params.far);
    CameraData {
        view,
        projection,
        view_projection: projection * view,
        position: Vec4::from((position.translation, 1.0)),
    }
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
