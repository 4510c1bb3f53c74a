use glam::{Mat4, Vec3, Vec4};

use super::AABB;

/// Maps light clip space into shadow-map texture space.
///
/// x and y go from [-1, 1] to [0, 1] with y flipped (texture rows grow
/// downwards); depth is already [0, 1] in wgpu clip space and stays as is.
pub const SHADOW_BIAS: Mat4 = Mat4::from_cols(
    Vec4::new(0.5, 0.0, 0.0, 0.0),
    Vec4::new(0.0, -0.5, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.5, 0.5, 0.0, 1.0),
);

/// Direction used when a caller hands in a degenerate light direction
pub const FALLBACK_LIGHT_DIRECTION: Vec3 = Vec3::NEG_Y;

/// Orthographic view-projection of a directional light, fitted so the
/// bounding sphere of `bounds` lies inside the light frustum.
///
/// `direction` points from the light towards the scene.
pub fn light_view_projection(direction: Vec3, bounds: &AABB) -> Mat4 {
    let direction = direction.try_normalize().unwrap_or(FALLBACK_LIGHT_DIRECTION);
    let center = bounds.center();
    let radius = bounds.bounding_radius().max(1e-3);

    let eye = center - direction * radius * 2.0;
    let up = if direction.dot(Vec3::Y).abs() > 0.99 { Vec3::Z } else { Vec3::Y };

    let view = Mat4::look_at_rh(eye, center, up);
    let projection = Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.0, radius * 4.0);
    projection * view
}

/// Object space to shadow-map texture space for one model
pub fn shadow_map_transform(light_view_projection: &Mat4, model_transform: &Mat4) -> Mat4 {
    SHADOW_BIAS * *light_view_projection * *model_transform
}

/// Inverse-transpose of the upper 3x3, padded back to a 4x4 for uniform layout
pub fn normal_matrix(model_transform: &Mat4) -> Mat4 {
    let linear = glam::Mat3::from_mat4(*model_transform);
    if linear.determinant().abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    Mat4::from_mat3(linear.inverse().transpose())
}
