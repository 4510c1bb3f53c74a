mod aabb;
mod transforms;

pub use aabb::AABB;
pub use transforms::{
    light_view_projection, normal_matrix, shadow_map_transform, FALLBACK_LIGHT_DIRECTION,
    SHADOW_BIAS,
};
