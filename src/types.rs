use glam::{Mat4, Vec3};

use crate::math::normal_matrix;

/// Mesh vertex as laid out in the vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-draw uniforms of the full shading pass
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FullUniforms {
    pub model_view_projection: [[f32; 4]; 4],
    pub shadow_map_transform: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// Towards the light, normalised
    pub to_light: [f32; 3],
    pub ambient: f32,
    pub base_color: [f32; 4],
    pub shade: f32,
    pub shadow_bias: f32,
    pub shadow_texel: f32,
    pub _pad: f32,
}

/// Lighting terms shared by every draw of a frame
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightParams {
    /// Direction the light travels
    pub direction: Vec3,
    pub ambient: f32,
    pub shadow_bias: f32,
    /// Edge length of the shadow map in texels
    pub shadow_map_size: u32,
}

impl FullUniforms {
    pub fn new(
        model_view_projection: &Mat4,
        shadow_map_transform: &Mat4,
        model_transform: &Mat4,
        base_color: [f32; 4],
        shade: f32,
        light: &LightParams,
    ) -> Self {
        let to_light = -light
            .direction
            .try_normalize()
            .unwrap_or(crate::math::FALLBACK_LIGHT_DIRECTION);

        Self {
            model_view_projection: model_view_projection.to_cols_array_2d(),
            shadow_map_transform: shadow_map_transform.to_cols_array_2d(),
            model: model_transform.to_cols_array_2d(),
            normal: normal_matrix(model_transform).to_cols_array_2d(),
            to_light: to_light.to_array(),
            ambient: light.ambient.clamp(0.0, 1.0),
            base_color,
            shade: sanitize_shade(shade),
            shadow_bias: light.shadow_bias,
            shadow_texel: 1.0 / light.shadow_map_size.max(1) as f32,
            _pad: 0.0,
        }
    }
}

/// Shade must be a finite, non-negative intensity
pub fn sanitize_shade(shade: f32) -> f32 {
    if shade.is_finite() {
        shade.max(0.0)
    } else {
        0.0
    }
}

/// Per-draw uniforms of the shadow depth pass
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DepthUniforms {
    pub light_model_view_projection: [[f32; 4]; 4],
}
