pub mod full;
pub mod shadow;
mod uniform_ring;

pub use full::{full_shader_source, FullShader, TextureUnit, DEPTH_FORMAT, MAX_TEXTURE_UNITS};
pub use shadow::{ShadowMap, ShadowPass, SHADOW_FORMAT, SHADOW_SHADER_SOURCE};
pub use uniform_ring::UniformRing;
