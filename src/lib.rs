pub mod camera;
pub mod config;
pub mod core;
pub mod loaders;
pub mod math;
pub mod model;
pub mod shading;
pub mod types;

pub use camera::{move_camera_on_keyboard, Camera, CameraShake};
pub use config::{CameraConfig, DemoConfig, FullShaderConfig, ShadowConfig};
pub use model::{MeshData, Model};
pub use shading::{FullShader, ShadowMap, ShadowPass, TextureUnit};
