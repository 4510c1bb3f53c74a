// config.rs - Tunables for the camera and shading passes, loadable from JSON
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Radians; 0 looks down +Z, PI looks down -Z
    pub yaw: f32,
    /// Radians, positive looks up
    pub pitch: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub viewport: [u32; 2],
    /// World units per second
    pub speed: f32,
    /// Radians per pixel of mouse travel
    pub mouse_sensitivity: f32,
    pub shake_magnitude: f32,
    /// New shake targets per second
    pub shake_rate: f32,
    /// Fixed seed for reproducible shake; random when absent
    pub shake_seed: Option<u64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, 8.0],
            yaw: std::f32::consts::PI,
            pitch: 0.0,
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 500.0,
            viewport: [800, 600],
            speed: 5.0,
            mouse_sensitivity: 0.005,
            shake_magnitude: 0.0,
            shake_rate: 4.0,
            shake_seed: None,
        }
    }
}

impl CameraConfig {
    /// Reject projections that would collapse depth or invert the frustum
    pub fn validate(&self) -> Result<()> {
        if self.near.is_nan() || self.near <= 0.0 {
            bail!("Camera near plane must be positive, got {}", self.near);
        }
        if self.far.is_nan() || self.far <= self.near {
            bail!("Camera far plane {} must lie beyond near plane {}", self.far, self.near);
        }
        let fov = self.fov_y_degrees;
        if fov.is_nan() || fov <= 0.0 || fov >= 180.0 {
            bail!("Camera field of view must be inside (0, 180) degrees, got {}", fov);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullShaderConfig {
    /// Direction the light travels, from the light towards the scene
    pub light_direction: [f32; 3],
    /// Fraction of the base colour that survives in full shadow
    pub ambient: f32,
    /// Depth offset subtracted before the shadow comparison
    pub shadow_bias: f32,
    /// Capacity of the per-draw uniform ring
    pub max_draws_per_frame: u32,
    pub cull_back_faces: bool,
}

impl Default for FullShaderConfig {
    fn default() -> Self {
        Self {
            light_direction: [-0.4, -1.0, -0.3],
            ambient: 0.25,
            shadow_bias: 0.002,
            max_draws_per_frame: 256,
            cull_back_faces: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Edge length of the square depth map in texels
    pub map_size: u32,
    pub depth_bias_constant: i32,
    pub depth_bias_slope_scale: f32,
    pub max_draws_per_frame: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 2048,
            depth_bias_constant: 2,
            depth_bias_slope_scale: 2.0,
            max_draws_per_frame: 256,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub camera: CameraConfig,
    pub full_shader: FullShaderConfig,
    pub shadow: ShadowConfig,
}

impl DemoConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse demo configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.camera.validate().context("Invalid camera configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = DemoConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = DemoConfig::from_json_str(
            r#"{ "camera": { "fov_y_degrees": 75.0, "shake_seed": 7 }, "shadow": { "map_size": 512 } }"#,
        )
        .unwrap();

        assert_eq!(config.camera.fov_y_degrees, 75.0);
        assert_eq!(config.camera.shake_seed, Some(7));
        assert_eq!(config.camera.near, CameraConfig::default().near);
        assert_eq!(config.shadow.map_size, 512);
        assert_eq!(config.full_shader, FullShaderConfig::default());
    }

    #[test]
    fn test_default_camera_is_valid() {
        CameraConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_non_positive_near() {
        for near in [0.0, -1.0, f32::NAN] {
            let config = CameraConfig { near, ..CameraConfig::default() };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("near plane"), "near {near}: {err}");
        }
    }

    #[test]
    fn test_rejects_far_not_beyond_near() {
        let config = CameraConfig { near: 1.0, far: 1.0, ..CameraConfig::default() };
        assert!(config.validate().unwrap_err().to_string().contains("far plane"));

        let config = CameraConfig { near: 1.0, far: 0.5, ..CameraConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_field_of_view_out_of_range() {
        for fov_y_degrees in [0.0, -30.0, 180.0, 270.0] {
            let config = CameraConfig { fov_y_degrees, ..CameraConfig::default() };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("field of view"), "fov {fov_y_degrees}: {err}");
        }
    }

    #[test]
    fn test_json_with_zero_near_is_rejected() {
        let err = DemoConfig::from_json_str(r#"{ "camera": { "near": 0.0 } }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("near plane"));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(DemoConfig::from_json_str("{ camera: ").is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = DemoConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut config = DemoConfig::default();
        config.full_shader.ambient = 0.5;
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(DemoConfig::from_json_str(&json).unwrap(), config);
    }
}
