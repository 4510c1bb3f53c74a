pub mod gltf;
pub mod obj;

use std::path::Path;

use anyhow::{bail, Result};

use crate::core::GpuContext;
use crate::model::{MeshData, Model};

pub use self::gltf::{load_gltf_file, load_gltf_slice};
pub use self::obj::{load_obj_file, parse_obj};

/// Light grey used when a file carries no material colour
pub const DEFAULT_BASE_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Mesh read from disk plus the colour it asked for
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMesh {
    pub mesh: MeshData,
    pub base_color: [f32; 4],
}

/// Load a mesh, picking the format from the file extension
pub fn load_mesh(path: impl AsRef<Path>) -> Result<LoadedMesh> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("obj") => load_obj_file(path),
        Some("gltf") | Some("glb") => load_gltf_file(path),
        _ => bail!("Unsupported model format: {:?}", path),
    }
}

/// Load a mesh and upload it as a drawable model
pub fn load_model(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let loaded = load_mesh(path)?;
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    Model::upload(gpu, &loaded.mesh, loaded.base_color, label)
}
