use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use std::path::Path;

use crate::math::normal_matrix;
use crate::model::MeshData;
use crate::types::Vertex;

use super::LoadedMesh;

/// Loads a glTF file into a single mesh with node transforms baked in
pub fn load_gltf_file(path: impl AsRef<Path>) -> Result<LoadedMesh> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    load_gltf_document(&document, &buffers)
}

/// Same as [`load_gltf_file`] for an in-memory `.gltf`/`.glb`
pub fn load_gltf_slice(bytes: &[u8]) -> Result<LoadedMesh> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).context("Failed to parse glTF data")?;

    load_gltf_document(&document, &buffers)
}

fn load_gltf_document(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<LoadedMesh> {
    log::debug!(
        "glTF: {} scenes, {} nodes, {} meshes, {} materials",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count()
    );

    let mut mesh = MeshData::default();
    let scene = document.default_scene().or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        for node in scene.nodes() {
            process_node(&node, buffers, &Mat4::IDENTITY, &mut mesh)?;
        }
    }

    let base_color = document
        .materials()
        .next()
        .map(|m| m.pbr_metallic_roughness().base_color_factor())
        .unwrap_or(super::DEFAULT_BASE_COLOR);

    if mesh.indices.is_empty() {
        log::warn!("No triangle geometry found in glTF document");
    }
    log::info!(
        "Extracted {} vertices, {} triangles from glTF",
        mesh.vertices.len(),
        mesh.triangle_count()
    );

    Ok(LoadedMesh { mesh, base_color })
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    out: &mut MeshData,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, out)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, out)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    out: &mut MeshData,
) -> Result<()> {
    let normal_transform = normal_matrix(transform);

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();

        let normals: Option<Vec<Vec3>> = reader.read_normals().map(|normals| {
            normals
                .map(|n| normal_transform.transform_vector3(Vec3::from_array(n)).normalize_or_zero())
                .collect()
        });

        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let mut part = MeshData::new(
            positions
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let normal = normals.as_ref().and_then(|n| n.get(i)).copied().unwrap_or(Vec3::ZERO);
                    let uv = uvs.get(i).copied().unwrap_or([0.0, 0.0]);
                    Vertex::new(p.to_array(), normal.to_array(), uv)
                })
                .collect(),
            indices,
        );
        // drop a trailing partial triangle
        part.indices.truncate(part.triangle_count() * 3);
        part.validate().with_context(|| format!("Invalid primitive in mesh {:?}", mesh.name()))?;

        if normals.is_none() {
            part.compute_normals();
        }
        out.append(&part);
    }

    Ok(())
}
