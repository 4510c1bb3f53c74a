use anyhow::{bail, Result};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::core::GpuContext;
use crate::math::AABB;
use crate::types::Vertex;

/// CPU-side triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.vertices.iter().map(|v| Vec3::from_array(v.position)))
    }

    /// Check the index list forms whole triangles inside the vertex range
    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            bail!("Index count {} is not a multiple of 3", self.indices.len());
        }
        let count = self.vertices.len();
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            bail!("Index {} out of range for {} vertices", bad, count);
        }
        Ok(())
    }

    /// Replace every normal with the area-weighted average of its faces
    pub fn compute_normals(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= sums.len() || b >= sums.len() || c >= sums.len() {
                continue;
            }
            let pa = Vec3::from_array(self.vertices[a].position);
            let pb = Vec3::from_array(self.vertices[b].position);
            let pc = Vec3::from_array(self.vertices[c].position);
            // cross product length is twice the area, which is the weight we want
            let face = (pb - pa).cross(pc - pa);
            sums[a] += face;
            sums[b] += face;
            sums[c] += face;
        }
        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            vertex.normal = sum.normalize_or_zero().to_array();
        }
    }

    /// Append another mesh, rebasing its indices
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Axis-aligned box, outward normals, 24 vertices
    pub fn cuboid(half_extents: Vec3) -> Self {
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = MeshData::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv, uv) in [
                (-1.0f32, -1.0f32, [0.0f32, 1.0f32]),
                (1.0, -1.0, [1.0, 1.0]),
                (1.0, 1.0, [1.0, 0.0]),
                (-1.0, 1.0, [0.0, 0.0]),
            ] {
                let p = (normal + u * su + v * sv) * half_extents;
                mesh.vertices.push(Vertex::new(p.to_array(), normal.to_array(), uv));
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Flat square in the XZ plane facing +Y
    pub fn ground_plane(half_size: f32) -> Self {
        let n = [0.0, 1.0, 0.0];
        let s = half_size;
        MeshData::new(
            vec![
                Vertex::new([-s, 0.0, s], n, [0.0, 1.0]),
                Vertex::new([s, 0.0, s], n, [1.0, 1.0]),
                Vertex::new([s, 0.0, -s], n, [1.0, 0.0]),
                Vertex::new([-s, 0.0, -s], n, [0.0, 0.0]),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }
}

/// GPU model handle: uploaded vertex and index buffers plus draw metadata
pub struct Model {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    bounds: AABB,
    base_color: [f32; 4],
}

impl Model {
    pub fn upload(gpu: &GpuContext, mesh: &MeshData, base_color: [f32; 4], label: &str) -> Result<Self> {
        mesh.validate()?;
        let Some(bounds) = mesh.bounds() else {
            bail!("Model '{}' has no vertices", label);
        };
        if mesh.indices.is_empty() {
            bail!("Model '{}' has no triangles", label);
        }

        let vertex_buffer = gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "Uploaded model '{}': {} vertices, {} triangles",
            label,
            mesh.vertices.len(),
            mesh.triangle_count()
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            bounds,
            base_color,
        })
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn base_color(&self) -> [f32; 4] {
        self.base_color
    }

    pub fn set_base_color(&mut self, base_color: [f32; 4]) {
        self.base_color = base_color;
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Bind buffers and issue the indexed draw
    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_shape() {
        let mesh = MeshData::cuboid(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        mesh.validate().unwrap();

        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_cuboid_winding_matches_normals() {
        let mesh = MeshData::cuboid(Vec3::ONE);
        for tri in mesh.indices.chunks_exact(3) {
            let p: Vec<Vec3> = tri.iter().map(|&i| Vec3::from_array(mesh.vertices[i as usize].position)).collect();
            let face = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
            let normal = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            assert!(face.abs_diff_eq(normal, 1e-5), "face {face} vs normal {normal}");
        }
    }

    #[test]
    fn test_compute_normals_flat_plane() {
        let mut plane = MeshData::ground_plane(2.0);
        for v in &mut plane.vertices {
            v.normal = [0.0; 3];
        }
        plane.compute_normals();
        for v in &plane.vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_validate_rejects_bad_indices() {
        let mut mesh = MeshData::ground_plane(1.0);
        mesh.indices.push(0);
        assert!(mesh.validate().is_err());

        mesh.indices.extend_from_slice(&[1, 9]);
        let err = mesh.validate().unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut mesh = MeshData::ground_plane(1.0);
        mesh.append(&MeshData::ground_plane(1.0));
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(&mesh.indices[6..], &[4, 5, 6, 4, 6, 7]);
        mesh.validate().unwrap();
    }
}
