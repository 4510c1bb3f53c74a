use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::model::MeshData;
use crate::types::Vertex;

use super::LoadedMesh;

/// Corner of an OBJ face: zero-based position, texcoord and normal indices
type Corner = (usize, Option<usize>, Option<usize>);

/// Loads a Wavefront OBJ file.
///
/// Polygons are fan-triangulated; vertices sharing the same
/// position/texcoord/normal triple are merged. Materials are ignored.
pub fn load_obj_file(path: impl AsRef<Path>) -> Result<LoadedMesh> {
    let path = path.as_ref();
    log::info!("Loading OBJ file: {:?}", path);

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read OBJ file: {:?}", path))?;
    parse_obj(&source).with_context(|| format!("Failed to parse OBJ file: {:?}", path))
}

pub fn parse_obj(source: &str) -> Result<LoadedMesh> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut mesh = MeshData::default();
    let mut merged: HashMap<Corner, u32> = HashMap::new();
    let mut missing_normals = false;

    for (line_number, raw_line) in source.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        let mut items = line.split_whitespace();
        let Some(keyword) = items.next() else {
            continue;
        };
        let line_number = line_number + 1;

        match keyword {
            "v" => positions.push(parse_floats::<3>(items, 3, line_number)?),
            "vn" => normals.push(parse_floats::<3>(items, 3, line_number)?),
            "vt" => {
                // v is optional and defaults to 0; OBJ v grows upwards, texture rows downwards
                let [u, v] = parse_floats::<2>(items, 1, line_number)?;
                tex_coords.push([u, 1.0 - v]);
            }
            "f" => {
                let corners = items
                    .map(|item| {
                        parse_corner(item, positions.len(), tex_coords.len(), normals.len())
                            .with_context(|| format!("line {}: bad face corner '{}'", line_number, item))
                    })
                    .collect::<Result<Vec<Corner>>>()?;
                if corners.len() < 3 {
                    bail!("line {}: face needs at least 3 corners", line_number);
                }

                let mut index_of = |corner: Corner| -> u32 {
                    *merged.entry(corner).or_insert_with(|| {
                        let (p, t, n) = corner;
                        missing_normals |= n.is_none();
                        mesh.vertices.push(Vertex::new(
                            positions[p],
                            n.map(|n| normals[n]).unwrap_or([0.0; 3]),
                            t.map(|t| tex_coords[t]).unwrap_or([0.0; 2]),
                        ));
                        (mesh.vertices.len() - 1) as u32
                    })
                };

                let first = index_of(corners[0]);
                for pair in corners[1..].windows(2) {
                    let b = index_of(pair[0]);
                    let c = index_of(pair[1]);
                    mesh.indices.extend_from_slice(&[first, b, c]);
                }
            }
            // groups, smoothing, materials: not needed for a single-colour model
            _ => {}
        }
    }

    if missing_normals {
        log::debug!("OBJ lacks normals on some faces, generating smooth normals");
        mesh.compute_normals();
    }

    log::info!(
        "Parsed OBJ: {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangle_count()
    );

    Ok(LoadedMesh {
        mesh,
        base_color: super::DEFAULT_BASE_COLOR,
    })
}

/// Parse up to `N` numbers, at least `required` of them; missing trailing
/// components stay zero
fn parse_floats<'a, const N: usize>(
    items: impl Iterator<Item = &'a str>,
    required: usize,
    line_number: usize,
) -> Result<[f32; N]> {
    let mut values = [0.0f32; N];
    let mut count = 0;
    for item in items.take(N) {
        values[count] = item
            .parse()
            .with_context(|| format!("line {}: '{}' is not a number", line_number, item))?;
        count += 1;
    }
    if count < required {
        bail!("line {}: expected {} numbers, found {}", line_number, required, count);
    }
    Ok(values)
}

/// Parse `v`, `v/t`, `v//n` or `v/t/n`, resolving negative (relative) indices
fn parse_corner(item: &str, positions: usize, tex_coords: usize, normals: usize) -> Result<Corner> {
    let mut parts = item.split('/');
    let position = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("missing position index"))
        .and_then(|s| resolve_index(s, positions))?;
    let tex_coord = match parts.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, tex_coords)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, normals)?),
        _ => None,
    };
    Ok((position, tex_coord, normal))
}

fn resolve_index(text: &str, len: usize) -> Result<usize> {
    let raw: i64 = text.parse().with_context(|| format!("'{}' is not an index", text))?;
    let resolved = match raw {
        0 => bail!("OBJ indices start at 1"),
        r if r > 0 => r - 1,
        r => len as i64 + r,
    };
    if resolved < 0 || resolved as usize >= len {
        bail!("index {} out of range (have {})", raw, len);
    }
    Ok(resolved as usize)
}
