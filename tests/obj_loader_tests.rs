use glam::Vec3;
use shadow_scene::loaders::{load_mesh, parse_obj, DEFAULT_BASE_COLOR};

const QUAD: &str = "
# unit quad in the XZ plane
v -1 0  1
v  1 0  1
v  1 0 -1
v -1 0 -1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_quad_is_fan_triangulated() {
        let loaded = parse_obj(QUAD).unwrap();
        let mesh = &loaded.mesh;

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(loaded.base_color, DEFAULT_BASE_COLOR);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_normals_and_flipped_tex_coords_kept() {
        let mesh = parse_obj(QUAD).unwrap().mesh;
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
        assert_eq!(mesh.vertices[0].tex_coord, [0.0, 1.0]);
        assert_eq!(mesh.vertices[2].tex_coord, [1.0, 0.0]);
    }

    #[test]
    fn test_tex_coord_with_only_u() {
        let source = "
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5
f 1/1 2/1 3/1
";
        let mesh = parse_obj(source).unwrap().mesh;
        // missing v is 0, flipped to texture rows
        assert_eq!(mesh.vertices[0].tex_coord, [0.5, 1.0]);
    }

    #[test]
    fn test_shared_corners_are_merged() {
        let source = "
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3
f 1 3 4
";
        let mesh = parse_obj(source).unwrap().mesh;
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_distinct_normals_split_vertices() {
        let source = "
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 0 -1
f 1//1 2//1 3//1
f 1//2 3//2 2//2
";
        let mesh = parse_obj(source).unwrap().mesh;
        assert_eq!(mesh.vertices.len(), 6);
    }

    #[test]
    fn test_negative_indices_are_relative() {
        let source = "
v 0 0 0
v 1 0 0
v 0 0 -1
f -3 -2 -1
";
        let mesh = parse_obj(source).unwrap().mesh;
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[2].position, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_missing_normals_are_generated() {
        let source = "
v 0 0 0
v 1 0 0
v 0 0 -1
f 1 2 3
";
        let mesh = parse_obj(source).unwrap().mesh;
        for v in &mesh.vertices {
            assert!(Vec3::from_array(v.normal).abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn test_unknown_statements_ignored() {
        let source = "
mtllib scene.mtl
o thing
g group
s 1
usemtl red
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        assert_eq!(parse_obj(source).unwrap().mesh.triangle_count(), 1);
    }

    #[test]
    fn test_bad_input_reports_line() {
        let err = parse_obj("v 0 0 0\nv 1 0 zero\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));

        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(format!("{:#}", err).contains("at least 3"));

        let err = parse_obj("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(format!("{:#}", err).contains("out of range"));
    }

    #[test]
    fn test_empty_source_gives_empty_mesh() {
        let mesh = parse_obj("# nothing here\n").unwrap().mesh;
        assert!(mesh.vertices.is_empty());
        assert!(mesh.bounds().is_none());
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_load_mesh_by_extension() {
        let path = std::env::temp_dir().join(format!("shadow_scene_quad_{}.obj", std::process::id()));
        std::fs::write(&path, QUAD).unwrap();

        let loaded = load_mesh(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.mesh.triangle_count(), 2);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = load_mesh("model.fbx").unwrap_err();
        assert!(err.to_string().contains("Unsupported model format"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_mesh("/no/such/dir/model.obj").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read OBJ file"));
    }
}
