use std::mem::{offset_of, size_of};

use shadow_scene::shading::{full_shader_source, TextureUnit, MAX_TEXTURE_UNITS, SHADOW_SHADER_SOURCE};
use shadow_scene::types::{DepthUniforms, FullUniforms};

fn parse_and_validate(source: &str) -> naga::Module {
    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(e) => panic!("WGSL parse failed:\n{}", e.emit_to_string(source)),
    };
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!("WGSL validation failed: {e:?}");
    }
    module
}

/// Size and member offsets of a named WGSL struct
fn struct_layout(module: &naga::Module, name: &str) -> (u32, Vec<(String, u32)>) {
    let ty = module
        .types
        .iter()
        .map(|(_, ty)| ty)
        .find(|ty| ty.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("struct {name} not declared"));

    match &ty.inner {
        naga::TypeInner::Struct { members, span } => (
            *span,
            members
                .iter()
                .map(|m| (m.name.clone().unwrap_or_default(), m.offset))
                .collect(),
        ),
        other => panic!("{name} is not a struct: {other:?}"),
    }
}

fn binding_of(module: &naga::Module, name: &str) -> naga::ResourceBinding {
    module
        .global_variables
        .iter()
        .map(|(_, var)| var)
        .find(|var| var.name.as_deref() == Some(name))
        .and_then(|var| var.binding.clone())
        .unwrap_or_else(|| panic!("global {name} has no binding"))
}

#[cfg(test)]
mod full_shader_source_tests {
    use super::*;

    #[test]
    fn test_every_texture_unit_validates() {
        for unit in 1..MAX_TEXTURE_UNITS {
            let module = parse_and_validate(&full_shader_source(TextureUnit(unit)));

            let map = binding_of(&module, "shadow_map");
            let sampler = binding_of(&module, "shadow_sampler");
            assert_eq!((map.group, map.binding), (unit, 0));
            assert_eq!((sampler.group, sampler.binding), (unit, 1));

            let uniforms = binding_of(&module, "u");
            assert_eq!((uniforms.group, uniforms.binding), (0, 0));
        }
    }

    #[test]
    fn test_uniform_layout_matches_rust_struct() {
        let module = parse_and_validate(&full_shader_source(TextureUnit::default()));
        let (size, members) = struct_layout(&module, "FullUniforms");

        assert_eq!(size as usize, size_of::<FullUniforms>());

        let expected = [
            ("model_view_projection", offset_of!(FullUniforms, model_view_projection)),
            ("shadow_map_transform", offset_of!(FullUniforms, shadow_map_transform)),
            ("model", offset_of!(FullUniforms, model)),
            ("normal", offset_of!(FullUniforms, normal)),
            ("to_light", offset_of!(FullUniforms, to_light)),
            ("ambient", offset_of!(FullUniforms, ambient)),
            ("base_color", offset_of!(FullUniforms, base_color)),
            ("shade", offset_of!(FullUniforms, shade)),
            ("shadow_bias", offset_of!(FullUniforms, shadow_bias)),
            ("shadow_texel", offset_of!(FullUniforms, shadow_texel)),
        ];
        for (name, offset) in expected {
            let (_, wgsl_offset) = members
                .iter()
                .find(|(member, _)| member == name)
                .unwrap_or_else(|| panic!("member {name} missing from WGSL struct"));
            assert_eq!(*wgsl_offset as usize, offset, "offset of {name}");
        }
    }

    #[test]
    fn test_entry_points_present() {
        let module = parse_and_validate(&full_shader_source(TextureUnit(1)));
        let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"vs_main"));
        assert!(names.contains(&"fs_main"));
    }
}

#[cfg(test)]
mod shadow_shader_source_tests {
    use super::*;

    #[test]
    fn test_shadow_shader_validates() {
        let module = parse_and_validate(SHADOW_SHADER_SOURCE);
        let (size, _) = struct_layout(&module, "DepthUniforms");
        assert_eq!(size as usize, size_of::<DepthUniforms>());

        let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["vs_main"]);
    }
}
