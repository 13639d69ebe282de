//! The cube shader parses and validates, and its interface matches the
//! CPU-side layouts.

use morphfield::shader::{Instance, Uniforms, Vertex, CUBE_SHADER};

fn parse() -> naga::Module {
    match naga::front::wgsl::parse_str(CUBE_SHADER) {
        Ok(module) => module,
        Err(e) => panic!("{}", e.emit_to_string(CUBE_SHADER)),
    }
}

#[test]
fn cube_shader_validates() {
    let module = parse();
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!("{}", e.emit_to_string(CUBE_SHADER));
    }
}

#[test]
fn cube_shader_entry_points() {
    let module = parse();
    let names: Vec<(&str, naga::ShaderStage)> = module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect();
    assert!(names.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(names.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

#[test]
fn vertex_inputs_match_buffer_layouts() {
    let module = parse();
    let vs = module
        .entry_points
        .iter()
        .find(|ep| ep.name == "vs_main")
        .unwrap();

    let mut locations = Vec::new();
    for arg in &vs.function.arguments {
        let ty = &module.types[arg.ty];
        if let naga::TypeInner::Struct { members, .. } = &ty.inner {
            for m in members {
                if let Some(naga::Binding::Location { location, .. }) = m.binding {
                    locations.push(location);
                }
            }
        }
    }
    locations.sort_unstable();

    let mut expected: Vec<u32> = Vertex::ATTRIBUTES
        .iter()
        .chain(Instance::ATTRIBUTES.iter())
        .map(|a| a.shader_location)
        .collect();
    expected.sort_unstable();
    assert_eq!(locations, expected);
}

#[test]
fn uniform_block_size_matches() {
    let module = parse();
    let (_, var) = module
        .global_variables
        .iter()
        .find(|(_, v)| v.name.as_deref() == Some("uniforms"))
        .unwrap();
    let size = module.types[var.ty].inner.size(module.to_ctx());
    assert_eq!(size as usize, std::mem::size_of::<Uniforms>());
}
