//! WGSL validation and uniform reflection through naga.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::backend::ShaderStage;

/// Bind group slot holding program-specific uniforms.
pub const USER_UNIFORM_GROUP: u32 = 0;
pub const USER_UNIFORM_BINDING: u32 = 3;

/// Number of 16-byte slots in the program uniform block.
pub const USER_UNIFORM_SLOTS: usize = 16;

/// A named uniform and the first 16-byte slot it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub slot: u32,
}

/// What the engine needs to know about a validated stage.
#[derive(Debug, Clone, Default)]
pub struct Reflection {
    /// Entry point for the requested stage, if WGSL has one.
    pub entry_point: Option<String>,
    pub uniforms: Vec<UniformSlot>,
}

/// Parses and validates `source`, then reflects the program uniform block.
///
/// Vertex and fragment sources must declare an entry point of that stage.
pub fn validate(stage: ShaderStage, source: &str) -> Result<(naga::Module, Reflection), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let entry_point = match stage.as_naga() {
        Some(naga_stage) => {
            let Some(ep) = module.entry_points.iter().find(|ep| ep.stage == naga_stage) else {
                return Err(format!("no {stage:?} entry point in shader source"));
            };
            Some(ep.name.clone())
        }
        None => None,
    };

    let uniforms = reflect_uniforms(&module);
    Ok((module, Reflection { entry_point, uniforms }))
}

fn reflect_uniforms(module: &naga::Module) -> Vec<UniformSlot> {
    let mut out = Vec::new();

    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        let Some(binding) = &var.binding else { continue };
        if binding.group != USER_UNIFORM_GROUP || binding.binding != USER_UNIFORM_BINDING {
            continue;
        }

        match &module.types[var.ty].inner {
            naga::TypeInner::Struct { members, .. } => {
                for member in members {
                    let Some(name) = &member.name else { continue };
                    out.push(UniformSlot {
                        name: name.clone(),
                        slot: member.offset / 16,
                    });
                }
            }
            _ => {
                if let Some(name) = &var.name {
                    out.push(UniformSlot {
                        name: name.clone(),
                        slot: 0,
                    });
                }
            }
        }
    }

    out.retain(|u| (u.slot as usize) < USER_UNIFORM_SLOTS);
    out
}

/// Merges the uniforms of linked stages; the first declaration of a name wins.
pub fn merge_uniforms<'a>(stages: impl IntoIterator<Item = &'a Reflection>) -> Vec<UniformSlot> {
    let mut out: Vec<UniformSlot> = Vec::new();
    for reflection in stages {
        for u in &reflection.uniforms {
            if !out.iter().any(|o| o.name == u.name) {
                out.push(u.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINT_FS: &str = r#"
struct Params {
    tint: vec4<f32>,
    transform: mat4x4<f32>,
    strength: vec4<f32>,
};

@group(0) @binding(3) var<uniform> params: Params;

@fragment
fn fs_tint() -> @location(0) vec4<f32> {
    return params.tint * params.strength.x;
}
"#;

    #[test]
    fn reflects_member_slots() {
        let (_, r) = validate(ShaderStage::Fragment, TINT_FS).unwrap();
        assert_eq!(r.entry_point.as_deref(), Some("fs_tint"));
        let slots: Vec<(&str, u32)> = r.uniforms.iter().map(|u| (u.name.as_str(), u.slot)).collect();
        assert_eq!(slots, vec![("tint", 0), ("transform", 1), ("strength", 5)]);
    }

    #[test]
    fn missing_stage_entry_point_is_an_error() {
        let err = validate(ShaderStage::Vertex, TINT_FS).unwrap_err();
        assert!(err.contains("Vertex"));
    }

    #[test]
    fn syntax_error_reports_message() {
        let err = validate(ShaderStage::Fragment, "fn broken( {").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn merge_keeps_first_declaration() {
        let a = Reflection {
            entry_point: None,
            uniforms: vec![UniformSlot { name: "t".into(), slot: 0 }],
        };
        let b = Reflection {
            entry_point: None,
            uniforms: vec![
                UniformSlot { name: "t".into(), slot: 2 },
                UniformSlot { name: "u".into(), slot: 1 },
            ],
        };
        let merged = merge_uniforms([&a, &b]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].slot, 0);
    }
}
