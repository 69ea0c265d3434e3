use crate::HShader;
use crate::store::{Store, StoreDefaults};
use snafu::Snafu;
use wgpu::{PolygonMode, PrimitiveTopology};

const DEFAULT_WGSL: &str = include_str!("shaders/default.wgsl");

/// Entry point names every scene shader must expose.
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Snafu)]
pub enum ShaderError {
    #[snafu(display("Failed to parse shader source: {reason}"))]
    Parse { reason: String },
    #[snafu(display("Shader failed validation: {reason}"))]
    Validation { reason: String },
    #[snafu(display("Shader is missing the `{name}` entry point"))]
    MissingEntryPoint { name: &'static str },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderType {
    Default,
    Custom,
}

/// A complete WGSL module with a vertex and a fragment entry point.
///
/// Sources loaded from disk are parsed and validated before the asset is
/// admitted to the store, so the renderer can assume every shader it is
/// handed compiles.
#[derive(Debug, Clone)]
pub struct Shader {
    name: String,
    code: String,
    shader_type: ShaderType,
    polygon_mode: PolygonMode,
    topology: PrimitiveTopology,
}

impl Shader {
    pub fn from_source(
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<Shader, ShaderError> {
        let code = code.into();
        validate(&code)?;

        Ok(Shader {
            name: name.into(),
            code,
            shader_type: ShaderType::Custom,
            polygon_mode: PolygonMode::Fill,
            topology: PrimitiveTopology::TriangleList,
        })
    }

    fn builtin(name: &str, code: &str) -> Shader {
        debug_assert!(validate(code).is_ok(), "builtin shader {name:?} is invalid");

        Shader {
            name: name.to_string(),
            code: code.to_string(),
            shader_type: ShaderType::Default,
            polygon_mode: PolygonMode::Fill,
            topology: PrimitiveTopology::TriangleList,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn shader_type(&self) -> ShaderType {
        self.shader_type
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }
}

/// Parses and validates a WGSL module, checking both entry points exist.
pub fn validate(code: &str) -> Result<(), ShaderError> {
    let module = naga::front::wgsl::parse_str(code).map_err(|e| ShaderError::Parse {
        reason: e.emit_to_string(code),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            reason: e.into_inner().to_string(),
        })?;

    let has_entry = |stage: naga::ShaderStage, name: &str| {
        module
            .entry_points
            .iter()
            .any(|ep| ep.stage == stage && ep.name == name)
    };

    if !has_entry(naga::ShaderStage::Vertex, VERTEX_ENTRY) {
        return Err(ShaderError::MissingEntryPoint { name: VERTEX_ENTRY });
    }
    if !has_entry(naga::ShaderStage::Fragment, FRAGMENT_ENTRY) {
        return Err(ShaderError::MissingEntryPoint {
            name: FRAGMENT_ENTRY,
        });
    }

    Ok(())
}

impl HShader {
    pub const DEFAULT: HShader = HShader::new(0);
}

impl StoreDefaults for Shader {
    fn populate(store: &Store<Shader>) {
        store.add_default(HShader::DEFAULT, Shader::builtin("Default", DEFAULT_WGSL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shader_is_valid() {
        assert!(validate(DEFAULT_WGSL).is_ok());
    }

    #[test]
    fn garbage_fails_to_parse() {
        let err = Shader::from_source("broken", "not wgsl at all {").unwrap_err();
        assert!(matches!(err, ShaderError::Parse { .. }));
    }

    #[test]
    fn vertex_only_module_is_rejected() {
        let source = "\
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
";
        let err = Shader::from_source("vertex only", source).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingEntryPoint {
                name: FRAGMENT_ENTRY
            }
        ));
    }

    #[test]
    fn wrong_entry_point_names_are_rejected() {
        let source = "\
@vertex
fn vertex(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}

@fragment
fn fragment() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
";
        let err = Shader::from_source("misnamed", source).unwrap_err();
        assert!(matches!(err, ShaderError::MissingEntryPoint { .. }));
    }
}
