use crate::components::Component;
use kestrel_asset::{HMesh, HShader};

/// Makes a game object visible: pairs a mesh handle with the shader it is
/// drawn with.
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    mesh: HMesh,
    shader: HShader,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        MeshRenderer {
            mesh: HMesh::UNIT_CUBE,
            shader: HShader::DEFAULT,
        }
    }
}

impl MeshRenderer {
    pub fn new(mesh: HMesh) -> Self {
        MeshRenderer {
            mesh,
            shader: HShader::DEFAULT,
        }
    }

    pub fn with_shader(mesh: HMesh, shader: HShader) -> Self {
        MeshRenderer { mesh, shader }
    }

    pub fn mesh(&self) -> HMesh {
        self.mesh
    }

    pub fn set_mesh(&mut self, mesh: HMesh) {
        self.mesh = mesh;
    }

    pub fn shader(&self) -> HShader {
        self.shader
    }

    pub fn set_shader(&mut self, shader: HShader) {
        self.shader = shader;
    }
}

impl Component for MeshRenderer {}
