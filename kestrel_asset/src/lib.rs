//! Asset types and management for the Kestrel engine.
//!
//! Assets such as meshes and shaders are stored in type specific stores and
//! referenced through handles. The [`AssetStore`] additionally keeps a
//! path index so that loading the same file twice yields the same handle.

pub mod mesh;
pub mod shader;
pub mod store;

pub use mesh::{Mesh, MeshError, Vertex3D};
pub use shader::{Shader, ShaderError, ShaderType};
pub use store::asset_store::{AssetError, AssetStore};
pub use store::{H, Store};

pub type HMesh = H<Mesh>;
pub type HShader = H<Shader>;
