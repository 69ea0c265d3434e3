pub mod vertex;

pub use vertex::Vertex3D;

use crate::HMesh;
use crate::store::{Store, StoreDefaults};
use itertools::izip;
use nalgebra::{Vector2, Vector3};
use obj::{IndexTuple, ObjError};
use snafu::Snafu;

const CUBE_OBJ: &[u8] = include_bytes!("preset_meshes/cube.obj");

#[derive(Debug, Snafu)]
pub enum MeshError {
    #[snafu(display("The loaded mesh did not have any normals"))]
    NormalsMissing,
    #[snafu(display("The loaded mesh did not have any uv coordinates"))]
    UVMissing,
    #[snafu(display("The loaded mesh was not previously triangulated"))]
    NonTriangulated,
    #[snafu(transparent)]
    Obj { source: ObjError },
}

/// Raw mesh data as it comes out of a model file. GPU buffers are created
/// lazily by the renderer's asset cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Option<Vec<u32>>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Option<Vec<u32>>) -> Self {
        Mesh { vertices, indices }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    #[inline]
    pub fn has_indices(&self) -> bool {
        self.indices.is_some()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn indices_count(&self) -> usize {
        self.indices().map_or(0, <[u32]>::len)
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        if self.has_indices() {
            self.indices_count() / 3
        } else {
            self.vertex_count() / 3
        }
    }

    /// Parses a Wavefront OBJ byte slice into an unindexed triangle soup.
    ///
    /// Every polygon must already be a triangle and carry texture
    /// coordinates and normals.
    pub fn load_from_obj_slice(data: &[u8]) -> Result<Mesh, MeshError> {
        let data = obj::ObjData::load_buf(data)?;
        let mut positions: Vec<Vector3<f32>> = Vec::new();
        let mut normals: Vec<Vector3<f32>> = Vec::new();
        let mut uvs: Vec<Vector2<f32>> = Vec::new();

        for object in data.objects {
            for group in object.groups {
                for poly in group.polys {
                    if poly.0.len() != 3 {
                        return Err(MeshError::NonTriangulated);
                    }
                    for IndexTuple(pos, uv, normal) in poly.0 {
                        let Some(uv) = uv else {
                            return Err(MeshError::UVMissing);
                        };
                        let Some(normal) = normal else {
                            return Err(MeshError::NormalsMissing);
                        };
                        positions.push(data.position[pos].into());
                        uvs.push([data.texture[uv][0], data.texture[uv][1]].into());
                        normals.push(data.normal[normal].into());
                    }
                }
            }
        }

        debug_assert!(positions.len() == uvs.len() && positions.len() == normals.len());

        let vertices = izip!(positions, uvs, normals)
            .map(|(position, uv, normal)| Vertex3D::new(position, uv, normal))
            .collect::<Vec<_>>();

        Ok(Mesh::new(vertices, None))
    }

    fn unit_cube() -> Mesh {
        Mesh::load_from_obj_slice(CUBE_OBJ).expect("embedded cube mesh is valid")
    }
}

impl HMesh {
    pub const UNIT_CUBE: HMesh = HMesh::new(0);
}

impl StoreDefaults for Mesh {
    fn populate(store: &Store<Mesh>) {
        store.add_default(HMesh::UNIT_CUBE, Mesh::unit_cube());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &[u8] = b"\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

    const QUAD_OBJ: &[u8] = b"\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vn 0.0 0.0 1.0
f 1/1/1 2/1/1 3/1/1 4/1/1
";

    const NO_NORMALS_OBJ: &[u8] = b"\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
f 1/1 2/1 3/1
";

    #[test]
    fn parses_a_triangle() {
        let mesh = Mesh::load_from_obj_slice(TRIANGLE_OBJ).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_indices());

        let first = mesh.vertices()[0];
        assert_eq!(first.position, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(first.normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn rejects_polygons_with_more_than_three_corners() {
        let err = Mesh::load_from_obj_slice(QUAD_OBJ).unwrap_err();
        assert!(matches!(err, MeshError::NonTriangulated));
    }

    #[test]
    fn rejects_meshes_without_normals() {
        let err = Mesh::load_from_obj_slice(NO_NORMALS_OBJ).unwrap_err();
        assert!(matches!(err, MeshError::NormalsMissing));
    }

    #[test]
    fn embedded_cube_loads() {
        let cube = Mesh::unit_cube();
        assert_eq!(cube.triangle_count(), 12);
    }
}
