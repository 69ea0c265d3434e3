use bytemuck::{Pod, Zeroable};
use nalgebra::{Vector2, Vector3};
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexStepMode};

/// Interleaved vertex layout shared by every mesh: position, texture
/// coordinate, normal.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex3D {
    pub position: Vector3<f32>,
    pub uv: Vector2<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex3D {
    const ATTRIBUTES: [VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Float32x3,
    ];

    pub fn new(position: Vector3<f32>, uv: Vector2<f32>, normal: Vector3<f32>) -> Self {
        Vertex3D {
            position,
            uv,
            normal,
        }
    }

    pub const fn continuous_descriptor() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: size_of::<Vertex3D>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_covers_the_whole_vertex() {
        let layout = Vertex3D::continuous_descriptor();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 3);

        let last = layout.attributes.last().unwrap();
        assert_eq!(last.offset, 20);
    }
}
