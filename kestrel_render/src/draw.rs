use bytemuck::{Pod, Zeroable};
use kestrel_asset::{HMesh, HShader};
use nalgebra::{Matrix4, Vector3, Vector4};

/// Maps GL-convention clip depth (-1..1) to wgpu's 0..1 range. Applied once
/// when a projection matrix enters a [`CameraUniform`].
#[rustfmt::skip]
pub fn depth_correction() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: Matrix4<f32>,
    pub proj: Matrix4<f32>,
    pub eye: Vector4<f32>,
}

impl CameraUniform {
    /// `proj` is expected in GL convention, as produced by
    /// `Perspective3::to_homogeneous`.
    pub fn new(view: Matrix4<f32>, proj: Matrix4<f32>, eye: Vector3<f32>) -> Self {
        CameraUniform {
            view,
            proj: depth_correction() * proj,
            eye: Vector4::new(eye.x, eye.y, eye.z, 1.0),
        }
    }

    /// Used when no camera exists in the scene yet.
    pub fn fallback() -> Self {
        CameraUniform {
            view: Matrix4::identity(),
            proj: Matrix4::identity(),
            eye: Vector4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: Matrix4<f32>,
}

#[derive(Debug, Copy, Clone)]
pub struct DrawCall {
    pub mesh: HMesh,
    pub shader: HShader,
    pub model: Matrix4<f32>,
}

/// Immutable per-frame snapshot of everything the renderer needs.
#[derive(Debug, Clone)]
pub struct DrawList {
    pub camera: CameraUniform,
    pub calls: Vec<DrawCall>,
}

impl DrawList {
    pub fn empty() -> Self {
        DrawList {
            camera: CameraUniform::fallback(),
            calls: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Perspective3;

    #[test]
    fn depth_correction_remaps_gl_clip_range() {
        let correction = depth_correction();

        let near = correction * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = correction * Vector4::new(0.0, 0.0, 1.0, 1.0);

        assert!((near.z - 0.0).abs() < 1e-6);
        assert!((far.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn camera_uniform_corrects_the_projection() {
        let proj = Perspective3::new(1.0, 67f32.to_radians(), 0.1, 100.0).to_homogeneous();
        let uniform = CameraUniform::new(Matrix4::identity(), proj, Vector3::zeros());

        // A point on the near plane lands at depth 0 after correction.
        let clip = uniform.proj * Vector4::new(0.0, 0.0, -0.1, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-4);
    }

    #[test]
    fn uniforms_are_tightly_packed() {
        assert_eq!(size_of::<CameraUniform>(), 144);
        assert_eq!(size_of::<ModelUniform>(), 64);
    }
}
