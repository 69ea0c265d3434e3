//! Engine math helpers on top of nalgebra.
//!
//! Euler angles are stored in degrees throughout the engine and compose in
//! Z·Y·X order: `rotation_deg` applies roll around X first, then pitch
//! around Y, then yaw around Z.

pub use ::nalgebra;
pub use ::nalgebra::{Matrix2, Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
pub use ::nalgebra::{Perspective3, Rotation3, Scale3, Translation3, Unit, UnitQuaternion};

pub fn degrees(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}

pub fn radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

pub fn translation(t: Vector3<f32>) -> Matrix4<f32> {
    Translation3::from(t).to_homogeneous()
}

pub fn scaling(s: Vector3<f32>) -> Matrix4<f32> {
    Scale3::from(s).to_homogeneous()
}

/// Rotation matrix from Euler angles in degrees, composed as Rz·Ry·Rx.
pub fn rotation_deg(euler_deg: Vector3<f32>) -> Matrix4<f32> {
    Rotation3::from_euler_angles(
        radians(euler_deg.x),
        radians(euler_deg.y),
        radians(euler_deg.z),
    )
    .to_homogeneous()
}

/// Model matrix composed as translation · rotation · scale.
pub fn model_matrix(
    position: Vector3<f32>,
    scale: Vector3<f32>,
    orientation_deg: Vector3<f32>,
) -> Matrix4<f32> {
    translation(position) * rotation_deg(orientation_deg) * scaling(scale)
}

/// Camera view matrix: orientation applied to the world translated by the
/// negated camera position.
pub fn view_matrix(position: Vector3<f32>, orientation_deg: Vector3<f32>) -> Matrix4<f32> {
    rotation_deg(orientation_deg) * translation(-position)
}

pub fn look_at(eye: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::look_at_rh(&eye, &target, &up)
}

/// GL-convention perspective projection; the renderer converts the depth
/// range when uploading camera uniforms.
pub fn perspective(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    Perspective3::new(aspect, radians(fov_y_deg), near, far).to_homogeneous()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat_eq(a: &Matrix4<f32>, b: &Matrix4<f32>) {
        assert!((a - b).norm() < 1e-5, "matrices differ:\n{a}\n{b}");
    }

    fn assert_vec_eq(a: &Vector4<f32>, b: &Vector4<f32>) {
        assert!((a - b).norm() < 1e-5, "vectors differ: {a} vs {b}");
    }

    #[test]
    fn degree_radian_roundtrip() {
        assert!((degrees(radians(123.0)) - 123.0).abs() < 1e-4);
    }

    #[test]
    fn yaw_rotates_x_onto_y() {
        let rot = rotation_deg(Vector3::new(0.0, 0.0, 90.0));
        let rotated = rot * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert_vec_eq(&rotated, &Vector4::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn euler_angles_compose_z_y_x() {
        let combined = rotation_deg(Vector3::new(30.0, 45.0, 60.0));
        let manual = rotation_deg(Vector3::new(0.0, 0.0, 60.0))
            * rotation_deg(Vector3::new(0.0, 45.0, 0.0))
            * rotation_deg(Vector3::new(30.0, 0.0, 0.0));
        assert_mat_eq(&combined, &manual);
    }

    #[test]
    fn model_matrix_applies_scale_before_rotation() {
        let model = model_matrix(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(2.0, 2.0, 2.0),
            Vector3::new(0.0, 0.0, 90.0),
        );
        // Local +x scales to length 2, rotates onto +y, then translates.
        let moved = model * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_vec_eq(&moved, &Vector4::new(1.0, 4.0, 3.0, 1.0));
    }

    #[test]
    fn untransformed_camera_has_identity_view() {
        let view = view_matrix(Vector3::zeros(), Vector3::zeros());
        assert_mat_eq(&view, &Matrix4::identity());
    }

    #[test]
    fn view_matrix_moves_the_world_opposite_the_camera() {
        let view = view_matrix(Vector3::new(0.0, 0.0, 15.0), Vector3::zeros());
        let origin = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_vec_eq(&origin, &Vector4::new(0.0, 0.0, -15.0, 1.0));
    }

    #[test]
    fn perspective_preserves_the_near_plane() {
        let proj = perspective(67.0, 16.0 / 9.0, 0.1, 100.0);
        let clip = proj * Vector4::new(0.0, 0.0, -0.1, 1.0);
        // GL convention: the near plane sits at z/w == -1.
        assert!((clip.z / clip.w + 1.0).abs() < 1e-4);
    }
}
