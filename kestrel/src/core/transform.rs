use crate::math;
use nalgebra::{Matrix4, Vector3};
use num_traits::AsPrimitive;

/// Stores the position, scale and Euler orientation (degrees) of a
/// [`GameObject`](crate::core::GameObject).
///
/// The model matrix is recomputed on write; reads return the cached value.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vector3<f32>,
    scale: Vector3<f32>,
    orientation: Vector3<f32>,
    model: Matrix4<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            orientation: Vector3::zeros(),
            model: Matrix4::identity(),
        }
    }
}

impl Transform {
    pub fn new(
        position: Vector3<f32>,
        scale: Vector3<f32>,
        orientation_deg: Vector3<f32>,
    ) -> Self {
        let mut transform = Transform {
            position,
            scale,
            orientation: orientation_deg,
            model: Matrix4::identity(),
        };
        transform.rebuild();
        transform
    }

    #[inline]
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    #[inline]
    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    /// Euler orientation in degrees, Z·Y·X composition order.
    #[inline]
    pub fn orientation(&self) -> Vector3<f32> {
        self.orientation
    }

    pub fn set_position(
        &mut self,
        x: impl AsPrimitive<f32>,
        y: impl AsPrimitive<f32>,
        z: impl AsPrimitive<f32>,
    ) {
        self.set_position_vec(Vector3::new(x.as_(), y.as_(), z.as_()));
    }

    pub fn set_position_vec(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.rebuild();
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.position += offset;
        self.rebuild();
    }

    pub fn set_scale_vec(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
        self.rebuild();
    }

    pub fn set_orientation_vec(&mut self, orientation_deg: Vector3<f32>) {
        self.orientation = orientation_deg;
        self.rebuild();
    }

    pub fn rotate(&mut self, offset_deg: Vector3<f32>) {
        self.orientation += offset_deg;
        self.rebuild();
    }

    /// The cached model matrix, translation · rotation · scale.
    #[inline]
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.model
    }

    fn rebuild(&mut self) {
        self.model = math::model_matrix(self.position, self.scale, self.orientation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transform_is_identity() {
        let transform = Transform::default();
        assert_eq!(*transform.matrix(), Matrix4::identity());
    }

    #[test]
    fn matrix_tracks_mutations() {
        let mut transform = Transform::default();
        transform.set_position(1, 2, 3);

        let expected = math::translation(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(*transform.matrix(), expected);

        transform.translate(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(transform.position(), Vector3::new(2.0, 2.0, 3.0));
    }

    #[test]
    fn rotate_accumulates_euler_angles() {
        let mut transform = Transform::default();
        transform.rotate(Vector3::new(0.0, 30.0, 0.0));
        transform.rotate(Vector3::new(0.0, 60.0, 0.0));

        let expected = math::rotation_deg(Vector3::new(0.0, 90.0, 0.0));
        assert!((transform.matrix() - expected).norm() < 1e-5);
    }
}
