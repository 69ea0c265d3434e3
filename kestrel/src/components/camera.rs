use crate::components::Component;
use crate::core::GameObjectId;
use crate::world::World;
use nalgebra::{Matrix4, Perspective3};

/// Projection state of a camera object.
///
/// The view matrix comes from the owning object's transform; this component
/// only owns the perspective parameters and keeps the projection cached.
/// The aspect ratio follows the viewport automatically.
#[derive(Debug, Clone)]
pub struct CameraComponent {
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Perspective3<f32>,
}

impl Default for CameraComponent {
    fn default() -> Self {
        CameraComponent::with_settings(67.0, 1.0, 0.1, 100.0)
    }
}

impl CameraComponent {
    pub fn with_settings(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        CameraComponent {
            fov: fov_deg,
            aspect,
            near,
            far,
            projection: Perspective3::new(aspect, fov_deg.to_radians(), near, far),
        }
    }

    /// Field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov_deg: f32) {
        self.fov = fov_deg;
        self.regenerate();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.regenerate();
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
        self.regenerate();
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
        self.regenerate();
    }

    /// GL-convention projection matrix.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection.to_homogeneous()
    }

    fn regenerate(&mut self) {
        self.projection = Perspective3::new(self.aspect, self.fov.to_radians(), self.near, self.far);
    }
}

impl Component for CameraComponent {
    fn update(&mut self, world: &mut World, _parent: GameObjectId) {
        let aspect = world.viewport_aspect();
        if (aspect - self.aspect).abs() > f32::EPSILON {
            self.set_aspect(aspect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_keep_the_projection_in_sync() {
        let mut camera = CameraComponent::default();
        camera.set_aspect(16.0 / 9.0);
        camera.set_fov(90.0);

        let expected = Perspective3::new(16.0 / 9.0, 90f32.to_radians(), 0.1, 100.0);
        assert_eq!(camera.projection_matrix(), expected.to_homogeneous());
    }

    #[test]
    fn default_matches_the_classic_camera() {
        let camera = CameraComponent::default();
        assert_eq!(camera.fov(), 67.0);
        assert_eq!(camera.near(), 0.1);
        assert_eq!(camera.far(), 100.0);
    }
}
