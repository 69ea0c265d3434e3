//! Built-in components that can be attached to
//! [`GameObject`](crate::core::GameObject).
//!
//! Components implement per-frame behavior. If it's dynamic, it's probably
//! a component.
//!
//! To make a component:
//! ```rust
//! use kestrel::World;
//! use kestrel::components::Component;
//! use kestrel::core::GameObjectId;
//! use kestrel::math::Vector3;
//!
//! pub struct Sink {
//!     rate: f32,
//! }
//!
//! impl Component for Sink {
//!     fn update(&mut self, world: &mut World, parent: GameObjectId) {
//!         let drop = self.rate * world.delta_time().as_secs_f32();
//!         if let Some(object) = world.get_object_mut(parent) {
//!             object.transform.translate(Vector3::new(0.0, -drop, 0.0));
//!         }
//!     }
//! }
//! ```

pub mod camera;
pub mod freecam;
pub mod mesh_renderer;

pub use camera::CameraComponent;
pub use freecam::FreecamController;
pub use mesh_renderer::MeshRenderer;

use crate::core::GameObjectId;
use crate::world::World;
use std::any::Any;

/// Behavior attached to a game object.
///
/// During every hook the component is detached from its owner, so looking
/// itself up through `parent` yields nothing; everything else in the world
/// is fair game, including removing the parent object.
pub trait Component: Any {
    /// Called once, right before the component is attached.
    fn init(&mut self, _world: &mut World, _parent: GameObjectId) {}

    /// Called every frame while the parent object is enabled.
    fn update(&mut self, _world: &mut World, _parent: GameObjectId) {}

    /// Called after every component's `update` ran.
    fn post_update(&mut self, _world: &mut World, _parent: GameObjectId) {}

    /// Called when the component or its parent object is removed.
    fn on_remove(&mut self, _world: &mut World, _parent: GameObjectId) {}
}
