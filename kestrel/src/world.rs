//! The [`World`] struct stores and updates all game objects.
//!
//! It maintains the flat scene graph, input state, frame timing and the
//! asset store, and offers utilities to create, look up and remove game
//! objects and their components.

use crate::components::{CameraComponent, Component, FreecamController, MeshRenderer};
use crate::core::{GameObject, GameObjectId};
use crate::math;
use kestrel_asset::AssetStore;
use kestrel_render::{CameraUniform, DrawCall, DrawList};
use slotmap::SlotMap;
use std::any::Any;
use std::any::TypeId;
use std::sync::Arc;
use tracing::warn;
use web_time::{Duration, Instant};
use winit::dpi::PhysicalSize;

/// Central structure representing the running scene.
///
/// The world keeps track of all [`GameObject`] instances and provides
/// access to shared systems like input and assets.
pub struct World {
    /// Collection of all game objects indexed by their unique ID
    objects: SlotMap<GameObjectId, GameObject>,
    /// Object ids in creation order
    children: Vec<GameObjectId>,
    /// Input management system
    pub input: crate::input::InputManager,
    /// Asset storage containing meshes and shaders
    pub assets: Arc<AssetStore>,
    /// The camera object used for rendering
    active_camera: Option<GameObjectId>,

    /// Time when the world was created
    start_time: Instant,
    /// Time elapsed since the last frame
    delta_time: Duration,
    /// Time when the last frame started
    last_frame_time: Instant,
    /// Size of the window surface in pixels
    viewport_size: PhysicalSize<u32>,
    /// Flag indicating whether a shutdown has been requested
    requested_shutdown: bool,
}

impl World {
    pub fn new(assets: Arc<AssetStore>) -> World {
        World {
            objects: SlotMap::with_key(),
            children: Vec::new(),
            input: crate::input::InputManager::new(),
            assets,
            active_camera: None,

            start_time: Instant::now(),
            delta_time: Duration::default(),
            last_frame_time: Instant::now(),
            viewport_size: PhysicalSize::new(1, 1),
            requested_shutdown: false,
        }
    }

    /// A world with its own fresh asset store. Mostly useful for tests.
    pub fn fresh() -> World {
        World::new(AssetStore::new())
    }

    pub fn new_object(&mut self, name: impl Into<String>) -> GameObjectId {
        let name = name.into();
        let id = self
            .objects
            .insert_with_key(|id| GameObject::new(id, name));
        self.children.push(id);
        id
    }

    pub fn get_object(&self, id: GameObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    pub fn find_object_by_name(&self, name: &str) -> Option<&GameObject> {
        self.children
            .iter()
            .filter_map(|id| self.objects.get(*id))
            .find(|object| object.name == name)
    }

    /// Objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = &GameObject> {
        self.children.iter().filter_map(|id| self.objects.get(*id))
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Removes the object, running `on_remove` on its components.
    pub fn remove_object(&mut self, id: GameObjectId) -> bool {
        let Some(mut object) = self.objects.remove(id) else {
            return false;
        };

        for mut component in object.components.drain(..) {
            component.on_remove(self, id);
        }

        self.children.retain(|child| *child != id);
        if self.active_camera == Some(id) {
            self.active_camera = None;
        }

        true
    }

    /// Attaches a component, replacing any existing component of the same
    /// concrete type. Returns `false` if the object does not exist.
    pub fn add_component<C: Component>(&mut self, id: GameObjectId, mut component: C) -> bool {
        if !self.objects.contains_key(id) {
            warn!("Tried to attach a component to a dead object {id:?}");
            return false;
        }

        component.init(self, id);

        let type_id = TypeId::of::<C>();
        let replaced = {
            let Some(object) = self.objects.get_mut(id) else {
                // The component removed its own parent during init.
                return false;
            };
            object
                .components
                .iter()
                .position(|c| (&**c as &dyn Any).type_id() == type_id)
                .map(|index| object.components.swap_remove(index))
        };

        if let Some(mut old) = replaced {
            warn!("Replacing an existing component of the same type on {id:?}");
            old.on_remove(self, id);
        }

        let Some(object) = self.objects.get_mut(id) else {
            return false;
        };
        object.components.push(Box::new(component));
        true
    }

    /// Detaches the component of type `C`, running its `on_remove`.
    pub fn remove_component<C: Component>(&mut self, id: GameObjectId) -> bool {
        let type_id = TypeId::of::<C>();
        let removed = {
            let Some(object) = self.objects.get_mut(id) else {
                return false;
            };
            object
                .components
                .iter()
                .position(|c| (&**c as &dyn Any).type_id() == type_id)
                .map(|index| object.components.swap_remove(index))
        };

        let Some(mut component) = removed else {
            return false;
        };
        component.on_remove(self, id);
        true
    }

    pub fn get_component<C: Component>(&self, id: GameObjectId) -> Option<&C> {
        self.objects.get(id)?.get_component::<C>()
    }

    pub fn get_component_mut<C: Component>(&mut self, id: GameObjectId) -> Option<&mut C> {
        self.objects.get_mut(id)?.get_component_mut::<C>()
    }

    /// Spawns a camera object with a [`FreecamController`] and makes it the
    /// active camera.
    pub fn spawn_camera(&mut self, name: &str, fov_deg: f32, near: f32, far: f32) -> GameObjectId {
        let id = self.new_object(name);
        let aspect = self.viewport_aspect();
        self.add_component(
            id,
            CameraComponent::with_settings(fov_deg, aspect, near, far),
        );
        self.add_component(id, FreecamController::default());
        self.active_camera = Some(id);
        id
    }

    /// The classic scene camera: fov 67°, placed at (0, 0, 15).
    pub fn spawn_default_camera(&mut self) -> GameObjectId {
        let id = self.spawn_camera("Main Camera", 67.0, 0.01, 1000.0);
        if let Some(object) = self.objects.get_mut(id) {
            object.transform.set_position(0.0, 0.0, 15.0);
        }
        id
    }

    pub fn active_camera(&self) -> Option<GameObjectId> {
        self.active_camera
    }

    pub fn set_active_camera(&mut self, id: GameObjectId) {
        if self.objects.contains_key(id) {
            self.active_camera = Some(id);
        } else {
            warn!("Tried to activate a dead camera object {id:?}");
        }
    }

    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    pub fn time_since_start(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn set_viewport_size(&mut self, size: PhysicalSize<u32>) {
        self.viewport_size = PhysicalSize::new(size.width.max(1), size.height.max(1));
    }

    pub fn viewport_size(&self) -> PhysicalSize<u32> {
        self.viewport_size
    }

    pub fn viewport_aspect(&self) -> f32 {
        self.viewport_size.width as f32 / self.viewport_size.height as f32
    }

    pub fn request_shutdown(&mut self) {
        self.requested_shutdown = true;
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested_shutdown
    }

    /// Advances frame timing and runs the component lifecycle for this
    /// frame: `update` on every enabled object, then `post_update`, then
    /// input state rollover.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now - self.last_frame_time;
        self.last_frame_time = now;

        self.run_components(|component, world, id| component.update(world, id));
        self.run_components(|component, world, id| component.post_update(world, id));

        self.input.next_frame();
    }

    fn run_components(&mut self, hook: impl Fn(&mut dyn Component, &mut World, GameObjectId)) {
        let ids = self.children.clone();
        for id in ids {
            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            if !object.enabled {
                continue;
            }

            // Components are detached while their hooks run so they can
            // freely mutate the world, including their own parent.
            let mut components = std::mem::take(&mut object.components);
            for component in components.iter_mut() {
                hook(component.as_mut(), self, id);
                if !self.objects.contains_key(id) {
                    break;
                }
            }

            if let Some(object) = self.objects.get_mut(id) {
                let added = std::mem::take(&mut object.components);
                components.extend(added);
                object.components = components;
            } else {
                // The object removed itself; finish its components off.
                for mut component in components {
                    component.on_remove(self, id);
                }
            }
        }
    }

    /// Snapshots everything the renderer needs for this frame.
    pub fn extract_draw_list(&self) -> DrawList {
        let camera = self.camera_uniform();

        let mut calls = Vec::new();
        for object in self.objects() {
            if !object.enabled {
                continue;
            }
            let Some(renderer) = object.get_component::<MeshRenderer>() else {
                continue;
            };
            calls.push(DrawCall {
                mesh: renderer.mesh(),
                shader: renderer.shader(),
                model: *object.transform.matrix(),
            });
        }

        DrawList { camera, calls }
    }

    fn camera_uniform(&self) -> CameraUniform {
        let Some(object) = self.active_camera.and_then(|id| self.objects.get(id)) else {
            return CameraUniform::fallback();
        };
        let Some(camera) = object.get_component::<CameraComponent>() else {
            return CameraUniform::fallback();
        };

        let view = math::view_matrix(
            object.transform.position(),
            object.transform.orientation(),
        );

        CameraUniform::new(view, camera.projection_matrix(), object.transform.position())
    }
}
