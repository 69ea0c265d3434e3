use kestrel::World;
use kestrel::components::{CameraComponent, Component, MeshRenderer};
use kestrel::core::GameObjectId;
use kestrel::math::Vector3;
use std::cell::Cell;

thread_local! {
    static UPDATE_CALLS: Cell<u32> = const { Cell::new(0) };
    static REMOVE_CALLS: Cell<u32> = const { Cell::new(0) };
}

fn reset_counters() {
    UPDATE_CALLS.with(|slot| slot.set(0));
    REMOVE_CALLS.with(|slot| slot.set(0));
}

#[derive(Default)]
struct CountingComponent;

impl Component for CountingComponent {
    fn update(&mut self, _world: &mut World, _parent: GameObjectId) {
        UPDATE_CALLS.with(|slot| slot.set(slot.get() + 1));
    }

    fn on_remove(&mut self, _world: &mut World, _parent: GameObjectId) {
        REMOVE_CALLS.with(|slot| slot.set(slot.get() + 1));
    }
}

#[derive(Default)]
struct SelfDestructComponent;

impl Component for SelfDestructComponent {
    fn update(&mut self, world: &mut World, parent: GameObjectId) {
        world.remove_object(parent);
    }
}

#[derive(Default)]
struct SpinComponent;

impl Component for SpinComponent {
    fn update(&mut self, world: &mut World, parent: GameObjectId) {
        if let Some(object) = world.get_object_mut(parent) {
            object.transform.rotate(Vector3::new(0.0, 1.0, 0.0));
        }
    }
}

#[test]
fn objects_are_created_and_found_by_name() {
    let mut world = World::fresh();

    let id = world.new_object("Crate");
    assert_eq!(world.object_count(), 1);
    assert_eq!(world.get_object(id).unwrap().name, "Crate");
    assert!(world.find_object_by_name("Crate").is_some());
    assert!(world.find_object_by_name("Barrel").is_none());
}

#[test]
fn components_attach_and_resolve_by_type() {
    let mut world = World::fresh();
    let id = world.new_object("Thing");

    assert!(world.add_component(id, MeshRenderer::default()));
    assert!(world.get_component::<MeshRenderer>(id).is_some());
    assert!(world.get_component::<CameraComponent>(id).is_none());
}

#[test]
fn one_component_per_concrete_type() {
    reset_counters();
    let mut world = World::fresh();
    let id = world.new_object("Thing");

    world.add_component(id, CountingComponent);
    world.add_component(id, CountingComponent);

    assert_eq!(world.get_object(id).unwrap().component_count(), 1);
    // The replaced instance got its removal hook.
    assert_eq!(REMOVE_CALLS.with(Cell::get), 1);
}

#[test]
fn update_runs_components_of_enabled_objects_only() {
    reset_counters();
    let mut world = World::fresh();

    let enabled = world.new_object("on");
    let disabled = world.new_object("off");
    world.add_component(enabled, CountingComponent);
    world.add_component(disabled, CountingComponent);
    world.get_object_mut(disabled).unwrap().enabled = false;

    world.update();
    assert_eq!(UPDATE_CALLS.with(Cell::get), 1);
}

#[test]
fn components_can_mutate_their_parent_during_update() {
    let mut world = World::fresh();
    let id = world.new_object("Spinner");
    world.add_component(id, SpinComponent);

    world.update();
    world.update();

    let orientation = world.get_object(id).unwrap().transform.orientation();
    assert_eq!(orientation, Vector3::new(0.0, 2.0, 0.0));
}

#[test]
fn removing_the_parent_during_update_is_safe() {
    reset_counters();
    let mut world = World::fresh();
    let id = world.new_object("Doomed");
    world.add_component(id, SelfDestructComponent);
    world.add_component(id, CountingComponent);

    world.update();

    assert!(world.get_object(id).is_none());
    assert_eq!(world.object_count(), 0);
    // The sibling component still got cleaned up.
    assert_eq!(REMOVE_CALLS.with(Cell::get), 1);
}

#[test]
fn removing_an_object_runs_component_removal_hooks() {
    reset_counters();
    let mut world = World::fresh();
    let id = world.new_object("Gone");
    world.add_component(id, CountingComponent);

    assert!(world.remove_object(id));
    assert_eq!(REMOVE_CALLS.with(Cell::get), 1);
    assert!(!world.remove_object(id));
}

#[test]
fn removing_the_active_camera_clears_it() {
    let mut world = World::fresh();
    let camera = world.spawn_default_camera();

    assert_eq!(world.active_camera(), Some(camera));
    world.remove_object(camera);
    assert_eq!(world.active_camera(), None);
}

#[test]
fn default_camera_matches_the_classic_scene() {
    let mut world = World::fresh();
    let camera = world.spawn_default_camera();

    let object = world.get_object(camera).unwrap();
    assert_eq!(object.transform.position(), Vector3::new(0.0, 0.0, 15.0));

    let component = object.get_component::<CameraComponent>().unwrap();
    assert_eq!(component.fov(), 67.0);
    assert_eq!(component.near(), 0.01);
    assert_eq!(component.far(), 1000.0);
}

#[test]
fn draw_list_contains_mesh_bearing_objects_in_order() {
    let mut world = World::fresh();
    world.spawn_default_camera();

    let first = world.new_object("first");
    world.add_component(first, MeshRenderer::default());
    world
        .get_object_mut(first)
        .unwrap()
        .transform
        .set_position(1.0, 0.0, 0.0);

    let hidden = world.new_object("hidden");
    world.add_component(hidden, MeshRenderer::default());
    world.get_object_mut(hidden).unwrap().enabled = false;

    let bare = world.new_object("no mesh");
    let _ = bare;

    let frame = world.extract_draw_list();
    assert_eq!(frame.calls.len(), 1);
    assert_eq!(frame.calls[0].model[(0, 3)], 1.0);
}

#[test]
fn draw_list_without_camera_uses_the_fallback_uniform() {
    let mut world = World::fresh();
    let id = world.new_object("mesh");
    world.add_component(id, MeshRenderer::default());

    let frame = world.extract_draw_list();
    assert_eq!(frame.calls.len(), 1);
    assert_eq!(frame.camera.view, kestrel::math::Matrix4::identity());
}
