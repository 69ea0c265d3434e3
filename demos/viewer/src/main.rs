//! Loads the bundled sphere scene and flies around it.

use kestrel::components::Component;
use kestrel::core::GameObjectId;
use kestrel::math::Vector3;
use kestrel::{AppRuntime, AppState, World};
use kestrel_scene::SceneLoader;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;

const CONTROLS_HELP: &str = "\
Camera:
  [W]: Forwards.  [S]: Backwards.  [A]: Left.  [D]: Right.
  [Space]: Up.  [L-Ctrl]: Down.  [Q]: Roll left.  [E]: Roll right.
Other:
  [M]: Capture/release the mouse.  [Esc]: Exit.";

fn scene_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("res/scene.json")
}

/// Slowly turns the object so the shading is visible without moving.
struct Spin {
    degrees_per_second: f32,
}

impl Component for Spin {
    fn update(&mut self, world: &mut World, parent: GameObjectId) {
        let step = self.degrees_per_second * world.delta_time().as_secs_f32();
        if let Some(object) = world.get_object_mut(parent) {
            object.transform.rotate(Vector3::new(0.0, step, 0.0));
        }
    }
}

#[derive(Debug, Default)]
struct Viewer;

impl AppState for Viewer {
    fn init(&mut self, world: &mut World) -> Result<(), Box<dyn Error>> {
        SceneLoader::load(world, scene_path())?;

        if let Some(sphere) = world.find_object_by_name("Sphere") {
            let id = sphere.id;
            world.add_component(
                id,
                Spin {
                    degrees_per_second: 20.0,
                },
            );
        }

        info!("{CONTROLS_HELP}");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    kestrel_utils::init_logging();

    Viewer::configure("Kestrel Viewer", 1600, 900).run()
}
