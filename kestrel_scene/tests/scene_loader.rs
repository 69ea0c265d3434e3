use kestrel::World;
use kestrel::components::{CameraComponent, MeshRenderer};
use kestrel::math::Vector3;
use kestrel_scene::{SceneError, SceneLoader, SceneWriter};
use std::fs;
use std::path::PathBuf;

const SIMPLE_SCENE: &str = r#"{
    "camera": {
        "position": [0.0, 0.0, 15.0],
        "fov": 67.0,
        "near": 0.01,
        "far": 1000.0
    },
    "objects": [
        {
            "name": "Crate",
            "transform": {
                "position": [1.0, 2.0, 3.0],
                "scale": [2.0, 2.0, 2.0],
                "orientation": [0.0, 45.0, 0.0]
            }
        },
        { "name": "Marker" }
    ]
}"#;

#[test]
fn loads_camera_and_objects() {
    let mut world = World::fresh();
    let ids = SceneLoader::load_str(&mut world, SIMPLE_SCENE).unwrap();

    assert_eq!(ids.len(), 3);
    assert_eq!(world.object_count(), 3);

    let camera_id = world.active_camera().expect("scene camera is active");
    let camera_object = world.get_object(camera_id).unwrap();
    assert_eq!(
        camera_object.transform.position(),
        Vector3::new(0.0, 0.0, 15.0)
    );
    let camera = camera_object.get_component::<CameraComponent>().unwrap();
    assert_eq!(camera.fov(), 67.0);
    assert_eq!(camera.far(), 1000.0);

    let spawned = world.find_object_by_name("Crate").unwrap();
    assert_eq!(spawned.transform.position(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(spawned.transform.scale(), Vector3::new(2.0, 2.0, 2.0));
    assert!(!spawned.has_component::<MeshRenderer>());

    assert!(world.find_object_by_name("Marker").is_some());
}

#[test]
fn invalid_json_reports_a_parse_error() {
    let mut world = World::fresh();
    let err = SceneLoader::load_str(&mut world, "{ not json").unwrap_err();
    assert!(matches!(err, SceneError::Parse { .. }));
}

#[test]
fn ill_typed_fields_name_the_offending_key() {
    let mut world = World::fresh();
    let scene = r#"{ "objects": [ { "name": 42 } ] }"#;

    let err = SceneLoader::load_str(&mut world, scene).unwrap_err();
    match err {
        SceneError::Schema { field, .. } => assert_eq!(field, "objects[0].name"),
        other => panic!("expected a schema error, got {other:?}"),
    }
}

#[test]
fn a_bad_entry_fails_the_whole_load() {
    let mut world = World::fresh();
    let scene = r#"{
        "objects": [
            { "name": "fine" },
            { "name": "broken", "transform": { "position": [1.0] } }
        ]
    }"#;

    assert!(SceneLoader::load_str(&mut world, scene).is_err());
    // Nothing was spawned for the valid entry either.
    assert_eq!(world.object_count(), 0);
}

#[test]
fn dangling_mesh_paths_fail_the_load() {
    let mut world = World::fresh();
    let scene = r#"{ "objects": [ { "name": "ghost", "mesh": "missing/mesh.obj" } ] }"#;

    let err = SceneLoader::load_str(&mut world, scene).unwrap_err();
    assert!(matches!(err, SceneError::Asset { .. }));
    assert_eq!(world.object_count(), 0);
}

#[test]
fn saving_and_reloading_reproduces_the_scene() {
    let mut world = World::fresh();
    SceneLoader::load_str(&mut world, SIMPLE_SCENE).unwrap();

    let json = SceneWriter::to_json_string(&world).unwrap();

    let mut reloaded = World::fresh();
    SceneLoader::load_str(&mut reloaded, &json).unwrap();

    assert_eq!(reloaded.object_count(), world.object_count());

    let original = world.find_object_by_name("Crate").unwrap();
    let copy = reloaded.find_object_by_name("Crate").unwrap();
    assert_eq!(copy.transform.position(), original.transform.position());
    assert_eq!(copy.transform.scale(), original.transform.scale());
    assert_eq!(
        copy.transform.orientation(),
        original.transform.orientation()
    );

    let camera_id = reloaded.active_camera().unwrap();
    let camera = reloaded
        .get_component::<CameraComponent>(camera_id)
        .unwrap();
    assert_eq!(camera.fov(), 67.0);
}

#[test]
fn meshes_load_relative_to_the_scene_file() {
    let dir = std::env::temp_dir().join(format!("kestrel_scene_test_{}", std::process::id()));
    fs::create_dir_all(dir.join("meshes")).unwrap();

    fs::write(
        dir.join("meshes/tri.obj"),
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n",
    )
    .unwrap();

    let scene_path: PathBuf = dir.join("scene.json");
    fs::write(
        &scene_path,
        r#"{ "objects": [ { "name": "Tri", "mesh": "meshes/tri.obj" } ] }"#,
    )
    .unwrap();

    let mut world = World::fresh();
    SceneLoader::load(&mut world, &scene_path).unwrap();

    let object = world.find_object_by_name("Tri").unwrap();
    let renderer = object.get_component::<MeshRenderer>().unwrap();
    let mesh = world.assets.meshes.try_get(renderer.mesh()).unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    drop(mesh);

    // Saving records the resolved path, so the scene reloads from anywhere.
    let saved_path = dir.join("saved.json");
    SceneWriter::save(&world, &saved_path).unwrap();

    let mut reloaded = World::fresh();
    SceneLoader::load(&mut reloaded, &saved_path).unwrap();
    assert!(
        reloaded
            .find_object_by_name("Tri")
            .unwrap()
            .has_component::<MeshRenderer>()
    );

    let _ = fs::remove_dir_all(dir);
}
