//! JSON scene files.
//!
//! A scene file describes a camera and a flat list of objects:
//!
//! ```json
//! {
//!   "camera": {
//!     "position": [0.0, 0.0, 15.0],
//!     "orientation": [0.0, 0.0, 0.0],
//!     "fov": 67.0,
//!     "near": 0.01,
//!     "far": 1000.0
//!   },
//!   "objects": [
//!     {
//!       "name": "Sphere",
//!       "transform": {
//!         "position": [0.0, 0.0, 0.0],
//!         "scale": [1.0, 1.0, 1.0],
//!         "orientation": [0.0, 0.0, 0.0]
//!       },
//!       "mesh": "meshes/sphere.obj",
//!       "shader": "shaders/debug.wgsl"
//!     }
//!   ]
//! }
//! ```
//!
//! Loads are atomic: either every entry parses and every referenced asset
//! resolves, or the world is left untouched. Mesh and shader paths are
//! resolved relative to the scene file's directory.

use kestrel::World;
use kestrel::components::{CameraComponent, MeshRenderer};
use kestrel::core::GameObjectId;
use kestrel_asset::{AssetError, HMesh, HShader};
use nalgebra::Vector3;
use serde_json::{Map, Value, json};
use snafu::{ResultExt, Snafu};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

type JsonMap = Map<String, Value>;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum SceneError {
    #[snafu(display("Failed to read scene file {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to write scene file {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to parse scene JSON: {source}"))]
    Parse { source: serde_json::Error },

    #[snafu(display("Scene field `{field}` {problem}"))]
    Schema { field: String, problem: String },

    #[snafu(display("Failed to load an asset referenced by the scene: {source}"))]
    Asset { source: AssetError },
}

fn schema_error(field: impl Into<String>, problem: impl Into<String>) -> SceneError {
    SceneError::Schema {
        field: field.into(),
        problem: problem.into(),
    }
}

#[derive(Debug, Clone)]
struct ParsedCamera {
    position: Vector3<f32>,
    orientation: Vector3<f32>,
    fov: f32,
    near: f32,
    far: f32,
}

#[derive(Debug, Clone)]
struct ParsedObject {
    name: String,
    position: Vector3<f32>,
    scale: Vector3<f32>,
    orientation: Vector3<f32>,
    mesh: Option<PathBuf>,
    shader: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct ParsedScene {
    camera: Option<ParsedCamera>,
    objects: Vec<ParsedObject>,
}

pub struct SceneLoader;

impl SceneLoader {
    /// Loads a scene file into the world. Asset paths inside the file are
    /// resolved relative to the file's directory.
    pub fn load(world: &mut World, path: impl AsRef<Path>) -> Result<Vec<GameObjectId>, SceneError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).context(IoErr { path })?;
        let base = path.parent().unwrap_or(Path::new("."));

        let ids = Self::load_str_with_base(world, &text, base)?;
        info!("Loaded scene {:?} ({} objects)", path.display(), ids.len());
        Ok(ids)
    }

    pub fn load_str(world: &mut World, json: &str) -> Result<Vec<GameObjectId>, SceneError> {
        Self::load_str_with_base(world, json, Path::new("."))
    }

    pub fn load_str_with_base(
        world: &mut World,
        json: &str,
        base: &Path,
    ) -> Result<Vec<GameObjectId>, SceneError> {
        let scene = parse_scene(json)?;

        // Resolve every referenced asset before touching the scene graph so
        // a dangling path cannot leave a half-built scene behind.
        let mut renderers: Vec<Option<(HMesh, HShader)>> = Vec::with_capacity(scene.objects.len());
        for object in &scene.objects {
            let Some(mesh_path) = &object.mesh else {
                renderers.push(None);
                continue;
            };

            let mesh = world
                .assets
                .load_mesh(base.join(mesh_path))
                .context(AssetErr)?;
            let shader = match &object.shader {
                Some(shader_path) => world
                    .assets
                    .load_shader(base.join(shader_path))
                    .context(AssetErr)?,
                None => HShader::DEFAULT,
            };
            renderers.push(Some((mesh, shader)));
        }

        let mut ids = Vec::new();

        if let Some(camera) = &scene.camera {
            let id = world.spawn_camera("Main Camera", camera.fov, camera.near, camera.far);
            if let Some(object) = world.get_object_mut(id) {
                object.transform.set_position_vec(camera.position);
                object.transform.set_orientation_vec(camera.orientation);
            }
            ids.push(id);
        }

        for (object, renderer) in scene.objects.iter().zip(renderers) {
            let id = world.new_object(object.name.clone());
            if let Some(spawned) = world.get_object_mut(id) {
                spawned.transform.set_position_vec(object.position);
                spawned.transform.set_scale_vec(object.scale);
                spawned.transform.set_orientation_vec(object.orientation);
            }
            if let Some((mesh, shader)) = renderer {
                world.add_component(id, MeshRenderer::with_shader(mesh, shader));
            }
            ids.push(id);
        }

        Ok(ids)
    }
}

pub struct SceneWriter;

impl SceneWriter {
    pub fn save(world: &World, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        let json = Self::to_json_string(world)?;
        fs::write(path, json).context(WriteFileErr { path })?;
        info!("Saved scene to {:?}", path.display());
        Ok(())
    }

    /// Serializes the world's camera and objects into the scene format.
    pub fn to_json_string(world: &World) -> Result<String, SceneError> {
        let mut root = JsonMap::new();

        let camera_id = world.active_camera();
        if let Some(object) = camera_id.and_then(|id| world.get_object(id))
            && let Some(camera) = object.get_component::<CameraComponent>()
        {
            root.insert(
                "camera".to_string(),
                json!({
                    "position": vec3_value(object.transform.position()),
                    "orientation": vec3_value(object.transform.orientation()),
                    "fov": camera.fov(),
                    "near": camera.near(),
                    "far": camera.far(),
                }),
            );
        }

        let mut objects = Vec::new();
        for object in world.objects() {
            if Some(object.id) == camera_id {
                continue;
            }

            let mut entry = JsonMap::new();
            entry.insert("name".to_string(), Value::from(object.name.clone()));
            entry.insert(
                "transform".to_string(),
                json!({
                    "position": vec3_value(object.transform.position()),
                    "scale": vec3_value(object.transform.scale()),
                    "orientation": vec3_value(object.transform.orientation()),
                }),
            );

            if let Some(renderer) = object.get_component::<MeshRenderer>() {
                if let Some(path) = world.assets.mesh_path(renderer.mesh()) {
                    entry.insert("mesh".to_string(), Value::from(path.display().to_string()));
                }
                if renderer.shader() != HShader::DEFAULT
                    && let Some(path) = world.assets.shader_path(renderer.shader())
                {
                    entry.insert(
                        "shader".to_string(),
                        Value::from(path.display().to_string()),
                    );
                }
            }

            objects.push(Value::Object(entry));
        }
        root.insert("objects".to_string(), Value::Array(objects));

        serde_json::to_string_pretty(&Value::Object(root)).context(ParseErr)
    }
}

fn parse_scene(json: &str) -> Result<ParsedScene, SceneError> {
    let root: Value = serde_json::from_str(json).context(ParseErr)?;
    let root = root
        .as_object()
        .ok_or_else(|| schema_error("<root>", "must be an object"))?;

    let camera = match root.get("camera") {
        Some(value) => Some(parse_camera(value)?),
        None => None,
    };

    let mut objects = Vec::new();
    if let Some(value) = root.get("objects") {
        let entries = value
            .as_array()
            .ok_or_else(|| schema_error("objects", "must be an array"))?;
        for (index, entry) in entries.iter().enumerate() {
            objects.push(parse_object(entry, index)?);
        }
    }

    Ok(ParsedScene { camera, objects })
}

fn parse_camera(value: &Value) -> Result<ParsedCamera, SceneError> {
    let map = value
        .as_object()
        .ok_or_else(|| schema_error("camera", "must be an object"))?;

    Ok(ParsedCamera {
        position: vec3_field(map, "camera.position", "position", Vector3::zeros())?,
        orientation: vec3_field(map, "camera.orientation", "orientation", Vector3::zeros())?,
        fov: f32_field(map, "camera.fov", "fov", 67.0)?,
        near: f32_field(map, "camera.near", "near", 0.01)?,
        far: f32_field(map, "camera.far", "far", 1000.0)?,
    })
}

fn parse_object(value: &Value, index: usize) -> Result<ParsedObject, SceneError> {
    let context = format!("objects[{index}]");
    let map = value
        .as_object()
        .ok_or_else(|| schema_error(context.clone(), "must be an object"))?;

    let name = match map.get("name") {
        Some(value) => value
            .as_str()
            .ok_or_else(|| schema_error(format!("{context}.name"), "must be a string"))?
            .to_string(),
        None => format!("Object {index}"),
    };

    let (position, scale, orientation) = match map.get("transform") {
        Some(value) => {
            let transform = value.as_object().ok_or_else(|| {
                schema_error(format!("{context}.transform"), "must be an object")
            })?;
            (
                vec3_field(
                    transform,
                    &format!("{context}.transform.position"),
                    "position",
                    Vector3::zeros(),
                )?,
                vec3_field(
                    transform,
                    &format!("{context}.transform.scale"),
                    "scale",
                    Vector3::new(1.0, 1.0, 1.0),
                )?,
                vec3_field(
                    transform,
                    &format!("{context}.transform.orientation"),
                    "orientation",
                    Vector3::zeros(),
                )?,
            )
        }
        None => (
            Vector3::zeros(),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::zeros(),
        ),
    };

    let mesh = path_field(map, &format!("{context}.mesh"), "mesh")?;
    let shader = path_field(map, &format!("{context}.shader"), "shader")?;

    Ok(ParsedObject {
        name,
        position,
        scale,
        orientation,
        mesh,
        shader,
    })
}

fn path_field(map: &JsonMap, field: &str, key: &str) -> Result<Option<PathBuf>, SceneError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(PathBuf::from(s)))
            .ok_or_else(|| schema_error(field, "must be a string path")),
    }
}

fn f32_field(map: &JsonMap, field: &str, key: &str, default: f32) -> Result<f32, SceneError> {
    match map.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| schema_error(field, "must be a number")),
    }
}

fn vec3_field(
    map: &JsonMap,
    field: &str,
    key: &str,
    default: Vector3<f32>,
) -> Result<Vector3<f32>, SceneError> {
    let Some(value) = map.get(key) else {
        return Ok(default);
    };

    let entries = value
        .as_array()
        .ok_or_else(|| schema_error(field, "must be an array of three numbers"))?;
    if entries.len() != 3 {
        return Err(schema_error(field, "must have exactly three components"));
    }

    let mut components = [0.0f32; 3];
    for (component, entry) in components.iter_mut().zip(entries) {
        *component = entry
            .as_f64()
            .ok_or_else(|| schema_error(field, "must contain only numbers"))?
            as f32;
    }

    Ok(Vector3::new(components[0], components[1], components[2]))
}

fn vec3_value(v: Vector3<f32>) -> Value {
    json!([v.x, v.y, v.z])
}
