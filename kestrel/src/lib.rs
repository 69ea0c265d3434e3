pub mod components;
pub mod core;
pub mod input;
pub mod math;
pub mod utils;
pub mod windowing;
pub mod world;

pub use windowing::{AppRuntime, AppSettings, AppState};
pub use world::World;

pub use kestrel_asset as assets;
pub use kestrel_render as rendering;

pub use ::tracing;
pub use ::winit;
