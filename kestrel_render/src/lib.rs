//! GPU side of the Kestrel engine.
//!
//! [`State`] owns the wgpu instance, device and queue. [`Renderer`] owns the
//! swapchain, the depth buffer and the GPU asset caches, and draws the
//! [`DrawList`] snapshot the world extracts each frame.

pub mod cache;
pub mod draw;
pub mod renderer;
pub mod state;

pub use draw::{CameraUniform, DrawCall, DrawList, ModelUniform};
pub use renderer::Renderer;
pub use state::{State, StateError};
