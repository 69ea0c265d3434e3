pub mod object;
pub mod transform;

pub use object::{GameObject, GameObjectId};
pub use transform::Transform;
