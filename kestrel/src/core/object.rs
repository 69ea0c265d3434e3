use crate::components::Component;
use crate::core::Transform;
use slotmap::new_key_type;
use std::any::Any;

new_key_type! {
    /// Uniquely identifies a game object within the world.
    pub struct GameObjectId;
}

/// An object within a scene.
///
/// A game object has a unique identifier, a non-unique name, a transform
/// and a set of attached components. At most one component of each concrete
/// type can be attached at a time.
pub struct GameObject {
    /// A unique identifier for this object within the world.
    pub id: GameObjectId,
    /// The name of the object (not required to be unique).
    pub name: String,
    /// Whether the object's components take part in updates and rendering.
    pub enabled: bool,
    /// The transformation applied to the object.
    pub transform: Transform,
    /// Components attached to this object.
    pub(crate) components: Vec<Box<dyn Component>>,
}

impl GameObject {
    pub(crate) fn new(id: GameObjectId, name: impl Into<String>) -> Self {
        GameObject {
            id,
            name: name.into(),
            enabled: true,
            transform: Transform::default(),
            components: Vec::new(),
        }
    }

    /// Gets the attached component of type `C`, if any.
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.components
            .iter()
            .find_map(|c| (&**c as &dyn Any).downcast_ref::<C>())
    }

    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find_map(|c| (&mut **c as &mut dyn Any).downcast_mut::<C>())
    }

    pub fn has_component<C: Component>(&self) -> bool {
        self.get_component::<C>().is_some()
    }

    /// Iterates over every attached component.
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| c.as_ref())
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}
