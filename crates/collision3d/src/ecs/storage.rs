//! Component storage
//!
//! One sparse secondary map per component type, keyed by the world's entity
//! arena. Type erasure goes through [`ComponentStorage`] so the world can
//! drop an entity's components without knowing their types.

use std::any::Any;

use slotmap::SecondaryMap;

use super::entity::EntityKey;
use super::Component;

/// Type-erased view of a per-type component map
pub(super) trait ComponentStorage: Send + Sync {
    /// Drop the entity's component, if any
    fn remove_entity(&mut self, key: EntityKey);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Components of one type
pub(super) struct TypedStorage<T: Component> {
    pub(super) components: SecondaryMap<EntityKey, T>,
}

impl<T: Component> TypedStorage<T> {
    pub(super) fn new() -> Self {
        Self {
            components: SecondaryMap::new(),
        }
    }
}

impl<T: Component> ComponentStorage for TypedStorage<T> {
    fn remove_entity(&mut self, key: EntityKey) {
        self.components.remove(key);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
