//! ECS World implementation

use std::any::TypeId;
use std::collections::HashMap;

use slotmap::SlotMap;

use super::entity::EntityKey;
use super::storage::{ComponentStorage, TypedStorage};
use super::{Component, Entity};

/// ECS World containing all entities and components
pub struct World {
    entities: SlotMap<EntityKey, ()>,
    order: Vec<Entity>,
    component_storages: HashMap<TypeId, Box<dyn ComponentStorage>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            order: Vec::new(),
            component_storages: HashMap::new(),
        }
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity::new(self.entities.insert(()));
        self.order.push(entity);
        entity
    }

    /// Remove an entity and all of its components
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        if self.entities.remove(entity.key()).is_none() {
            return false;
        }
        for storage in self.component_storages.values_mut() {
            storage.remove_entity(entity.key());
        }
        self.order.retain(|e| *e != entity);
        true
    }

    /// Check whether the entity is still alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity.key())
    }

    /// Live entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    /// Add a component to an entity, replacing any previous one of that type.
    ///
    /// Returns the replaced component. Components on dead entities are dropped.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage_mut::<T>().components.insert(entity.key(), component)
    }

    /// Remove a component from an entity
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<TypedStorage<T>>()?
            .components
            .remove(entity.key())
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.components.get(entity.key())
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<TypedStorage<T>>()?
            .components
            .get_mut(entity.key())
    }

    /// Check whether the entity has a component of type `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.get_component::<T>(entity).is_some()
    }

    /// Every entity carrying a `T`, in creation order
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        let storage = self.storage::<T>();
        self.order.iter().filter_map(move |entity| {
            storage
                .and_then(|s| s.components.get(entity.key()))
                .map(|component| (*entity, component))
        })
    }

    fn storage<T: Component>(&self) -> Option<&TypedStorage<T>> {
        self.component_storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<TypedStorage<T>>()
    }

    fn storage_mut<T: Component>(&mut self) -> &mut TypedStorage<T> {
        let storage = self
            .component_storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedStorage::<T>::new()));
        match storage.as_any_mut().downcast_mut::<TypedStorage<T>>() {
            Some(typed) => typed,
            None => unreachable!("component storage registered under a foreign TypeId"),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
