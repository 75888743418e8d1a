//! Collision component for ECS
//!
//! Based on Game Engine Architecture 3rd Edition:
//! - Section 13.3: Collision Detection System
//! - Section 16.2: Component-based architecture
//!
//! Holds an entity's colliders, its participation rules and the contacts
//! recorded for it during the current tick.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::ecs::{Component, Entity};
use crate::foundation::math::Transform;
use crate::physics::collision::{Aabb, Collider, CollisionTriangle, Interpenetration, TrianglePredicate};

/// Predicate deciding whether an entity takes part in a query
pub type EntityPredicate = dyn Fn(Entity) -> bool + Send + Sync;

/// Shared triangle predicate stored on a component
pub type TriangleFilter = Arc<TrianglePredicate>;

/// Shared entity predicate stored on a component
pub type EntityFilter = Arc<EntityPredicate>;

/// How an entity takes part in the resolution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Never moved by the pass; other entities are pushed out of it
    Static,

    /// Moved out of triangles, static entities and lower-priority dynamics.
    /// Higher priority entities are resolved first and win pairwise contests.
    Dynamic {
        /// Resolution priority
        priority: i32,
    },
}

impl Default for CollisionKind {
    fn default() -> Self {
        Self::Dynamic { priority: 0 }
    }
}

bitflags! {
    /// Per-entity switches for the resolution pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionOptions: u32 {
        /// Ignore other entities, both as obstacles and as movers
        const SKIP_ENTITIES = 1 << 1;
        /// Ignore level and mesh triangles
        const SKIP_TRIANGLES = 1 << 2;
        /// Ray cast along the tick's motion to stop tunneling
        const ROBUST_PROTECTION = 1 << 3;
        /// Stop at cliff edges taller than the ledge height
        const LEDGE_DETECTION = 1 << 4;
    }
}

/// Component giving an entity collision behavior
#[derive(Clone)]
pub struct CollisionComponent {
    /// Static or dynamic participation
    pub kind: CollisionKind,

    /// Disabled components are skipped entirely
    pub is_enabled: bool,

    /// Pass switches
    pub options: CollisionOptions,

    /// Cheap shape used when no detail collider is set
    pub primitive_collider: Collider,

    /// Precise shape, preferred over the primitive one
    pub detail_collider: Option<Collider>,

    /// Shape used by ray queries that ask for it
    pub ray_cast_collider: Option<Collider>,

    /// Drops shallower than this are walked down instead of treated as ledges
    pub ledge_height: f32,

    /// Restricts which triangles this entity collides with
    pub triangle_filter: Option<TriangleFilter>,

    /// Restricts which entities this entity collides with
    pub entity_filter: Option<EntityFilter>,

    /// Triangles touched this tick, with the push applied for each
    pub touching: Vec<(CollisionTriangle, Interpenetration)>,

    /// Entities intersected this tick; directions point away from the listed entity
    pub intersecting: Vec<(Entity, Interpenetration)>,
}

impl Component for CollisionComponent {}

impl Default for CollisionComponent {
    fn default() -> Self {
        Self {
            kind: CollisionKind::default(),
            is_enabled: true,
            options: CollisionOptions::empty(),
            primitive_collider: Collider::default(),
            detail_collider: None,
            ray_cast_collider: None,
            ledge_height: 0.5,
            triangle_filter: None,
            entity_filter: None,
            touching: Vec::new(),
            intersecting: Vec::new(),
        }
    }
}

impl fmt::Debug for CollisionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionComponent")
            .field("kind", &self.kind)
            .field("is_enabled", &self.is_enabled)
            .field("options", &self.options)
            .field("collider", self.collider())
            .field("ledge_height", &self.ledge_height)
            .field("has_triangle_filter", &self.triangle_filter.is_some())
            .field("has_entity_filter", &self.entity_filter.is_some())
            .field("touching", &self.touching.len())
            .field("intersecting", &self.intersecting.len())
            .finish_non_exhaustive()
    }
}

impl CollisionComponent {
    /// Dynamic entity with the given primitive collider and priority 0
    pub fn dynamic(collider: impl Into<Collider>) -> Self {
        Self {
            primitive_collider: collider.into(),
            ..Self::default()
        }
    }

    /// Static entity with the given collider
    pub fn fixed(collider: impl Into<Collider>) -> Self {
        Self {
            kind: CollisionKind::Static,
            primitive_collider: collider.into(),
            ..Self::default()
        }
    }

    /// Builder pattern: Set resolution priority, making the entity dynamic
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.kind = CollisionKind::Dynamic { priority };
        self
    }

    /// Builder pattern: Add pass options
    pub fn with_options(mut self, options: CollisionOptions) -> Self {
        self.options |= options;
        self
    }

    /// Builder pattern: Set the detail collider
    pub fn with_detail_collider(mut self, collider: impl Into<Collider>) -> Self {
        self.detail_collider = Some(collider.into());
        self
    }

    /// Builder pattern: Set the ray cast collider
    pub fn with_ray_cast_collider(mut self, collider: impl Into<Collider>) -> Self {
        self.ray_cast_collider = Some(collider.into());
        self
    }

    /// Builder pattern: Set the ledge height
    pub fn with_ledge_height(mut self, height: f32) -> Self {
        self.ledge_height = height;
        self
    }

    /// Builder pattern: Set the triangle filter
    pub fn with_triangle_filter(
        mut self,
        filter: impl Fn(&CollisionTriangle) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.triangle_filter = Some(Arc::new(filter));
        self
    }

    /// Builder pattern: Set the entity filter
    pub fn with_entity_filter(mut self, filter: impl Fn(Entity) -> bool + Send + Sync + 'static) -> Self {
        self.entity_filter = Some(Arc::new(filter));
        self
    }

    /// Builder pattern: Enable or disable
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.is_enabled = enabled;
        self
    }

    /// Effective collider: the detail collider when set, else the primitive one
    pub fn collider(&self) -> &Collider {
        self.detail_collider.as_ref().unwrap_or(&self.primitive_collider)
    }

    /// Collider used by ray queries, falling back to the effective collider
    pub fn ray_cast_collider(&self) -> &Collider {
        self.ray_cast_collider.as_ref().unwrap_or_else(|| self.collider())
    }

    /// Bounding box of the effective collider
    pub fn bounding_box(&self) -> Aabb {
        self.collider().bounding_box()
    }

    /// Move every collider to follow `transform`.
    ///
    /// An oriented-box detail collider also re-derives the primitive box from
    /// its corners so the broad phase stays conservative under rotation.
    pub fn update_colliders(&mut self, transform: &Transform) {
        self.primitive_collider.update(transform);
        if let Some(detail) = self.detail_collider.as_mut() {
            detail.update(transform);
            if let Collider::Obb(obb) = detail {
                self.primitive_collider = Collider::Aabb(obb.bounding_box());
            }
        }
        if let Some(ray_cast) = self.ray_cast_collider.as_mut() {
            ray_cast.update(transform);
        }
    }

    /// Re-base every collider's offset and size from a joint transform
    pub fn update_size_and_offset(&mut self, transform: &Transform) {
        self.primitive_collider.update_size_and_offset(transform);
        if let Some(detail) = self.detail_collider.as_mut() {
            detail.update_size_and_offset(transform);
        }
        if let Some(ray_cast) = self.ray_cast_collider.as_mut() {
            ray_cast.update_size_and_offset(transform);
        }
    }

    /// Whether the pass moves this entity
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, CollisionKind::Dynamic { .. })
    }

    /// Resolution priority; static entities report `i32::MAX`
    pub fn priority(&self) -> i32 {
        match self.kind {
            CollisionKind::Dynamic { priority } => priority,
            CollisionKind::Static => i32::MAX,
        }
    }

    /// Whether this entity takes part in entity-vs-entity tests
    pub fn collides_with_entities(&self) -> bool {
        !self.options.contains(CollisionOptions::SKIP_ENTITIES)
    }

    /// Whether the entity filter accepts `entity`
    pub fn accepts_entity(&self, entity: Entity) -> bool {
        self.entity_filter.as_ref().map_or(true, |accept| accept(entity))
    }

    /// Whether the triangle filter accepts `triangle`
    pub fn accepts_triangle(&self, triangle: &CollisionTriangle) -> bool {
        self.triangle_filter.as_ref().map_or(true, |accept| accept(triangle))
    }

    /// Forget the previous tick's contacts
    pub fn clear_results(&mut self) {
        self.touching.clear();
        self.intersecting.clear();
    }
}
