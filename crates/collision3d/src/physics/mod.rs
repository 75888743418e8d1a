//! Physics module for collision detection
//!
//! Collider shapes and the narrow-phase tests between them. Broad-phase
//! indexing lives in [`crate::spatial`], resolution in
//! [`crate::ecs::systems::collision_system`].

pub mod collision;

pub use collision::{
    Aabb,
    Collider,
    CollisionTriangle,
    Interpenetration,
    Ray,
    SurfaceImpact,
    SurfaceType,
};
