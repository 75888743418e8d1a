//! ECS Systems module

mod collision_heuristics;
pub mod collision_queries;
pub mod collision_system;
pub mod transform_history;

pub use collision_queries::{
    closest_hit, entities_hit, entities_probably_hit_by_collider, entities_probably_hit_by_ray, triangles_hit,
    triangles_near, ClosestHit,
};
pub use collision_system::{CollisionError, CollisionPair, CollisionSystem};
pub use transform_history::TransformHistorySystem;
