//! ECS Components module
//!
//! Contains the components the collision pass reads and writes

pub mod transform;
pub mod collision;
pub mod octree;
pub mod rig;

pub use transform::TransformComponent;
pub use collision::{
    CollisionComponent, CollisionKind, CollisionOptions, EntityFilter, EntityPredicate, TriangleFilter,
};
pub use octree::OctreeComponent;
pub use rig::{Joint, RigComponent, Skeleton};
