//! # collision3d
//!
//! Octree-indexed static triangle collision and per-tick collision
//! resolution for 3D game entities.
//!
//! ## Features
//!
//! - **Octree Level Index**: Static level triangles bucketed for fast region and ray queries
//! - **Collider Shapes**: AABB, OBB, sphere, ellipsoid, mesh and skinned mesh colliders
//! - **Resolution Pass**: Priority-ordered push-out against triangles, static and dynamic entities
//! - **Heuristics**: Ledge detection and tunneling protection for fast movers
//! - **Ray Queries**: Sorted hits across the level and entity colliders
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collision3d::prelude::*;
//!
//! let mut world = World::new();
//! let player = world.create_entity();
//! world.add_component(player, TransformComponent::from_position(Vec3::new(0.0, 1.0, 0.0)));
//! world.add_component(player, CollisionComponent::dynamic(Sphere::new(Vec3::zeros(), Vec3::zeros(), 0.5)));
//!
//! let mut history = TransformHistorySystem::new();
//! let mut collision = CollisionSystem::default();
//! history.run(&mut world).ok();
//! // ... move entities ...
//! collision.run(&mut world)?;
//! # Ok::<(), CollisionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod physics;
pub mod spatial;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, ConfigError},
        ecs::{
            components::{
                CollisionComponent, CollisionKind, CollisionOptions, Joint, OctreeComponent, RigComponent,
                Skeleton, TransformComponent,
            },
            systems::{CollisionError, CollisionSystem, TransformHistorySystem},
            Component, Entity, System, World,
        },
        foundation::math::{Mat4, Quat, Transform, Vec3},
        physics::collision::{
            Aabb, Collider, CollisionAttributes, CollisionTriangle, Ellipsoid, Interpenetration, MeshCollider, Obb, Ray, Sphere,
            SurfaceImpact, SurfaceType,
        },
        spatial::{Octree, OctreeConfig},
    };
}
