//! Collision geometry
//!
//! Shapes, triangles and the narrow-phase math between them.
//!
//! # Module Organization
//!
//! - [`primitives`] - Rays, planes, surface classification, result types
//! - [`triangle`] - Collision triangles used by meshes and the octree
//! - [`attributes`] - Game-defined bits carried by each triangle
//! - [`aabb`], [`obb`], [`sphere`] - Primitive colliders
//! - [`mesh`], [`skinned`] - Triangle-soup colliders
//! - [`shape`] - The [`Collider`] sum type and its double dispatch
//!
//! # Conventions
//!
//! `base.interpenetration(other)` measures how far `other` must move along
//! the returned direction to leave `base`. Depths are positive and exactly
//! touching shapes do not collide.

pub mod primitives;
pub mod triangle;
pub mod attributes;
pub mod aabb;
pub mod obb;
pub mod sphere;
pub mod mesh;
pub mod skinned;
pub mod shape;

pub use primitives::{Interpenetration, Plane, PlaneSide, Ray, SurfaceImpact, SurfaceType};
pub use triangle::{CollisionTriangle, TrianglePredicate};
pub use attributes::CollisionAttributes;
pub use aabb::Aabb;
pub use obb::Obb;
pub use sphere::{Ellipsoid, Sphere};
pub use mesh::{MeshCollider, RawGeometry};
pub use skinned::{SkinnedMeshCollider, SkinnedVertex};
pub use shape::Collider;
