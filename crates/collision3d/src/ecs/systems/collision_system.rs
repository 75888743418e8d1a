//! ECS collision resolution system
//!
//! Based on Game Engine Architecture 3rd Edition:
//! - Section 13.3: Collision Detection System
//! - Section 16.6: Updating Game Objects in Real Time
//!
//! One pass per tick. Dynamic entities are visited in descending priority and
//! pushed out of level triangles, mesh entities, static entities and other
//! dynamic entities by simple position correction. Every contact is recorded
//! on the entity's [`CollisionComponent`] for gameplay code to read until the
//! next tick.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::config::CollisionConfig;
use crate::ecs::components::{
    CollisionComponent, CollisionOptions, OctreeComponent, RigComponent, TransformComponent,
};
use crate::ecs::{Entity, System, World};
use crate::foundation::logging::{error, trace};
use crate::foundation::math::{direction, Transform, Vec3};
use crate::physics::collision::{Collider, CollisionTriangle, Interpenetration, SkinnedMeshCollider, SurfaceType};

use super::collision_heuristics::{perform_ledge_detection, perform_robust_protection};
use super::collision_queries::entities_probably_hit_by_collider;

/// Collision pair representing two entities that have been tested this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Entity with the smaller id
    pub entity_a: Entity,
    /// Entity with the larger id
    pub entity_b: Entity,
}

impl CollisionPair {
    /// Create a new collision pair (always stores smaller entity ID first for consistency)
    pub fn new(entity_a: Entity, entity_b: Entity) -> Self {
        if entity_a.id() < entity_b.id() {
            Self { entity_a, entity_b }
        } else {
            Self {
                entity_a: entity_b,
                entity_b: entity_a,
            }
        }
    }
}

/// Failures that abort a collision pass
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CollisionError {
    /// A rig names a collider joint its skeleton does not have
    #[error("entity {entity} drives its collider from joint `{joint}`, which its skeleton lacks")]
    MissingJoint {
        /// Id of the misconfigured entity
        entity: u64,
        /// The joint name that failed to resolve
        joint: String,
    },
}

/// Per-tick collision resolution
#[derive(Debug, Clone, Default)]
pub struct CollisionSystem {
    config: CollisionConfig,
}

impl CollisionSystem {
    /// Create a collision system with the given tunables
    pub fn new(config: CollisionConfig) -> Self {
        Self { config }
    }

    /// Current tunables
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Build a level octree with this system's octree configuration
    pub fn load_level(&self, octree: &mut OctreeComponent, center: Vec3, triangles: &[CollisionTriangle]) {
        octree.load_with_config(center, triangles, &self.config.octree);
    }

    /// Run one resolution pass.
    ///
    /// Stops at the first misconfigured rig; entities resolved before it keep
    /// their corrections.
    pub fn update(&mut self, world: &mut World) -> Result<(), CollisionError> {
        let bodies: Vec<(Entity, bool, i32)> = world
            .query::<CollisionComponent>()
            .map(|(entity, body)| (entity, body.is_dynamic(), body.priority()))
            .collect();

        for (entity, _, _) in bodies.iter().filter(|(_, is_dynamic, _)| !is_dynamic) {
            pose_static_skin(world, *entity);
            refresh_colliders(world, *entity);
        }

        let mut order: Vec<(Entity, i32)> = Vec::new();
        for (entity, _, priority) in bodies.iter().filter(|(_, is_dynamic, _)| *is_dynamic) {
            refresh_colliders(world, *entity);
            if let Some(body) = world.get_component_mut::<CollisionComponent>(*entity) {
                body.clear_results();
            }
            order.push((*entity, *priority));
        }
        order.sort_by_key(|(_, priority)| Reverse(*priority));
        trace!("Collision pass over {} dynamic entities", order.len());

        let mut finished_pairs = HashSet::new();
        for (entity, _) in order {
            // Detached while resolving so the entity never meets itself
            let Some(mut body) = world.remove_component::<CollisionComponent>(entity) else {
                continue;
            };
            let outcome = self.resolve(world, entity, &mut body, &mut finished_pairs);
            world.add_component(entity, body);
            outcome?;
        }

        Ok(())
    }

    fn resolve(
        &self,
        world: &mut World,
        entity: Entity,
        body: &mut CollisionComponent,
        finished_pairs: &mut HashSet<CollisionPair>,
    ) -> Result<(), CollisionError> {
        if !body.is_enabled {
            return Ok(());
        }
        let Some(mut transform) = world.get_component::<TransformComponent>(entity).cloned() else {
            return Ok(());
        };

        apply_rig(world, entity, &transform, body)?;
        body.update_colliders(&transform.transform());

        if body.options.contains(CollisionOptions::LEDGE_DETECTION) {
            perform_ledge_detection(world, &self.config, &mut transform, body);
            body.update_colliders(&transform.transform());
        }

        if body.options.contains(CollisionOptions::ROBUST_PROTECTION) {
            perform_robust_protection(world, &self.config, &mut transform, body);
            body.update_colliders(&transform.transform());
        }

        if !body.options.contains(CollisionOptions::SKIP_TRIANGLES) {
            self.resolve_triangles(world, &mut transform, body);
        }

        if body.collides_with_entities() {
            self.resolve_static_entities(world, &mut transform, body);
            self.resolve_dynamic_entities(world, entity, &mut transform, body, finished_pairs);
        }

        if let Some(stored) = world.get_component_mut::<TransformComponent>(entity) {
            *stored = transform;
        }
        Ok(())
    }

    fn resolve_triangles(&self, world: &World, transform: &mut TransformComponent, body: &mut CollisionComponent) {
        let bounds = body.bounding_box();
        let scale = self.config.candidate_box_scale;

        let mut candidates: Vec<CollisionTriangle> = Vec::new();
        for other in entities_probably_hit_by_collider(world, body.collider(), None) {
            let triangles = world
                .get_component::<CollisionComponent>(other)
                .filter(|mesh| mesh.is_enabled)
                .and_then(|mesh| mesh.collider().triangles());
            if let Some(triangles) = triangles {
                candidates.extend_from_slice(triangles);
            }
        }

        let search = bounds.scaled(scale);
        for (_, octree) in world.query::<OctreeComponent>() {
            if octree.bounding_box().is_some_and(|root| root.is_colliding(&bounds)) {
                candidates.extend(octree.triangles_near(&search));
            }
        }

        candidates.retain(|triangle| triangle.is_potentially_colliding(&bounds, scale));
        candidates.sort_by_key(CollisionTriangle::surface_type);
        candidates.retain(|triangle| body.accepts_triangle(triangle));

        for triangle in candidates {
            let Some(hit) = triangle.interpenetration(body.collider()).and_then(Interpenetration::colliding) else {
                continue;
            };
            body.touching.push((triangle, hit));

            let push = hit.depth + self.config.rest_gap;
            transform.position += match triangle.surface_type() {
                SurfaceType::Floor | SurfaceType::Ramp => direction::up() * push,
                SurfaceType::Ceiling => direction::down() * push,
                SurfaceType::Wall => hit.direction * push,
            };
            body.update_colliders(&transform.transform());
        }
    }

    fn resolve_static_entities(&self, world: &World, transform: &mut TransformComponent, body: &mut CollisionComponent) {
        let candidates: Vec<Entity> = world
            .query::<CollisionComponent>()
            .filter(|(_, other)| !other.is_dynamic())
            .map(|(other, _)| other)
            .collect();

        for other in candidates {
            if !body.accepts_entity(other) {
                continue;
            }
            let Some(fixed) = world.get_component::<CollisionComponent>(other) else {
                continue;
            };
            if !fixed.is_enabled
                || fixed.collider().is_mesh()
                || !fixed.collides_with_entities()
                || !body.bounding_box().is_colliding(&fixed.bounding_box())
            {
                continue;
            }

            let Some(hit) = fixed
                .collider()
                .interpenetration(body.collider())
                .and_then(Interpenetration::colliding)
            else {
                continue;
            };
            body.intersecting.push((other, hit));
            transform.position += hit.direction * (hit.depth + self.config.rest_gap);
            body.update_colliders(&transform.transform());
        }
    }

    /// Pairwise resolution between dynamic entities.
    ///
    /// Each unordered pair is tested once per tick. The lower-priority entity
    /// moves; on equal priority the entity currently being resolved moves.
    fn resolve_dynamic_entities(
        &self,
        world: &mut World,
        entity: Entity,
        transform: &mut TransformComponent,
        body: &mut CollisionComponent,
        finished_pairs: &mut HashSet<CollisionPair>,
    ) {
        if body.collider().is_mesh() {
            return;
        }

        let candidates: Vec<Entity> = world
            .query::<CollisionComponent>()
            .filter(|(_, other)| other.is_dynamic())
            .map(|(other, _)| other)
            .collect();

        for other in candidates {
            if !body.accepts_entity(other) {
                continue;
            }
            let Some(them) = world.get_component::<CollisionComponent>(other) else {
                continue;
            };
            if !them.is_enabled || !them.accepts_entity(entity) || them.collider().is_mesh() {
                continue;
            }
            if !finished_pairs.insert(CollisionPair::new(entity, other)) {
                continue;
            }
            if !them.collides_with_entities() || !body.bounding_box().is_colliding(&them.bounding_box()) {
                continue;
            }

            if body.priority() <= them.priority() {
                let Some(hit) = them
                    .collider()
                    .interpenetration(body.collider())
                    .and_then(Interpenetration::colliding)
                else {
                    continue;
                };
                body.intersecting.push((other, hit));
                transform.position += hit.direction * (hit.depth + self.config.rest_gap);
                body.update_colliders(&transform.transform());
                if let Some(them) = world.get_component_mut::<CollisionComponent>(other) {
                    them.intersecting.push((entity, hit.reversed()));
                }
            } else {
                let Some(hit) = body
                    .collider()
                    .interpenetration(them.collider())
                    .and_then(Interpenetration::colliding)
                else {
                    continue;
                };
                body.intersecting.push((other, hit.reversed()));
                push_entity(world, other, hit.direction * (hit.depth + self.config.rest_gap));
                if let Some(them) = world.get_component_mut::<CollisionComponent>(other) {
                    them.intersecting.push((entity, hit));
                }
            }
        }
    }
}

impl System for CollisionSystem {
    type Error = CollisionError;

    fn run(&mut self, world: &mut World) -> Result<(), Self::Error> {
        self.update(world)
    }
}

/// Move colliders to follow the entity's stored transform
fn refresh_colliders(world: &mut World, entity: Entity) {
    let Some(transform) = world.get_component::<TransformComponent>(entity).map(TransformComponent::transform) else {
        return;
    };
    if let Some(body) = world.get_component_mut::<CollisionComponent>(entity) {
        body.update_colliders(&transform);
    }
}

/// Translate another entity and refresh its colliders
fn push_entity(world: &mut World, entity: Entity, delta: Vec3) {
    if let Some(transform) = world.get_component_mut::<TransformComponent>(entity) {
        transform.position += delta;
    }
    refresh_colliders(world, entity);
}

/// Drive collider size and offset from the rig's collider joint and pose any
/// skinned mesh colliders
fn apply_rig(
    world: &World,
    entity: Entity,
    transform: &TransformComponent,
    body: &mut CollisionComponent,
) -> Result<(), CollisionError> {
    let Some(rig) = world.get_component::<RigComponent>(entity) else {
        return Ok(());
    };

    if let Some(joint_name) = rig.collider_joint.as_deref() {
        let Some(joint) = rig.joint_named(joint_name) else {
            error!("{entity} drives its collider from joint `{joint_name}`, which its skeleton lacks");
            return Err(CollisionError::MissingJoint {
                entity: entity.id(),
                joint: joint_name.to_string(),
            });
        };
        let joint_world = Transform::from_matrix(transform.to_matrix() * joint.model_space);
        let joint_model = Transform::from_matrix(joint.model_space);
        body.update_size_and_offset(&Transform {
            position: joint_world.position - transform.position,
            rotation: transform.rotation * joint_model.rotation.inverse(),
            scale: joint_model.scale,
        });
    }

    let mut palette = None;
    for mesh in skinned_colliders(body) {
        mesh.set_pose(palette.get_or_insert_with(|| rig.skinning_matrices()));
    }
    Ok(())
}

/// Pose the skinned mesh colliders of a static entity from its rig.
///
/// Static entities never resolve, so their collider joint is not applied.
fn pose_static_skin(world: &mut World, entity: Entity) {
    let Some(palette) = world.get_component::<RigComponent>(entity).map(RigComponent::skinning_matrices) else {
        return;
    };
    if let Some(body) = world.get_component_mut::<CollisionComponent>(entity) {
        for mesh in skinned_colliders(body) {
            mesh.set_pose(&palette);
        }
    }
}

fn skinned_colliders(body: &mut CollisionComponent) -> impl Iterator<Item = &mut SkinnedMeshCollider> + '_ {
    std::iter::once(&mut body.primitive_collider)
        .chain(body.detail_collider.as_mut())
        .chain(body.ray_cast_collider.as_mut())
        .filter_map(|collider| match collider {
            Collider::SkinnedMesh(mesh) => Some(mesh),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_unordered() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        assert_eq!(CollisionPair::new(a, b), CollisionPair::new(b, a));
        assert_eq!(CollisionPair::new(b, a).entity_a, a);
    }

    #[test]
    fn test_missing_joint_message() {
        let error = CollisionError::MissingJoint {
            entity: 7,
            joint: "hand".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "entity 7 drives its collider from joint `hand`, which its skeleton lacks"
        );
    }
}
