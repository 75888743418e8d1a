//! Ray and region queries over a world's collision data
//!
//! Level triangles come from every [`OctreeComponent`]; entity triangles come
//! from mesh colliders on [`CollisionComponent`]s. Ray results are sorted by
//! distance from the ray origin, nearest first.

use crate::ecs::components::{CollisionComponent, EntityPredicate, OctreeComponent};
use crate::ecs::{Entity, World};
use crate::foundation::math::Vec3;
use crate::physics::collision::{Aabb, Collider, CollisionTriangle, Ray, SurfaceImpact, TrianglePredicate};

/// Nearest thing a ray ran into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestHit {
    /// World-space hit position
    pub position: Vec3,
    /// Surface normal at the hit
    pub normal: Vec3,
    /// The triangle hit, when a triangle was nearest
    pub triangle: Option<CollisionTriangle>,
    /// The entity hit, when an entity collider was nearest
    pub entity: Option<Entity>,
}

/// Level triangles whose boxes overlap `region`.
///
/// Octrees are searched in creation order and the first non-empty result is
/// returned.
pub fn triangles_near(world: &World, region: &Aabb, filter: Option<&TrianglePredicate>) -> Vec<CollisionTriangle> {
    for (_, octree) in world.query::<OctreeComponent>() {
        if !octree.bounding_box().is_some_and(|bounds| bounds.is_colliding(region)) {
            continue;
        }
        let mut triangles = octree.triangles_near(region);
        if triangles.is_empty() {
            continue;
        }
        if let Some(accept) = filter {
            triangles.retain(|triangle| accept(triangle));
        }
        return triangles;
    }
    Vec::new()
}

/// Every triangle the ray passes through, from mesh entities and octrees
pub fn triangles_hit(
    world: &World,
    ray: &Ray,
    use_ray_cast_collider: bool,
    triangle_filter: Option<&TrianglePredicate>,
    entity_filter: Option<&EntityPredicate>,
) -> Vec<(Vec3, CollisionTriangle)> {
    let mut hits = Vec::new();

    for (_, component) in probable_ray_hits(world, ray, use_ray_cast_collider, entity_filter) {
        let collider = query_collider(component, use_ray_cast_collider);
        if !collider.is_mesh() {
            continue;
        }
        hits.extend(
            collider
                .triangles_hit(ray)
                .into_iter()
                .filter(|(_, triangle)| triangle_filter.map_or(true, |accept| accept(triangle))),
        );
    }

    for (_, octree) in world.query::<OctreeComponent>() {
        hits.extend(octree.triangles_hit(ray, triangle_filter));
    }

    hits.sort_by(|(a, _), (b, _)| {
        (a - ray.origin)
            .magnitude_squared()
            .total_cmp(&(b - ray.origin).magnitude_squared())
    });
    hits
}

/// Entities whose collider box the ray passes through or starts in
pub fn entities_probably_hit_by_ray(world: &World, ray: &Ray, filter: Option<&EntityPredicate>) -> Vec<Entity> {
    probable_ray_hits(world, ray, false, filter)
        .map(|(entity, _)| entity)
        .collect()
}

/// Entities whose collider box overlaps the box of `collider`
pub fn entities_probably_hit_by_collider(
    world: &World,
    collider: &Collider,
    filter: Option<&EntityPredicate>,
) -> Vec<Entity> {
    let bounds = collider.bounding_box();
    world
        .query::<CollisionComponent>()
        .filter(|(entity, _)| filter.map_or(true, |accept| accept(*entity)))
        .filter(|(_, component)| component.bounding_box().is_colliding(&bounds))
        .map(|(entity, _)| entity)
        .collect()
}

/// Exact ray hits against non-mesh entity colliders
pub fn entities_hit(
    world: &World,
    ray: &Ray,
    use_ray_cast_collider: bool,
    filter: Option<&EntityPredicate>,
) -> Vec<(SurfaceImpact, Entity)> {
    let mut hits: Vec<(SurfaceImpact, Entity)> = probable_ray_hits(world, ray, use_ray_cast_collider, filter)
        .filter_map(|(entity, component)| {
            let collider = query_collider(component, use_ray_cast_collider);
            if collider.is_mesh() {
                return None;
            }
            collider.surface_impact(ray).map(|impact| (impact, entity))
        })
        .collect();

    hits.sort_by(|(a, _), (b, _)| a.distance.total_cmp(&b.distance));
    hits
}

/// Nearest triangle or entity hit.
///
/// A triangle wins ties; the entity is reported only when strictly closer.
pub fn closest_hit(
    world: &World,
    ray: &Ray,
    use_ray_cast_collider: bool,
    triangle_filter: Option<&TrianglePredicate>,
    entity_filter: Option<&EntityPredicate>,
) -> Option<ClosestHit> {
    let triangle = triangles_hit(world, ray, use_ray_cast_collider, triangle_filter, entity_filter)
        .into_iter()
        .next()
        .map(|(position, triangle)| ClosestHit {
            position,
            normal: triangle.normal(),
            triangle: Some(triangle),
            entity: None,
        });
    let entity = entities_hit(world, ray, use_ray_cast_collider, entity_filter)
        .into_iter()
        .next()
        .map(|(impact, entity)| {
            (
                impact.distance,
                ClosestHit {
                    position: impact.position,
                    normal: impact.normal,
                    triangle: None,
                    entity: Some(entity),
                },
            )
        });

    match (triangle, entity) {
        (Some(triangle), Some((distance, entity))) => {
            if distance < (triangle.position - ray.origin).magnitude() {
                Some(entity)
            } else {
                Some(triangle)
            }
        }
        (Some(triangle), None) => Some(triangle),
        (None, Some((_, entity))) => Some(entity),
        (None, None) => None,
    }
}

fn query_collider(component: &CollisionComponent, use_ray_cast_collider: bool) -> &Collider {
    if use_ray_cast_collider {
        component.ray_cast_collider()
    } else {
        component.collider()
    }
}

fn probable_ray_hits<'w>(
    world: &'w World,
    ray: &'w Ray,
    use_ray_cast_collider: bool,
    filter: Option<&'w EntityPredicate>,
) -> impl Iterator<Item = (Entity, &'w CollisionComponent)> + 'w {
    world
        .query::<CollisionComponent>()
        .filter(move |(entity, _)| filter.map_or(true, |accept| accept(*entity)))
        .filter(move |(_, component)| {
            query_collider(component, use_ray_cast_collider)
                .bounding_box()
                .is_colliding_with_ray(ray)
        })
}
