//! Pre-resolution heuristics for dynamic entities
//!
//! Both run before the triangle phase and only move the entity's transform;
//! the caller refreshes colliders afterwards.
//!
//! - Ledge detection looks ahead of an ellipsoid collider and pushes the
//!   entity back from drops taller than its ledge height.
//! - Robust protection casts a ray along the tick's motion and pulls the
//!   entity back in front of the first surface it would have passed through.

use crate::config::CollisionConfig;
use crate::ecs::components::{CollisionComponent, TransformComponent};
use crate::ecs::World;
use crate::foundation::logging::warn;
use crate::foundation::math::{direction, is_finite, max_component, Vec3};
use crate::physics::collision::{CollisionTriangle, Ellipsoid, PlaneSide, Ray, SurfaceType};

use super::collision_queries::triangles_hit;

/// Push the entity back from ledges ahead of it.
///
/// Returns `true` when the transform was moved. Non-ellipsoid colliders are
/// left alone.
pub(crate) fn perform_ledge_detection(
    world: &World,
    config: &CollisionConfig,
    transform: &mut TransformComponent,
    body: &mut CollisionComponent,
) -> bool {
    if body.collider().as_ellipsoid().is_none() {
        return false;
    }

    let forward = transform.forward();
    let diagonals = [transform.right() + forward, transform.left() + forward];
    let pushed = diagonals
        .into_iter()
        .any(|heading| check_ledge_along(world, config, heading, transform, body));

    if pushed {
        for side in [transform.right(), transform.left()] {
            if check_ledge_along(world, config, side, transform, body) {
                break;
            }
        }
    }
    pushed
}

/// Pull the entity back in front of the first triangle crossed this tick.
///
/// Non-finite travel snaps the entity back to its previous position.
pub(crate) fn perform_robust_protection(
    world: &World,
    config: &CollisionConfig,
    transform: &mut TransformComponent,
    body: &CollisionComponent,
) {
    let distance = transform.distance_traveled();
    let travel = transform.direction_traveled();
    if !distance.is_finite() || !is_finite(&travel) {
        warn!(
            "Non-finite motion from {:?} to {:?}, restoring previous position",
            transform.previous.position, transform.position
        );
        transform.position = transform.previous.position;
        return;
    }

    let collider = body.collider();
    let offset = collider.offset();
    let previous = transform.previous.position + offset;
    let start = previous - travel * max_component(&collider.bounding_box().radius);
    let ray = Ray::new(start, travel);

    let Some((hit, _)) = triangles_hit(world, &ray, false, body.triangle_filter.as_deref(), None)
        .into_iter()
        .next()
    else {
        return;
    };

    if (hit - previous).magnitude() < distance {
        transform.position = hit - travel * config.robust_backoff - offset;
    }
}

/// Run one ledge check and refresh colliders whatever the outcome
fn check_ledge_along(
    world: &World,
    config: &CollisionConfig,
    heading: Vec3,
    transform: &mut TransformComponent,
    body: &mut CollisionComponent,
) -> bool {
    let pushed = match (heading.try_normalize(f32::EPSILON), body.collider().as_ellipsoid()) {
        (Some(heading), Some(ellipsoid)) => {
            ledge_push_back(world, config, heading, transform.position, ellipsoid, body.ledge_height)
        }
        _ => None,
    };

    if let Some(position) = pushed {
        transform.position = position;
    }
    body.update_colliders(&transform.transform());
    pushed.is_some()
}

/// New entity position when a ledge lies along `heading`, else `None`
fn ledge_push_back(
    world: &World,
    config: &CollisionConfig,
    heading: Vec3,
    position: Vec3,
    ellipsoid: &Ellipsoid,
    ledge_height: f32,
) -> Option<Vec3> {
    let radius = ellipsoid.radius;
    let center = ellipsoid.position();

    let ahead = center + heading * radius.x * config.ledge_lookahead_fraction;
    if let Some((hit, _)) = first_wall_hit(world, ahead, heading) {
        if (hit - position).magnitude() < radius.x {
            return None;
        }
    }

    let below = ahead - direction::up() * (radius.y + config.ledge_drop_margin);
    if let Some((floor, _)) = first_floor_hit(world, below, center) {
        if (position.y - floor.y).abs() < ledge_height {
            return None;
        }
    }

    let beneath_entity = Vec3::new(position.x, position.y - config.ledge_drop_margin, position.z);
    let back = (beneath_entity - below).try_normalize(f32::EPSILON)?;
    let (_, wall) = first_wall_hit(world, below, back)?;

    let closest = wall.closest_surface_point(center);
    if (closest - position).magnitude() >= radius.x {
        return None;
    }
    let pushed = closest - wall.normal() * radius.x;
    Some(Vec3::new(pushed.x, position.y, pushed.z))
}

/// Nearest wall facing `origin` along the ray
fn first_wall_hit(world: &World, origin: Vec3, toward: Vec3) -> Option<(Vec3, CollisionTriangle)> {
    let facing_walls = move |triangle: &CollisionTriangle| {
        triangle.surface_type() == SurfaceType::Wall && triangle.plane().classify_point(origin) == PlaneSide::Front
    };
    triangles_hit(world, &Ray::new(origin, toward), false, Some(&facing_walls), None)
        .into_iter()
        .next()
}

/// Nearest walkable surface straight below `origin` that `viewer` stands above
fn first_floor_hit(world: &World, origin: Vec3, viewer: Vec3) -> Option<(Vec3, CollisionTriangle)> {
    let walkable = move |triangle: &CollisionTriangle| {
        triangle.surface_type().is_walkable() && triangle.plane().classify_point(viewer) == PlaneSide::Front
    };
    triangles_hit(world, &Ray::new(origin, direction::down()), false, Some(&walkable), None)
        .into_iter()
        .next()
}
