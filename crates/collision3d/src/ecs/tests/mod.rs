//! Whole-pass collision scenarios
//!
//! Each test builds a small world, runs one or two collision passes and
//! checks where entities end up and what contacts were recorded.

use std::f32::consts::FRAC_PI_2;

use approx::assert_relative_eq;

use crate::config::CollisionConfig;
use crate::ecs::components::{
    CollisionComponent, CollisionOptions, Joint, OctreeComponent, RigComponent, Skeleton, TransformComponent,
};
use crate::ecs::systems::{closest_hit, triangles_hit, CollisionError, CollisionSystem, TransformHistorySystem};
use crate::ecs::{Entity, System, World};
use crate::foundation::logging;
use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::physics::collision::{
    Aabb, Collider, CollisionAttributes, CollisionTriangle, Ellipsoid, MeshCollider, Ray, SkinnedMeshCollider,
    SkinnedVertex, Sphere, SurfaceType,
};

fn quad(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> [CollisionTriangle; 2] {
    [CollisionTriangle::new(p0, p1, p2), CollisionTriangle::new(p0, p2, p3)]
}

/// Floor facing +y over `x0..x1`, `z0..z1`
fn floor(y: f32, x0: f32, x1: f32, z0: f32, z1: f32) -> [CollisionTriangle; 2] {
    quad(
        Vec3::new(x0, y, z1),
        Vec3::new(x1, y, z1),
        Vec3::new(x1, y, z0),
        Vec3::new(x0, y, z0),
    )
}

/// Ceiling facing -y over `x0..x1`, `z0..z1`
fn ceiling(y: f32, x0: f32, x1: f32, z0: f32, z1: f32) -> [CollisionTriangle; 2] {
    quad(
        Vec3::new(x0, y, z0),
        Vec3::new(x1, y, z0),
        Vec3::new(x1, y, z1),
        Vec3::new(x0, y, z1),
    )
}

/// Wall in the plane `x`, facing +x
fn wall_facing_positive_x(x: f32, y0: f32, y1: f32, z0: f32, z1: f32) -> [CollisionTriangle; 2] {
    quad(
        Vec3::new(x, y0, z0),
        Vec3::new(x, y1, z0),
        Vec3::new(x, y1, z1),
        Vec3::new(x, y0, z1),
    )
}

/// Wall in the plane `x`, facing -x
fn wall_facing_negative_x(x: f32, y0: f32, y1: f32, z0: f32, z1: f32) -> [CollisionTriangle; 2] {
    quad(
        Vec3::new(x, y0, z0),
        Vec3::new(x, y0, z1),
        Vec3::new(x, y1, z1),
        Vec3::new(x, y1, z0),
    )
}

fn spawn_level(world: &mut World, triangles: &[CollisionTriangle]) -> Entity {
    let level = world.create_entity();
    let mut octree = OctreeComponent::new();
    CollisionSystem::default().load_level(&mut octree, Vec3::zeros(), triangles);
    world.add_component(level, octree);
    level
}

fn spawn(world: &mut World, transform: TransformComponent, body: CollisionComponent) -> Entity {
    let entity = world.create_entity();
    world.add_component(entity, transform);
    world.add_component(entity, body);
    entity
}

fn ball(radius: f32) -> Sphere {
    Sphere::new(Vec3::zeros(), Vec3::zeros(), radius)
}

fn position_of(world: &World, entity: Entity) -> Vec3 {
    world
        .get_component::<TransformComponent>(entity)
        .map(|transform| transform.position)
        .unwrap()
}

fn body_of(world: &World, entity: Entity) -> &CollisionComponent {
    world.get_component::<CollisionComponent>(entity).unwrap()
}

#[test]
fn test_sphere_rests_on_floor_with_gap() {
    let mut world = World::new();
    spawn_level(&mut world, &floor(0.0, -5.0, 5.0, -5.0, 5.0));
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.0, 0.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    let position = position_of(&world, player);
    assert_relative_eq!(position.y, 1.001, epsilon = 1e-4);
    assert_relative_eq!(position.x, 0.0, epsilon = 1e-5);

    let body = body_of(&world, player);
    assert!(!body.touching.is_empty());
    assert!(body.touching.iter().all(|(_, hit)| hit.is_colliding()));
    // The pushed collider clears every triangle it touched
    for (triangle, _) in &body.touching {
        assert!(triangle.interpenetration(body.collider()).is_none());
    }
}

#[test]
fn test_ceiling_pushes_down() {
    let mut world = World::new();
    spawn_level(&mut world, &ceiling(2.0, -5.0, 5.0, -5.0, 5.0));
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.0, 1.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    assert_relative_eq!(position_of(&world, player), Vec3::new(0.0, 0.999, 0.0), epsilon = 1e-4);
    let body = body_of(&world, player);
    assert!(!body.touching.is_empty());
    assert!(body.touching.iter().all(|(triangle, _)| triangle.surface_type() == SurfaceType::Ceiling));
    assert!(body.touching.iter().all(|(_, hit)| hit.direction.y < 0.0));
}

#[test]
fn test_floor_edge_pushes_straight_up() {
    let mut world = World::new();
    spawn_level(&mut world, &floor(0.0, -5.0, 0.0, -5.0, 5.0));
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.5, 0.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    // The contact is the floor's edge, so the measured direction leans sideways
    let body = body_of(&world, player);
    assert_eq!(body.touching.len(), 1);
    let hit = body.touching[0].1;
    assert!(hit.direction.x > 0.5);
    assert_relative_eq!(hit.depth, 1.0 - 0.5_f32.sqrt(), epsilon = 1e-4);

    let position = position_of(&world, player);
    assert_relative_eq!(position.x, 0.5);
    assert_relative_eq!(position.z, 0.0);
    assert_relative_eq!(position.y, 0.5 + hit.depth + 0.001, epsilon = 1e-4);
}

#[test]
fn test_triangles_inserted_after_load_collide() {
    let mut world = World::new();
    let lower = floor(0.0, -200.0, 200.0, -200.0, 200.0);
    let upper = floor(400.0, -200.0, 200.0, -200.0, 200.0);
    let level = spawn_level(&mut world, &[lower, upper].concat());
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(10.0, 200.5, 10.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    let mut system = CollisionSystem::default();
    system.update(&mut world).unwrap();
    assert_relative_eq!(position_of(&world, player).y, 200.5);

    world
        .get_component_mut::<OctreeComponent>(level)
        .unwrap()
        .insert_triangles(&floor(200.0, -20.0, 20.0, -20.0, 20.0));
    system.update(&mut world).unwrap();

    assert_relative_eq!(position_of(&world, player).y, 201.001, epsilon = 1e-3);
    assert!(!body_of(&world, player).touching.is_empty());
}

#[test]
fn test_touching_reports_triangle_attributes() {
    let mut world = World::new();
    let ice = CollisionAttributes::from_groups(0b1, 3);
    let level = floor(0.0, -5.0, 5.0, -5.0, 5.0).map(|triangle| triangle.with_attributes(ice));
    spawn_level(&mut world, &level);
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.0, 0.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    let touching = &body_of(&world, player).touching;
    assert!(!touching.is_empty());
    assert!(touching.iter().all(|(triangle, _)| triangle.attributes == ice));
}

#[test]
fn test_results_cleared_each_tick() {
    let mut world = World::new();
    spawn_level(&mut world, &floor(0.0, -5.0, 5.0, -5.0, 5.0));
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.0, 0.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    let mut system = CollisionSystem::default();
    system.update(&mut world).unwrap();
    assert!(!body_of(&world, player).touching.is_empty());

    // Resting above the floor, nothing is touched on the second tick
    system.update(&mut world).unwrap();
    assert!(body_of(&world, player).touching.is_empty());
}

#[test]
fn test_skip_triangles_ignores_level() {
    let mut world = World::new();
    spawn_level(&mut world, &floor(0.0, -5.0, 5.0, -5.0, 5.0));
    let ghost = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.0, 0.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)).with_options(CollisionOptions::SKIP_TRIANGLES),
    );

    CollisionSystem::default().update(&mut world).unwrap();
    assert_relative_eq!(position_of(&world, ghost).y, 0.5);
}

#[test]
fn test_triangle_filter_lets_entity_through() {
    let mut world = World::new();
    spawn_level(&mut world, &floor(0.0, -5.0, 5.0, -5.0, 5.0));
    let ghost = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.0, 0.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)).with_triangle_filter(|_| false),
    );

    CollisionSystem::default().update(&mut world).unwrap();
    assert_relative_eq!(position_of(&world, ghost).y, 0.5);
    assert!(body_of(&world, ghost).touching.is_empty());
}

#[test]
fn test_mesh_entity_acts_as_floor() {
    let mut world = World::new();
    let slab = spawn(
        &mut world,
        TransformComponent::identity(),
        CollisionComponent::fixed(MeshCollider::new(floor(0.0, -5.0, 5.0, -5.0, 5.0).to_vec())),
    );
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.0, 0.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    assert_relative_eq!(position_of(&world, player).y, 1.001, epsilon = 1e-4);
    assert_relative_eq!(position_of(&world, slab), Vec3::zeros());
    // Mesh entities push through the triangle phase, not the entity phase
    assert!(body_of(&world, player).intersecting.is_empty());
}

#[test]
fn test_static_entity_pushes_dynamic_out() {
    let mut world = World::new();
    let crate_box = spawn(
        &mut world,
        TransformComponent::identity(),
        CollisionComponent::fixed(Aabb::from_center_radius(Vec3::zeros(), Vec3::repeat(1.0))),
    );
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(1.5, 0.0, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    assert!(position_of(&world, player).x >= 2.0);
    assert_relative_eq!(position_of(&world, crate_box), Vec3::zeros());

    let body = body_of(&world, player);
    assert_eq!(body.intersecting.len(), 1);
    assert_eq!(body.intersecting[0].0, crate_box);
    assert!(body.intersecting[0].1.direction.x > 0.0);
}

#[test]
fn test_mirrored_box_is_still_pushed() {
    let mut world = World::new();
    spawn(
        &mut world,
        TransformComponent::identity(),
        CollisionComponent::fixed(Aabb::from_center_radius(Vec3::zeros(), Vec3::repeat(1.0))),
    );
    let mirrored = spawn(
        &mut world,
        TransformComponent {
            scale: Vec3::new(-1.0, 1.0, 1.0),
            ..TransformComponent::from_position(Vec3::new(1.5, 0.0, 0.0))
        },
        CollisionComponent::dynamic(Aabb::default()),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    assert_relative_eq!(position_of(&world, mirrored).x, 2.001, epsilon = 1e-4);
    assert_eq!(body_of(&world, mirrored).intersecting.len(), 1);
}

#[test]
fn test_skip_entities_and_disabled_bodies() {
    let mut world = World::new();
    spawn(
        &mut world,
        TransformComponent::identity(),
        CollisionComponent::fixed(Aabb::from_center_radius(Vec3::zeros(), Vec3::repeat(1.0))),
    );
    let skipping = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(1.5, 0.0, 0.0)),
        CollisionComponent::dynamic(ball(1.0)).with_options(CollisionOptions::SKIP_ENTITIES),
    );
    let disabled = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(-1.5, 0.0, 0.0)),
        CollisionComponent::dynamic(ball(1.0)).with_enabled(false),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    assert_relative_eq!(position_of(&world, skipping).x, 1.5);
    assert_relative_eq!(position_of(&world, disabled).x, -1.5);
}

fn priority_duel(create_low_first: bool) -> (World, Entity, Entity) {
    let mut world = World::new();
    let spawn_low = |world: &mut World| {
        spawn(
            world,
            TransformComponent::from_position(Vec3::new(1.5, 0.0, 0.0)),
            CollisionComponent::dynamic(ball(1.0)).with_priority(5),
        )
    };
    let spawn_high = |world: &mut World| {
        spawn(
            world,
            TransformComponent::identity(),
            CollisionComponent::dynamic(ball(1.0)).with_priority(10),
        )
    };

    let (low, high) = if create_low_first {
        let low = spawn_low(&mut world);
        (low, spawn_high(&mut world))
    } else {
        let high = spawn_high(&mut world);
        (spawn_low(&mut world), high)
    };

    CollisionSystem::default().update(&mut world).unwrap();
    (world, low, high)
}

#[test]
fn test_lower_priority_entity_moves() {
    for create_low_first in [true, false] {
        let (world, low, high) = priority_duel(create_low_first);

        assert_relative_eq!(position_of(&world, high), Vec3::zeros());
        assert!(position_of(&world, low).x >= 2.0);

        let low_body = body_of(&world, low);
        assert_eq!(low_body.intersecting.len(), 1);
        assert_eq!(low_body.intersecting[0].0, high);
        assert!(low_body.intersecting[0].1.direction.x > 0.0);

        let high_body = body_of(&world, high);
        assert_eq!(high_body.intersecting.len(), 1);
        assert_eq!(high_body.intersecting[0].0, low);
        assert!(high_body.intersecting[0].1.direction.x < 0.0);
    }
}

#[test]
fn test_equal_priority_first_processed_moves() {
    let mut world = World::new();
    let first = spawn(
        &mut world,
        TransformComponent::identity(),
        CollisionComponent::dynamic(ball(1.0)),
    );
    let second = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(1.5, 0.0, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    assert!(position_of(&world, first).x < -0.4);
    assert_relative_eq!(position_of(&world, second), Vec3::new(1.5, 0.0, 0.0));
    // The pair is tested once, so each side records it once
    assert_eq!(body_of(&world, first).intersecting.len(), 1);
    assert_eq!(body_of(&world, second).intersecting.len(), 1);
}

#[test]
fn test_entity_filter_excludes_pair() {
    let mut world = World::new();
    let first = world.create_entity();
    let second = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(1.5, 0.0, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );
    world.add_component(first, TransformComponent::identity());
    world.add_component(
        first,
        CollisionComponent::dynamic(ball(1.0)).with_entity_filter(move |other| other != second),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    assert_relative_eq!(position_of(&world, first), Vec3::zeros());
    assert_relative_eq!(position_of(&world, second), Vec3::new(1.5, 0.0, 0.0));
}

fn ledge_level(drop: f32) -> Vec<CollisionTriangle> {
    let mut triangles = Vec::new();
    triangles.extend(floor(0.0, -5.0, 0.0, -2.0, 2.0));
    triangles.extend(wall_facing_positive_x(0.0, -drop, 0.0, -2.0, 2.0));
    triangles.extend(floor(-drop, 0.0, 5.0, -2.0, 2.0));
    triangles
}

fn ledge_walker(world: &mut World) -> Entity {
    // Facing +x, toward the cliff
    let rotation = Quat::from_axis_angle(&Vec3::y_axis(), -FRAC_PI_2);
    spawn(
        world,
        TransformComponent::from_position_rotation(Vec3::new(-0.2, 0.01, 0.0), rotation),
        CollisionComponent::dynamic(Ellipsoid::new(Vec3::zeros(), Vec3::new(0.0, 0.5, 0.0), Vec3::repeat(0.5)))
            .with_options(CollisionOptions::LEDGE_DETECTION),
    )
}

#[test]
fn test_ledge_detection_stops_at_tall_drop() {
    let mut world = World::new();
    spawn_level(&mut world, &ledge_level(0.6));
    let walker = ledge_walker(&mut world);

    CollisionSystem::default().update(&mut world).unwrap();

    let position = position_of(&world, walker);
    assert_relative_eq!(position.x, -0.5, epsilon = 1e-3);
    assert_relative_eq!(position.z, 0.0, epsilon = 1e-3);
    assert_relative_eq!(position.y, 0.01, epsilon = 1e-5);
}

#[test]
fn test_ledge_detection_allows_step_down() {
    let mut world = World::new();
    spawn_level(&mut world, &ledge_level(0.4));
    let walker = ledge_walker(&mut world);

    CollisionSystem::default().update(&mut world).unwrap();

    assert_relative_eq!(position_of(&world, walker), Vec3::new(-0.2, 0.01, 0.0), epsilon = 1e-5);
}

fn tunneling_world(options: CollisionOptions) -> (World, Entity) {
    let mut world = World::new();
    spawn_level(&mut world, &wall_facing_negative_x(5.0, -2.0, 2.0, -2.0, 2.0));
    let bullet = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(10.0, 0.0, 0.0)).with_previous_position(Vec3::zeros()),
        CollisionComponent::dynamic(ball(0.5)).with_options(options),
    );
    (world, bullet)
}

#[test]
fn test_robust_protection_stops_tunneling() {
    let (mut world, bullet) = tunneling_world(CollisionOptions::ROBUST_PROTECTION);

    CollisionSystem::default().update(&mut world).unwrap();

    let position = position_of(&world, bullet);
    assert!(position.x < 5.0);
    assert_relative_eq!(position.x, 4.499, epsilon = 1e-3);
}

#[test]
fn test_fast_mover_tunnels_without_protection() {
    let (mut world, bullet) = tunneling_world(CollisionOptions::empty());

    CollisionSystem::default().update(&mut world).unwrap();

    assert_relative_eq!(position_of(&world, bullet).x, 10.0);
}

#[test]
fn test_non_finite_motion_snaps_back() {
    logging::init_for_tests();
    let mut world = World::new();
    let lost = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(f32::NAN, 0.0, 0.0)).with_previous_position(Vec3::new(1.0, 2.0, 3.0)),
        CollisionComponent::dynamic(ball(0.5)).with_options(CollisionOptions::ROBUST_PROTECTION),
    );

    CollisionSystem::default().update(&mut world).unwrap();
    assert_relative_eq!(position_of(&world, lost), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_history_then_collision_tick() {
    let mut world = World::new();
    spawn_level(&mut world, &wall_facing_negative_x(5.0, -2.0, 2.0, -2.0, 2.0));
    let bullet = spawn(
        &mut world,
        TransformComponent::identity(),
        CollisionComponent::dynamic(ball(0.5)).with_options(CollisionOptions::ROBUST_PROTECTION),
    );

    let mut history = TransformHistorySystem::new();
    let mut collision = CollisionSystem::new(CollisionConfig::default());

    assert!(history.run(&mut world).is_ok());
    if let Some(transform) = world.get_component_mut::<TransformComponent>(bullet) {
        transform.position.x = 20.0;
    }
    collision.run(&mut world).unwrap();

    assert!(position_of(&world, bullet).x < 5.0);
}

#[test]
fn test_ray_hits_are_sorted() {
    let mut world = World::new();
    let mut level = Vec::new();
    level.extend(floor(0.0, -5.0, 5.0, -5.0, 5.0));
    level.extend(floor(-3.0, -5.0, 5.0, -5.0, 5.0));
    spawn_level(&mut world, &level);
    spawn(
        &mut world,
        TransformComponent::identity(),
        CollisionComponent::fixed(MeshCollider::new(floor(-1.5, -5.0, 5.0, -5.0, 5.0).to_vec())),
    );
    CollisionSystem::default().update(&mut world).unwrap();

    let ray = Ray::new(Vec3::new(0.3, 10.0, 0.7), Vec3::new(0.0, -1.0, 0.0));
    let hits = triangles_hit(&world, &ray, false, None, None);
    assert_eq!(hits.len(), 3);
    let distances: Vec<f32> = hits.iter().map(|(point, _)| (point - ray.origin).magnitude()).collect();
    assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));

    let nearest = closest_hit(&world, &ray, false, None, None).unwrap();
    assert_relative_eq!(nearest.position.y, 0.0, epsilon = 1e-5);
}

fn rigged_world(collider_joint: &str) -> (World, Entity) {
    let mut world = World::new();
    let bind = Mat4::new_translation(&Vec3::new(0.0, 1.0, 0.0)) * Mat4::new_scaling(2.0);
    let rig = RigComponent::new(Skeleton::new(vec![Joint::new("spine", bind)])).with_collider_joint(collider_joint);
    let entity = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(2.0, 0.0, 0.0)),
        CollisionComponent::dynamic(ball(0.25)),
    );
    world.add_component(entity, rig);
    (world, entity)
}

#[test]
fn test_rig_joint_drives_collider() {
    let (mut world, entity) = rigged_world("spine");

    CollisionSystem::default().update(&mut world).unwrap();

    let Collider::Sphere(sphere) = body_of(&world, entity).collider() else {
        panic!("collider should stay a sphere");
    };
    assert_relative_eq!(sphere.position(), Vec3::new(2.0, 1.0, 0.0), epsilon = 1e-5);
    assert_relative_eq!(sphere.radius, 1.0, epsilon = 1e-5);
}

#[test]
fn test_missing_joint_is_an_error() {
    logging::init_for_tests();
    let (mut world, entity) = rigged_world("hand");

    let result = CollisionSystem::default().update(&mut world);

    assert_eq!(
        result,
        Err(CollisionError::MissingJoint {
            entity: entity.id(),
            joint: "hand".to_string(),
        })
    );
    // The component is put back even when the pass fails
    assert!(world.has_component::<CollisionComponent>(entity));
}

#[test]
fn test_static_skinned_mesh_follows_its_rig() {
    let mut world = World::new();
    let corners = [(-5.0, 5.0), (5.0, 5.0), (5.0, -5.0), (-5.0, -5.0)];
    let vertices = corners
        .iter()
        .map(|(x, z)| SkinnedVertex::rigid(Vec3::new(*x, 0.0, *z), 0))
        .collect();
    let platform = spawn(
        &mut world,
        TransformComponent::identity(),
        CollisionComponent::fixed(SkinnedMeshCollider::new(vertices, vec![0, 1, 2, 0, 2, 3])),
    );
    let mut rig = RigComponent::new(Skeleton::new(vec![Joint::new("lift", Mat4::identity())]));
    rig.joint_named_mut("lift").unwrap().model_space = Mat4::new_translation(&Vec3::new(0.0, 1.0, 0.0));
    world.add_component(platform, rig);
    let player = spawn(
        &mut world,
        TransformComponent::from_position(Vec3::new(0.0, 1.5, 0.0)),
        CollisionComponent::dynamic(ball(1.0)),
    );

    CollisionSystem::default().update(&mut world).unwrap();

    let Collider::SkinnedMesh(mesh) = body_of(&world, platform).collider() else {
        panic!("collider should stay a skinned mesh");
    };
    assert_relative_eq!(mesh.bounding_box().position().y, 1.0, epsilon = 1e-5);
    assert_relative_eq!(position_of(&world, player).y, 2.001, epsilon = 1e-4);
}
