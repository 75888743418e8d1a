//! Triangle-soup collision meshes
//!
//! A mesh collider keeps its triangles in model space and re-derives the
//! world-space copy only when its transform changes.
//! GEA 13.3.4: "Collision shapes should be stored in model space and
//! transformed on-the-fly"

use std::sync::Arc;

use super::aabb::Aabb;
use super::attributes::CollisionAttributes;
use super::primitives::{Interpenetration, Ray, SurfaceImpact};
use super::shape::Collider;
use super::triangle::CollisionTriangle;
use crate::foundation::math::{Transform, Vec3};

/// Raw indexed geometry as produced by a mesh importer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeometry {
    /// Vertex positions in model space
    pub positions: Vec<Vec3>,
    /// Triangle list indices, three per triangle
    pub indices: Vec<u32>,
    /// Attributes per triangle, in index order; missing entries are empty
    pub attributes: Vec<CollisionAttributes>,
}

impl RawGeometry {
    /// Creates geometry from positions and triangle-list indices
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            attributes: Vec::new(),
        }
    }

    /// Builder pattern: Set per-triangle attributes
    pub fn with_attributes(mut self, attributes: Vec<CollisionAttributes>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Build collision triangles from the index list.
    ///
    /// Incomplete trailing triples and out-of-range indices are skipped.
    pub fn generate_collision_triangles(&self) -> Vec<CollisionTriangle> {
        self.indices
            .chunks_exact(3)
            .enumerate()
            .filter_map(|(triangle, chunk)| {
                let p1 = self.positions.get(chunk[0] as usize)?;
                let p2 = self.positions.get(chunk[1] as usize)?;
                let p3 = self.positions.get(chunk[2] as usize)?;
                let attributes = self.attributes.get(triangle).copied().unwrap_or_default();
                Some(CollisionTriangle::new(*p1, *p2, *p3).with_attributes(attributes))
            })
            .collect()
    }
}

/// Static triangle-soup collider attached to an entity
#[derive(Debug, Clone)]
pub struct MeshCollider {
    local_triangles: Arc<[CollisionTriangle]>,
    triangles: Vec<CollisionTriangle>,
    bounding_box: Aabb,
    last_transform: Option<Transform>,
}

impl MeshCollider {
    /// Creates a mesh collider from model-space triangles
    pub fn new(triangles: Vec<CollisionTriangle>) -> Self {
        let bounding_box = bounds_of(&triangles, Vec3::zeros());
        Self {
            local_triangles: triangles.clone().into(),
            triangles,
            bounding_box,
            last_transform: None,
        }
    }

    /// Creates a mesh collider from imported geometry
    pub fn from_geometry(geometry: &RawGeometry) -> Self {
        Self::new(geometry.generate_collision_triangles())
    }

    /// World-space triangles as of the last update
    pub fn triangles(&self) -> &[CollisionTriangle] {
        &self.triangles
    }

    /// Enclosing box of the world-space triangles
    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    /// Re-transform the triangles when the transform changed
    pub fn update(&mut self, transform: &Transform) {
        if self.last_transform.as_ref() == Some(transform) {
            return;
        }
        let matrix = transform.to_matrix();
        self.triangles = self
            .local_triangles
            .iter()
            .map(|triangle| triangle.transformed(&matrix))
            .collect();
        self.bounding_box = bounds_of(&self.triangles, transform.position);
        self.last_transform = Some(*transform);
    }

    /// Every triangle the ray passes through
    pub fn triangles_hit(&self, ray: &Ray) -> Vec<(Vec3, CollisionTriangle)> {
        triangles_hit(&self.triangles, ray)
    }

    /// Nearest triangle impact
    pub fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        nearest_impact(&self.triangles, ray)
    }

    /// Nearest point on any triangle
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        closest_point(&self.triangles, point, self.bounding_box.position())
    }

    /// Deepest overlap of `other` against any triangle
    pub fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        deepest_interpenetration(&self.triangles, other)
    }
}

/// Enclosing box of every vertex, or a zero box at `fallback`
pub(crate) fn bounds_of(triangles: &[CollisionTriangle], fallback: Vec3) -> Aabb {
    Aabb::enclosing(triangles.iter().flat_map(CollisionTriangle::vertices))
        .unwrap_or_else(|| Aabb::from_center_radius(fallback, Vec3::zeros()))
}

pub(crate) fn triangles_hit(triangles: &[CollisionTriangle], ray: &Ray) -> Vec<(Vec3, CollisionTriangle)> {
    triangles
        .iter()
        .filter_map(|triangle| triangle.surface_point(ray).map(|point| (point, *triangle)))
        .collect()
}

pub(crate) fn nearest_impact(triangles: &[CollisionTriangle], ray: &Ray) -> Option<SurfaceImpact> {
    triangles
        .iter()
        .filter_map(|triangle| {
            triangle.surface_point(ray).map(|position| SurfaceImpact {
                position,
                normal: triangle.normal(),
                distance: (position - ray.origin).magnitude(),
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

pub(crate) fn closest_point(triangles: &[CollisionTriangle], point: Vec3, fallback: Vec3) -> Vec3 {
    triangles
        .iter()
        .map(|triangle| triangle.closest_surface_point(point))
        .min_by(|a, b| (a - point).magnitude_squared().total_cmp(&(b - point).magnitude_squared()))
        .unwrap_or(fallback)
}

pub(crate) fn deepest_interpenetration(
    triangles: &[CollisionTriangle],
    other: &Collider,
) -> Option<Interpenetration> {
    triangles
        .iter()
        .filter_map(|triangle| triangle.interpenetration(other))
        .max_by(|a, b| a.depth.total_cmp(&b.depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::sphere::Sphere;
    use approx::assert_relative_eq;

    fn ground_geometry() -> RawGeometry {
        RawGeometry::new(
            vec![
                Vec3::new(-1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(-1.0, 0.0, -1.0),
            ],
            vec![0, 1, 2, 0, 2, 3, 7],
        )
    }

    #[test]
    fn test_generate_triangles_skips_partial_triples() {
        let triangles = ground_geometry().generate_collision_triangles();
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().all(|t| t.normal().y > 0.99));

        let broken = RawGeometry::new(vec![Vec3::zeros()], vec![0, 1, 2]);
        assert!(broken.generate_collision_triangles().is_empty());
    }

    #[test]
    fn test_attributes_survive_import_and_update() {
        let footstep = CollisionAttributes::from_groups(0b10, 4);
        let geometry = ground_geometry().with_attributes(vec![footstep]);
        let mut mesh = MeshCollider::from_geometry(&geometry);
        mesh.update(&Transform::from_position(Vec3::new(3.0, 1.0, 0.0)));

        let triangles = mesh.triangles();
        assert_eq!(triangles[0].attributes, footstep);
        assert_eq!(triangles[1].attributes, CollisionAttributes::NONE);
    }

    #[test]
    fn test_update_moves_triangles_and_bounds() {
        let mut mesh = MeshCollider::from_geometry(&ground_geometry());
        let transform = Transform {
            position: Vec3::new(10.0, 2.0, 0.0),
            scale: Vec3::new(5.0, 1.0, 5.0),
            ..Transform::default()
        };
        mesh.update(&transform);

        let bounds = mesh.bounding_box();
        assert_relative_eq!(bounds.min(), Vec3::new(5.0, 2.0, -5.0), epsilon = 1e-5);
        assert_relative_eq!(bounds.max(), Vec3::new(15.0, 2.0, 5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_ray_and_interpenetration() {
        let mut mesh = MeshCollider::from_geometry(&ground_geometry());
        mesh.update(&Transform::default());

        let ray = Ray::new(Vec3::new(0.5, 3.0, 0.5), Vec3::new(0.0, -1.0, 0.0));
        let impact = mesh.surface_impact(&ray).expect("ray should hit the ground");
        assert_relative_eq!(impact.distance, 3.0, epsilon = 1e-5);

        let ball = Collider::Sphere(Sphere::new(Vec3::new(0.2, 0.4, 0.2), Vec3::zeros(), 0.5));
        let hit = mesh.interpenetration(&ball).expect("ball overlaps ground");
        assert_relative_eq!(hit.depth, 0.1, epsilon = 1e-5);
        assert_relative_eq!(hit.direction, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }
}
