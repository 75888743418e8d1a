//! Collider sum type
//!
//! Every shape an entity can carry, with a single double-dispatch table for
//! narrow-phase tests. The first collider of a pair is the base shape, the
//! second is the one being pushed; results point from base toward pushed.

use super::aabb::Aabb;
use super::mesh::MeshCollider;
use super::obb::Obb;
use super::primitives::{Interpenetration, Ray, SurfaceImpact};
use super::skinned::SkinnedMeshCollider;
use super::sphere::{Ellipsoid, Sphere};
use super::triangle::CollisionTriangle;
use crate::foundation::math::{direction, Transform, Vec3};

/// Collision shapes
#[derive(Debug, Clone)]
pub enum Collider {
    /// Axis-aligned box
    Aabb(Aabb),
    /// Oriented box
    Obb(Obb),
    /// Sphere
    Sphere(Sphere),
    /// Axis-aligned ellipsoid, the usual character shape
    Ellipsoid(Ellipsoid),
    /// Static triangle soup
    Mesh(MeshCollider),
    /// Skeleton-deformed triangle soup
    SkinnedMesh(SkinnedMeshCollider),
}

impl Default for Collider {
    fn default() -> Self {
        Self::Aabb(Aabb::default())
    }
}

impl From<Aabb> for Collider {
    fn from(value: Aabb) -> Self {
        Self::Aabb(value)
    }
}

impl From<Obb> for Collider {
    fn from(value: Obb) -> Self {
        Self::Obb(value)
    }
}

impl From<Sphere> for Collider {
    fn from(value: Sphere) -> Self {
        Self::Sphere(value)
    }
}

impl From<Ellipsoid> for Collider {
    fn from(value: Ellipsoid) -> Self {
        Self::Ellipsoid(value)
    }
}

impl From<MeshCollider> for Collider {
    fn from(value: MeshCollider) -> Self {
        Self::Mesh(value)
    }
}

impl From<SkinnedMeshCollider> for Collider {
    fn from(value: SkinnedMeshCollider) -> Self {
        Self::SkinnedMesh(value)
    }
}

impl Collider {
    /// Broad-phase box enclosing the whole shape
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Self::Aabb(aabb) => *aabb,
            Self::Obb(obb) => obb.bounding_box(),
            Self::Sphere(sphere) => sphere.bounding_box(),
            Self::Ellipsoid(ellipsoid) => ellipsoid.bounding_box(),
            Self::Mesh(mesh) => mesh.bounding_box(),
            Self::SkinnedMesh(mesh) => mesh.bounding_box(),
        }
    }

    /// World-space middle of the shape
    pub fn position(&self) -> Vec3 {
        match self {
            Self::Aabb(aabb) => aabb.position(),
            Self::Obb(obb) => obb.position(),
            Self::Sphere(sphere) => sphere.position(),
            Self::Ellipsoid(ellipsoid) => ellipsoid.position(),
            Self::Mesh(mesh) => mesh.bounding_box().position(),
            Self::SkinnedMesh(mesh) => mesh.bounding_box().position(),
        }
    }

    /// Offset between the entity position and the shape's middle
    pub fn offset(&self) -> Vec3 {
        match self {
            Self::Aabb(aabb) => aabb.offset,
            Self::Obb(obb) => obb.offset,
            Self::Sphere(sphere) => sphere.offset,
            Self::Ellipsoid(ellipsoid) => ellipsoid.offset,
            Self::Mesh(_) | Self::SkinnedMesh(_) => Vec3::zeros(),
        }
    }

    /// Follow the owning entity's transform
    pub fn update(&mut self, transform: &Transform) {
        match self {
            Self::Aabb(aabb) => aabb.update(transform),
            Self::Obb(obb) => obb.update(transform),
            Self::Sphere(sphere) => sphere.update(transform),
            Self::Ellipsoid(ellipsoid) => ellipsoid.update(transform),
            Self::Mesh(mesh) => mesh.update(transform),
            Self::SkinnedMesh(mesh) => mesh.update(transform),
        }
    }

    /// Re-base offset and size from a joint-driven transform.
    ///
    /// Meshes take their extent from geometry and ignore this.
    pub fn update_size_and_offset(&mut self, transform: &Transform) {
        match self {
            Self::Aabb(aabb) => aabb.update_size_and_offset(transform),
            Self::Obb(obb) => obb.update_size_and_offset(transform),
            Self::Sphere(sphere) => sphere.update_size_and_offset(transform),
            Self::Ellipsoid(ellipsoid) => ellipsoid.update_size_and_offset(transform),
            Self::Mesh(_) | Self::SkinnedMesh(_) => {}
        }
    }

    /// Triangle colliders
    pub fn is_mesh(&self) -> bool {
        matches!(self, Self::Mesh(_) | Self::SkinnedMesh(_))
    }

    /// World-space triangles of mesh colliders
    pub fn triangles(&self) -> Option<&[CollisionTriangle]> {
        match self {
            Self::Mesh(mesh) => Some(mesh.triangles()),
            Self::SkinnedMesh(mesh) => Some(mesh.triangles()),
            _ => None,
        }
    }

    /// Every mesh triangle the ray passes through, empty for primitives
    pub fn triangles_hit(&self, ray: &Ray) -> Vec<(Vec3, CollisionTriangle)> {
        match self {
            Self::Mesh(mesh) => mesh.triangles_hit(ray),
            Self::SkinnedMesh(mesh) => mesh.triangles_hit(ray),
            _ => Vec::new(),
        }
    }

    /// The ellipsoid, if this is one
    pub fn as_ellipsoid(&self) -> Option<&Ellipsoid> {
        match self {
            Self::Ellipsoid(ellipsoid) => Some(ellipsoid),
            _ => None,
        }
    }

    /// Nearest ray impact
    pub fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        match self {
            Self::Aabb(aabb) => aabb.surface_impact(ray),
            Self::Obb(obb) => obb.surface_impact(ray),
            Self::Sphere(sphere) => sphere.surface_impact(ray),
            Self::Ellipsoid(ellipsoid) => ellipsoid.surface_impact(ray),
            Self::Mesh(mesh) => mesh.surface_impact(ray),
            Self::SkinnedMesh(mesh) => mesh.surface_impact(ray),
        }
    }

    /// Nearest ray hit position
    pub fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        self.surface_impact(ray).map(|impact| impact.position)
    }

    /// Outward normal near `point`
    pub fn surface_normal(&self, point: Vec3) -> Vec3 {
        match self {
            Self::Aabb(aabb) => aabb.surface_normal(point),
            Self::Obb(obb) => obb.surface_normal(point),
            Self::Sphere(sphere) => sphere.surface_normal(point),
            Self::Ellipsoid(ellipsoid) => ellipsoid.surface_normal(point),
            Self::Mesh(_) | Self::SkinnedMesh(_) => self
                .triangles()
                .unwrap_or_default()
                .iter()
                .min_by(|a, b| {
                    let da = (a.closest_surface_point(point) - point).magnitude_squared();
                    let db = (b.closest_surface_point(point) - point).magnitude_squared();
                    da.total_cmp(&db)
                })
                .map_or_else(direction::up, CollisionTriangle::normal),
        }
    }

    /// Nearest point on the shape to `point`
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        match self {
            Self::Aabb(aabb) => aabb.closest_surface_point(point),
            Self::Obb(obb) => obb.closest_surface_point(point),
            Self::Sphere(sphere) => sphere.closest_surface_point(point),
            Self::Ellipsoid(ellipsoid) => ellipsoid.closest_surface_point(point),
            Self::Mesh(mesh) => mesh.closest_surface_point(point),
            Self::SkinnedMesh(mesh) => mesh.closest_surface_point(point),
        }
    }

    /// Overlap of `other` measured against this collider.
    ///
    /// Returns `None` unless the shapes strictly overlap. Bounding boxes are
    /// compared first, so a result here always implies a broad-phase hit.
    /// Mesh-vs-mesh is unsupported and never collides.
    pub fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        if !self.bounding_box().is_colliding(&other.bounding_box()) {
            return None;
        }

        match (self, other) {
            (Self::Mesh(mesh), _) => mesh.interpenetration(other),
            (Self::SkinnedMesh(mesh), _) => mesh.interpenetration(other),
            (_, Self::Mesh(_) | Self::SkinnedMesh(_)) => {
                other.interpenetration(self).map(Interpenetration::reversed)
            }

            (Self::Aabb(a), Self::Aabb(b)) => a.interpenetration_with_aabb(b),
            (Self::Aabb(a), Self::Obb(b)) => a.frame().interpenetration_with_box(&b.frame()),
            (Self::Obb(a), Self::Aabb(b)) => a.frame().interpenetration_with_box(&b.frame()),
            (Self::Obb(a), Self::Obb(b)) => a.frame().interpenetration_with_box(&b.frame()),

            (Self::Aabb(a), Self::Sphere(b)) => a.interpenetration_with_sphere(b.position(), b.radius),
            (Self::Obb(a), Self::Sphere(b)) => a.frame().interpenetration_with_sphere(b.position(), b.radius),
            (Self::Aabb(a), Self::Ellipsoid(b)) => b.interpenetration_from_aabb(a),
            (Self::Obb(a), Self::Ellipsoid(b)) => a.frame().interpenetration_with_ellipsoid(b.position(), b.radius),

            (Self::Sphere(a), Self::Sphere(b)) => {
                sphere_as_ellipsoid(a).interpenetration_with_ellipsoid(b.position(), Vec3::repeat(b.radius))
            }
            (Self::Sphere(a), Self::Ellipsoid(b)) => {
                sphere_as_ellipsoid(a).interpenetration_with_ellipsoid(b.position(), b.radius)
            }
            (Self::Ellipsoid(a), Self::Sphere(b)) => {
                a.interpenetration_with_ellipsoid(b.position(), Vec3::repeat(b.radius))
            }
            (Self::Ellipsoid(a), Self::Ellipsoid(b)) => a.interpenetration_with_ellipsoid(b.position(), b.radius),

            (Self::Sphere(_) | Self::Ellipsoid(_), Self::Aabb(_) | Self::Obb(_)) => {
                other.interpenetration(self).map(Interpenetration::reversed)
            }
        }
    }
}

fn sphere_as_ellipsoid(sphere: &Sphere) -> Ellipsoid {
    Ellipsoid::new(sphere.center, sphere.offset, Vec3::repeat(sphere.radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use crate::physics::collision::mesh::RawGeometry;
    use approx::assert_relative_eq;

    fn sample_colliders() -> Vec<Collider> {
        let ground = RawGeometry::new(
            vec![
                Vec3::new(-2.0, 0.0, 2.0),
                Vec3::new(2.0, 0.0, 2.0),
                Vec3::new(2.0, 0.0, -2.0),
                Vec3::new(-2.0, 0.0, -2.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        let mut mesh = MeshCollider::from_geometry(&ground);
        mesh.update(&Transform::default());

        vec![
            Aabb::from_center_radius(Vec3::zeros(), Vec3::new(1.0, 0.5, 1.0)).into(),
            Obb::new(
                Vec3::zeros(),
                Vec3::zeros(),
                Vec3::new(1.0, 0.5, 0.25),
                Quat::from_axis_angle(&Vec3::y_axis(), 0.6),
            )
            .into(),
            Sphere::new(Vec3::zeros(), Vec3::zeros(), 0.75).into(),
            Ellipsoid::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(0.5, 1.0, 0.5)).into(),
            mesh.into(),
        ]
    }

    fn moved(collider: &Collider, position: Vec3) -> Collider {
        let mut collider = collider.clone();
        collider.update(&Transform::from_position(position));
        collider
    }

    #[test]
    fn test_default_is_unit_aabb() {
        match Collider::default() {
            Collider::Aabb(aabb) => assert_relative_eq!(aabb.radius, Vec3::repeat(1.0)),
            other => panic!("unexpected default collider: {other:?}"),
        }
    }

    #[test]
    fn test_narrow_phase_never_exceeds_broad_phase() {
        let offsets = [
            Vec3::new(0.3, 0.2, 0.0),
            Vec3::new(1.2, 0.0, 0.4),
            Vec3::new(0.0, 1.1, 0.0),
            Vec3::new(1.4, 1.0, 1.2),
            Vec3::new(2.5, 0.0, 0.0),
            Vec3::new(0.0, -0.4, 1.9),
        ];
        let colliders = sample_colliders();
        for a in &colliders {
            for b in &colliders {
                for offset in &offsets {
                    let b = moved(b, *offset);
                    if let Some(hit) = a.interpenetration(&b) {
                        assert!(hit.is_colliding());
                        assert!(
                            a.bounding_box().is_colliding(&b.bounding_box()),
                            "narrow phase accepted a pair the broad phase rejects: {a:?} vs {b:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_direction_points_toward_compared_shape() {
        let colliders = sample_colliders();
        let offset = Vec3::new(0.0, 0.6, 0.0);
        for a in colliders.iter().filter(|c| !c.is_mesh()) {
            for b in colliders.iter().filter(|c| !c.is_mesh()) {
                let b = moved(b, offset);
                if let Some(hit) = a.interpenetration(&b) {
                    assert!(
                        hit.direction.dot(&offset) > 0.0,
                        "separation should push upward: {a:?} vs {b:?} gave {hit:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_mesh_pairs() {
        let colliders = sample_colliders();
        let mesh = &colliders[4];
        let ball = moved(&colliders[2], Vec3::new(0.5, 0.5, 0.5));

        let from_mesh = mesh.interpenetration(&ball).expect("ball overlaps ground");
        assert_relative_eq!(from_mesh.direction, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);

        let from_ball = ball.interpenetration(mesh).expect("reversed pair");
        assert_relative_eq!(from_ball.direction, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);

        assert!(mesh.interpenetration(mesh).is_none());
    }

    #[test]
    fn test_surface_impact_dispatch() {
        // Off the ground quad's diagonal so exactly one triangle is hit
        let ray = Ray::new(Vec3::new(0.1, 10.0, 0.05), Vec3::new(0.0, -1.0, 0.0));
        for collider in sample_colliders() {
            let impact = collider.surface_impact(&ray).expect("downward ray hits every sample");
            assert!(impact.normal.y > 0.0, "{collider:?} gave {impact:?}");
            assert!(impact.distance > 0.0);
        }
    }
}
