//! Collision triangle
//!
//! The unit of static level geometry. Triangles carry their plane, a surface
//! classification and a cached bounding box so the octree and the
//! resolution pass can reject them cheaply.

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::attributes::CollisionAttributes;
use super::obb::BoxFrame;
use super::primitives::{Interpenetration, Plane, Ray, SurfaceType};
use super::shape::Collider;
use super::sphere::Ellipsoid;
use crate::foundation::math::{Mat4, Point3, Vec3};

/// Predicate deciding whether a triangle takes part in a query
pub type TrianglePredicate = dyn Fn(&CollisionTriangle) -> bool + Send + Sync;

/// A world-space triangle used for collision and ray casts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollisionTriangle {
    /// First vertex
    pub p1: Vec3,
    /// Second vertex
    pub p2: Vec3,
    /// Third vertex
    pub p3: Vec3,
    /// Game-defined surface attributes, carried through every copy
    #[serde(default)]
    pub attributes: CollisionAttributes,
    normal: Vec3,
    surface_type: SurfaceType,
    bounding_box: Aabb,
}

impl PartialEq for CollisionTriangle {
    fn eq(&self, other: &Self) -> bool {
        self.p1 == other.p1 && self.p2 == other.p2 && self.p3 == other.p3
    }
}

impl CollisionTriangle {
    const DEGENERATE_EPSILON: f32 = 1e-12;
    const RAY_EPSILON: f32 = 1e-5;

    /// Creates a triangle; winding is counter-clockwise around the normal
    pub fn new(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let cross = (p2 - p1).cross(&(p3 - p1));
        let normal = if cross.magnitude_squared() > Self::DEGENERATE_EPSILON {
            cross.normalize()
        } else {
            Vec3::zeros()
        };
        let bounding_box = Aabb::from_min_max(p1.inf(&p2).inf(&p3), p1.sup(&p2).sup(&p3));
        Self {
            p1,
            p2,
            p3,
            attributes: CollisionAttributes::NONE,
            normal,
            surface_type: SurfaceType::from_normal(&normal),
            bounding_box,
        }
    }

    /// Builder pattern: Set the surface attributes
    pub fn with_attributes(mut self, attributes: impl Into<CollisionAttributes>) -> Self {
        self.attributes = attributes.into();
        self
    }

    /// Copy moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.p1 + offset, self.p2 + offset, self.p3 + offset).with_attributes(self.attributes)
    }

    /// Copy with every vertex transformed by a matrix
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let apply = |p: &Vec3| matrix.transform_point(&Point3::from(*p)).coords;
        Self::new(apply(&self.p1), apply(&self.p2), apply(&self.p3)).with_attributes(self.attributes)
    }

    /// Unit normal, zero for degenerate triangles
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Classification from the normal
    pub fn surface_type(&self) -> SurfaceType {
        self.surface_type
    }

    /// Axis-aligned bounds of the three vertices
    pub fn bounding_box(&self) -> &Aabb {
        &self.bounding_box
    }

    /// Vertices as an array
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.p1, self.p2, self.p3]
    }

    /// Centroid
    pub fn center(&self) -> Vec3 {
        (self.p1 + self.p2 + self.p3) / 3.0
    }

    /// Zero-area triangles never collide
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::zeros()
    }

    /// Supporting plane
    pub fn plane(&self) -> Plane {
        Plane::new(self.p1, self.normal)
    }

    /// Ray intersection using Möller-Trumbore.
    ///
    /// Hits closer than a small epsilon along the ray are ignored so a ray
    /// cast from a surface does not report that surface.
    pub fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        if self.is_degenerate() {
            return None;
        }

        let edge1 = self.p2 - self.p1;
        let edge2 = self.p3 - self.p1;
        let h = ray.direction.cross(&edge2);
        let a = edge1.dot(&h);
        if a.abs() < f32::EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.p1;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > Self::RAY_EPSILON).then(|| ray.point_at(t))
    }

    /// Closest point on the triangle to `point`
    /// (Real-Time Collision Detection 5.1.5)
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        let (a, b, c) = (self.p1, self.p2, self.p3);
        let ab = b - a;
        let ac = c - a;

        let ap = point - a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = point - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = point - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = va + vb + vc;
        if denom.abs() <= f32::EPSILON {
            return a;
        }
        let v = vb / denom;
        let w = vc / denom;
        a + ab * v + ac * w
    }

    /// Conservative pre-filter against a collider's box enlarged by `scale`
    pub fn is_potentially_colliding(&self, bounds: &Aabb, scale: f32) -> bool {
        self.bounding_box.is_colliding(&bounds.scaled(scale))
    }

    /// Overlap of `collider` pushed out of this triangle.
    ///
    /// Mesh colliders are not tested against single triangles.
    pub fn interpenetration(&self, collider: &Collider) -> Option<Interpenetration> {
        if self.is_degenerate() || !self.bounding_box.is_colliding(&collider.bounding_box()) {
            return None;
        }

        match collider {
            Collider::Sphere(sphere) => self.interpenetration_with_sphere(sphere.position(), sphere.radius),
            Collider::Ellipsoid(ellipsoid) => self.interpenetration_with_ellipsoid(ellipsoid),
            Collider::Aabb(aabb) => self.interpenetration_with_box(&aabb.frame()),
            Collider::Obb(obb) => self.interpenetration_with_box(&obb.frame()),
            Collider::Mesh(_) | Collider::SkinnedMesh(_) => None,
        }
    }

    fn interpenetration_with_sphere(&self, center: Vec3, radius: f32) -> Option<Interpenetration> {
        let closest = self.closest_surface_point(center);
        let separation = center - closest;
        let distance = separation.magnitude();
        if distance >= radius {
            return None;
        }
        let direction = if distance > f32::EPSILON {
            separation / distance
        } else {
            self.normal
        };
        Interpenetration::new(radius - distance, direction, closest).colliding()
    }

    fn interpenetration_with_ellipsoid(&self, ellipsoid: &Ellipsoid) -> Option<Interpenetration> {
        if ellipsoid.is_degenerate() {
            return None;
        }
        let unit = Self::new(
            ellipsoid.to_unit_space(self.p1),
            ellipsoid.to_unit_space(self.p2),
            ellipsoid.to_unit_space(self.p3),
        );
        if unit.is_degenerate() {
            return None;
        }
        let hit = unit.interpenetration_with_sphere(Vec3::zeros(), 1.0)?;
        let separation = (hit.direction * hit.depth).component_mul(&ellipsoid.radius);
        Interpenetration::from_separation(separation, ellipsoid.from_unit_space(hit.point))
    }

    fn interpenetration_with_box(&self, frame: &BoxFrame) -> Option<Interpenetration> {
        frame.interpenetration_from_triangle(&self.vertices(), &self.normal)
    }
}
