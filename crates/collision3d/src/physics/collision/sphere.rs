//! Sphere and ellipsoid colliders
//!
//! Ellipsoids are axis-aligned. Tests against them run in the ellipsoid's
//! unit space, where it becomes the unit sphere, and the resulting separation
//! is scaled back into world space.

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::primitives::{Interpenetration, Ray, SurfaceImpact};
use crate::foundation::math::{max_component, Transform, Vec3};

/// Sphere collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Anchor point, normally the owning entity's position
    pub center: Vec3,
    /// Offset from `center` to the middle of the sphere
    pub offset: Vec3,
    /// Sphere radius
    pub radius: f32,
    base_offset: Vec3,
    base_radius: f32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), 1.0)
    }
}

impl Sphere {
    /// Creates a new sphere
    pub fn new(center: Vec3, offset: Vec3, radius: f32) -> Self {
        Self {
            center,
            offset,
            radius,
            base_offset: offset,
            base_radius: radius,
        }
    }

    /// World-space middle of the sphere
    pub fn position(&self) -> Vec3 {
        self.center + self.offset
    }

    /// Enclosing axis-aligned box
    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(self.center, self.offset, Vec3::repeat(self.radius))
    }

    /// Follow a transform; non-uniform scale uses the largest axis
    pub fn update(&mut self, transform: &Transform) {
        self.center = transform.position;
        self.offset = self.base_offset.component_mul(&transform.scale);
        self.radius = self.base_radius * max_component(&transform.scale.abs());
    }

    /// Re-base offset and size; `transform.scale` is the full diameter
    pub fn update_size_and_offset(&mut self, transform: &Transform) {
        self.base_offset = transform.position;
        self.base_radius = max_component(&transform.scale.abs()) * 0.5;
        self.offset = self.base_offset;
        self.radius = self.base_radius;
    }

    /// Nearest point on the sphere surface to `point`
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        let toward = point - self.position();
        match toward.try_normalize(f32::EPSILON) {
            Some(direction) => self.position() + direction * self.radius,
            None => self.position() + Vec3::y() * self.radius,
        }
    }

    /// Ray intersection
    pub fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        let (distance, position) = unit_sphere_entry(
            (ray.origin - self.position()) / self.radius,
            ray.direction / self.radius,
        )
        .map(|t| (t, ray.point_at(t)))?;
        Some(SurfaceImpact {
            position,
            normal: self.surface_normal(position),
            distance,
        })
    }

    /// Outward normal at the surface point nearest `point`
    pub fn surface_normal(&self, point: Vec3) -> Vec3 {
        (point - self.position())
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::y)
    }
}

/// Axis-aligned ellipsoid collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Anchor point, normally the owning entity's position
    pub center: Vec3,
    /// Offset from `center` to the middle of the ellipsoid
    pub offset: Vec3,
    /// Radii along each world axis
    pub radius: Vec3,
    base_offset: Vec3,
    base_radius: Vec3,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Ellipsoid {
    /// Creates a new ellipsoid
    pub fn new(center: Vec3, offset: Vec3, radius: Vec3) -> Self {
        Self {
            center,
            offset,
            radius,
            base_offset: offset,
            base_radius: radius,
        }
    }

    /// World-space middle of the ellipsoid
    pub fn position(&self) -> Vec3 {
        self.center + self.offset
    }

    /// Enclosing axis-aligned box
    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(self.center, self.offset, self.radius)
    }

    /// Follow a transform
    pub fn update(&mut self, transform: &Transform) {
        self.center = transform.position;
        self.offset = self.base_offset.component_mul(&transform.scale);
        self.radius = self.base_radius.component_mul(&transform.scale.abs());
    }

    /// Re-base offset and size; `transform.scale` is the full size
    pub fn update_size_and_offset(&mut self, transform: &Transform) {
        self.base_offset = transform.position;
        self.base_radius = transform.scale.abs() * 0.5;
        self.offset = self.base_offset;
        self.radius = self.base_radius;
    }

    /// Map a world point into unit space
    pub(crate) fn to_unit_space(&self, point: Vec3) -> Vec3 {
        (point - self.position()).component_div(&self.radius)
    }

    /// Map a unit-space point back to world space
    pub(crate) fn from_unit_space(&self, point: Vec3) -> Vec3 {
        point.component_mul(&self.radius) + self.position()
    }

    /// Whether the radii can be inverted
    pub(crate) fn is_degenerate(&self) -> bool {
        self.radius.iter().any(|r| *r <= 0.0 || !r.is_finite())
    }

    /// Surface point along the ray from the center toward `point`
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        let unit = self.to_unit_space(point);
        let direction = unit.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y);
        self.from_unit_space(direction)
    }

    /// Ray intersection computed in unit space
    pub fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        if self.is_degenerate() {
            return None;
        }
        let distance = unit_sphere_entry(
            self.to_unit_space(ray.origin),
            ray.direction.component_div(&self.radius),
        )?;
        let position = ray.point_at(distance);
        Some(SurfaceImpact {
            position,
            normal: self.surface_normal(position),
            distance,
        })
    }

    /// Outward normal from the implicit-surface gradient
    pub fn surface_normal(&self, point: Vec3) -> Vec3 {
        let radius_squared = self.radius.component_mul(&self.radius);
        (point - self.position())
            .component_div(&radius_squared)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::y)
    }

    /// Push another ellipsoid out of this one.
    ///
    /// In this ellipsoid's unit space the other shape is measured by its
    /// support distance along the line between centers.
    pub(crate) fn interpenetration_with_ellipsoid(&self, center: Vec3, radii: Vec3) -> Option<Interpenetration> {
        if self.is_degenerate() {
            return None;
        }
        let scaled_radii = radii.component_div(&self.radius);
        let between = self.to_unit_space(center);
        let distance = between.magnitude();
        let direction = between.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y);
        let reach = 1.0 + scaled_radii.component_mul(&direction).magnitude();
        if distance >= reach {
            return None;
        }
        let separation = (direction * (reach - distance)).component_mul(&self.radius);
        Interpenetration::from_separation(separation, self.from_unit_space(direction))
    }

    /// Push this ellipsoid out of an axis-aligned box; the box is the base shape
    pub(crate) fn interpenetration_from_aabb(&self, base: &Aabb) -> Option<Interpenetration> {
        if self.is_degenerate() {
            return None;
        }
        let unit_box = Aabb::from_center_radius(
            self.to_unit_space(base.position()),
            base.radius.component_div(&self.radius),
        );
        let hit = unit_box.interpenetration_with_sphere(Vec3::zeros(), 1.0)?;
        let separation = (hit.direction * hit.depth).component_mul(&self.radius);
        Interpenetration::from_separation(separation, self.from_unit_space(hit.point))
    }
}

/// Smallest positive `t` where `origin + t * direction` meets the unit sphere
fn unit_sphere_entry(origin: Vec3, direction: Vec3) -> Option<f32> {
    let a = direction.dot(&direction);
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * origin.dot(&direction);
    let c = origin.dot(&origin) - 1.0;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let t1 = (-b - sqrt_discriminant) / (2.0 * a);
    let t2 = (-b + sqrt_discriminant) / (2.0 * a);
    if t1 > 0.0 {
        Some(t1)
    } else if t2 > 0.0 {
        Some(t2)
    } else {
        None
    }
}
