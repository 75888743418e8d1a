//! Axis-aligned bounding box
//!
//! Used three ways: as a primitive collider, as the broad-phase proxy every
//! collider exposes, and as the node volume of the triangle octree.
//!
//! Ray tests use the slab method (Real-Time Collision Detection 5.3.3).

use serde::{Deserialize, Serialize};

use super::obb::BoxFrame;
use super::primitives::{Interpenetration, Ray, SurfaceImpact};
use crate::foundation::math::{Transform, Vec3};

/// Axis-aligned box stored as center, offset and half-extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Anchor point, normally the owning entity's position
    pub center: Vec3,
    /// Offset from `center` to the middle of the box
    pub offset: Vec3,
    /// Half-extents along each axis
    pub radius: Vec3,
    base_offset: Vec3,
    base_radius: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Aabb {
    const RAY_EPSILON: f32 = 1e-8;

    /// Create a box anchored at `center`, shifted by `offset`
    pub fn new(center: Vec3, offset: Vec3, radius: Vec3) -> Self {
        Self {
            center,
            offset,
            radius,
            base_offset: offset,
            base_radius: radius,
        }
    }

    /// Box centered on `center` with no offset
    pub fn from_center_radius(center: Vec3, radius: Vec3) -> Self {
        Self::new(center, Vec3::zeros(), radius)
    }

    /// Box spanning two corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self::from_center_radius((min + max) * 0.5, (max - min) * 0.5)
    }

    /// Smallest box enclosing every point, `None` when empty
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self::from_min_max(min, max))
    }

    /// World-space middle of the box
    pub fn position(&self) -> Vec3 {
        self.center + self.offset
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.position() - self.radius
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.position() + self.radius
    }

    /// Full extents
    pub fn size(&self) -> Vec3 {
        self.radius * 2.0
    }

    /// Copy with half-extents multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            radius: self.radius * factor,
            ..*self
        }
    }

    /// Follow a transform: anchor at its position, scale offset and size
    pub fn update(&mut self, transform: &Transform) {
        self.center = transform.position;
        self.offset = self.base_offset.component_mul(&transform.scale);
        self.radius = self.base_radius.component_mul(&transform.scale.abs());
    }

    /// Re-base offset and size; `transform.scale` is the full box size
    pub fn update_size_and_offset(&mut self, transform: &Transform) {
        self.base_offset = transform.position;
        self.base_radius = transform.scale.abs() * 0.5;
        self.offset = self.base_offset;
        self.radius = self.base_radius;
    }

    /// Overlap test, touching counts as overlapping
    pub fn is_colliding(&self, other: &Aabb) -> bool {
        let delta = self.position() - other.position();
        let reach = self.radius + other.radius;
        delta.x.abs() <= reach.x && delta.y.abs() <= reach.y && delta.z.abs() <= reach.z
    }

    /// Whether the ray starts inside or passes through the box
    pub fn is_colliding_with_ray(&self, ray: &Ray) -> bool {
        self.slab_interval(ray).is_some()
    }

    /// Whether the box point-set contains `point`
    pub fn contains_point(&self, point: Vec3) -> bool {
        let delta = point - self.position();
        delta.x.abs() <= self.radius.x
            && delta.y.abs() <= self.radius.y
            && delta.z.abs() <= self.radius.z
    }

    /// Whether `other` lies completely inside this box
    pub fn contains_box(&self, other: &Aabb) -> bool {
        let (min, max) = (self.min(), self.max());
        let (other_min, other_max) = (other.min(), other.max());
        other_min.x >= min.x
            && other_min.y >= min.y
            && other_min.z >= min.z
            && other_max.x <= max.x
            && other_max.y <= max.y
            && other_max.z <= max.z
    }

    /// Parametric entry/exit distances along the ray.
    ///
    /// `None` when the ray misses or the box lies behind it.
    pub(crate) fn slab_interval(&self, ray: &Ray) -> Option<(f32, f32)> {
        let min = self.min();
        let max = self.max();
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir.abs() < Self::RAY_EPSILON {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t0 = (min[axis] - origin) * inv;
            let mut t1 = (max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
        }

        (t_exit >= t_enter.max(0.0)).then_some((t_enter, t_exit))
    }

    /// Entry point of the ray, `None` on a miss or when starting inside
    pub fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        let (t_enter, _) = self.slab_interval(ray)?;
        (t_enter > 0.0).then(|| ray.point_at(t_enter))
    }

    /// Entry point with its face normal
    pub fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        let (t_enter, _) = self.slab_interval(ray)?;
        if t_enter <= 0.0 {
            return None;
        }
        let position = ray.point_at(t_enter);
        Some(SurfaceImpact {
            position,
            normal: self.surface_normal(position),
            distance: t_enter,
        })
    }

    /// Normal of the face nearest to `point`
    pub fn surface_normal(&self, point: Vec3) -> Vec3 {
        let local = point - self.position();
        let mut best_axis = 0;
        let mut best_ratio = f32::NEG_INFINITY;
        for axis in 0..3 {
            let ratio = if self.radius[axis] > 0.0 {
                local[axis].abs() / self.radius[axis]
            } else {
                f32::INFINITY
            };
            if ratio > best_ratio {
                best_ratio = ratio;
                best_axis = axis;
            }
        }
        let mut normal = Vec3::zeros();
        normal[best_axis] = if local[best_axis] < 0.0 { -1.0 } else { 1.0 };
        normal
    }

    /// Clamp `point` into the box
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        point.sup(&self.min()).inf(&self.max())
    }

    /// Smallest box enclosing both boxes
    pub fn expanded_to_enclose(&self, other: &Aabb) -> Aabb {
        Aabb::from_min_max(self.min().inf(&other.min()), self.max().sup(&other.max()))
    }

    /// The 8 corner points
    pub fn points(&self) -> [Vec3; 8] {
        let p = self.position();
        let r = self.radius;
        [
            Vec3::new(p.x - r.x, p.y - r.y, p.z - r.z),
            Vec3::new(p.x + r.x, p.y - r.y, p.z - r.z),
            Vec3::new(p.x - r.x, p.y + r.y, p.z - r.z),
            Vec3::new(p.x + r.x, p.y + r.y, p.z - r.z),
            Vec3::new(p.x - r.x, p.y - r.y, p.z + r.z),
            Vec3::new(p.x + r.x, p.y - r.y, p.z + r.z),
            Vec3::new(p.x - r.x, p.y + r.y, p.z + r.z),
            Vec3::new(p.x + r.x, p.y + r.y, p.z + r.z),
        ]
    }

    /// Box as an oriented frame for separating-axis tests
    pub(crate) fn frame(&self) -> BoxFrame {
        BoxFrame::axis_aligned(self.position(), self.radius)
    }

    /// Overlap of `other` pushed out of `self` along the shallowest axis
    pub fn interpenetration_with_aabb(&self, other: &Aabb) -> Option<Interpenetration> {
        let delta = other.position() - self.position();
        let overlap = self.radius + other.radius - delta.abs();
        if overlap.x <= 0.0 || overlap.y <= 0.0 || overlap.z <= 0.0 {
            return None;
        }

        let axis = if overlap.x <= overlap.y && overlap.x <= overlap.z {
            0
        } else if overlap.y <= overlap.z {
            1
        } else {
            2
        };
        let mut direction = Vec3::zeros();
        direction[axis] = if delta[axis] < 0.0 { -1.0 } else { 1.0 };
        let point = self.closest_surface_point(other.position());
        Interpenetration::new(overlap[axis], direction, point).colliding()
    }

    /// Overlap of a sphere pushed out of `self`
    pub fn interpenetration_with_sphere(&self, center: Vec3, radius: f32) -> Option<Interpenetration> {
        self.frame().interpenetration_with_sphere(center, radius)
    }
}
