//! Oriented bounding box and separating-axis tests
//!
//! Box-vs-box and triangle-vs-box overlaps use the separating axis theorem
//! with minimum-translation tracking (Real-Time Collision Detection 4.4.1,
//! Game Engine Architecture 3rd Edition, Section 13.3.5).

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::primitives::{project_points, Interpenetration, Ray, SeparatingAxes, SurfaceImpact};
use crate::foundation::math::{Quat, Transform, Vec3};

/// A box in world space described by its center, unit axes and half-extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoxFrame {
    pub center: Vec3,
    pub axes: [Vec3; 3],
    pub half: Vec3,
}

impl BoxFrame {
    pub(crate) fn axis_aligned(center: Vec3, half: Vec3) -> Self {
        Self {
            center,
            axes: [Vec3::x(), Vec3::y(), Vec3::z()],
            half,
        }
    }

    pub(crate) fn oriented(center: Vec3, rotation: &Quat, half: Vec3) -> Self {
        Self {
            center,
            axes: [rotation * Vec3::x(), rotation * Vec3::y(), rotation * Vec3::z()],
            half,
        }
    }

    /// Interval covered by the box along a unit axis
    pub(crate) fn project(&self, axis: &Vec3) -> (f32, f32) {
        let center = self.center.dot(axis);
        let reach = self.half.x * self.axes[0].dot(axis).abs()
            + self.half.y * self.axes[1].dot(axis).abs()
            + self.half.z * self.axes[2].dot(axis).abs();
        (center - reach, center + reach)
    }

    /// Coordinates of `point` in the box frame
    pub(crate) fn to_local(&self, point: Vec3) -> Vec3 {
        let d = point - self.center;
        Vec3::new(d.dot(&self.axes[0]), d.dot(&self.axes[1]), d.dot(&self.axes[2]))
    }

    pub(crate) fn to_world(&self, local: Vec3) -> Vec3 {
        self.center + self.axes[0] * local.x + self.axes[1] * local.y + self.axes[2] * local.z
    }

    pub(crate) fn contains(&self, point: Vec3) -> bool {
        let local = self.to_local(point);
        local.x.abs() <= self.half.x && local.y.abs() <= self.half.y && local.z.abs() <= self.half.z
    }

    pub(crate) fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.to_local(point);
        let clamped = Vec3::new(
            local.x.clamp(-self.half.x, self.half.x),
            local.y.clamp(-self.half.y, self.half.y),
            local.z.clamp(-self.half.z, self.half.z),
        );
        self.to_world(clamped)
    }

    pub(crate) fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::zeros(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
            let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
            let sz = if i & 4 == 0 { -1.0 } else { 1.0 };
            *corner = self.to_world(Vec3::new(sx * self.half.x, sy * self.half.y, sz * self.half.z));
        }
        corners
    }

    /// Face axis with the least room between an inside point and the surface
    fn shallowest_face(&self, local: &Vec3) -> (usize, f32) {
        (0..3)
            .map(|axis| (axis, self.half[axis] - local[axis].abs()))
            .fold((0, f32::INFINITY), |best, candidate| if candidate.1 < best.1 { candidate } else { best })
    }

    fn face_direction(&self, axis: usize, local: &Vec3) -> Vec3 {
        if local[axis] < 0.0 {
            -self.axes[axis]
        } else {
            self.axes[axis]
        }
    }

    /// Push a sphere out of the box
    pub(crate) fn interpenetration_with_sphere(&self, center: Vec3, radius: f32) -> Option<Interpenetration> {
        let local = self.to_local(center);
        if self.contains(center) {
            let (axis, room) = self.shallowest_face(&local);
            let direction = self.face_direction(axis, &local);
            let point = center + direction * room;
            return Interpenetration::new(room + radius, direction, point).colliding();
        }

        let closest = self.closest_point(center);
        let separation = center - closest;
        let distance = separation.magnitude();
        if distance >= radius || distance <= 0.0 {
            return None;
        }
        Interpenetration::new(radius - distance, separation / distance, closest).colliding()
    }

    /// Push an axis-aligned ellipsoid out of the box using its support distance
    pub(crate) fn interpenetration_with_ellipsoid(&self, center: Vec3, radii: Vec3) -> Option<Interpenetration> {
        let support = |direction: &Vec3| radii.component_mul(direction).magnitude();

        let local = self.to_local(center);
        if self.contains(center) {
            let (axis, room) = self.shallowest_face(&local);
            let direction = self.face_direction(axis, &local);
            let point = center + direction * room;
            return Interpenetration::new(room + support(&direction), direction, point).colliding();
        }

        let closest = self.closest_point(center);
        let separation = center - closest;
        let distance = separation.magnitude();
        if distance <= 0.0 {
            return None;
        }
        let direction = separation / distance;
        let reach = support(&direction);
        if distance >= reach {
            return None;
        }
        Interpenetration::new(reach - distance, direction, closest).colliding()
    }

    /// Push `other` out of this box
    pub(crate) fn interpenetration_with_box(&self, other: &BoxFrame) -> Option<Interpenetration> {
        let mut sat = SeparatingAxes::new();
        let project_a = |axis: &Vec3| self.project(axis);
        let project_b = |axis: &Vec3| other.project(axis);

        for axis in self.axes.iter().chain(other.axes.iter()) {
            if !sat.test(*axis, project_a, project_b) {
                return None;
            }
        }
        for a in &self.axes {
            for b in &other.axes {
                if !sat.test(a.cross(b), project_a, project_b) {
                    return None;
                }
            }
        }
        sat.finish(self.closest_point(other.center))
    }

    /// Push this box out of a triangle; the triangle is the base shape
    pub(crate) fn interpenetration_from_triangle(&self, vertices: &[Vec3; 3], normal: &Vec3) -> Option<Interpenetration> {
        let mut sat = SeparatingAxes::new();
        let project_triangle = |axis: &Vec3| project_points(vertices, axis);
        let project_box = |axis: &Vec3| self.project(axis);

        if !sat.test(*normal, project_triangle, project_box) {
            return None;
        }
        for axis in &self.axes {
            if !sat.test(*axis, project_triangle, project_box) {
                return None;
            }
        }
        let edges = [
            vertices[1] - vertices[0],
            vertices[2] - vertices[1],
            vertices[0] - vertices[2],
        ];
        for edge in &edges {
            for axis in &self.axes {
                if !sat.test(edge.cross(axis), project_triangle, project_box) {
                    return None;
                }
            }
        }
        sat.finish(self.center)
    }
}

/// Box collider with an arbitrary rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obb {
    /// Anchor point, normally the owning entity's position
    pub center: Vec3,
    /// Offset from `center` to the middle of the box
    pub offset: Vec3,
    /// Half-extents along the box's local axes
    pub radius: Vec3,
    /// Orientation of the box axes
    pub rotation: Quat,
    base_offset: Vec3,
    base_radius: Vec3,
    base_rotation: Quat,
}

impl Default for Obb {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Quat::identity())
    }
}

impl Obb {
    /// Create an oriented box
    pub fn new(center: Vec3, offset: Vec3, radius: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            offset,
            radius,
            rotation,
            base_offset: offset,
            base_radius: radius,
            base_rotation: rotation,
        }
    }

    /// World-space middle of the box
    pub fn position(&self) -> Vec3 {
        self.center + self.offset
    }

    pub(crate) fn frame(&self) -> BoxFrame {
        BoxFrame::oriented(self.position(), &self.rotation, self.radius)
    }

    /// Unit axes of the box in world space
    pub fn axes(&self) -> [Vec3; 3] {
        self.frame().axes
    }

    /// World-space corner points
    pub fn corners(&self) -> [Vec3; 8] {
        self.frame().corners()
    }

    /// Axis-aligned box enclosing every corner
    pub fn bounding_box(&self) -> Aabb {
        let corners = self.corners();
        let (min, max) = corners
            .iter()
            .fold((corners[0], corners[0]), |(min, max), p| (min.inf(p), max.sup(p)));
        let mut aabb = Aabb::from_min_max(min, max);
        aabb.offset = aabb.center - self.center;
        aabb.center = self.center;
        aabb
    }

    /// Follow a transform
    pub fn update(&mut self, transform: &Transform) {
        self.center = transform.position;
        self.offset = self.base_offset.component_mul(&transform.scale);
        self.radius = self.base_radius.component_mul(&transform.scale.abs());
        self.rotation = transform.rotation * self.base_rotation;
    }

    /// Re-base offset, size and rotation; `transform.scale` is the full size
    pub fn update_size_and_offset(&mut self, transform: &Transform) {
        self.base_offset = transform.position;
        self.base_radius = transform.scale.abs() * 0.5;
        self.base_rotation = transform.rotation;
        self.offset = self.base_offset;
        self.radius = self.base_radius;
    }

    /// Whether the box contains `point`
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.frame().contains(point)
    }

    /// Nearest point of the box to `point`
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        self.frame().closest_point(point)
    }

    /// Overlap test against an axis-aligned box
    pub fn is_colliding_with_aabb(&self, other: &Aabb) -> bool {
        other.frame().interpenetration_with_box(&self.frame()).is_some()
    }

    /// Entry point of the ray, tested in the box's local frame
    pub fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        let frame = self.frame();
        let local_origin = frame.to_local(ray.origin);
        let inverse = self.rotation.inverse();
        let local_ray = Ray {
            origin: local_origin,
            direction: inverse * ray.direction,
        };
        let local_box = Aabb::from_center_radius(Vec3::zeros(), self.radius);
        let local_impact = local_box.surface_impact(&local_ray)?;
        Some(SurfaceImpact {
            position: frame.to_world(local_impact.position),
            normal: self.rotation * local_impact.normal,
            distance: local_impact.distance,
        })
    }

    /// Entry point of the ray
    pub fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        self.surface_impact(ray).map(|impact| impact.position)
    }

    /// Normal of the face nearest to `point`
    pub fn surface_normal(&self, point: Vec3) -> Vec3 {
        let frame = self.frame();
        let local = frame.to_local(point);
        let local_normal = Aabb::from_center_radius(Vec3::zeros(), self.radius).surface_normal(local);
        self.rotation * local_normal
    }
}
