//! Primitive collision values and shared intersection helpers
//!
//! Rays, planes, surface classification and the result types produced by
//! the narrow phase. The separating-axis accumulator used by the box and
//! triangle tests lives here as well.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{direction, is_finite, Vec3};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized on construction)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Creates a ray starting at `from` and pointing toward `to`
    pub fn between(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Returns `true` if the direction could be normalized
    pub fn is_valid(&self) -> bool {
        is_finite(&self.origin) && is_finite(&self.direction)
    }
}

/// Which side of a plane a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// In the half-space the normal points into
    Front,
    /// Behind the plane
    Back,
    /// On the plane, within tolerance
    On,
}

/// An infinite plane `normal · p + constant = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal (zero for planes built from degenerate triangles)
    pub normal: Vec3,
    /// Signed offset from the origin
    pub constant: f32,
}

impl Plane {
    const ON_PLANE_EPSILON: f32 = 1e-6;

    /// Plane through `origin` facing `normal`
    pub fn new(origin: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            constant: -origin.dot(&normal),
        }
    }

    /// Signed distance from the plane to `point`
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.constant
    }

    /// Classify a point against the plane
    pub fn classify_point(&self, point: Vec3) -> PlaneSide {
        let distance = self.distance_to(point);
        if distance > Self::ON_PLANE_EPSILON {
            PlaneSide::Front
        } else if distance < -Self::ON_PLANE_EPSILON {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }
}

/// Triangle classification derived from the angle between its normal and up.
///
/// Discriminants order candidate triangles during resolution: walkable
/// surfaces resolve first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum SurfaceType {
    /// Nearly horizontal, facing up
    Floor = 0,
    /// Walkable slope
    Ramp = 1,
    /// Nearly horizontal, facing down
    Ceiling = 2,
    /// Everything else
    Wall = 3,
}

impl SurfaceType {
    /// Upper bound (exclusive) of the floor angle, 30 degrees
    pub const FLOOR_MAX_ANGLE: f32 = 0.523_599;
    /// Upper bound (inclusive) of the ramp angle, 55 degrees
    pub const RAMP_MAX_ANGLE: f32 = 0.959_931;
    /// Lower bound (inclusive) of the ceiling angle, 155 degrees
    pub const CEILING_MIN_ANGLE: f32 = 2.705_26;

    /// Classify a unit normal
    pub fn from_normal(normal: &Vec3) -> Self {
        if normal.magnitude_squared() < f32::EPSILON || !is_finite(normal) {
            return Self::Wall;
        }

        let cosine = normal.normalize().dot(&direction::up()).clamp(-1.0, 1.0);
        let angle = cosine.acos();
        if angle < Self::FLOOR_MAX_ANGLE {
            Self::Floor
        } else if angle <= Self::RAMP_MAX_ANGLE {
            Self::Ramp
        } else if angle >= Self::CEILING_MIN_ANGLE {
            Self::Ceiling
        } else {
            Self::Wall
        }
    }

    /// Floors and ramps can be stood on
    pub fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Ramp)
    }
}

/// Measured overlap between two shapes.
///
/// `direction` points from the base shape toward the compared shape, so
/// moving the compared shape by `direction * depth` separates the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpenetration {
    /// Penetration distance, positive when overlapping
    pub depth: f32,
    /// Unit separation direction
    pub direction: Vec3,
    /// Representative contact point
    pub point: Vec3,
}

impl Interpenetration {
    /// Create a new interpenetration result
    pub fn new(depth: f32, direction: Vec3, point: Vec3) -> Self {
        Self {
            depth,
            direction,
            point,
        }
    }

    /// Strictly positive, finite overlap
    pub fn is_colliding(&self) -> bool {
        self.depth > 0.0 && self.depth.is_finite() && is_finite(&self.direction)
    }

    /// `Some(self)` when colliding
    pub fn colliding(self) -> Option<Self> {
        self.is_colliding().then_some(self)
    }

    /// Same overlap seen from the other shape
    pub fn reversed(self) -> Self {
        Self {
            direction: -self.direction,
            ..self
        }
    }

    /// Build from a separation vector; `None` for zero or non-finite input
    pub fn from_separation(separation: Vec3, point: Vec3) -> Option<Self> {
        let depth = separation.magnitude();
        if depth <= 0.0 || !depth.is_finite() {
            return None;
        }
        Self::new(depth, separation / depth, point).colliding()
    }
}

/// Point where a ray meets a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceImpact {
    /// World-space hit position
    pub position: Vec3,
    /// Surface normal at the hit
    pub normal: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Minimum-translation search over candidate separating axes.
///
/// Shape A is the base, shape B the one being pushed; the resulting axis
/// points from A toward B.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SeparatingAxes {
    depth: f32,
    axis: Vec3,
}

impl SeparatingAxes {
    const AXIS_EPSILON: f32 = 1e-8;

    pub(crate) fn new() -> Self {
        Self {
            depth: f32::INFINITY,
            axis: Vec3::zeros(),
        }
    }

    /// Test one axis given a projection function for each shape.
    ///
    /// Returns `false` when the axis separates the shapes.
    pub(crate) fn test(
        &mut self,
        axis: Vec3,
        project_a: impl Fn(&Vec3) -> (f32, f32),
        project_b: impl Fn(&Vec3) -> (f32, f32),
    ) -> bool {
        let length_squared = axis.magnitude_squared();
        if length_squared < Self::AXIS_EPSILON || !length_squared.is_finite() {
            return true;
        }
        let axis = axis / length_squared.sqrt();

        let (min_a, max_a) = project_a(&axis);
        let (min_b, max_b) = project_b(&axis);

        let push_positive = max_a - min_b;
        let push_negative = max_b - min_a;
        if push_positive <= 0.0 || push_negative <= 0.0 {
            return false;
        }

        let (depth, axis) = if push_positive <= push_negative {
            (push_positive, axis)
        } else {
            (push_negative, -axis)
        };
        if depth < self.depth {
            self.depth = depth;
            self.axis = axis;
        }
        true
    }

    /// Final overlap once every axis passed
    pub(crate) fn finish(self, point: Vec3) -> Option<Interpenetration> {
        if !self.depth.is_finite() {
            return None;
        }
        Interpenetration::new(self.depth, self.axis, point).colliding()
    }
}

/// Project a set of points onto an axis
pub(crate) fn project_points(points: &[Vec3], axis: &Vec3) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}
