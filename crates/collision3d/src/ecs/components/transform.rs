//! Transform component for the ECS system
//!
//! Follows Game Engine Architecture principles:
//! - Pure data component, with the previous tick's transform kept alongside
//!   so collision can reason about motion between ticks
//! - Y-up right-handed coordinates, forward is -Z

use crate::ecs::Component;
use crate::foundation::math::{direction, Mat4, Quat, Transform as MathTransform, Vec3};

/// ECS Transform component
///
/// World-space position, rotation and scale, plus the transform stored at the
/// end of the previous tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World space position (Y-up right-handed)
    pub position: Vec3,

    /// World space rotation quaternion
    pub rotation: Quat,

    /// World space scale factors
    pub scale: Vec3,

    /// Transform as of the last [`TransformComponent::store_previous`]
    pub previous: MathTransform,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            previous: MathTransform::default(),
        }
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only; the previous transform starts equal
    pub fn from_position(position: Vec3) -> Self {
        Self::from_transform(&MathTransform::from_position(position))
    }

    /// Create from position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self::from_transform(&MathTransform::from_position_rotation(position, rotation))
    }

    /// Create from a foundation transform, with no motion recorded
    pub fn from_transform(transform: &MathTransform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            previous: *transform,
        }
    }

    /// Current transform as a foundation math value
    pub fn transform(&self) -> MathTransform {
        MathTransform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Overwrite position, rotation and scale; the previous slot is untouched
    pub fn set_transform(&mut self, transform: &MathTransform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
        self.scale = transform.scale;
    }

    /// Convert to transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        self.transform().to_matrix()
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set rotation from quaternion
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set rotation from axis-angle
    pub fn with_rotation_axis_angle(mut self, axis: Vec3, angle: f32) -> Self {
        self.rotation = Quat::from_axis_angle(&nalgebra::Unit::new_normalize(axis), angle);
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: Set the previous tick's transform
    pub fn with_previous(mut self, previous: MathTransform) -> Self {
        self.previous = previous;
        self
    }

    /// Builder pattern: Set the previous tick's position only
    pub fn with_previous_position(mut self, position: Vec3) -> Self {
        self.previous.position = position;
        self
    }

    /// Remember the current transform as the previous one
    pub fn store_previous(&mut self) {
        self.previous = self.transform();
    }

    /// Local forward direction
    pub fn forward(&self) -> Vec3 {
        self.rotation * direction::forward()
    }

    /// Local right direction
    pub fn right(&self) -> Vec3 {
        self.rotation * direction::right()
    }

    /// Local left direction
    pub fn left(&self) -> Vec3 {
        self.rotation * direction::left()
    }

    /// Distance moved since the previous transform was stored
    pub fn distance_traveled(&self) -> f32 {
        (self.position - self.previous.position).magnitude()
    }

    /// Unit direction of travel since the previous transform was stored.
    ///
    /// Zero travel reports world forward. Non-finite positions propagate NaN.
    pub fn direction_traveled(&self) -> Vec3 {
        let travel = self.position - self.previous.position;
        if travel.iter().any(|c| !c.is_finite()) {
            return Vec3::repeat(f32::NAN);
        }
        travel.try_normalize(f32::EPSILON).unwrap_or_else(direction::forward)
    }
}
