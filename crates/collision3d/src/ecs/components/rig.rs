//! Skeletal rig component
//!
//! Based on Game Engine Architecture 3rd Edition, Section 12.3: each joint
//! keeps its current model-space pose and the inverse of its bind pose, so
//! the skinning matrix is their product.

use crate::ecs::Component;
use crate::foundation::math::Mat4;

/// A named skeleton joint
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    /// Joint name used for lookups
    pub name: String,
    /// Current pose in model space
    pub model_space: Mat4,
    /// Inverse of the bind pose in model space
    pub inverse_bind: Mat4,
}

impl Joint {
    /// Joint posed at its bind pose
    pub fn new(name: impl Into<String>, bind_pose: Mat4) -> Self {
        Self {
            name: name.into(),
            model_space: bind_pose,
            inverse_bind: bind_pose.try_inverse().unwrap_or_else(Mat4::identity),
        }
    }

    /// Skinning matrix for this joint's current pose
    pub fn skinning_matrix(&self) -> Mat4 {
        self.model_space * self.inverse_bind
    }
}

/// Ordered joint list; skinned vertices index into it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    /// Joints in palette order
    pub joints: Vec<Joint>,
}

impl Skeleton {
    /// Skeleton from joints in palette order
    pub fn new(joints: Vec<Joint>) -> Self {
        Self { joints }
    }
}

/// Animated skeleton attached to an entity
#[derive(Debug, Clone, Default)]
pub struct RigComponent {
    /// The entity's skeleton
    pub skeleton: Skeleton,
    /// Joint whose transform drives the collider's offset and size
    pub collider_joint: Option<String>,
}

impl Component for RigComponent {}

impl RigComponent {
    /// Rig without a collider joint
    pub fn new(skeleton: Skeleton) -> Self {
        Self {
            skeleton,
            collider_joint: None,
        }
    }

    /// Builder pattern: Drive the collider from the named joint
    pub fn with_collider_joint(mut self, joint: impl Into<String>) -> Self {
        self.collider_joint = Some(joint.into());
        self
    }

    /// Look up a joint by name
    pub fn joint_named(&self, name: &str) -> Option<&Joint> {
        self.skeleton.joints.iter().find(|joint| joint.name == name)
    }

    /// Mutable joint lookup, for animation updates
    pub fn joint_named_mut(&mut self, name: &str) -> Option<&mut Joint> {
        self.skeleton.joints.iter_mut().find(|joint| joint.name == name)
    }

    /// Skinning palette in joint order
    pub fn skinning_matrices(&self) -> Vec<Mat4> {
        self.skeleton.joints.iter().map(Joint::skinning_matrix).collect()
    }
}
