//! Math utilities and types
//!
//! Provides the vector, matrix and transform types shared by the collision
//! code. The world is Y-up and right-handed: forward is `-Z`, right is `+X`.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type, used for texture coordinates
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// World-space unit directions
pub mod direction {
    use super::Vec3;

    /// World up (`+Y`)
    pub fn up() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    /// World down (`-Y`)
    pub fn down() -> Vec3 {
        Vec3::new(0.0, -1.0, 0.0)
    }

    /// World forward (`-Z`)
    pub fn forward() -> Vec3 {
        Vec3::new(0.0, 0.0, -1.0)
    }

    /// World right (`+X`)
    pub fn right() -> Vec3 {
        Vec3::new(1.0, 0.0, 0.0)
    }

    /// World left (`-X`)
    pub fn left() -> Vec3 {
        Vec3::new(-1.0, 0.0, 0.0)
    }
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }

    /// Apply this transform to a vector (no translation)
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.to_matrix().transform_vector(&vector)
    }

    /// Decompose a TRS matrix into a transform.
    ///
    /// Shear is discarded. Zero scale axes produce a non-finite rotation,
    /// which callers feeding rig data are expected to avoid.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
        let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
        let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
        let scale = Vec3::new(scale_x, scale_y, scale_z);

        let rotation_matrix = Matrix3::new(
            matrix.m11 / scale_x, matrix.m12 / scale_y, matrix.m13 / scale_z,
            matrix.m21 / scale_x, matrix.m22 / scale_y, matrix.m23 / scale_z,
            matrix.m31 / scale_x, matrix.m32 / scale_y, matrix.m33 / scale_z,
        );
        let rotation = Quat::from_matrix(&rotation_matrix);

        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Local forward direction in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * direction::forward()
    }

    /// Local right direction in world space
    pub fn right(&self) -> Vec3 {
        self.rotation * direction::right()
    }

    /// Local left direction in world space
    pub fn left(&self) -> Vec3 {
        self.rotation * direction::left()
    }

    /// Local up direction in world space
    pub fn up(&self) -> Vec3 {
        self.rotation * direction::up()
    }

    /// Returns `true` when every component is finite
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.scale.iter().all(|v| v.is_finite())
            && self.rotation.coords.iter().all(|v| v.is_finite())
    }
}

/// Largest component of a vector
pub fn max_component(v: &Vec3) -> f32 {
    v.x.max(v.y).max(v.z)
}

/// Smallest component of a vector
pub fn min_component(v: &Vec3) -> f32 {
    v.x.min(v.y).min(v.z)
}

/// Returns `true` when every component is finite
pub fn is_finite(v: &Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
