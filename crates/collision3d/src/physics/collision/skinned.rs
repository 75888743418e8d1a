//! Skinned collision meshes
//!
//! Bind-pose vertices carry up to four joint influences. Each update blends
//! the current joint skinning matrices (linear blend skinning, GEA 12.5) and
//! rebuilds the world-space triangles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::attributes::CollisionAttributes;
use super::mesh::{bounds_of, closest_point, deepest_interpenetration, nearest_impact, triangles_hit};
use super::primitives::{Interpenetration, Ray, SurfaceImpact};
use super::shape::Collider;
use super::triangle::CollisionTriangle;
use crate::foundation::math::{Mat4, Point3, Transform, Vec3};

/// Bind-pose vertex with joint influences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinnedVertex {
    /// Model-space bind position
    pub position: Vec3,
    /// Indices into the skinning matrix palette
    pub joints: [u16; 4],
    /// Influence weights, expected to sum to one
    pub weights: [f32; 4],
}

impl SkinnedVertex {
    /// Vertex bound entirely to one joint
    pub fn rigid(position: Vec3, joint: u16) -> Self {
        Self {
            position,
            joints: [joint, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    fn skin(&self, palette: &[Mat4]) -> Vec3 {
        let bind = Point3::from(self.position);
        let mut blended = Vec3::zeros();
        let mut total = 0.0;
        for (joint, weight) in self.joints.iter().zip(self.weights.iter()) {
            if *weight <= 0.0 {
                continue;
            }
            if let Some(matrix) = palette.get(usize::from(*joint)) {
                blended += matrix.transform_point(&bind).coords * *weight;
                total += *weight;
            }
        }
        if total > 0.0 {
            blended / total
        } else {
            self.position
        }
    }
}

/// Triangle mesh deformed by a skeleton
#[derive(Debug, Clone)]
pub struct SkinnedMeshCollider {
    vertices: Arc<[SkinnedVertex]>,
    indices: Arc<[u32]>,
    attributes: Arc<[CollisionAttributes]>,
    palette: Vec<Mat4>,
    triangles: Vec<CollisionTriangle>,
    bounding_box: Aabb,
    last_transform: Option<Transform>,
    pose_changed: bool,
}

impl SkinnedMeshCollider {
    /// Creates a skinned collider in bind pose
    pub fn new(vertices: Vec<SkinnedVertex>, indices: Vec<u32>) -> Self {
        let mut collider = Self {
            vertices: vertices.into(),
            indices: indices.into(),
            attributes: Arc::from(Vec::new()),
            palette: Vec::new(),
            triangles: Vec::new(),
            bounding_box: Aabb::from_center_radius(Vec3::zeros(), Vec3::zeros()),
            last_transform: None,
            pose_changed: true,
        };
        collider.rebuild(&Transform::default());
        collider
    }

    /// Builder pattern: Set per-triangle attributes, in index order
    pub fn with_attributes(mut self, attributes: Vec<CollisionAttributes>) -> Self {
        self.attributes = attributes.into();
        let transform = self.last_transform.unwrap_or_default();
        self.rebuild(&transform);
        self
    }

    /// Replace the skinning matrices (joint model space times inverse bind)
    pub fn set_pose(&mut self, palette: &[Mat4]) {
        self.palette.clear();
        self.palette.extend_from_slice(palette);
        self.pose_changed = true;
    }

    /// World-space triangles as of the last update
    pub fn triangles(&self) -> &[CollisionTriangle] {
        &self.triangles
    }

    /// Enclosing box of the posed triangles
    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    /// Re-skin when the pose or the transform changed
    pub fn update(&mut self, transform: &Transform) {
        if !self.pose_changed && self.last_transform.as_ref() == Some(transform) {
            return;
        }
        self.rebuild(transform);
    }

    fn rebuild(&mut self, transform: &Transform) {
        let world = transform.to_matrix();
        let posed: Vec<Vec3> = self
            .vertices
            .iter()
            .map(|vertex| {
                let local = vertex.skin(&self.palette);
                world.transform_point(&Point3::from(local)).coords
            })
            .collect();

        self.triangles = self
            .indices
            .chunks_exact(3)
            .enumerate()
            .filter_map(|(triangle, chunk)| {
                let p1 = posed.get(chunk[0] as usize)?;
                let p2 = posed.get(chunk[1] as usize)?;
                let p3 = posed.get(chunk[2] as usize)?;
                let attributes = self.attributes.get(triangle).copied().unwrap_or_default();
                Some(CollisionTriangle::new(*p1, *p2, *p3).with_attributes(attributes))
            })
            .collect();
        self.bounding_box = bounds_of(&self.triangles, transform.position);
        self.last_transform = Some(*transform);
        self.pose_changed = false;
    }

    /// Every triangle the ray passes through
    pub fn triangles_hit(&self, ray: &Ray) -> Vec<(Vec3, CollisionTriangle)> {
        triangles_hit(&self.triangles, ray)
    }

    /// Nearest triangle impact
    pub fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        nearest_impact(&self.triangles, ray)
    }

    /// Nearest point on any posed triangle
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        closest_point(&self.triangles, point, self.bounding_box.position())
    }

    /// Deepest overlap of `other` against any posed triangle
    pub fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        deepest_interpenetration(&self.triangles, other)
    }
}
