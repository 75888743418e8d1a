//! Level geometry component
//!
//! An entity carrying this component owns the static triangle index of a
//! level. The octree is built on load; later triangles are inserted into the
//! existing tree without rebuilding it.

use crate::ecs::Component;
use crate::foundation::logging::warn;
use crate::foundation::math::Vec3;
use crate::physics::collision::{Aabb, CollisionTriangle, Ray, TrianglePredicate};
use crate::spatial::{Octree, OctreeConfig};

/// Static triangle octree attached to a level entity
#[derive(Debug, Clone, Default)]
pub struct OctreeComponent {
    octree: Option<Octree>,
}

impl Component for OctreeComponent {}

impl OctreeComponent {
    /// Empty component; queries return nothing until loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the octree with the default configuration
    pub fn load(&mut self, center: Vec3, triangles: &[CollisionTriangle]) {
        self.load_with_config(center, triangles, &OctreeConfig::default());
    }

    /// Build the octree, replacing any previous one
    pub fn load_with_config(&mut self, center: Vec3, triangles: &[CollisionTriangle], config: &OctreeConfig) {
        self.octree = Some(Octree::build(center, triangles, config));
    }

    /// Builder pattern: Load on construction
    pub fn with_triangles(mut self, center: Vec3, triangles: &[CollisionTriangle], config: &OctreeConfig) -> Self {
        self.load_with_config(center, triangles, config);
        self
    }

    /// Add triangles to a loaded octree; ignored before the first load
    pub fn insert_triangles(&mut self, triangles: &[CollisionTriangle]) {
        match self.octree.as_mut() {
            Some(octree) => octree.insert_triangles(triangles.iter().copied()),
            None => warn!("Dropping {} triangles inserted before the octree was loaded", triangles.len()),
        }
    }

    /// Whether an octree has been built
    pub fn is_loaded(&self) -> bool {
        self.octree.is_some()
    }

    /// The built octree
    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }

    /// Root bounds, if loaded
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.octree.as_ref().map(Octree::bounds)
    }

    /// Triangles whose boxes overlap `region`
    pub fn triangles_near(&self, region: &Aabb) -> Vec<CollisionTriangle> {
        self.octree
            .as_ref()
            .map(|octree| octree.triangles_near(region))
            .unwrap_or_default()
    }

    /// Triangles under the node containing `point` at `depth`
    pub fn triangles_at(&self, point: Vec3, depth: u32) -> Option<Vec<CollisionTriangle>> {
        self.octree.as_ref()?.triangles_at(point, depth)
    }

    /// Triangles the ray passes through, unsorted
    pub fn triangles_hit(&self, ray: &Ray, filter: Option<&TrianglePredicate>) -> Vec<(Vec3, CollisionTriangle)> {
        self.octree
            .as_ref()
            .map(|octree| octree.triangles_hit(ray, filter))
            .unwrap_or_default()
    }
}
