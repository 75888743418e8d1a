//! Octree of static level triangles
//!
//! The tree is built once per level load. Nodes live in a flat arena with the
//! root at index 0; every node is either a leaf holding triangle indices or an
//! interior node holding child indices. Triangles are inserted into every leaf
//! whose box overlaps the triangle's box, so a triangle may appear in several
//! leaves and queries deduplicate by index.
//!
//! "Real-Time Collision Detection" 7.3: subdivide to a fixed depth derived
//! from the world extent, then drop empty branches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::foundation::logging::{debug, info};
use crate::foundation::math::{max_component, Vec3};
use crate::physics::collision::{Aabb, CollisionTriangle, Ray, TrianglePredicate};

/// Configuration for octree construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// World extent covered by one level of subdivision
    pub leaf_extent: f32,

    /// Lower bound for the subdivision depth
    pub min_depth: u32,

    /// Upper bound for the subdivision depth
    pub max_depth: u32,

    /// Extra size added to the enclosing box of all triangles
    pub padding: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            leaf_extent: 150.0,
            min_depth: 1,
            max_depth: 4,
            padding: 0.1,
        }
    }
}

impl OctreeConfig {
    /// Subdivision depth for a world whose largest side is `extent`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn depth_for_extent(&self, extent: f32) -> u32 {
        let upper = self.max_depth.max(self.min_depth);
        let levels = if self.leaf_extent > 0.0 && extent.is_finite() {
            (extent / self.leaf_extent).floor().max(0.0) as u32
        } else {
            upper
        };
        levels.clamp(self.min_depth, upper)
    }
}

/// A node in the octree arena
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// Distance from the root
    pub depth: u32,

    /// Region covered by this node
    pub bounds: Aabb,

    children: Vec<usize>,
    triangles: Vec<u32>,
}

impl OctreeNode {
    fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            depth,
            bounds,
            children: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Arena indices of the child nodes
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Indices of the triangles stored in this leaf
    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangles
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.triangles.is_empty()
    }
}

/// Static triangle octree
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    triangles: Vec<CollisionTriangle>,
    max_depth: u32,
}

impl Octree {
    /// Arena index of the root node
    pub const ROOT: usize = 0;

    /// Build an octree over `triangles`, each translated by `center`.
    ///
    /// Triangles with identical vertices are stored once.
    pub fn build(center: Vec3, triangles: &[CollisionTriangle], config: &OctreeConfig) -> Self {
        let mut seen = HashSet::with_capacity(triangles.len());
        let mut unique = Vec::with_capacity(triangles.len());
        let mut enclosing: Option<Aabb> = None;

        for triangle in triangles {
            let moved = triangle.translated(center);
            if !seen.insert(vertex_key(&moved)) {
                continue;
            }
            enclosing = Some(match enclosing {
                Some(bounds) => bounds.expanded_to_enclose(moved.bounding_box()),
                None => *moved.bounding_box(),
            });
            unique.push(moved);
        }

        let enclosing = enclosing.unwrap_or_else(|| Aabb::from_center_radius(center, Vec3::zeros()));
        let size = enclosing.size() + Vec3::repeat(config.padding);
        let root_bounds = Aabb::from_center_radius(enclosing.position(), size * 0.5);
        let max_depth = config.depth_for_extent(max_component(&size));

        let mut octree = Self {
            nodes: vec![OctreeNode::new(root_bounds, 0)],
            triangles: Vec::new(),
            max_depth,
        };
        octree.subdivide(Self::ROOT);
        octree.insert_triangles(unique);
        let pruned = octree.prune();

        info!(
            "Octree built: {} triangles ({} duplicates dropped), depth {}, {} nodes, {} leaves",
            octree.triangles.len(),
            triangles.len() - octree.triangles.len(),
            max_depth,
            octree.nodes.len(),
            octree.leaf_count()
        );
        debug!("Octree pruned {pruned} empty nodes, root bounds {:?}", octree.bounds());

        octree
    }

    /// Add triangles after the build.
    ///
    /// Octants dropped by pruning are grown back down to the build depth
    /// where a new triangle needs them. Triangles are not translated, and
    /// parts outside the root bounds are not indexed.
    pub fn insert_triangles(&mut self, triangles: impl IntoIterator<Item = CollisionTriangle>) {
        for triangle in triangles {
            let Ok(index) = u32::try_from(self.triangles.len()) else {
                debug!("Octree triangle index space exhausted");
                return;
            };
            let bounds = *triangle.bounding_box();
            self.triangles.push(triangle);
            self.insert(Self::ROOT, index, &bounds);
        }
    }

    /// Region covered by the root node
    pub fn bounds(&self) -> Aabb {
        self.nodes[Self::ROOT].bounds
    }

    /// Subdivision depth chosen at build time
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// All nodes, root first
    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    /// Node count after pruning
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Leaf count after pruning
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Every stored triangle, deduplicated and translated
    pub fn triangles(&self) -> &[CollisionTriangle] {
        &self.triangles
    }

    /// Triangles whose boxes overlap `region`
    pub fn triangles_near(&self, region: &Aabb) -> Vec<CollisionTriangle> {
        let root = &self.nodes[Self::ROOT];
        if !root.bounds.is_colliding(region) {
            debug!("Query box {:?} lies outside the octree", region.position());
            return Vec::new();
        }

        let mut leaves = Vec::new();
        if root.is_leaf() {
            leaves.push(Self::ROOT);
        } else {
            self.leaves_near(Self::ROOT, region, &mut leaves);
        }

        let mut indices: Vec<u32> = leaves
            .iter()
            .flat_map(|leaf| self.nodes[*leaf].triangles.iter().copied())
            .collect();
        indices.sort_unstable();
        indices.dedup();

        indices
            .into_iter()
            .map(|index| self.triangles[index as usize])
            .filter(|triangle| triangle.bounding_box().is_colliding(region))
            .collect()
    }

    /// Triangles stored at or below the node that contains `point` at `depth`.
    ///
    /// `None` when no node at that depth contains the point, either because
    /// it lies outside the root or because that branch was pruned.
    pub fn triangles_at(&self, point: Vec3, depth: u32) -> Option<Vec<CollisionTriangle>> {
        let mut index = Self::ROOT;
        if !self.nodes[index].bounds.contains_point(point) {
            return None;
        }
        while self.nodes[index].depth < depth {
            index = self.nodes[index]
                .children
                .iter()
                .copied()
                .find(|child| self.nodes[*child].bounds.contains_point(point))?;
        }

        let mut indices = Vec::new();
        self.collect_indices(index, &mut indices);
        indices.sort_unstable();
        indices.dedup();
        Some(indices.into_iter().map(|index| self.triangles[index as usize]).collect())
    }

    /// Triangles the ray passes through, with the hit points
    pub fn triangles_hit(&self, ray: &Ray, filter: Option<&TrianglePredicate>) -> Vec<(Vec3, CollisionTriangle)> {
        let mut tested = HashSet::new();
        let mut hits = Vec::new();
        self.collect_hits(Self::ROOT, ray, filter, &mut tested, &mut hits);
        hits
    }

    fn subdivide(&mut self, index: usize) {
        let node = &self.nodes[index];
        if node.depth >= self.max_depth {
            return;
        }

        let depth = node.depth + 1;
        for octant in octants(node.bounds) {
            let child = self.nodes.len();
            self.nodes.push(OctreeNode::new(octant, depth));
            self.nodes[index].children.push(child);
            self.subdivide(child);
        }
    }

    /// Store `triangle` in every max-depth leaf it overlaps, regrowing
    /// octants that were pruned
    fn insert(&mut self, index: usize, triangle: u32, triangle_bounds: &Aabb) {
        let node = &self.nodes[index];
        if !node.bounds.is_colliding(triangle_bounds) {
            return;
        }

        if node.depth >= self.max_depth {
            let list = &mut self.nodes[index].triangles;
            if !list.contains(&triangle) {
                list.push(triangle);
            }
            return;
        }

        let depth = node.depth + 1;
        for octant in octants(node.bounds) {
            if !octant.is_colliding(triangle_bounds) {
                continue;
            }
            let existing = self.nodes[index]
                .children
                .iter()
                .copied()
                .find(|child| self.nodes[*child].bounds.position() == octant.position());
            let child = match existing {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(OctreeNode::new(octant, depth));
                    self.nodes[index].children.push(child);
                    child
                }
            };
            self.insert(child, triangle, triangle_bounds);
        }
    }

    /// Remove childless, triangle-less nodes until none remain
    fn prune(&mut self) -> usize {
        let mut removed = 0;
        loop {
            let mut removed_this_pass = 0;
            for index in 0..self.nodes.len() {
                let children = std::mem::take(&mut self.nodes[index].children);
                let before = children.len();
                let kept: Vec<usize> = children
                    .into_iter()
                    .filter(|child| !self.nodes[*child].is_empty())
                    .collect();
                removed_this_pass += before - kept.len();
                self.nodes[index].children = kept;
            }
            if removed_this_pass == 0 {
                break;
            }
            removed += removed_this_pass;
        }
        self.compact();
        removed
    }

    /// Drop unreachable nodes and renumber the arena breadth first
    fn compact(&mut self) {
        let mut order = vec![Self::ROOT];
        let mut cursor = 0;
        while cursor < order.len() {
            order.extend(self.nodes[order[cursor]].children.iter().copied());
            cursor += 1;
        }

        let mut remap = vec![usize::MAX; self.nodes.len()];
        for (new_index, old_index) in order.iter().enumerate() {
            remap[*old_index] = new_index;
        }

        self.nodes = order
            .iter()
            .map(|old_index| {
                let mut node = self.nodes[*old_index].clone();
                node.children = node.children.iter().map(|child| remap[*child]).collect();
                node
            })
            .collect();
    }

    fn collect_indices(&self, index: usize, indices: &mut Vec<u32>) {
        let node = &self.nodes[index];
        indices.extend_from_slice(&node.triangles);
        for child in &node.children {
            self.collect_indices(*child, indices);
        }
    }

    fn leaves_near(&self, index: usize, region: &Aabb, leaves: &mut Vec<usize>) {
        for child in &self.nodes[index].children {
            let node = &self.nodes[*child];
            if !node.bounds.is_colliding(region) {
                continue;
            }
            if node.is_leaf() {
                leaves.push(*child);
                // Every triangle touching the region also touches this leaf
                if node.bounds.contains_box(region) {
                    break;
                }
            } else {
                self.leaves_near(*child, region, leaves);
            }
        }
    }

    fn collect_hits(
        &self,
        index: usize,
        ray: &Ray,
        filter: Option<&TrianglePredicate>,
        tested: &mut HashSet<u32>,
        hits: &mut Vec<(Vec3, CollisionTriangle)>,
    ) {
        let node = &self.nodes[index];
        if !node.bounds.is_colliding_with_ray(ray) {
            return;
        }

        for triangle_index in &node.triangles {
            if !tested.insert(*triangle_index) {
                continue;
            }
            let triangle = &self.triangles[*triangle_index as usize];
            if filter.is_some_and(|accept| !accept(triangle)) {
                continue;
            }
            if let Some(point) = triangle.surface_point(ray) {
                hits.push((point, *triangle));
            }
        }

        for child in &node.children {
            self.collect_hits(*child, ray, filter, tested, hits);
        }
    }
}

/// The eight child boxes of `bounds`, one per corner
fn octants(bounds: Aabb) -> impl Iterator<Item = Aabb> {
    let center = bounds.position();
    let half = bounds.radius * 0.5;
    bounds
        .points()
        .into_iter()
        .map(move |corner| Aabb::from_center_radius((corner + center) * 0.5, half))
}

fn vertex_key(triangle: &CollisionTriangle) -> [u32; 9] {
    let mut key = [0; 9];
    for (slot, value) in key.iter_mut().zip(triangle.vertices().iter().flat_map(|v| v.iter().copied())) {
        *slot = value.to_bits();
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor_grid(cells: i32, cell: f32) -> Vec<CollisionTriangle> {
        let mut triangles = Vec::new();
        for i in 0..cells {
            for k in 0..cells {
                #[allow(clippy::cast_precision_loss)]
                let (x0, z0) = (i as f32 * cell, k as f32 * cell);
                let (x1, z1) = (x0 + cell, z0 + cell);
                let p0 = Vec3::new(x0, 0.0, z1);
                let p1 = Vec3::new(x1, 0.0, z1);
                let p2 = Vec3::new(x1, 0.0, z0);
                let p3 = Vec3::new(x0, 0.0, z0);
                triangles.push(CollisionTriangle::new(p0, p1, p2));
                triangles.push(CollisionTriangle::new(p0, p2, p3));
            }
        }
        triangles
    }

    fn same_set(a: &[CollisionTriangle], b: &[CollisionTriangle]) -> bool {
        a.len() == b.len() && a.iter().all(|t| b.contains(t))
    }

    #[test]
    fn test_root_query_returns_deduplicated_input() {
        let mut input = floor_grid(4, 10.0);
        let duplicate = input[3];
        input.push(duplicate);

        let octree = Octree::build(Vec3::zeros(), &input, &OctreeConfig::default());
        assert_eq!(octree.triangles().len(), 32);

        let everything = octree.triangles_near(&octree.bounds());
        assert!(same_set(&everything, &input[..32]));
    }

    #[test]
    fn test_build_translates_by_center() {
        let input = floor_grid(1, 2.0);
        let octree = Octree::build(Vec3::new(100.0, 5.0, 0.0), &input, &OctreeConfig::default());
        assert!(octree.triangles().iter().all(|t| t.p1.y == 5.0 && t.p1.x >= 100.0));
        assert_relative_eq!(octree.bounds().position(), Vec3::new(101.0, 5.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_small_region_query_is_complete() {
        let input = floor_grid(20, 25.0);
        let octree = Octree::build(Vec3::zeros(), &input, &OctreeConfig::default());
        assert!(octree.max_depth() > 1);

        for (x, z, r) in [(12.0, 12.0, 1.0), (250.0, 250.0, 30.0), (499.0, 3.0, 5.0), (100.0, 400.0, 80.0)] {
            let region = Aabb::from_center_radius(Vec3::new(x, 0.0, z), Vec3::repeat(r));
            let found = octree.triangles_near(&region);
            let expected: Vec<_> = input
                .iter()
                .filter(|t| t.bounding_box().is_colliding(&region))
                .copied()
                .collect();
            assert!(same_set(&found, &expected), "query at ({x}, {z}) radius {r}");
        }
    }

    #[test]
    fn test_empty_leaves_are_pruned() {
        let octree = Octree::build(Vec3::zeros(), &floor_grid(8, 40.0), &OctreeConfig::default());
        assert!(octree.nodes().iter().all(|node| !node.is_leaf() || !node.triangle_indices().is_empty()));
        for node in octree.nodes() {
            assert!(node.children().iter().all(|child| *child < octree.node_count()));
        }
    }

    #[test]
    fn test_depth_clamped_by_extent() {
        let config = OctreeConfig::default();
        assert_eq!(config.depth_for_extent(10.0), 1);
        assert_eq!(config.depth_for_extent(320.0), 2);
        assert_eq!(config.depth_for_extent(10_000.0), 4);

        let tiny = Octree::build(Vec3::zeros(), &floor_grid(1, 1.0), &config);
        assert_eq!(tiny.max_depth(), 1);
    }

    #[test]
    fn test_query_outside_returns_empty() {
        let octree = Octree::build(Vec3::zeros(), &floor_grid(2, 10.0), &OctreeConfig::default());
        let far = Aabb::from_center_radius(Vec3::new(1000.0, 0.0, 0.0), Vec3::repeat(1.0));
        assert!(octree.triangles_near(&far).is_empty());
    }

    #[test]
    fn test_ray_hits_are_unique_and_filtered() {
        let input = floor_grid(4, 10.0);
        let octree = Octree::build(Vec3::zeros(), &input, &OctreeConfig::default());

        // The hit cell straddles two leaves
        let ray = Ray::new(Vec3::new(21.0, 10.0, 15.0), Vec3::new(0.0, -1.0, 0.0));
        let hits = octree.triangles_hit(&ray, None);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].0, Vec3::new(21.0, 0.0, 15.0), epsilon = 1e-4);

        let reject_all: &TrianglePredicate = &|_| false;
        assert!(octree.triangles_hit(&ray, Some(reject_all)).is_empty());
    }

    #[test]
    fn test_insert_regrows_pruned_octants() {
        let lower = floor_grid(1, 400.0);
        let upper: Vec<_> = lower.iter().map(|t| t.translated(Vec3::new(0.0, 400.0, 0.0))).collect();
        let mut octree = Octree::build(Vec3::zeros(), &[lower, upper].concat(), &OctreeConfig::default());
        assert!(octree.max_depth() > 1);

        // Halfway between the floors every octant was pruned
        let region = Aabb::from_center_radius(Vec3::new(105.0, 150.0, 105.0), Vec3::repeat(2.0));
        assert!(octree.triangles_near(&region).is_empty());

        let ledge = CollisionTriangle::new(
            Vec3::new(100.0, 150.0, 110.0),
            Vec3::new(110.0, 150.0, 110.0),
            Vec3::new(110.0, 150.0, 100.0),
        );
        let nodes_before = octree.node_count();
        octree.insert_triangles([ledge]);

        assert!(octree.node_count() > nodes_before);
        assert_eq!(octree.triangles_near(&region), vec![ledge]);
        let ray = Ray::new(Vec3::new(108.0, 200.0, 108.0), Vec3::new(0.0, -1.0, 0.0));
        let hits = octree.triangles_hit(&ray, None);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|(point, _)| (point.y - 150.0).abs() < 1e-3));
    }

    #[test]
    fn test_triangles_at_depth() {
        let input = floor_grid(8, 40.0);
        let octree = Octree::build(Vec3::zeros(), &input, &OctreeConfig::default());
        let point = Vec3::new(10.0, 0.0, 10.0);

        let everything = octree.triangles_at(point, 0).expect("root contains the point");
        assert!(same_set(&everything, &input));

        let leaf = octree.triangles_at(point, octree.max_depth()).expect("leaf under the floor");
        assert!(!leaf.is_empty() && leaf.len() < input.len());
        assert!(leaf.iter().any(|t| t.bounding_box().contains_point(point)));

        assert!(octree.triangles_at(Vec3::new(10.0, 0.0, 1000.0), 0).is_none());
        assert!(octree.triangles_at(Vec3::new(10.0, 150.0, 10.0), octree.max_depth()).is_none());
    }

    #[test]
    fn test_empty_build() {
        let octree = Octree::build(Vec3::zeros(), &[], &OctreeConfig::default());
        assert_eq!(octree.node_count(), 1);
        assert!(octree.triangles_near(&octree.bounds()).is_empty());
    }
}
