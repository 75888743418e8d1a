//! Spatial partitioning data structures
//!
//! Static level geometry is indexed by an octree so collision and ray
//! queries only visit nearby triangles.

mod octree;

pub use octree::{Octree, OctreeConfig, OctreeNode};
