//! Shape and size summary of a built BVH.

use std::fmt;
use std::time::Duration;

use lumen_math::Aabb;

use super::{Bvh, Node, MAX_DEPTH};
use crate::Primitive;

/// Summary of a BVH, as logged after every completed build.
#[derive(Debug, Clone, PartialEq)]
pub struct BvhStats {
    /// Wall time the build took.
    pub build_time: Duration,
    /// Number of primitives indexed.
    pub primitives: usize,
    /// Number of nodes.
    pub nodes: usize,
    /// Bytes used by the node array and the reordered primitive list.
    pub memory_bytes: usize,
    /// Depth of the shallowest leaf; the root is at depth 0.
    pub min_depth: usize,
    /// Depth of the deepest leaf.
    pub max_depth: usize,
    /// Number of leaves.
    pub leaves: usize,
    /// Leaves holding 1, 2, 3, 4 and more than 4 primitives.
    pub leaf_sizes: [usize; 5],
    /// Bounds of the whole structure.
    pub bounds: Aabb,
}

impl BvhStats {
    pub(crate) fn collect(bvh: &Bvh<'_>) -> Self {
        let mut stats = Self {
            build_time: bvh.build_time,
            primitives: bvh.primitives.len(),
            nodes: bvh.nodes.len(),
            memory_bytes: std::mem::size_of_val(bvh.primitives.as_slice())
                + std::mem::size_of_val(bvh.nodes.as_slice()),
            min_depth: 0,
            max_depth: 0,
            leaves: 0,
            leaf_sizes: [0; 5],
            bounds: bvh.bounding_box(),
        };
        if bvh.nodes.is_empty() {
            return stats;
        }

        stats.min_depth = usize::MAX;
        let mut stack: Vec<(usize, usize)> = Vec::with_capacity(MAX_DEPTH);
        stack.push((0, 0));
        while let Some((index, depth)) = stack.pop() {
            let node: &Node = &bvh.nodes[index];
            if node.is_leaf() {
                stats.min_depth = stats.min_depth.min(depth);
                stats.max_depth = stats.max_depth.max(depth);
                stats.leaves += 1;
                stats.leaf_sizes[node.primitive_range().len().min(5) - 1] += 1;
            } else {
                stack.push((node.right_child(), depth + 1));
                stack.push((index + 1, depth + 1));
            }
        }

        stats
    }
}

impl fmt::Display for BvhStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MB: f64 = 1024.0 * 1024.0;
        let leaf_depth = (self.leaves.max(1) as f64).log2().ceil();

        writeln!(f, "  Time to build          : {:?}", self.build_time)?;
        writeln!(f, "  Primitives             : {}", self.primitives)?;
        writeln!(f, "  Nodes                  : {}", self.nodes)?;
        writeln!(f, "  Memory usage           : {:.2}Mb", self.memory_bytes as f64 / MB)?;
        writeln!(f, "  Min depth              : {}", self.min_depth)?;
        writeln!(f, "  Max depth              : {}", self.max_depth)?;
        writeln!(f, "  Leaves (ceil log2)     : {} ({leaf_depth})", self.leaves)?;
        for (size, count) in self.leaf_sizes[..4].iter().enumerate() {
            writeln!(f, "  Leaves with  {} prims   : {count}", size + 1)?;
        }
        writeln!(f, "  Leaves with >4 prims   : {}", self.leaf_sizes[4])?;
        let (min, max) = (self.bounds.min, self.bounds.max);
        writeln!(f, "  AABB minimum           : ({}, {}, {})", min.x, min.y, min.z)?;
        write!(f, "  AABB maximum           : ({}, {}, {})", max.x, max.y, max.z)
    }
}
