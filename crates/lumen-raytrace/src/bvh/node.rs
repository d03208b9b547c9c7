//! Compact, depth-first node layout used for traversal.

use std::ops::Range;

use lumen_math::Aabb;

use super::arena::{BuildNode, BuildNodes, NodeRef};
use super::info::PrimitiveInfo;
use crate::Primitive;

/// One node of a flattened BVH.
///
/// Nodes are stored in depth-first order with the left child directly after
/// its parent, so only the right child needs an explicit index. A leaf lists
/// a contiguous run of the reordered primitive list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    aabb: Aabb,
    /// First primitive of a leaf, or index of an interior node's right child.
    offset: u32,
    /// Number of primitives; zero for interior nodes.
    count: u32,
    axis: u8,
}

impl Node {
    /// Bounds of everything below this node.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// True for leaves.
    pub fn is_leaf(&self) -> bool {
        self.count > 0
    }

    /// Indices into the primitive list covered by a leaf. Empty for interior
    /// nodes.
    pub fn primitive_range(&self) -> Range<usize> {
        if self.is_leaf() {
            self.offset as usize..(self.offset + self.count) as usize
        } else {
            0..0
        }
    }

    /// Index of an interior node's right child.
    pub fn right_child(&self) -> usize {
        self.offset as usize
    }

    /// Axis (0 = x, 1 = y, 2 = z) an interior node was split along.
    pub fn axis(&self) -> usize {
        usize::from(self.axis)
    }
}

/// Lay out the build tree rooted at `root` depth-first and reorder the
/// primitives to match the leaves.
pub(crate) fn flatten<'p>(
    root: NodeRef,
    nodes: &BuildNodes,
    infos: &[PrimitiveInfo],
    primitives: &[&'p dyn Primitive],
) -> (Vec<&'p dyn Primitive>, Vec<Node>) {
    let mut flat = Flattener {
        nodes,
        infos,
        primitives,
        ordered: Vec::with_capacity(primitives.len()),
        flat: Vec::with_capacity(nodes.len()),
    };
    flat.visit(root);
    (flat.ordered, flat.flat)
}

struct Flattener<'a, 'p> {
    nodes: &'a BuildNodes,
    infos: &'a [PrimitiveInfo],
    primitives: &'a [&'p dyn Primitive],
    ordered: Vec<&'p dyn Primitive>,
    flat: Vec<Node>,
}

impl Flattener<'_, '_> {
    fn visit(&mut self, node: NodeRef) {
        let (nodes, infos, primitives) = (self.nodes, self.infos, self.primitives);
        match *nodes.get(node) {
            BuildNode::Leaf { aabb, start, end } => {
                let offset = self.ordered.len() as u32;
                self.ordered.extend(
                    infos[start as usize..end as usize]
                        .iter()
                        .map(|info| primitives[info.index as usize]),
                );
                self.flat.push(Node {
                    aabb,
                    offset,
                    count: end - start,
                    axis: 0,
                });
            }
            BuildNode::Interior {
                aabb,
                axis,
                left,
                right,
            } => {
                let index = self.flat.len();
                self.flat.push(Node {
                    aabb,
                    offset: 0,
                    count: 0,
                    axis,
                });
                self.visit(left);
                self.flat[index].offset = self.flat.len() as u32;
                self.visit(right);
            }
        }
    }
}
