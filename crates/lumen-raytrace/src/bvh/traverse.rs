//! Ray queries against a built BVH.
//!
//! Both queries walk the tree iteratively with a fixed-size stack of nodes
//! still to visit. At each interior node the child on the near side of the
//! split plane is visited first and the other one is pushed.

use lumen_math::{Aabb, Ray, Vec3};

use super::{Bvh, MAX_DEPTH};
use crate::{Hit, Primitive};

/// Pending far children. Depth is capped at [`MAX_DEPTH`], so at most one
/// entry per level of the current path is ever pushed.
struct TraversalStack {
    entries: [u32; MAX_DEPTH],
    len: usize,
}

impl TraversalStack {
    fn new() -> Self {
        Self {
            entries: [0; MAX_DEPTH],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, node: usize) {
        self.entries[self.len] = node as u32;
        self.len += 1;
    }

    #[inline]
    fn pop(&mut self) -> Option<usize> {
        self.len = self.len.checked_sub(1)?;
        Some(self.entries[self.len] as usize)
    }
}

impl Bvh<'_> {
    /// Children of interior node `index`, nearest to the ray origin first.
    #[inline]
    fn children_in_order(&self, index: usize, inv_direction: &Vec3) -> (usize, usize) {
        let node = &self.nodes[index];
        let (left, right) = (index + 1, node.right_child());
        if inv_direction[node.axis()] < 0.0 {
            (right, left)
        } else {
            (left, right)
        }
    }
}

impl Primitive for Bvh<'_> {
    fn bounding_box(&self) -> Aabb {
        self.nodes.first().map_or_else(Aabb::empty, |root| *root.aabb())
    }

    fn occludes(&self, ray: &Ray) -> bool {
        if self.nodes.is_empty() {
            return false;
        }

        let inv_direction = ray.inv_direction();
        let mut stack = TraversalStack::new();
        let mut current = 0;

        loop {
            let node = &self.nodes[current];
            if node.aabb().hit_by(ray, inv_direction, f64::INFINITY) {
                if !node.is_leaf() {
                    let (near, far) = self.children_in_order(current, inv_direction);
                    stack.push(far);
                    current = near;
                    continue;
                }
                if self.primitives[node.primitive_range()]
                    .iter()
                    .any(|primitive| primitive.occludes(ray))
                {
                    return true;
                }
            }

            match stack.pop() {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    fn closest_hit<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>) -> bool {
        if self.nodes.is_empty() {
            return false;
        }

        let inv_direction = ray.inv_direction();
        let mut stack = TraversalStack::new();
        let mut current = 0;
        let mut found = false;

        loop {
            let node = &self.nodes[current];
            if node.aabb().hit_by(ray, inv_direction, hit.t) {
                if !node.is_leaf() {
                    let (near, far) = self.children_in_order(current, inv_direction);
                    stack.push(far);
                    current = near;
                    continue;
                }
                for &primitive in &self.primitives[node.primitive_range()] {
                    if primitive.closest_hit(ray, hit) {
                        found = true;
                    }
                }
            }

            match stack.pop() {
                Some(next) => current = next,
                None => return found,
            }
        }
    }
}
