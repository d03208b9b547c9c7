//! Axis-aligned bounding boxes.

use crate::{gamma, Point3, Ray, Vec3};

/// Axis-aligned bounding box in 3D.
///
/// The default value is the empty box, with `min` at +∞ and `max` at −∞, so
/// that merging anything into it yields that thing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// A degenerate box containing exactly one point.
    pub fn from_point(p: Point3) -> Self {
        Self { min: p, max: p }
    }

    /// True if nothing has been merged into this box yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain `p`.
    pub fn include_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Expand this AABB to enclose `other`.
    ///
    /// Merging an empty box leaves `self` unchanged.
    pub fn merge(&mut self, other: &Aabb) -> &mut Self {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
        self
    }

    /// The smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut merged = *self;
        merged.merge(other);
        merged
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Total area of the six faces. Zero for an empty box.
    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.extent();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Center of the box.
    pub fn centroid(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Index (0 = x, 1 = y, 2 = z) of the axis along which the box is longest.
    pub fn max_extent_axis(&self) -> usize {
        let d = self.extent();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// True if the box has no extent along `axis`.
    pub fn is_planar(&self, axis: usize) -> bool {
        self.min[axis] == self.max[axis]
    }

    /// True if the boxes share at least one point; touching faces count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    /// True if `other` lies entirely inside this box (boundaries included).
    pub fn contains(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.min[axis] && other.max[axis] <= self.max[axis])
    }

    /// Slab test used while walking acceleration structures.
    ///
    /// `inv_direction` must be the component-wise reciprocal of the ray
    /// direction and `t_max` the farthest distance still of interest (the
    /// current closest hit, or +∞). The far bound of every slab is inflated by
    /// `1 + 2γ(3)` so rounding error at box boundaries never produces a false
    /// miss. NaNs from `0 · ∞` (a ray lying in a slab plane) leave the interval
    /// untouched.
    #[inline]
    pub fn hit_by(&self, ray: &Ray, inv_direction: &Vec3, t_max: f64) -> bool {
        let mut t0 = 0.0;
        let mut t1 = t_max;

        for axis in 0..3 {
            let mut t_near = (self.min[axis] - ray.origin[axis]) * inv_direction[axis];
            let mut t_far = (self.max[axis] - ray.origin[axis]) * inv_direction[axis];

            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }

            t_far *= 1.0 + 2.0 * gamma(3);

            if t_near > t0 {
                t0 = t_near;
            }
            if t_far < t1 {
                t1 = t_far;
            }
            if t0 > t1 {
                return false;
            }
        }

        true
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
