//! Ray representation and the ray/box slab test.

use crate::{Aabb, Point3, Vec3};

/// A ray in 3D space defined by origin, direction and time.
///
/// The direction is not normalized; hit distances are expressed in units of
/// its length. `time` is carried through for motion-blurred geometry.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Direction of the ray.
    pub direction: Vec3,
    /// Time at which the ray is cast.
    pub time: f64,
    /// `1 / direction`, component-wise.
    inv_direction: Vec3,
    /// Per axis, 1 if the direction is negative and 0 otherwise.
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray cast at time zero.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self::with_time(origin, direction, 0.0)
    }

    /// Create a new ray cast at `time`.
    pub fn with_time(origin: Point3, direction: Vec3, time: f64) -> Self {
        let inv = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let sign = [
            usize::from(inv.x < 0.0),
            usize::from(inv.y < 0.0),
            usize::from(inv.z < 0.0),
        ];
        Self {
            origin,
            direction,
            time,
            inv_direction: inv,
            sign,
        }
    }

    /// Component-wise reciprocal of the direction.
    #[inline]
    pub fn inv_direction(&self) -> &Vec3 {
        &self.inv_direction
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }

    /// Entry and exit parameters of the ray through `aabb`, or `None` if it
    /// misses or the box lies entirely behind the origin.
    ///
    /// The entry is clamped to zero when the origin is inside the box.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(f64, f64)> {
        let corners = [aabb.min, aabb.max];
        let mut entry = f64::NEG_INFINITY;
        let mut exit = f64::INFINITY;

        for axis in 0..3 {
            let near = corners[self.sign[axis]][axis];
            let far = corners[1 - self.sign[axis]][axis];
            entry = entry.max((near - self.origin[axis]) * self.inv_direction[axis]);
            exit = exit.min((far - self.origin[axis]) * self.inv_direction[axis]);
        }

        (exit >= entry && exit >= 0.0).then(|| (entry.max(0.0), exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let p = ray.at(2.5);
        assert_abs_diff_eq!(p.x, 5.0);
        assert_abs_diff_eq!(p.y, 0.0);
        assert_abs_diff_eq!(p.z, 0.0);
    }

    #[test]
    fn test_ray_keeps_time() {
        let ray = Ray::with_time(Point3::origin(), Vec3::new(0.0, 1.0, 0.0), 0.25);
        assert_eq!(ray.time, 0.25);
        assert_eq!(Ray::new(Point3::origin(), Vec3::y()).time, 0.0);
    }

    #[test]
    fn test_inverse_direction() {
        let ray = Ray::new(Point3::origin(), Vec3::new(2.0, -4.0, 0.0));
        let inv = ray.inv_direction();
        assert_abs_diff_eq!(inv.x, 0.5);
        assert_abs_diff_eq!(inv.y, -0.25);
        assert!(inv.z.is_infinite());
    }

    #[test]
    fn test_ray_aabb_hit() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert_abs_diff_eq!(t_min, 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(t_max, 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_ray_aabb_miss() {
        let ray = Ray::new(Point3::new(-5.0, 5.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn test_origin_inside_box_clamps_entry() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(t_min, 0.0);
        assert_abs_diff_eq!(t_max, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_box_behind_origin() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }
}
