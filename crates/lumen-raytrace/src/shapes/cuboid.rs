//! Solid axis-aligned boxes.

use lumen_math::{Aabb, Point2, Ray, Vec3};

use crate::{Hit, Primitive};

/// A solid box aligned with the coordinate axes.
#[derive(Debug, Clone, Copy)]
pub struct Cuboid {
    /// Extent of the box.
    pub bounds: Aabb,
}

impl Cuboid {
    /// Create a box from its bounds.
    pub fn new(bounds: Aabb) -> Self {
        Self { bounds }
    }

    /// Axis-aligned cube of edge length `size` centered at `center`.
    pub fn cube(center: lumen_math::Point3, size: f64) -> Self {
        let half = Vec3::repeat(size * 0.5);
        Self::new(Aabb::new(center - half, center + half))
    }

    /// Distance to the surface along the ray: the entry point, or the exit
    /// point when the ray starts inside.
    fn surface_t(&self, ray: &Ray) -> Option<f64> {
        let (t_min, t_max) = ray.intersect_aabb(&self.bounds)?;
        Some(if t_min > 0.0 { t_min } else { t_max })
    }

    /// Outward normal of the face `point` lies on.
    fn face_normal(&self, point: &lumen_math::Point3) -> (Vec3, usize) {
        let center = self.bounds.centroid();
        let half = self.bounds.extent() * 0.5;

        let mut axis = 0;
        let mut best = f64::NEG_INFINITY;
        for i in 0..3 {
            let d = if half[i] > 0.0 {
                (point[i] - center[i]).abs() / half[i]
            } else {
                f64::INFINITY
            };
            if d > best {
                best = d;
                axis = i;
            }
        }

        let mut normal = Vec3::zeros();
        normal[axis] = (point[axis] - center[axis]).signum();
        (normal, axis)
    }
}

impl Primitive for Cuboid {
    fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    fn occludes(&self, ray: &Ray) -> bool {
        self.surface_t(ray).is_some()
    }

    fn closest_hit<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>) -> bool {
        let Some(t) = self.surface_t(ray).filter(|&t| t < hit.t) else {
            return false;
        };

        let point = ray.at(t);
        let (normal, axis) = self.face_normal(&point);
        let extent = self.bounds.extent();
        let (u_axis, v_axis) = ((axis + 1) % 3, (axis + 2) % 3);
        let uv = Point2::new(
            (point[u_axis] - self.bounds.min[u_axis]) / extent[u_axis],
            (point[v_axis] - self.bounds.min[v_axis]) / extent[v_axis],
        );

        *hit = Hit {
            t,
            point,
            normal,
            uv,
            primitive: Some(self),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lumen_math::Point3;

    #[test]
    fn test_ray_cube_entry() {
        let cube = Cuboid::cube(Point3::new(10.0, 0.0, 0.0), 1.0);
        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));

        let mut hit = Hit::new();
        assert!(cube.closest_hit(&ray, &mut hit));
        assert_abs_diff_eq!(hit.t, 14.5, epsilon = 1e-10);
        assert_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));
        assert_abs_diff_eq!(hit.uv.x, 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(hit.uv.y, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_ray_cube_from_inside() {
        let cube = Cuboid::cube(Point3::origin(), 2.0);
        let ray = Ray::new(Point3::origin(), Vec3::new(0.0, 0.0, -1.0));

        let mut hit = Hit::new();
        assert!(cube.closest_hit(&ray, &mut hit));
        assert_abs_diff_eq!(hit.t, 1.0, epsilon = 1e-10);
        assert_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_ray_cube_miss_and_bound() {
        let cube = Cuboid::cube(Point3::origin(), 1.0);
        let beside = Ray::new(Point3::new(-5.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!cube.occludes(&beside));

        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let mut hit = Hit::within(2.0);
        assert!(!cube.closest_hit(&ray, &mut hit));
    }
}
