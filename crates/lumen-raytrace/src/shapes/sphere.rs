//! Ray-sphere intersection (quadratic equation).

use lumen_math::{Aabb, Point2, Point3, Ray, Vec3};
use std::f64::consts::PI;

use crate::{Hit, Primitive};

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Point3,
    /// Radius of the sphere.
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Ray parameters of the entry and exit points, sorted, or `None` if the
    /// ray's line misses the sphere.
    fn roots(&self, ray: &Ray) -> Option<(f64, f64)> {
        let oc = ray.origin - self.center;
        let d = &ray.direction;

        // Quadratic: |oc + t*d|^2 = r^2
        let a = d.dot(d);
        let b = 2.0 * oc.dot(d);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        Some(((-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)))
    }

    /// Nearest root in `[0, t_max)`.
    fn nearest(&self, ray: &Ray, t_max: f64) -> Option<f64> {
        let (t1, t2) = self.roots(ray)?;
        [t1, t2].into_iter().find(|&t| t >= 0.0 && t < t_max)
    }
}

impl Primitive for Sphere {
    fn bounding_box(&self) -> Aabb {
        let r = Vec3::repeat(self.radius);
        Aabb::new(self.center - r, self.center + r)
    }

    fn occludes(&self, ray: &Ray) -> bool {
        self.nearest(ray, f64::INFINITY).is_some()
    }

    fn closest_hit<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>) -> bool {
        let Some(t) = self.nearest(ray, hit.t) else {
            return false;
        };

        let point = ray.at(t);
        let normal = (point - self.center) / self.radius;
        *hit = Hit {
            t,
            point,
            normal,
            uv: sphere_uv(&normal),
            primitive: Some(self),
        };
        true
    }
}

/// Surface parameters for a unit normal: u = longitude in [0, 1),
/// v = latitude in [0, 1] from south to north pole.
fn sphere_uv(normal: &Vec3) -> Point2 {
    let phi = normal.y.atan2(normal.x);
    let phi = if phi < 0.0 { phi + 2.0 * PI } else { phi };
    let theta = normal.z.clamp(-1.0, 1.0).asin();
    Point2::new(phi / (2.0 * PI), theta / PI + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ray_sphere_through_center() {
        let sphere = Sphere::new(Point3::origin(), 5.0);
        let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));

        let mut hit = Hit::new();
        assert!(sphere.closest_hit(&ray, &mut hit));
        assert_abs_diff_eq!(hit.t, 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(hit.normal.x, -1.0, epsilon = 1e-10);
        assert!(hit.is_primitive(&sphere));
    }

    #[test]
    fn test_ray_sphere_miss() {
        let sphere = Sphere::new(Point3::origin(), 5.0);
        let ray = Ray::new(Point3::new(-10.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!sphere.occludes(&ray));

        let mut hit = Hit::new();
        assert!(!sphere.closest_hit(&ray, &mut hit));
        assert!(!hit.is_hit());
    }

    #[test]
    fn test_ray_sphere_from_inside() {
        let sphere = Sphere::new(Point3::origin(), 5.0);
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.0, 0.0));

        let mut hit = Hit::new();
        assert!(sphere.closest_hit(&ray, &mut hit));
        // Entry is behind the origin, so the exit point is reported.
        assert_abs_diff_eq!(hit.t, 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_ray_sphere_behind() {
        let sphere = Sphere::new(Point3::origin(), 1.0);
        let ray = Ray::new(Point3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!sphere.occludes(&ray));
    }

    #[test]
    fn test_closer_hit_is_kept() {
        let sphere = Sphere::new(Point3::new(10.0, 0.0, 0.0), 1.0);
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.0, 0.0));

        let mut hit = Hit::within(4.0);
        assert!(!sphere.closest_hit(&ray, &mut hit));
        assert_eq!(hit.t, 4.0);
    }

    #[test]
    fn test_unnormalized_direction_scales_t() {
        let sphere = Sphere::new(Point3::origin(), 1.0);
        let ray = Ray::new(Point3::new(-3.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));

        let mut hit = Hit::new();
        assert!(sphere.closest_hit(&ray, &mut hit));
        assert_abs_diff_eq!(hit.t, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(hit.point.x, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_sphere_uv() {
        let uv = sphere_uv(&Vec3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(uv.x, 0.0);
        assert_abs_diff_eq!(uv.y, 0.5);

        let north = sphere_uv(&Vec3::new(0.0, 0.0, 1.0));
        assert_abs_diff_eq!(north.y, 1.0);

        let quarter = sphere_uv(&Vec3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(quarter.x, 0.25);
    }

    #[test]
    fn test_bounding_box() {
        let sphere = Sphere::new(Point3::new(1.0, 2.0, 3.0), 0.5);
        let aabb = sphere.bounding_box();
        assert_eq!(aabb.min, Point3::new(0.5, 1.5, 2.5));
        assert_eq!(aabb.max, Point3::new(1.5, 2.5, 3.5));
    }
}
