//! Ray-triangle intersection (Möller–Trumbore).

use lumen_math::{Aabb, Point2, Point3, Ray, Vec3};

use crate::{Hit, Primitive};

/// A triangle given by its three corners, wound counter-clockwise when seen
/// from the side its normal points to.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// Corner vertices.
    pub vertices: [Point3; 3],
}

/// Below this determinant the ray is treated as parallel to the triangle.
const PARALLEL_EPSILON: f64 = 1e-12;

impl Triangle {
    /// Create a triangle from three corners.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Unit geometric normal.
    pub fn normal(&self) -> Vec3 {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a)).normalize()
    }

    /// Ray parameter and barycentric (u, v) of the hit, if `t` is in `[0, t_max)`.
    fn intersect(&self, ray: &Ray, t_max: f64) -> Option<(f64, f64, f64)> {
        let [a, b, c] = self.vertices;
        let edge1 = b - a;
        let edge2 = c - a;

        let p = ray.direction.cross(&edge2);
        let det = edge1.dot(&p);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = ray.origin - a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = ray.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&q) * inv_det;
        (t >= 0.0 && t < t_max).then_some((t, u, v))
    }
}

impl Primitive for Triangle {
    fn bounding_box(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for v in &self.vertices {
            aabb.include_point(v);
        }
        aabb
    }

    fn occludes(&self, ray: &Ray) -> bool {
        self.intersect(ray, f64::INFINITY).is_some()
    }

    fn closest_hit<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>) -> bool {
        let Some((t, u, v)) = self.intersect(ray, hit.t) else {
            return false;
        };

        *hit = Hit {
            t,
            point: ray.at(t),
            normal: self.normal(),
            uv: Point2::new(u, v),
            primitive: Some(self),
        };
        true
    }
}
