//! The intersection capability shared by shapes and acceleration structures.

use lumen_math::{Aabb, Point2, Point3, Ray, Vec3};

/// Anything a ray can be tested against.
///
/// Shapes implement this directly; acceleration structures implement it on
/// top of the primitives they index, so structures can be nested.
pub trait Primitive: Send + Sync {
    /// Bounds of everything this primitive can report a hit on.
    fn bounding_box(&self) -> Aabb;

    /// Whether the ray hits anything at all at `t >= 0`.
    ///
    /// Used for shadow rays: any hit will do, not necessarily the nearest.
    fn occludes(&self, ray: &Ray) -> bool;

    /// Look for a hit nearer than `hit.t`.
    ///
    /// On success `hit` is overwritten with the new, closer hit and `true` is
    /// returned. Hits at or beyond `hit.t` are ignored, so calling this for
    /// several primitives with the same record keeps the closest.
    fn closest_hit<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>) -> bool;
}

/// The closest intersection found so far along a ray.
#[derive(Clone, Copy)]
pub struct Hit<'a> {
    /// Parameter along the ray where intersection occurs.
    pub t: f64,
    /// 3D intersection point.
    pub point: Point3,
    /// Surface normal at the intersection (pointing outward).
    pub normal: Vec3,
    /// Surface parameter coordinates (u, v) at intersection.
    pub uv: Point2,
    /// The primitive that was hit.
    pub primitive: Option<&'a dyn Primitive>,
}

impl<'a> Hit<'a> {
    /// A record that has not seen a hit yet.
    pub fn new() -> Self {
        Self::within(f64::INFINITY)
    }

    /// A record that only accepts hits closer than `t_max`.
    pub fn within(t_max: f64) -> Self {
        Self {
            t: t_max,
            point: Point3::origin(),
            normal: Vec3::zeros(),
            uv: Point2::origin(),
            primitive: None,
        }
    }

    /// Whether any primitive has been recorded.
    pub fn is_hit(&self) -> bool {
        self.primitive.is_some()
    }

    /// True if the recorded primitive is `other` (compared by address).
    pub fn is_primitive(&self, other: &dyn Primitive) -> bool {
        self.primitive.is_some_and(|p| std::ptr::addr_eq(p, other))
    }
}

impl Default for Hit<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Hit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hit")
            .field("t", &self.t)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("uv", &self.uv)
            .field("primitive", &self.primitive.map(|p| std::ptr::from_ref(p).cast::<()>()))
            .finish()
    }
}
