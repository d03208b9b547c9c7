#![warn(missing_docs)]

//! Math types for the lumen renderer.
//!
//! Thin wrappers around nalgebra providing the geometric vocabulary shared by
//! shapes and acceleration structures: points, vectors, rays and axis-aligned
//! bounding boxes.

mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::Ray;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = nalgebra::Vector3<f64>;

/// A point in 2D parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// Half the distance between 1.0 and the next representable `f64`.
///
/// This is the bound on relative error of a single correctly rounded
/// floating-point operation.
pub const MACHINE_EPSILON: f64 = f64::EPSILON * 0.5;

/// Conservative bound on the relative error accumulated by `n` successive
/// floating-point operations: `n·ε / (1 − n·ε)`.
#[inline]
pub fn gamma(n: u32) -> f64 {
    let n_eps = f64::from(n) * MACHINE_EPSILON;
    n_eps / (1.0 - n_eps)
}
