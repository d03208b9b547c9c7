#![warn(missing_docs)]

//! Ray/primitive intersection and parallel acceleration structures for the
//! lumen renderer.
//!
//! Everything a ray can hit implements [`Primitive`]: the concrete
//! [`shapes`], and acceleration structures built over other primitives, so
//! structures nest freely.
//!
//! # Architecture
//!
//! - [`Primitive`] / [`Hit`] - the intersection capability and its result
//! - [`shapes`] - spheres, triangles and boxes
//! - [`bvh`] - SAH bounding volume hierarchy, built in parallel
//! - [`WorkerPool`] - the threads builds run on
//! - [`Cancellation`] - cooperative early exit for long builds
//! - [`build_structure`] - pick a structure by [`StructureKind`]
//!
//! # Example
//!
//! ```
//! use lumen_math::{Point3, Ray, Vec3};
//! use lumen_raytrace::shapes::Sphere;
//! use lumen_raytrace::{BuildSettings, Bvh, Cancellation, Hit, Primitive, WorkerPool};
//!
//! let spheres: Vec<Sphere> = (0..100)
//!     .map(|i| Sphere::new(Point3::new(3.0 * f64::from(i), 0.0, 0.0), 1.0))
//!     .collect();
//! let primitives: Vec<&dyn Primitive> = spheres.iter().map(|s| s as &dyn Primitive).collect();
//!
//! let pool = WorkerPool::new(4)?;
//! let bvh = Bvh::build(primitives, &Cancellation::new(), &pool, &BuildSettings::default());
//!
//! let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
//! let mut hit = Hit::new();
//! assert!(bvh.closest_hit(&ray, &mut hit));
//! assert!((hit.t - 4.0).abs() < 1e-9);
//! # Ok::<(), lumen_raytrace::TraceError>(())
//! ```

pub mod bvh;
mod cancel;
mod error;
mod pool;
mod primitive;
mod settings;
pub mod shapes;
mod structure;

pub use bvh::{Bvh, BvhStats};
pub use cancel::Cancellation;
pub use error::{Result, TraceError};
pub use pool::WorkerPool;
pub use primitive::{Hit, Primitive};
pub use settings::{BuildSettings, StructureKind};
pub use structure::build_structure;
