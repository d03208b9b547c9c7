//! Concrete shapes implementing [`Primitive`](crate::Primitive).
//!
//! Each shape solves its own ray equation and fills in the hit record with
//! distance, point, outward normal and surface parameters.

mod cuboid;
mod sphere;
mod triangle;

pub use cuboid::Cuboid;
pub use sphere::Sphere;
pub use triangle::Triangle;
