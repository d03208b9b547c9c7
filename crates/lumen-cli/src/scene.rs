//! Procedural test scenes.

use clap::ValueEnum;
use lumen_math::{Point3, Ray, Vec3};
use lumen_raytrace::shapes::{Cuboid, Sphere, Triangle};
use lumen_raytrace::Primitive;

/// Kind of shape a generated scene is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShapeKind {
    /// Spheres of varying radius.
    Spheres,
    /// Small randomly oriented triangles.
    Triangles,
    /// Small cubes.
    Cubes,
}

/// Owns the shapes of a generated scene.
pub enum Scene {
    Spheres(Vec<Sphere>),
    Triangles(Vec<Triangle>),
    Cubes(Vec<Cuboid>),
}

/// Edge length of the cube the scene fills.
pub const SCENE_SIZE: f64 = 100.0;

/// Low-discrepancy coordinate in `[0, 1)`.
fn weyl(i: usize, alpha: f64) -> f64 {
    (i as f64 * alpha).fract()
}

fn scatter(i: usize) -> Point3 {
    Point3::new(
        SCENE_SIZE * weyl(i, 0.618_033_988_749_895),
        SCENE_SIZE * weyl(i, 0.754_877_666_246_693),
        SCENE_SIZE * weyl(i, 0.569_840_290_998_053),
    )
}

impl Scene {
    /// Scatter `count` shapes of `kind` through the scene cube, sized so the
    /// density stays roughly constant as `count` grows.
    pub fn generate(kind: ShapeKind, count: usize) -> Self {
        let scale = SCENE_SIZE / (count.max(1) as f64).cbrt();
        match kind {
            ShapeKind::Spheres => Self::Spheres(
                (0..count)
                    .map(|i| {
                        let radius = scale * (0.1 + 0.3 * weyl(i, 0.414_213_562_373_095));
                        Sphere::new(scatter(i), radius)
                    })
                    .collect(),
            ),
            ShapeKind::Triangles => Self::Triangles(
                (0..count)
                    .map(|i| {
                        let a = scatter(i);
                        let spin = 6.283_185_307_179_586 * weyl(i, 0.302_775_637_731_995);
                        let u = Vec3::new(spin.cos(), spin.sin(), 0.3) * scale * 0.5;
                        let v = Vec3::new(-spin.sin(), 0.2, spin.cos()) * scale * 0.5;
                        Triangle::new(a, a + u, a + v)
                    })
                    .collect(),
            ),
            ShapeKind::Cubes => Self::Cubes(
                (0..count)
                    .map(|i| Cuboid::cube(scatter(i), scale * 0.4))
                    .collect(),
            ),
        }
    }

    /// Borrow every shape as a primitive.
    pub fn primitives(&self) -> Vec<&dyn Primitive> {
        match self {
            Self::Spheres(s) => s.iter().map(|p| p as &dyn Primitive).collect(),
            Self::Triangles(t) => t.iter().map(|p| p as &dyn Primitive).collect(),
            Self::Cubes(c) => c.iter().map(|p| p as &dyn Primitive).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Spheres(s) => s.len(),
            Self::Triangles(t) => t.len(),
            Self::Cubes(c) => c.len(),
        }
    }
}

/// A pinhole camera looking at the scene cube from its -z side.
pub fn camera_rays(width: usize, height: usize) -> Vec<Ray> {
    let eye = Point3::new(SCENE_SIZE * 0.5, SCENE_SIZE * 0.5, -SCENE_SIZE);
    let mut rays = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let u = (x as f64 + 0.5) / width as f64 - 0.5;
            let v = 0.5 - (y as f64 + 0.5) / height as f64;
            rays.push(Ray::new(eye, Vec3::new(u, v, 1.0)));
        }
    }
    rays
}
