#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use lumen_math::{Point3, Ray, Vec3};
use lumen_raytrace::shapes::Sphere;
use lumen_raytrace::{BuildSettings, Bvh, Cancellation, Hit, Primitive, WorkerPool};

fn sphere_grid(side: usize) -> Vec<Sphere> {
    let mut spheres = Vec::with_capacity(side * side * side);
    for x in 0..side {
        for y in 0..side {
            for z in 0..side {
                let center = Point3::new(x as f64, y as f64, z as f64) * 2.0;
                spheres.push(Sphere::new(center, 0.4 + 0.5 * ((x + y + z) % 3) as f64 / 3.0));
            }
        }
    }
    spheres
}

fn build_bench(c: &mut Criterion) {
    let spheres = sphere_grid(40);
    let mut group = c.benchmark_group("bvh-build");
    group.sample_size(10);

    for threads in [1, 2, 4, 8] {
        let pool = WorkerPool::new(threads).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &pool, |b, pool| {
            b.iter(|| {
                let primitives: Vec<&dyn Primitive> =
                    spheres.iter().map(|s| s as &dyn Primitive).collect();
                Bvh::build(primitives, &Cancellation::new(), pool, &BuildSettings::default())
            });
        });
    }
    group.finish();
}

fn trace_bench(c: &mut Criterion) {
    let spheres = sphere_grid(40);
    let primitives: Vec<&dyn Primitive> = spheres.iter().map(|s| s as &dyn Primitive).collect();
    let pool = WorkerPool::new(4).unwrap();
    let bvh = Bvh::build(primitives, &Cancellation::new(), &pool, &BuildSettings::default());

    let rays: Vec<Ray> = (0..64 * 64)
        .map(|i| {
            let (u, v) = ((i % 64) as f64 / 64.0, (i / 64) as f64 / 64.0);
            Ray::new(Point3::new(-10.0, 80.0 * u, 80.0 * v), Vec3::new(1.0, 0.1, -0.05))
        })
        .collect();

    c.bench_function("bvh-closest-hit", |b| {
        b.iter(|| {
            rays.iter()
                .filter(|ray| {
                    let mut hit = Hit::new();
                    bvh.closest_hit(ray, &mut hit)
                })
                .count()
        });
    });
    c.bench_function("bvh-occludes", |b| {
        b.iter(|| rays.iter().filter(|ray| bvh.occludes(ray)).count());
    });
}

criterion_group!(benches, build_bench, trace_bench);
criterion_main!(benches);
