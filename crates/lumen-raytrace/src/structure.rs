//! Choosing an acceleration structure by name.

use crate::{BuildSettings, Bvh, Cancellation, Primitive, StructureKind, WorkerPool};

/// Build the acceleration structure `kind` over `primitives`.
///
/// [`StructureKind::Default`] currently means a BVH.
pub fn build_structure<'p>(
    kind: StructureKind,
    primitives: Vec<&'p dyn Primitive>,
    cancellation: &Cancellation,
    pool: &WorkerPool,
    settings: &BuildSettings,
) -> Box<dyn Primitive + 'p> {
    match kind {
        StructureKind::Bvh | StructureKind::Default => {
            Box::new(Bvh::build(primitives, cancellation, pool, settings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Sphere;
    use crate::Hit;
    use lumen_math::{Point3, Ray, Vec3};

    #[test]
    fn test_named_structures_answer_queries() {
        let spheres = [
            Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0),
            Sphere::new(Point3::new(0.0, 0.0, 10.0), 1.0),
        ];
        let pool = WorkerPool::new(2).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 0.0, -1.0));

        for name in ["bvh", "default"] {
            let kind: StructureKind = name.parse().unwrap();
            let primitives: Vec<&dyn Primitive> =
                spheres.iter().map(|s| s as &dyn Primitive).collect();
            let structure = build_structure(
                kind,
                primitives,
                &Cancellation::new(),
                &pool,
                &BuildSettings::default(),
            );

            let mut hit = Hit::new();
            assert!(structure.closest_hit(&ray, &mut hit));
            assert!(hit.is_primitive(&spheres[1]));
            assert_eq!(hit.t, 9.0);
        }
    }
}
