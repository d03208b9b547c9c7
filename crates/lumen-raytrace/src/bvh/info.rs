//! Per-primitive build records and how they are spread over workers.

use std::ops::Range;

use lumen_math::{Aabb, Point3};

use crate::{Primitive, WorkerPool};

/// What the builder needs to know about one primitive.
///
/// `index` points back into the caller's primitive list; everything else is
/// cached so the builder never calls into the primitive again.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrimitiveInfo {
    pub index: u32,
    pub aabb: Aabb,
    pub centroid: Point3,
}

impl PrimitiveInfo {
    pub fn new(index: u32, aabb: Aabb) -> Self {
        Self {
            index,
            aabb,
            centroid: aabb.centroid(),
        }
    }
}

/// Split `0..count` into `parts` contiguous ranges of nearly equal size.
///
/// Range `t` is `count·t/parts .. count·(t+1)/parts`, computed in 64 bits so
/// the product cannot overflow. Some ranges are empty when `parts > count`.
pub(crate) fn chunk_ranges(count: usize, parts: usize) -> impl Iterator<Item = Range<usize>> {
    let parts = parts.max(1) as u64;
    let count = count as u64;
    (0..parts).map(move |t| {
        let start = count * t / parts;
        let end = count * (t + 1) / parts;
        start as usize..end as usize
    })
}

/// Compute a [`PrimitiveInfo`] for every primitive, with `workers` workers
/// each handling one contiguous slice.
pub(crate) fn prepare(
    primitives: &[&dyn Primitive],
    pool: &WorkerPool,
    workers: usize,
) -> Vec<PrimitiveInfo> {
    let mut infos = vec![PrimitiveInfo::new(0, Aabb::empty()); primitives.len()];

    let mut tasks = Vec::with_capacity(workers);
    let mut rest = infos.as_mut_slice();
    for range in chunk_ranges(primitives.len(), workers) {
        let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
        rest = tail;
        tasks.push((range.start, chunk));
    }

    pool.fan_out(tasks, |_, (offset, chunk)| {
        for (i, info) in chunk.iter_mut().enumerate() {
            let index = offset + i;
            *info = PrimitiveInfo::new(index as u32, primitives[index].bounding_box());
        }
    });

    infos
}
