//! Recursive, parallel construction of the temporary build tree.
//!
//! Two strategies cooperate. Near the root, where a handful of ranges hold
//! most of the primitives, each range is processed *data-parallel*: its
//! workers compute bounds and SAH buckets over disjoint chunks and the
//! results are merged. Once a range's share of workers drops below
//! [`BuildSettings::min_workers_for_data_parallel`] (or the range gets small)
//! the build switches to *task-parallel* recursion, where one worker builds a
//! whole subtree and offers its right half to idle workers.

use lumen_math::Aabb;

use super::arena::{BuildNode, NodeArena, NodeRef};
use super::info::{chunk_ranges, PrimitiveInfo};
use super::sah::{self, Buckets, RangeBounds, Split};
use super::MAX_DEPTH;
use crate::{BuildSettings, Cancellation, WorkerPool};

/// Called with the depth of every range just after its split is chosen and
/// before its halves are built.
pub(crate) type SplitHook<'a> = &'a (dyn Fn(usize) + Sync);

/// Shared state of one build.
pub(crate) struct BuildContext<'a> {
    pub pool: &'a WorkerPool,
    pub cancellation: &'a Cancellation,
    pub settings: &'a BuildSettings,
    pub arena: NodeArena<'a>,
    pub on_split: Option<SplitHook<'a>>,
}

/// A finished subtree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Built {
    pub node: NodeRef,
    pub aabb: Aabb,
}

/// Scratch space of one worker during a data-parallel pass.
#[repr(align(64))]
#[derive(Default)]
struct ChunkState {
    bounds: RangeBounds,
    buckets: Buckets,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        pool: &'a WorkerPool,
        cancellation: &'a Cancellation,
        settings: &'a BuildSettings,
    ) -> Self {
        Self {
            pool,
            cancellation,
            settings,
            arena: NodeArena::new(pool),
            on_split: None,
        }
    }

    /// Build the subtree for `infos`, which starts at `start` in the full
    /// primitive list, with `workers` workers assigned to it.
    pub fn build(
        &self,
        infos: &mut [PrimitiveInfo],
        start: usize,
        workers: usize,
        depth: usize,
    ) -> Built {
        let data_parallel = workers >= self.settings.min_workers_for_data_parallel.max(2)
            && infos.len() > self.settings.min_primitives_for_threading;

        if data_parallel {
            self.build_data_parallel(infos, start, workers, depth)
        } else {
            self.build_task_parallel(infos, start, depth)
        }
    }

    fn build_task_parallel(
        &self,
        infos: &mut [PrimitiveInfo],
        start: usize,
        depth: usize,
    ) -> Built {
        let bounds = RangeBounds::of(infos);
        let axis = bounds.centroids.max_extent_axis();

        if infos.len() == 1 || self.must_stop(&bounds, axis, depth) {
            return self.leaf(bounds.aabb, start, infos.len());
        }

        let mid = match sah::split_range(infos, &bounds, axis) {
            Split::Leaf => return self.leaf(bounds.aabb, start, infos.len()),
            Split::At(mid) => mid,
        };
        self.split_chosen(depth);

        let spread = infos.len() > self.settings.min_primitives_for_threading
            && self.pool.threads_available() > 0;
        let (left_infos, right_infos) = infos.split_at_mut(mid);

        let (left, right) = if spread {
            self.pool.join(
                || self.build_task_parallel(left_infos, start, depth + 1),
                || self.build_task_parallel(right_infos, start + mid, depth + 1),
            )
        } else {
            (
                self.build_task_parallel(left_infos, start, depth + 1),
                self.build_task_parallel(right_infos, start + mid, depth + 1),
            )
        };

        self.interior(left, right, axis)
    }

    fn build_data_parallel(
        &self,
        infos: &mut [PrimitiveInfo],
        start: usize,
        workers: usize,
        depth: usize,
    ) -> Built {
        let count = infos.len();
        log::debug!(
            "data-parallel BVH split of {count} primitives over {workers} workers at depth {depth}"
        );

        let mut states: Vec<ChunkState> = (0..workers).map(|_| ChunkState::default()).collect();

        let view: &[PrimitiveInfo] = infos;
        self.pool.fan_out(chunk_tasks(&mut states, view), |_, (state, chunk)| {
            state.bounds = RangeBounds::of(chunk);
        });
        let bounds = states.iter().fold(RangeBounds::default(), |mut acc, state| {
            acc.merge(&state.bounds);
            acc
        });

        let axis = bounds.centroids.max_extent_axis();
        if self.must_stop(&bounds, axis, depth) {
            return self.leaf(bounds.aabb, start, count);
        }

        let centroids = bounds.centroids;
        self.pool.fan_out(chunk_tasks(&mut states, view), |_, (state, chunk)| {
            state.buckets = sah::fill_buckets(chunk, &centroids, axis);
        });
        let mut buckets = Buckets::default();
        for state in &states {
            sah::merge_buckets(&mut buckets, &state.buckets);
        }

        let split = sah::best_split(&buckets, &bounds.aabb);
        let mid = sah::partition_at(infos, &centroids, axis, split.bucket);
        self.split_chosen(depth);

        let left_workers = ((mid as u64 * workers as u64) / count as u64)
            .clamp(1, workers as u64 - 1) as usize;
        let right_workers = workers - left_workers;
        let (left_infos, right_infos) = infos.split_at_mut(mid);

        let (left, right) = self.pool.join(
            || self.build(left_infos, start, left_workers, depth + 1),
            || self.build(right_infos, start + mid, right_workers, depth + 1),
        );

        self.interior(left, right, axis)
    }

    /// Whether a range must become a leaf no matter what the SAH says:
    /// its centroids coincide along the best axis, the tree is as deep as
    /// traversal allows, or the build was cancelled.
    fn must_stop(&self, bounds: &RangeBounds, axis: usize, depth: usize) -> bool {
        bounds.centroids.is_planar(axis)
            || depth + 1 >= MAX_DEPTH
            || self.cancellation.is_cancelled()
    }

    fn split_chosen(&self, depth: usize) {
        if let Some(on_split) = self.on_split {
            on_split(depth);
        }
    }

    fn leaf(&self, aabb: Aabb, start: usize, count: usize) -> Built {
        let node = self.arena.alloc(BuildNode::Leaf {
            aabb,
            start: start as u32,
            end: (start + count) as u32,
        });
        Built { node, aabb }
    }

    fn interior(&self, left: Built, right: Built, axis: usize) -> Built {
        let aabb = left.aabb.union(&right.aabb);
        let node = self.arena.alloc(BuildNode::Interior {
            aabb,
            axis: axis as u8,
            left: left.node,
            right: right.node,
        });
        Built { node, aabb }
    }
}

/// Pair each worker's scratch state with its chunk of `infos`.
fn chunk_tasks<'s, 'i>(
    states: &'s mut [ChunkState],
    infos: &'i [PrimitiveInfo],
) -> Vec<(&'s mut ChunkState, &'i [PrimitiveInfo])> {
    let workers = states.len();
    states
        .iter_mut()
        .zip(chunk_ranges(infos.len(), workers))
        .map(|(state, range)| (state, &infos[range]))
        .collect()
}
