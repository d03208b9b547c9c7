//! Bounding Volume Hierarchy over arbitrary primitives.
//!
//! Built top-down with the Surface Area Heuristic (SAH) on a [`WorkerPool`],
//! then flattened into a depth-first node array for stack-based traversal.
//!
//! A build never fails. When cancelled it finishes quickly by turning every
//! range it has not split yet into a leaf; the result is coarser but still
//! answers every query correctly.

mod arena;
mod build;
mod info;
mod node;
mod sah;
mod stats;
mod traverse;


use std::time::{Duration, Instant};

pub use node::Node;
pub use stats::BvhStats;

use crate::{BuildSettings, Cancellation, Primitive, WorkerPool};
use build::{BuildContext, SplitHook};

/// Hard limit on tree depth, root included. Traversal relies on it to size
/// its stack.
pub const MAX_DEPTH: usize = 64;

/// Largest leaf the SAH will choose to keep unsplit. Leaves created because
/// of cancellation, coincident centroids or the depth limit can be larger.
pub const MAX_LEAF_PRIMITIVES: usize = 4;

/// Bounding Volume Hierarchy over borrowed primitives.
///
/// A `Bvh` is itself a [`Primitive`], so hierarchies can be nested.
pub struct Bvh<'p> {
    primitives: Vec<&'p dyn Primitive>,
    nodes: Vec<Node>,
    build_time: Duration,
}

impl<'p> Bvh<'p> {
    /// Build a BVH over `primitives` using the workers of `pool`.
    ///
    /// Every worker that is idle when the build starts takes part. The
    /// primitives' order in the structure is unrelated to their order in
    /// `primitives`.
    ///
    /// # Panics
    ///
    /// If there are more than `u32::MAX` primitives.
    pub fn build(
        primitives: Vec<&'p dyn Primitive>,
        cancellation: &Cancellation,
        pool: &WorkerPool,
        settings: &BuildSettings,
    ) -> Self {
        Self::build_observed(primitives, cancellation, pool, settings, None)
    }

    /// [`Bvh::build`], calling `on_split` each time a range is split.
    pub(crate) fn build_observed(
        primitives: Vec<&'p dyn Primitive>,
        cancellation: &Cancellation,
        pool: &WorkerPool,
        settings: &BuildSettings,
        on_split: Option<SplitHook<'_>>,
    ) -> Self {
        let started = Instant::now();
        assert!(
            u32::try_from(primitives.len()).is_ok(),
            "a BVH holds at most {} primitives, got {}",
            u32::MAX,
            primitives.len()
        );

        if primitives.is_empty() {
            return Self {
                primitives,
                nodes: Vec::new(),
                build_time: started.elapsed(),
            };
        }

        let workers = pool.threads_available().max(1);
        let (ordered, nodes) = pool.install(|| {
            let mut infos = info::prepare(&primitives, pool, workers);
            let mut context = BuildContext::new(pool, cancellation, settings);
            context.on_split = on_split;
            let root = context.build(&mut infos, 0, workers, 0);
            let built = context.arena.into_nodes();
            node::flatten(root.node, &built, &infos, &primitives)
        });

        let bvh = Self {
            primitives: ordered,
            nodes,
            build_time: started.elapsed(),
        };

        if cancellation.is_cancelled() {
            log::debug!(
                "BVH build over {} primitives cancelled after {:?}",
                bvh.primitives.len(),
                bvh.build_time
            );
        } else if log::log_enabled!(log::Level::Info) {
            log::info!("BVH build information:\n{}", bvh.stats());
        }

        bvh
    }

    /// Shape and size summary of this hierarchy.
    pub fn stats(&self) -> BvhStats {
        BvhStats::collect(self)
    }

    /// Nodes in depth-first order; the root comes first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Primitives in leaf order.
    pub fn primitives(&self) -> &[&'p dyn Primitive] {
        &self.primitives
    }

    /// True if the hierarchy indexes no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl std::fmt::Debug for Bvh<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bvh")
            .field("primitives", &self.primitives.len())
            .field("nodes", &self.nodes.len())
            .field("build_time", &self.build_time)
            .finish()
    }
}
