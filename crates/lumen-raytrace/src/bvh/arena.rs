//! Per-worker bump allocation of build nodes.
//!
//! During construction every worker appends the nodes it finishes to its own
//! chain of fixed-size blocks, so allocation never takes a lock. Nodes are
//! addressed by `(chain, slot)` pairs and are never freed individually; the
//! whole arena is dropped once the tree has been flattened.

use std::cell::UnsafeCell;
use std::sync::{Mutex, PoisonError};

use lumen_math::Aabb;

use crate::WorkerPool;

/// Number of build nodes per block.
pub(crate) const BLOCK_SIZE: usize = 4096;

/// Address of a build node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeRef {
    chain: u32,
    slot: u32,
}

/// A node of the temporary tree produced while building.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BuildNode {
    Interior {
        aabb: Aabb,
        axis: u8,
        left: NodeRef,
        right: NodeRef,
    },
    /// Covers `infos[start..end]`.
    Leaf { aabb: Aabb, start: u32, end: u32 },
}

/// A growable list of blocks, each holding up to [`BLOCK_SIZE`] nodes.
///
/// Blocks are never reallocated once created.
#[derive(Debug, Default)]
pub(crate) struct NodeChain {
    blocks: Vec<Vec<BuildNode>>,
}

impl NodeChain {
    fn push(&mut self, node: BuildNode) -> u32 {
        let needs_block = self
            .blocks
            .last()
            .map_or(true, |block| block.len() == BLOCK_SIZE);
        if needs_block {
            self.blocks.push(Vec::with_capacity(BLOCK_SIZE));
        }

        let block_index = self.blocks.len() - 1;
        let block = &mut self.blocks[block_index];
        block.push(node);
        (block_index * BLOCK_SIZE + block.len() - 1) as u32
    }

    fn get(&self, slot: u32) -> &BuildNode {
        let slot = slot as usize;
        &self.blocks[slot / BLOCK_SIZE][slot % BLOCK_SIZE]
    }

    fn len(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }
}

/// One worker's chain, padded to its own cache line.
#[repr(align(64))]
struct WorkerChain(UnsafeCell<NodeChain>);

// SAFETY: a `WorkerChain` is only ever accessed mutably by `NodeArena::alloc`,
// from the pool worker whose index selects it. Worker indices are unique per
// live thread of a pool, and `alloc` never yields to other work while it
// holds the reference, so no two threads touch the same chain concurrently.
unsafe impl Sync for WorkerChain {}

/// Lock-free node storage for one build, one chain per pool worker.
pub(crate) struct NodeArena<'a> {
    pool: &'a WorkerPool,
    workers: Vec<WorkerChain>,
    /// Used by threads that are not workers of `pool`.
    outside: Mutex<NodeChain>,
}

impl<'a> NodeArena<'a> {
    pub(crate) fn new(pool: &'a WorkerPool) -> Self {
        let workers = (0..pool.num_threads())
            .map(|_| WorkerChain(UnsafeCell::new(NodeChain::default())))
            .collect();
        Self {
            pool,
            workers,
            outside: Mutex::new(NodeChain::default()),
        }
    }

    /// Store `node` in the calling worker's chain.
    pub(crate) fn alloc(&self, node: BuildNode) -> NodeRef {
        let worker = self
            .pool
            .current_worker()
            .filter(|&index| index < self.workers.len());

        match worker {
            Some(index) => {
                // SAFETY: see `WorkerChain`; `index` is the calling thread's
                // own worker index in `self.pool`.
                let chain = unsafe { &mut *self.workers[index].0.get() };
                NodeRef {
                    chain: index as u32,
                    slot: chain.push(node),
                }
            }
            None => {
                let mut chain = self.outside.lock().unwrap_or_else(PoisonError::into_inner);
                NodeRef {
                    chain: self.workers.len() as u32,
                    slot: chain.push(node),
                }
            }
        }
    }

    /// Finish building and hand out read access to every chain.
    pub(crate) fn into_nodes(self) -> BuildNodes {
        let mut chains: Vec<NodeChain> = self
            .workers
            .into_iter()
            .map(|chain| chain.0.into_inner())
            .collect();
        chains.push(self.outside.into_inner().unwrap_or_else(PoisonError::into_inner));
        BuildNodes { chains }
    }
}

/// The finished contents of a [`NodeArena`].
pub(crate) struct BuildNodes {
    chains: Vec<NodeChain>,
}

impl BuildNodes {
    pub(crate) fn get(&self, node: NodeRef) -> &BuildNode {
        self.chains[node.chain as usize].get(node.slot)
    }

    /// Total number of nodes over all chains.
    pub(crate) fn len(&self) -> usize {
        self.chains.iter().map(NodeChain::len).sum()
    }
}
