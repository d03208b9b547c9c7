//! Worker pool shared by acceleration structure builds.
//!
//! A thin layer over a dedicated `rayon` thread pool that also keeps track of
//! how many workers are idle, so recursive builds can stop offering work to
//! other threads once everyone is busy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Result, TraceError};

/// A fixed-size pool of worker threads.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    idle: AtomicUsize,
}

/// Marks one worker as busy for as long as it is alive.
struct BusyWorker<'a> {
    idle: &'a AtomicUsize,
}

impl Drop for BusyWorker<'_> {
    fn drop(&mut self) {
        self.idle.fetch_add(1, Ordering::Relaxed);
    }
}

impl WorkerPool {
    /// Start a pool with `threads` workers.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(TraceError::InvalidSettings(
                "worker pool needs at least one thread".into(),
            ));
        }
        Self::from_builder(rayon::ThreadPoolBuilder::new().num_threads(threads))
    }

    /// Start a pool with one worker per available CPU.
    pub fn with_default_size() -> Result<Self> {
        Self::from_builder(rayon::ThreadPoolBuilder::new())
    }

    fn from_builder(builder: rayon::ThreadPoolBuilder) -> Result<Self> {
        let pool = builder
            .thread_name(|index| format!("lumen-worker-{index}"))
            .build()?;
        let idle = AtomicUsize::new(pool.current_num_threads());
        Ok(Self { pool, idle })
    }

    /// Total number of workers.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Number of workers not currently running work handed to them through
    /// this pool.
    pub fn threads_available(&self) -> usize {
        self.idle.load(Ordering::Relaxed)
    }

    /// Index of the calling thread within this pool, if it is one of its
    /// workers.
    pub fn current_worker(&self) -> Option<usize> {
        self.pool.current_thread_index()
    }

    fn claim(&self) -> Option<BusyWorker<'_>> {
        self.idle
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .ok()
            .map(|_| BusyWorker { idle: &self.idle })
    }

    /// Run `op` on a worker of this pool and wait for its result.
    ///
    /// Called from one of the pool's own workers this simply runs `op`.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        if self.current_worker().is_some() {
            return op();
        }
        let busy = self.claim();
        let result = self.pool.install(op);
        drop(busy);
        result
    }

    /// Run `a` on the calling worker while offering `b` to the rest of the
    /// pool, then block until both are done.
    ///
    /// `b` counts as one busy worker while it runs. If nobody picks it up the
    /// caller runs it itself once `a` is finished.
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        let busy = self.claim();
        self.pool.join(a, move || {
            let _busy = busy;
            b()
        })
    }

    /// Run `f` once per task as a structured task group.
    ///
    /// All tasks but the last are spawned onto the pool, each counting as one
    /// busy worker until it finishes; the last runs on the calling worker.
    /// Returns once every task has finished. `f` receives the task's position
    /// in `tasks`.
    pub fn fan_out<T, F>(&self, tasks: Vec<T>, f: F)
    where
        T: Send,
        F: Fn(usize, T) + Sync,
    {
        let mut tasks: Vec<(usize, T)> = tasks.into_iter().enumerate().collect();
        let Some((last_index, last)) = tasks.pop() else {
            return;
        };
        let f = &f;

        self.pool.scope(move |scope| {
            for (index, task) in tasks {
                let busy = self.claim();
                scope.spawn(move |_| {
                    let _busy = busy;
                    f(index, task);
                });
            }
            f(last_index, last);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::sync::Barrier;

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(TraceError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_all_threads_idle_initially() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.num_threads(), 3);
        assert_eq!(pool.threads_available(), 3);
        assert_eq!(pool.current_worker(), None);
    }

    #[test]
    fn test_install_runs_on_worker_and_counts_it_busy() {
        let pool = WorkerPool::new(2).unwrap();
        let (worker, available) =
            pool.install(|| (pool.current_worker(), pool.threads_available()));
        assert!(worker.is_some());
        assert_eq!(available, 1);
        assert_eq!(pool.threads_available(), 2);
    }

    #[test]
    fn test_join_returns_both_results() {
        let pool = WorkerPool::new(2).unwrap();
        let (a, b) = pool.install(|| pool.join(|| 1 + 1, || "right"));
        assert_eq!(a, 2);
        assert_eq!(b, "right");
        assert_eq!(pool.threads_available(), 2);
    }

    #[test]
    fn test_join_with_no_idle_workers_still_completes() {
        let pool = WorkerPool::new(1).unwrap();
        let (a, b) = pool.install(|| {
            assert_eq!(pool.threads_available(), 0);
            pool.join(|| 3, || 4)
        });
        assert_eq!(a + b, 7);
        assert_eq!(pool.threads_available(), 1);
    }

    #[test]
    fn test_fan_out_runs_every_task() {
        let pool = WorkerPool::new(4).unwrap();
        let mut sums = vec![0u64; 5];
        let data: Vec<u64> = (1..=100).collect();
        let tasks: Vec<(&mut u64, &[u64])> = sums.iter_mut().zip(data.chunks(20)).collect();

        pool.fan_out(tasks, |_, (sum, chunk)| {
            *sum = chunk.iter().sum();
        });

        assert_eq!(sums.iter().sum::<u64>(), 5050);
        assert!(sums.iter().all(|&s| s > 0));
    }

    #[test]
    fn test_fan_out_passes_task_index() {
        let pool = WorkerPool::new(2).unwrap();
        let seen = AtomicU64::new(0);
        pool.fan_out(vec![(); 6], |index, ()| {
            seen.fetch_or(1 << index, Ordering::Relaxed);
        });
        assert_eq!(seen.load(Ordering::Relaxed), 0b11_1111);
    }

    #[test]
    fn test_fan_out_counts_spawned_tasks_busy() {
        let pool = WorkerPool::new(4).unwrap();
        let together = Barrier::new(3);
        let seen = AtomicUsize::new(usize::MAX);

        pool.install(|| {
            pool.fan_out(vec![(); 3], |index, ()| {
                together.wait();
                if index == 2 {
                    seen.store(pool.threads_available(), Ordering::Relaxed);
                }
                together.wait();
            });
        });

        // One worker runs `install`, two run spawned tasks.
        assert_eq!(seen.load(Ordering::Relaxed), 1);
        assert_eq!(pool.threads_available(), 4);
    }

    #[test]
    fn test_fan_out_with_no_tasks() {
        let pool = WorkerPool::new(2).unwrap();
        pool.fan_out(Vec::<u32>::new(), |_, _| panic!("no tasks to run"));
    }
}
