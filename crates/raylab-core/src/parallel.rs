use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Dynamic range partitioner backed by OS threads. Iteration indices are
/// handed out in contiguous chunks claimed off one shared atomic counter, so
/// the only cross-thread coordination per chunk is a single `fetch_add`; the
/// user callback always runs outside any lock.
pub struct WorkScheduler {
    threads: usize,
}

struct LoopState {
    next_index: AtomicUsize,
    total: usize,
    chunk: usize,
}

impl LoopState {
    fn claim(&self) -> Option<(usize, usize)> {
        let begin = self.next_index.fetch_add(self.chunk, Ordering::Relaxed);
        if begin >= self.total {
            return None;
        }
        Some((begin, (begin + self.chunk).min(self.total)))
    }
}

impl WorkScheduler {
    /// `threads == 0` sizes the pool to the logical core count.
    pub fn new(threads: usize) -> Self {
        let threads = if threads == 0 {
            thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            threads
        };
        Self { threads }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Calls `f` for every index in `[0, count)` exactly once, then returns.
    /// The calling thread works alongside the spawned workers, so a
    /// one-thread scheduler degenerates to a plain sequential loop.
    ///
    /// No ordering is guaranteed between indices claimed by different
    /// threads. A panic inside `f` aborts the whole call.
    pub fn parallel_for<F>(&self, count: usize, chunk_size: usize, f: F)
    where
        F: Fn(usize) + Sync,
    {
        if count == 0 {
            return;
        }
        let chunk = chunk_size.max(1);
        if self.threads == 1 || count <= chunk {
            for index in 0..count {
                f(index);
            }
            return;
        }

        let state = LoopState {
            next_index: AtomicUsize::new(0),
            total: count,
            chunk,
        };

        thread::scope(|scope| {
            for _ in 1..self.threads {
                scope.spawn(|| run_worker(&state, &f));
            }
            run_worker(&state, &f);
        });
    }

    /// 2-D variant over an `(width, height)` grid. Internally mapped to the
    /// 1-D claim space `index = y * width + x`, one row per chunk.
    pub fn parallel_for_2d<F>(&self, extent: (usize, usize), f: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        let (width, height) = extent;
        if width == 0 || height == 0 {
            return;
        }
        self.parallel_for(width * height, width, |index| {
            f(index % width, index / width);
        });
    }
}

fn run_worker<F: Fn(usize) + Sync>(state: &LoopState, f: &F) {
    while let Some((begin, end)) = state.claim() {
        for index in begin..end {
            f(index);
        }
    }
}
