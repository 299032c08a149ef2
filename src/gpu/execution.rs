#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How a kernel's per-item work is scheduled.
///
/// Every helper returns only after all items are processed, which is the
/// barrier between consecutive kernel dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    Sequential,
    /// Rayon workers, each taking at least `min_len` consecutive items.
    #[cfg(feature = "parallel")]
    Parallel { min_len: usize },
}

impl Execution {
    pub fn is_parallel(&self) -> bool {
        !matches!(self, Execution::Sequential)
    }

    /// Runs `f(i)` for every `i` in `0..count`.
    pub fn for_each_index<F>(self, count: usize, f: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        match self {
            Execution::Sequential => (0..count).for_each(f),
            #[cfg(feature = "parallel")]
            Execution::Parallel { min_len } => (0..count)
                .into_par_iter()
                .with_min_len(min_len)
                .for_each(f),
        }
    }

    /// Runs `f(i, &mut items[i])` for every item.
    pub fn for_each_mut<T, F>(self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        match self {
            Execution::Sequential => items
                .iter_mut()
                .enumerate()
                .for_each(|(i, item)| f(i, item)),
            #[cfg(feature = "parallel")]
            Execution::Parallel { min_len } => items
                .par_iter_mut()
                .enumerate()
                .with_min_len(min_len)
                .for_each(|(i, item)| f(i, item)),
        }
    }

    /// Runs `f(chunk_index, chunk)` over consecutive chunks of `chunk_len` items.
    pub fn for_each_chunk_mut<T, F>(self, items: &mut [T], chunk_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        match self {
            Execution::Sequential => items
                .chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(i, chunk)| f(i, chunk)),
            #[cfg(feature = "parallel")]
            Execution::Parallel { .. } => items
                .par_chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(i, chunk)| f(i, chunk)),
        }
    }

    /// Fills `out[i] = f(i)`.
    pub fn map_into<U, F>(self, out: &mut [U], f: F)
    where
        U: Send,
        F: Fn(usize) -> U + Sync + Send,
    {
        self.for_each_mut(out, |i, slot| *slot = f(i));
    }
}
