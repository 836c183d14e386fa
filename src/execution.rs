//! Scheduling of per-group work, sequentially or across a thread pool.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::error::{AnomalyError, Result};

/// Worker-count request for group fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// Process groups one at a time, in encounter order.
    Sequential,
    /// Fixed worker count; `Workers(1)` behaves like `Sequential`.
    Workers(usize),
    /// Use every core the host reports.
    Auto,
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::Sequential
    }
}

impl Parallelism {
    /// Resolve the request into an effective worker count, at least 1.
    pub fn effective_workers(&self) -> usize {
        match self {
            Parallelism::Sequential => 1,
            Parallelism::Workers(n) => (*n).max(1),
            Parallelism::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Runs one job per group and collects the results in the groups' input
/// order, regardless of which worker finishes first.
///
/// An effective worker count of 1 runs jobs in a plain loop with an optional
/// progress bar; anything higher fans out across a fixed-size thread pool.
/// The first failing job aborts the whole run and its error is returned;
/// results of other jobs are discarded. Callers observe the same ordering
/// and error behavior from both paths.
#[derive(Debug, Clone)]
pub struct Executor {
    parallelism: Parallelism,
    show_progress: bool,
}

impl Executor {
    /// Create an executor with the given worker-count request.
    pub fn new(parallelism: Parallelism, show_progress: bool) -> Self {
        Self {
            parallelism,
            show_progress,
        }
    }

    /// Run `worker` over every group.
    pub fn run<G, T, F>(&self, groups: Vec<G>, worker: F) -> Result<Vec<T>>
    where
        G: Send,
        T: Send,
        F: Fn(G) -> Result<T> + Send + Sync,
    {
        let workers = self.parallelism.effective_workers();
        let bar = self.progress_bar(groups.len());

        let outcome = if workers <= 1 {
            groups
                .into_iter()
                .map(|group| {
                    let result = worker(group);
                    bar.inc(1);
                    result
                })
                .collect::<Result<Vec<T>>>()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| {
                    AnomalyError::Computation(format!("failed to build worker pool: {e}"))
                })?;
            pool.install(|| {
                groups
                    .into_par_iter()
                    .map(|group| {
                        let result = worker(group);
                        bar.inc(1);
                        result
                    })
                    .collect::<Result<Vec<T>>>()
            })
        };

        bar.finish_and_clear();
        outcome
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress || total <= 1 {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} groups ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Parallelism::Sequential, false)
    }
}
