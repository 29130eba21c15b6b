//! # Parallel — Independent Work Items Across a Fixed Pool
//!
//! Applies a fallible function to every item of a slice on a dedicated Rayon
//! pool of `workers` threads and collects one outcome per item, in input
//! order. There is no coordination between items: a failing item is counted
//! and reported, the rest carry on.
//!
//! A sequential counterpart runs the same function on the calling thread so
//! the two can be timed against each other.

use anyhow::{bail, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Per-item results plus aggregate statistics.
#[derive(Debug)]
pub struct BatchReport<R> {
    pub outcomes: Vec<Result<R>>,
    pub processed: u64,
    pub errors: u64,
    /// Sum of per-item processing time across all workers.
    pub busy: Duration,
    /// Wall-clock time for the whole batch.
    pub wall: Duration,
    pub workers: usize,
}

impl<R> BatchReport<R> {
    pub fn mean_item_time(&self) -> Duration {
        let n = self.processed + self.errors;
        if n == 0 {
            Duration::ZERO
        } else {
            self.busy.div_f64(n as f64)
        }
    }

    /// How many times faster this batch ran than `baseline` (wall clock).
    pub fn speedup_over<S>(&self, baseline: &BatchReport<S>) -> f64 {
        let ours = self.wall.as_secs_f64();
        if ours == 0.0 {
            return 0.0;
        }
        baseline.wall.as_secs_f64() / ours
    }

    /// Speedup divided by worker count, as a percentage.
    pub fn efficiency_over<S>(&self, baseline: &BatchReport<S>) -> f64 {
        self.speedup_over(baseline) / self.workers as f64 * 100.0
    }

    pub fn successes(&self) -> impl Iterator<Item = &R> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }
}

struct Tally {
    processed: AtomicU64,
    errors: AtomicU64,
    busy_nanos: AtomicU64,
}

impl Tally {
    fn new() -> Self {
        Tally {
            processed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            busy_nanos: AtomicU64::new(0),
        }
    }

    fn record<R>(&self, outcome: &Result<R>, took: Duration) {
        match outcome {
            Ok(_) => self.processed.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.errors.fetch_add(1, Ordering::Relaxed),
        };
        self.busy_nanos
            .fetch_add(took.as_nanos() as u64, Ordering::Relaxed);
    }

    fn into_report<R>(self, outcomes: Vec<Result<R>>, wall: Duration, workers: usize) -> BatchReport<R> {
        BatchReport {
            outcomes,
            processed: self.processed.into_inner(),
            errors: self.errors.into_inner(),
            busy: Duration::from_nanos(self.busy_nanos.into_inner()),
            wall,
            workers,
        }
    }
}

/// Map `f` over `items` on a pool of exactly `workers` threads.
pub fn map_items<T, R, F>(items: &[T], workers: usize, f: F) -> Result<BatchReport<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R> + Sync,
{
    if workers == 0 {
        bail!("worker count must be at least 1");
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("batch-{}", i))
        .build()?;

    let tally = Tally::new();
    let start = Instant::now();
    let outcomes: Vec<Result<R>> = pool.install(|| {
        items
            .par_iter()
            .map(|item| {
                let t0 = Instant::now();
                let outcome = f(item);
                tally.record(&outcome, t0.elapsed());
                outcome
            })
            .collect()
    });
    let wall = start.elapsed();
    debug!(items = items.len(), workers, wall_ms = wall.as_millis() as u64, "parallel batch done");
    Ok(tally.into_report(outcomes, wall, workers))
}

/// Map `f` over `items` on the calling thread.
pub fn map_items_sequential<T, R, F>(items: &[T], f: F) -> BatchReport<R>
where
    F: Fn(&T) -> Result<R>,
{
    let tally = Tally::new();
    let start = Instant::now();
    let outcomes: Vec<Result<R>> = items
        .iter()
        .map(|item| {
            let t0 = Instant::now();
            let outcome = f(item);
            tally.record(&outcome, t0.elapsed());
            outcome
        })
        .collect();
    tally.into_report(outcomes, start.elapsed(), 1)
}
