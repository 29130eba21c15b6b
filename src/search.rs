//! # Search — Partitioned Unbounded Search with an Early-Stop Quorum
//!
//! The coordinator spawns `W` workers. Worker `i` walks the magnitudes of its
//! [`Partition`] (`i+1, i+1+W, ...`) and tests `+n` then `-n` against an
//! [`Evaluator`]. Hits are committed to a shared [`HitSet`] whose capacity is
//! the target count. The commit that fills the set raises the termination
//! flag; every worker polls the flag before each candidate and exits.
//!
//! ## Commit Protocol
//!
//! The capacity check, the append and the flag store all happen under the
//! hit-set mutex. A worker that finds a hit after the set is full gets
//! [`Commit::Full`] and discards it, so the result never overshoots. Commits
//! are per candidate: `+n` and `-n` are two independent attempts.
//!
//! ## Termination
//!
//! Without a stop source the search only returns once `target` hits have been
//! found. If the evaluator has fewer hits than that, every worker runs
//! forever. This is the intended semi-decision behaviour, not a fault: pass a
//! [`StopSource`] (see [`crate::stop`]) to bound a run, in which case the
//! outcome carries the partial result and `cancelled() == true`.
//!
//! Zero is never a candidate.

use anyhow::Result;
use rug::Integer;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::events::{Event, EventBus};
use crate::partition::Partition;
use crate::polynomial::Polynomial;
use crate::progress::Progress;
use crate::StopSource;

pub const DEFAULT_WORKERS: usize = 4;

/// How many first magnitudes a worker announces in trace mode.
const TRACE_PREVIEW: usize = 3;

/// Tested-candidate counts are published in batches of this size.
const TESTED_FLUSH: u64 = 1024;

/// Decides whether a candidate is a hit. Must be pure: workers call it
/// concurrently without synchronization.
pub trait Evaluator: Sync {
    fn is_hit(&self, candidate: &Integer) -> bool;
}

impl Evaluator for Polynomial {
    fn is_hit(&self, candidate: &Integer) -> bool {
        self.is_root(candidate)
    }
}

impl<F> Evaluator for F
where
    F: Fn(&Integer) -> bool + Sync,
{
    fn is_hit(&self, candidate: &Integer) -> bool {
        self(candidate)
    }
}

/// Per-invocation knobs. Nothing here is shared between searches.
pub struct SearchOptions<'a> {
    pub workers: usize,
    pub stop: Option<&'a dyn StopSource>,
    pub events: Option<&'a EventBus>,
    pub progress: Option<&'a Progress>,
    /// Emit a `WorkerStarted` event per worker.
    pub trace: bool,
}

impl Default for SearchOptions<'_> {
    fn default() -> Self {
        SearchOptions {
            workers: DEFAULT_WORKERS,
            stop: None,
            events: None,
            progress: None,
            trace: false,
        }
    }
}

impl<'a> SearchOptions<'a> {
    pub fn with_workers(workers: usize) -> Self {
        SearchOptions {
            workers,
            ..Default::default()
        }
    }

    pub fn stop(mut self, stop: &'a dyn StopSource) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn events(mut self, events: &'a EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn progress(mut self, progress: &'a Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// Result of a commit attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commit {
    /// Appended; the set is still short of capacity.
    Added,
    /// Appended and the set is now full. Returned to exactly one caller.
    Quorum,
    /// The set was already full; nothing was appended.
    Full,
}

/// Capacity-bounded, insertion-ordered hits plus the termination flag.
pub struct HitSet {
    capacity: usize,
    hits: Mutex<Vec<Integer>>,
    done: AtomicBool,
}

impl HitSet {
    pub fn new(capacity: usize) -> Self {
        HitSet {
            capacity,
            hits: Mutex::new(Vec::with_capacity(capacity)),
            done: AtomicBool::new(capacity == 0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn try_commit(&self, candidate: &Integer) -> Commit {
        self.commit_with(candidate, |_| {})
    }

    /// Like [`try_commit`](Self::try_commit), but runs `on_commit` while the
    /// lock is still held whenever the candidate was appended. Callbacks
    /// therefore observe commits in exactly the order of the stored hits.
    pub fn commit_with<F>(&self, candidate: &Integer, on_commit: F) -> Commit
    where
        F: FnOnce(Commit),
    {
        let mut hits = self.hits.lock().unwrap();
        if hits.len() >= self.capacity {
            return Commit::Full;
        }
        hits.push(candidate.clone());
        let commit = if hits.len() == self.capacity {
            // Stored under the lock: no worker can see a full set with the flag clear.
            self.done.store(true, Ordering::Release);
            Commit::Quorum
        } else {
            Commit::Added
        };
        on_commit(commit);
        commit
    }

    /// The termination flag. Monotonic: once true it stays true.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<Integer> {
        self.hits.lock().unwrap().clone()
    }

    pub fn into_hits(self) -> Vec<Integer> {
        self.hits.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

/// What the coordinator hands back once every worker has stopped.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Hits in commit order.
    pub hits: Vec<Integer>,
    pub target: usize,
    pub tested: u64,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn is_complete(&self) -> bool {
        self.hits.len() == self.target
    }

    /// True when an external stop ended the search short of its target.
    pub fn cancelled(&self) -> bool {
        self.hits.len() < self.target
    }
}

/// State shared by the workers of one search invocation.
struct SearchContext<'a, E: ?Sized> {
    evaluator: &'a E,
    hits: HitSet,
    tested: AtomicU64,
    options: &'a SearchOptions<'a>,
}

impl<E: Evaluator + ?Sized> SearchContext<'_, E> {
    fn should_stop(&self) -> bool {
        self.hits.is_done() || self.options.stop.is_some_and(|s| s.is_stop_requested())
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = self.options.events {
            bus.emit(event);
        }
    }

    fn add_tested(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.tested.fetch_add(count, Ordering::Relaxed);
        if let Some(progress) = self.options.progress {
            progress.tested.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Test one candidate; returns true when this worker filled the quorum.
    fn test(&self, worker: usize, candidate: &Integer) -> bool {
        if !self.evaluator.is_hit(candidate) {
            return false;
        }
        let commit = self.hits.commit_with(candidate, |commit| {
            self.emit(Event::HitFound {
                worker,
                candidate: candidate.to_string(),
            });
            if commit == Commit::Quorum {
                self.emit(Event::QuorumReached {
                    worker,
                    hits: self.hits.capacity(),
                });
            }
        });
        if commit == Commit::Full {
            debug!(worker, %candidate, "hit discarded, quorum already reached");
            return false;
        }
        if let Some(progress) = self.options.progress {
            progress.found.fetch_add(1, Ordering::Relaxed);
        }
        commit == Commit::Quorum
    }

    fn run_worker(&self, partition: Partition) {
        let worker = partition.index();
        if self.options.trace {
            self.emit(Event::WorkerStarted {
                worker,
                preview: partition.preview(TRACE_PREVIEW),
                stride: partition.stride(),
            });
        }

        let mut pending = 0u64;
        for n in partition.magnitudes() {
            if self.should_stop() {
                break;
            }
            pending += 1;
            if self.test(worker, &n) {
                break;
            }
            if self.should_stop() {
                break;
            }
            let negated = -n;
            pending += 1;
            if self.test(worker, &negated) {
                break;
            }
            if pending >= TESTED_FLUSH {
                self.add_tested(pending);
                pending = 0;
            }
        }
        self.add_tested(pending);
        debug!(worker, "worker stopped");
    }
}

/// Run a quorum search over the nonzero integers.
///
/// Returns once `target` hits are committed or the stop source fires. With no
/// stop source and too few hits in existence this never returns.
pub fn run<E>(evaluator: &E, target: usize, options: &SearchOptions<'_>) -> Result<SearchOutcome>
where
    E: Evaluator + ?Sized,
{
    let partitions = Partition::all(options.workers)?;
    let start = Instant::now();

    if target == 0 {
        return Ok(SearchOutcome {
            hits: Vec::new(),
            target,
            tested: 0,
            elapsed: start.elapsed(),
        });
    }

    let ctx = SearchContext {
        evaluator,
        hits: HitSet::new(target),
        tested: AtomicU64::new(0),
        options,
    };

    thread::scope(|scope| {
        for partition in partitions {
            let ctx = &ctx;
            scope.spawn(move || ctx.run_worker(partition));
        }
    });

    let tested = ctx.tested.load(Ordering::Relaxed);
    let outcome = SearchOutcome {
        hits: ctx.hits.into_hits(),
        target,
        tested,
        elapsed: start.elapsed(),
    };

    if outcome.cancelled() {
        if let Some(bus) = options.events {
            bus.emit(Event::SearchCancelled {
                hits: outcome.hits.len(),
                target,
            });
        }
    }
    if let Some(bus) = options.events {
        bus.emit(Event::SearchCompleted {
            hits: outcome.hits.len(),
            tested,
            elapsed_secs: outcome.elapsed.as_secs_f64(),
        });
    }
    Ok(outcome)
}

/// Search `poly` for `target` integer roots with `workers` threads.
///
/// Blocks forever when the polynomial has fewer than `target` nonzero integer
/// roots. Use [`run`] with a stop source for a bounded variant.
pub fn find_integer_roots(poly: &Polynomial, target: usize, workers: usize) -> Result<Vec<Integer>> {
    let options = SearchOptions::with_workers(workers);
    info!(polynomial = %poly, target, workers, "searching for integer roots");
    Ok(run(poly, target, &options)?.hits)
}
