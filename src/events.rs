//! # Events — Diagnostic Side Channel for Searches
//!
//! A bounded, thread-safe log of what the workers did during a search: the
//! magnitudes each worker starts from, every committed hit, the quorum
//! transition, cancellation, and the final summary.
//!
//! ## Event Types
//!
//! | Variant | Emitted When |
//! |---------|-------------|
//! | `SearchStarted` | The coordinator is about to spawn workers |
//! | `WorkerStarted` | A worker begins its partition (trace mode only) |
//! | `HitFound` | A worker committed a hit to the result set |
//! | `QuorumReached` | The commit that filled the result set |
//! | `SearchCancelled` | An external stop source ended the search early |
//! | `SearchCompleted` | All workers joined |
//!
//! The log is observational only. Nothing in the search reads it back, so a
//! full or absent bus never changes a result.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{info, warn};

/// Events emitted by the search coordinator and its workers.
#[derive(Clone, Debug)]
pub enum Event {
    SearchStarted {
        description: String,
        target: usize,
        workers: usize,
    },
    WorkerStarted {
        worker: usize,
        preview: Vec<u64>,
        stride: u64,
    },
    HitFound {
        worker: usize,
        candidate: String,
    },
    QuorumReached {
        worker: usize,
        hits: usize,
    },
    SearchCancelled {
        hits: usize,
        target: usize,
    },
    SearchCompleted {
        hits: usize,
        tested: u64,
        elapsed_secs: f64,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct EventRecord {
    pub id: u64,
    pub kind: String,
    pub message: String,
    pub elapsed_secs: f64,
}

pub struct EventBus {
    recent: Mutex<VecDeque<EventRecord>>,
    next_id: AtomicU64,
    start: Instant,
}

const RECENT_EVENTS_CAP: usize = 200;

fn elapsed_tag(start: Instant) -> String {
    let secs = start.elapsed().as_secs();
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            recent: Mutex::new(VecDeque::with_capacity(RECENT_EVENTS_CAP)),
            next_id: AtomicU64::new(1),
            start: Instant::now(),
        }
    }

    /// Emit an event. Safe to call from worker threads.
    pub fn emit(&self, event: Event) {
        let elapsed = self.start.elapsed().as_secs_f64();
        let tag = elapsed_tag(self.start);

        match &event {
            Event::SearchStarted {
                description,
                target,
                workers,
            } => {
                info!(%tag, polynomial = %description, target, workers, "search started");
                self.push_record(
                    "search_start",
                    &format!("{} target={} workers={}", description, target, workers),
                    elapsed,
                );
            }
            Event::WorkerStarted {
                worker,
                preview,
                stride,
            } => {
                let listed = preview
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                info!(%tag, worker, stride, "worker will test n={}, ...", listed);
                self.push_record(
                    "worker_start",
                    &format!("[W{}] n={}, ... (stride={})", worker, listed, stride),
                    elapsed,
                );
            }
            Event::HitFound { worker, candidate } => {
                info!(%tag, worker, %candidate, "hit found");
                self.push_record(
                    "hit",
                    &format!("[W{}] root {}", worker, candidate),
                    elapsed,
                );
            }
            Event::QuorumReached { worker, hits } => {
                info!(%tag, worker, hits, "quorum reached, stopping workers");
                self.push_record(
                    "quorum",
                    &format!("[W{}] quorum of {} reached", worker, hits),
                    elapsed,
                );
            }
            Event::SearchCancelled { hits, target } => {
                warn!(%tag, hits, target, "search cancelled before quorum");
                self.push_record(
                    "cancelled",
                    &format!("cancelled with {}/{} hits", hits, target),
                    elapsed,
                );
            }
            Event::SearchCompleted {
                hits,
                tested,
                elapsed_secs,
            } => {
                info!(
                    %tag,
                    hits,
                    tested,
                    elapsed = format_args!("{:.3}s", elapsed_secs),
                    "search finished"
                );
                self.push_record(
                    "search_done",
                    &format!("hits={} tested={} in {:.3}s", hits, tested, elapsed_secs),
                    elapsed,
                );
            }
        }
    }

    /// Most recent events, newest first.
    pub fn recent_events(&self, limit: usize) -> Vec<EventRecord> {
        let events = self.recent.lock().unwrap();
        events.iter().rev().take(limit).cloned().collect()
    }

    /// Every retained event in emission order.
    pub fn history(&self) -> Vec<EventRecord> {
        self.recent.lock().unwrap().iter().cloned().collect()
    }

    fn push_record(&self, kind: &str, message: &str, elapsed: f64) {
        let mut recent = self.recent.lock().unwrap();
        if recent.len() >= RECENT_EVENTS_CAP {
            recent.pop_front();
        }
        recent.push_back(EventRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind: kind.into(),
            message: message.into(),
            elapsed_secs: elapsed,
        });
    }
}
