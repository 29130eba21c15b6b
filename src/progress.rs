//! # Progress — Atomic Search Progress Counters
//!
//! Thread-safe progress shared between search workers and the background
//! status reporter. Workers add to `tested` in small batches and bump
//! `found` on each committed hit; the reporter reads both without locking.
//!
//! ## Background Reporter
//!
//! `start_reporter` runs a [`Ticker`] that logs tested count, hits found and
//! rate at a fixed interval. Stopping the returned ticker ends it at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::ticker::Ticker;

pub struct Progress {
    pub tested: AtomicU64,
    pub found: AtomicU64,
    start: Instant,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            tested: AtomicU64::new(0),
            found: AtomicU64::new(0),
            start: Instant::now(),
        })
    }

    pub fn start_reporter(self: &Arc<Self>, interval: Duration) -> Ticker {
        let progress = Arc::clone(self);
        Ticker::spawn("progress", interval, move |_, _| progress.print_status())
    }

    /// Candidates tested per second since creation, 0.0 before the first second.
    pub fn rate(&self) -> f64 {
        let elapsed = self.start.elapsed();
        if elapsed.as_secs() > 0 {
            self.tested.load(Ordering::Relaxed) as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let tested = self.tested.load(Ordering::Relaxed);
        let found = self.found.load(Ordering::Relaxed);
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        info!(
            tested,
            rate = format_args!("{:.2}", self.rate()),
            found,
            elapsed = format_args!("{:02}:{:02}:{:02}", h, m, s),
            "search progress"
        );
    }
}
