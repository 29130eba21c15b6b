//! External cancellation for searches that may never reach their quorum.
//!
//! The core search has no timeout. Callers that need a bounded run pass a
//! [`StopSource`](crate::StopSource) in the search options; workers poll it
//! alongside the termination flag and leave through the same exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::StopSource;

/// Manually triggered stop, e.g. from a signal handler or another thread.
#[derive(Debug, Default)]
pub struct StopFlag {
    requested: AtomicBool,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }
}

impl StopSource for StopFlag {
    fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// Stop once a wall-clock deadline has passed.
///
/// A timeout too large to represent as an `Instant` never expires.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Deadline {
            at: Instant::now().checked_add(timeout),
        }
    }

    pub fn at(at: Instant) -> Self {
        Deadline { at: Some(at) }
    }

    pub fn remaining(&self) -> Duration {
        match self.at {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }
}

impl StopSource for Deadline {
    fn is_stop_requested(&self) -> bool {
        match self.at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn flag_starts_clear_and_latches() {
        let f = StopFlag::new();
        assert!(!f.is_stop_requested());
        f.request();
        f.request();
        assert!(f.is_stop_requested());
    }

    #[test]
    fn flag_is_visible_across_threads() {
        let f = Arc::new(StopFlag::new());
        let f2 = Arc::clone(&f);
        let handle = thread::spawn(move || {
            while !f2.is_stop_requested() {
                thread::sleep(Duration::from_millis(1));
            }
        });
        thread::sleep(Duration::from_millis(10));
        f.request();
        handle.join().unwrap();
    }

    #[test]
    fn expired_deadline_requests_stop() {
        let d = Deadline::after(Duration::ZERO);
        assert!(d.is_stop_requested());
        assert_eq!(d.remaining(), Duration::ZERO);
    }

    #[test]
    fn future_deadline_does_not_request_stop() {
        let d = Deadline::after(Duration::from_secs(3600));
        assert!(!d.is_stop_requested());
        assert!(d.remaining() > Duration::from_secs(3500));
    }

    #[test]
    fn unrepresentable_deadline_never_expires() {
        let d = Deadline::after(Duration::MAX);
        assert!(!d.is_stop_requested());
        assert_eq!(d.remaining(), Duration::MAX);
    }
}
