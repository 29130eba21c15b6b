//! # Ticker — Labeled Periodic Background Announcer
//!
//! Runs a callback every `period` on a dedicated thread until stopped. The
//! stop signal is a `Mutex<bool>` paired with a `Condvar`, so `stop()` wakes
//! a sleeping ticker immediately instead of waiting out the period, and the
//! thread is always joined rather than left for process exit to reap.

use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

struct Signal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

pub struct Ticker {
    label: String,
    signal: Arc<Signal>,
    handle: Option<thread::JoinHandle<u64>>,
}

impl Ticker {
    /// Start a ticker. `on_tick` receives the label and the time elapsed since
    /// the ticker started; it is first called one full period after spawn.
    pub fn spawn<F>(label: impl Into<String>, period: Duration, mut on_tick: F) -> Ticker
    where
        F: FnMut(&str, Duration) + Send + 'static,
    {
        let label = label.into();
        let signal = Arc::new(Signal {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        });
        let thread_signal = Arc::clone(&signal);
        let thread_label = label.clone();
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let mut ticks = 0u64;
            let mut next = start + period;
            let mut stopped = thread_signal.stopped.lock().unwrap();
            loop {
                if *stopped {
                    break;
                }
                let now = Instant::now();
                if now < next {
                    let (guard, _) = thread_signal
                        .wake
                        .wait_timeout(stopped, next - now)
                        .unwrap();
                    stopped = guard;
                    continue;
                }
                drop(stopped);
                on_tick(&thread_label, start.elapsed());
                ticks += 1;
                next += period;
                stopped = thread_signal.stopped.lock().unwrap();
            }
            ticks
        });
        Ticker {
            label,
            signal,
            handle: Some(handle),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Signal the thread, join it, and return how many ticks fired.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        *self.signal.stopped.lock().unwrap() = true;
        self.signal.wake.notify_all();
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or(0),
            None => 0,
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}
