//! # rootquorum
//!
//! Concurrent search for integer roots of a polynomial. The positive
//! magnitudes are split into stride partitions, one per worker thread; each
//! worker tests `+n` and `-n` with exact big-integer arithmetic and commits
//! hits to a shared, capacity-bounded result set. The commit that fills the
//! set stops every worker.
//!
//! The kernel in [`search`] is generic over any [`search::Evaluator`], so the
//! same quorum machinery serves arbitrary predicates over the integers.

pub mod config;
pub mod events;
pub mod parallel;
pub mod partition;
pub mod polynomial;
pub mod progress;
pub mod search;
pub mod stop;
pub mod ticker;

pub use polynomial::{Polynomial, Preset};
pub use search::{find_integer_roots, run, SearchOptions, SearchOutcome};

/// External cancellation source polled by search workers.
/// Search functions accept `Option<&dyn StopSource>` through [`SearchOptions`].
pub trait StopSource: Send + Sync {
    fn is_stop_requested(&self) -> bool;
}

/// Render integers as `[a, b, c]`.
pub fn format_list(values: &[rug::Integer]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rug::Integer;

    #[test]
    fn format_list_renders_signed_values() {
        let v = vec![Integer::from(3), Integer::from(-2), Integer::from(1000)];
        assert_eq!(format_list(&v), "[3, -2, 1000]");
        assert_eq!(format_list(&[]), "[]");
    }
}
