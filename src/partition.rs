//! # Partition — Stride Split of the Positive Integers
//!
//! Worker `i` of `W` walks the magnitudes `i+1, i+1+W, i+1+2W, ...`. The `W`
//! progressions are pairwise disjoint and together cover every positive
//! integer exactly once. Each magnitude `n` stands for the two candidates
//! `+n` and `-n`, so the union over all workers is every nonzero integer.
//!
//! Magnitudes are `rug::Integer`, so the sequence never wraps or ends.

use anyhow::{bail, Result};
use rug::Integer;

/// The slice of the search space owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    index: usize,
    count: usize,
}

impl Partition {
    /// `count >= 1` and `index < count`.
    pub fn new(index: usize, count: usize) -> Result<Self> {
        if count == 0 {
            bail!("worker count must be at least 1");
        }
        if index >= count {
            bail!("worker index {} out of range for {} workers", index, count);
        }
        Ok(Partition { index, count })
    }

    /// All partitions for `count` workers, in index order.
    pub fn all(count: usize) -> Result<Vec<Partition>> {
        if count == 0 {
            bail!("worker count must be at least 1");
        }
        (0..count).map(|i| Partition::new(i, count)).collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn first(&self) -> u64 {
        self.index as u64 + 1
    }

    pub fn stride(&self) -> u64 {
        self.count as u64
    }

    /// Lazy, infinite, strictly increasing magnitudes. Every call starts over.
    pub fn magnitudes(&self) -> Magnitudes {
        Magnitudes {
            next: Integer::from(self.first()),
            stride: self.stride(),
        }
    }

    /// The first `len` magnitudes, for trace output.
    pub fn preview(&self, len: usize) -> Vec<u64> {
        (0..len as u64)
            .map(|k| self.first() + k * self.stride())
            .collect()
    }
}

/// Iterator over a partition's magnitudes. Never returns `None`.
#[derive(Clone, Debug)]
pub struct Magnitudes {
    next: Integer,
    stride: u64,
}

impl Iterator for Magnitudes {
    type Item = Integer;

    fn next(&mut self) -> Option<Integer> {
        let current = self.next.clone();
        self.next += self.stride;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rejects_zero_workers_and_out_of_range_index() {
        assert!(Partition::new(0, 0).is_err());
        assert!(Partition::new(3, 3).is_err());
        assert!(Partition::new(2, 3).is_ok());
    }

    #[test]
    fn three_workers_interleave() {
        let firsts: Vec<Vec<u64>> = Partition::all(3)
            .unwrap()
            .iter()
            .map(|p| p.magnitudes().take(3).map(|n| n.to_u64().unwrap()).collect())
            .collect();
        assert_eq!(firsts, vec![vec![1, 4, 7], vec![2, 5, 8], vec![3, 6, 9]]);
    }

    #[test]
    fn single_worker_enumerates_every_positive_integer() {
        let p = Partition::new(0, 1).unwrap();
        let got: Vec<u64> = p.magnitudes().take(5).map(|n| n.to_u64().unwrap()).collect();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn partitions_cover_prefix_exactly_once() {
        for w in 1..=9usize {
            let m = 25;
            let mut seen = HashSet::new();
            for p in Partition::all(w).unwrap() {
                for n in p.magnitudes().take(m) {
                    assert!(seen.insert(n.to_u64().unwrap()), "duplicate {} for W={}", n, w);
                }
            }
            let expected: HashSet<u64> = (1..=(m * w) as u64).collect();
            assert_eq!(seen, expected, "W={}", w);
        }
    }

    #[test]
    fn magnitudes_restart_on_each_call() {
        let p = Partition::new(1, 4).unwrap();
        let a: Vec<Integer> = p.magnitudes().take(4).collect();
        let b: Vec<Integer> = p.magnitudes().take(4).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn preview_matches_iterator() {
        let p = Partition::new(2, 5).unwrap();
        let from_iter: Vec<u64> = p.magnitudes().take(3).map(|n| n.to_u64().unwrap()).collect();
        assert_eq!(p.preview(3), from_iter);
        assert_eq!(p.preview(3), vec![3, 8, 13]);
    }

    #[test]
    fn magnitudes_grow_past_u64() {
        let mut it = Magnitudes {
            next: Integer::from(u64::MAX),
            stride: 2,
        };
        assert_eq!(it.next().unwrap(), u64::MAX);
        let after = it.next().unwrap();
        assert!(after > u64::MAX);
        assert_eq!(after, Integer::from(u64::MAX) + 2u32);
    }
}
