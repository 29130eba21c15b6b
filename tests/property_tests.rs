//! Property-based tests for the partitioner, the evaluator and the quorum
//! search.
//!
//! These use `proptest` to check invariants across randomly generated
//! inputs rather than a handful of fixed examples.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//! PROPTEST_CASES=2000 cargo test --test property_tests
//! ```
//!
//! # Testing strategy
//!
//! - **Partition**: disjoint coverage of `1..=M*W` for every `W`.
//! - **Polynomial**: Horner evaluation agrees with the term-by-term sum.
//! - **Search**: for a polynomial built from known distinct nonzero roots,
//!   any target up to the root count yields exactly that many roots, all
//!   genuine, regardless of worker count.
//!
//! Search properties spawn threads per case, so they run fewer cases.

use proptest::prelude::*;
use rootquorum::partition::Partition;
use rootquorum::{find_integer_roots, Polynomial};
use rug::ops::Pow;
use rug::Integer;
use std::collections::BTreeSet;

/// Expand `(x - r1)(x - r2)...` into coefficients, highest degree first.
fn from_roots(roots: &[i64]) -> Polynomial {
    let mut coeffs = vec![Integer::from(1)];
    for &r in roots {
        let mut next = vec![Integer::new(); coeffs.len() + 1];
        for (i, c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= Integer::from(c * r);
        }
        coeffs = next;
    }
    Polynomial::new(coeffs).unwrap()
}

// == Partition =================================================================

proptest! {
    /// The first M magnitudes of all W partitions are exactly {1, ..., M*W}.
    #[test]
    fn prop_partitions_cover_prefix_disjointly(
        w in 1usize..=16,
        m in 1usize..=40,
    ) {
        let mut seen = BTreeSet::new();
        for p in Partition::all(w).unwrap() {
            for n in p.magnitudes().take(m) {
                let n = n.to_u64().unwrap();
                prop_assert!(seen.insert(n), "magnitude {} produced twice (W={})", n, w);
            }
        }
        let expected: BTreeSet<u64> = (1..=(m * w) as u64).collect();
        prop_assert_eq!(seen, expected);
    }

    /// Each partition is strictly increasing with constant stride W.
    #[test]
    fn prop_partition_is_arithmetic_progression(
        w in 1usize..=16,
        idx in 0usize..16,
    ) {
        prop_assume!(idx < w);
        let p = Partition::new(idx, w).unwrap();
        let firsts: Vec<u64> = p.magnitudes().take(10).map(|n| n.to_u64().unwrap()).collect();
        prop_assert_eq!(firsts[0], idx as u64 + 1);
        for pair in firsts.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], w as u64);
        }
    }
}

// == Polynomial ================================================================

proptest! {
    /// Horner's rule equals sum(c_i * x^(d-i)) for arbitrary coefficients.
    #[test]
    fn prop_evaluate_matches_term_sum(
        coeffs in prop::collection::vec(-1_000_000i64..1_000_000, 2..8),
        x in -10_000i64..10_000,
    ) {
        let p = Polynomial::from_i64(&coeffs).unwrap();
        let x = Integer::from(x);
        let degree = coeffs.len() - 1;
        let mut expected = Integer::new();
        for (i, &c) in coeffs.iter().enumerate() {
            expected += Integer::from(c) * x.clone().pow((degree - i) as u32);
        }
        prop_assert_eq!(p.evaluate(&x), expected);
    }

    /// Every root used to build a polynomial is reported as a root.
    #[test]
    fn prop_constructed_roots_are_roots(
        roots in prop::collection::vec(-500i64..500, 1..6),
    ) {
        let p = from_roots(&roots);
        prop_assert_eq!(p.degree(), roots.len());
        prop_assert!(p.is_monic());
        for &r in &roots {
            prop_assert!(p.is_root(&Integer::from(r)));
        }
    }

    /// Parsing the decimal rendering of coefficients gives back the polynomial.
    #[test]
    fn prop_parse_csv_of_coefficients(
        coeffs in prop::collection::vec(any::<i64>(), 2..8),
    ) {
        let csv = coeffs.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",");
        let parsed = Polynomial::parse(&csv).unwrap();
        prop_assert_eq!(parsed, Polynomial::from_i64(&coeffs).unwrap());
    }
}

// == Search ====================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Quorum exactness: k <= #roots yields exactly k genuine roots.
    #[test]
    fn prop_search_returns_exactly_target_roots(
        roots in prop::collection::btree_set((-40i64..=40).prop_filter("nonzero", |r| *r != 0), 1..5),
        k_frac in 0.0f64..=1.0,
        w_pow in 0u32..4,
    ) {
        let roots: Vec<i64> = roots.into_iter().collect();
        let k = ((roots.len() as f64) * k_frac).round() as usize;
        let w = 1usize << w_pow;
        let p = from_roots(&roots);

        let found = find_integer_roots(&p, k, w).unwrap();
        prop_assert_eq!(found.len(), k);
        let known: BTreeSet<i64> = roots.iter().copied().collect();
        let distinct: BTreeSet<i64> = found.iter().map(|h| h.to_i64().unwrap()).collect();
        prop_assert_eq!(distinct.len(), k, "duplicate root in {:?}", found);
        prop_assert!(distinct.is_subset(&known));
    }

    /// When the target equals the root count, the returned set is the full set.
    #[test]
    fn prop_search_full_target_finds_all_roots(
        roots in prop::collection::btree_set((-30i64..=30).prop_filter("nonzero", |r| *r != 0), 1..5),
        w in 1usize..=8,
    ) {
        let p = from_roots(&roots.iter().copied().collect::<Vec<_>>());
        let found = find_integer_roots(&p, roots.len(), w).unwrap();
        let got: BTreeSet<i64> = found.iter().map(|h| h.to_i64().unwrap()).collect();
        prop_assert_eq!(got, roots);
    }
}
