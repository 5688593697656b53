//! Uniform permutation source for winner selection.
//!
//! Winner selection draws the first `k` entries of a uniform random
//! permutation of all participants. The permutation must be unbiased, so
//! the default source shuffles with [`rand`]'s Fisher–Yates
//! implementation. Sort-based shuffles with a coarse random comparator
//! are measurably biased and must not be used here.

use std::fmt;

use rand::seq::SliceRandom;

/// Supplier of uniformly distributed permutations.
///
/// Implementations must return each of the `n!` orderings of
/// `0..n` with equal probability.
pub trait RandomSource: Send + Sync + fmt::Debug {
    /// Returns a uniform random permutation of the indices `0..n`.
    fn permutation(&self, n: usize) -> Vec<usize>;
}

/// Default [`RandomSource`] backed by the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn permutation(&self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rand::thread_rng());
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_contains_every_index_once() {
        let source = ThreadRngSource;
        let mut perm = source.permutation(32);
        assert_eq!(perm.len(), 32);
        perm.sort_unstable();
        let expected: Vec<usize> = (0..32).collect();
        assert_eq!(perm, expected);
    }

    #[test]
    fn empty_and_singleton_permutations() {
        let source = ThreadRngSource;
        assert!(source.permutation(0).is_empty());
        assert_eq!(source.permutation(1), vec![0]);
    }

    #[test]
    fn permutations_vary() {
        // 20! orderings; 50 identical draws in a row would indicate a
        // constant source.
        let source = ThreadRngSource;
        let first = source.permutation(20);
        let varied = (0..50).any(|_| source.permutation(20) != first);
        assert!(varied);
    }
}
