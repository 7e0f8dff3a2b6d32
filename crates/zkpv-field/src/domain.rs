//! Evaluation-domain helpers for the Goldilocks field.
//!
//! Size-`2^k` multiplicative subgroups use the fixed generator `g = 7` and
//! `ω_k = g^((p-1)/2^k)`, which has exact order `2^k` (2-adicity 32).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use crate::{goldilocks_primitive_root_2exp, Goldilocks as F};

/// A power-of-two multiplicative subgroup domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pow2Domain {
    /// `log2(size)`.
    pub log_size: usize,
    /// Domain size (`2^k`).
    pub size: usize,
    /// A generator of the size-`size` subgroup.
    pub gen: F,
}

impl Pow2Domain {
    /// Return the `i`-th element: `gen^i`.
    #[inline]
    #[must_use]
    pub fn element(&self, i: usize) -> F {
        self.gen.pow(i as u64)
    }

    /// All elements in order, computed incrementally.
    pub fn elements(&self) -> impl Iterator<Item = F> + '_ {
        let gen = self.gen;
        (0..self.size).scan(F::one(), move |cur, _| {
            let out = *cur;
            *cur *= gen;
            Some(out)
        })
    }

    /// Whether `x` lies in the subgroup (`x^size == 1`).
    #[must_use]
    pub fn contains(&self, x: F) -> bool {
        x.pow(self.size as u64) == F::one()
    }
}

/// Compute a `2^k` domain for Goldilocks. `1 <= k <= 32`.
///
/// # Panics
/// Panics if `k` is outside `1..=32`.
#[must_use]
pub fn pow2_domain(k: usize) -> Pow2Domain {
    assert!((1..=32).contains(&k), "k must be in 1..=32 for Goldilocks");
    let w_k = goldilocks_primitive_root_2exp(k as u32);
    debug_assert_eq!(w_k.pow(1u64 << k), F::one(), "ω^(2^k) should be 1");
    debug_assert_ne!(
        w_k.pow(1u64 << (k - 1)),
        F::one(),
        "ω should have exact order 2^k"
    );
    Pow2Domain {
        log_size: k,
        size: 1usize << k,
        gen: w_k,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_iterator_matches_element() {
        let d = pow2_domain(5);
        for (i, x) in d.elements().enumerate() {
            assert_eq!(x, d.element(i));
            assert!(d.contains(x));
        }
        assert!(!d.contains(F::from_u64(3)));
    }
}
