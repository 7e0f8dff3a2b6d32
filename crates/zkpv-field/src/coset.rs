//! Multiplicative cosets of power-of-two subgroup domains (Goldilocks).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use crate::ntt::forward_ntt_in_place;
use crate::{domain::Pow2Domain, pow2_domain, Goldilocks as F};

/// Default coset shift; `3` is not in any power-of-two subgroup of Goldilocks.
pub const DEFAULT_SHIFT: u64 = 3;

/// A multiplicative coset `C = shift · ⟨gen⟩` of a power-of-two subgroup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CosetDomain {
    /// Base `2^k` subgroup domain.
    pub base: Pow2Domain,
    /// Shift (coset representative), chosen outside the subgroup.
    pub shift: F,
}

impl CosetDomain {
    /// Coset of the `2^k` subgroup with the default shift.
    #[must_use]
    pub fn new(k_log2: usize) -> Self {
        Self {
            base: pow2_domain(k_log2),
            shift: F::from_u64(DEFAULT_SHIFT),
        }
    }

    /// Number of elements in the coset (same as base).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.base.size
    }

    /// `i`-th element: `shift * base.element(i)`.
    #[inline]
    #[must_use]
    pub fn element(&self, i: usize) -> F {
        self.shift * self.base.element(i)
    }

    /// Whether `x` lies on the coset, i.e. `(x / shift)^size == 1`.
    #[must_use]
    pub fn contains(&self, x: F) -> bool {
        self.base.contains(x * self.shift.inv())
    }
}

/// Evaluate a polynomial (given by coefficients) on a coset of size `2^k`.
///
/// `f(shift·x)` at subgroup points `x` equals the NTT of the coefficients
/// scaled by `shift^j`. Coefficients beyond `2^k` are truncated.
#[must_use]
pub fn evaluate_on_coset_pow2(coeffs: &[F], k_log2: usize, shift: F) -> Vec<F> {
    let n = 1usize << k_log2;
    let mut scaled = vec![F::zero(); n];
    let mut pow = F::one();
    for (dst, &c) in scaled.iter_mut().zip(coeffs) {
        *dst = c * pow;
        pow *= shift;
    }
    forward_ntt_in_place(&mut scaled);
    scaled
}
