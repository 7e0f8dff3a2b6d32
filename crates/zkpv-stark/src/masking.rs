//! Zero-knowledge randomness, sampled by the prover and never by the transcript.
//!
//! Two things are randomized:
//! - every trace column `T` is replaced by `T + Z_H · r` with `Z_H = X^n - 1`
//!   and `r` random, which leaves the values on the trace domain untouched
//!   while making every value opened off that domain uniformly random;
//! - a random mask polynomial `R` of degree below the FRI bound is committed
//!   next to the trace and added to the first FRI layer, hiding the layer
//!   values that are opened without a trace opening at the same point.

use rand::Rng;
use zkpv_field::{ntt::interpolate_from_evals, Goldilocks as F};

/// Uniform field element by rejection from `u64`.
pub fn random_felt<R: Rng + ?Sized>(rng: &mut R) -> F {
    loop {
        if let Some(v) = F::from_canonical_u64(rng.random::<u64>()) {
            return v;
        }
    }
}

/// `k` uniform field elements.
pub fn random_felts<R: Rng + ?Sized>(rng: &mut R, k: usize) -> Vec<F> {
    (0..k).map(|_| random_felt(rng)).collect()
}

/// Coefficients of `T + Z_H · r`, where `T` interpolates `column` over the
/// `n`-point trace domain and `r` has `blinding` random coefficients.
///
/// The result has `n + blinding` coefficients, ascending.
pub fn blind_column<R: Rng + ?Sized>(column: &[F], blinding: usize, rng: &mut R) -> Vec<F> {
    let n = column.len();
    let mut coeffs = interpolate_from_evals(column);
    coeffs.resize(n + blinding, F::zero());
    for (i, r) in random_felts(rng, blinding).into_iter().enumerate() {
        coeffs[i] -= r;
        coeffs[n + i] += r;
    }
    coeffs
}

/// Random mask polynomial with `degree_bound` coefficients.
pub fn mask_poly<R: Rng + ?Sized>(degree_bound: usize, rng: &mut R) -> Vec<F> {
    random_felts(rng, degree_bound)
}
