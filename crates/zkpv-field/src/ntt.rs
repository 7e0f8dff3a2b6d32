//! In-place radix-2 Cooley–Tukey NTT/INTT for Goldilocks.
//!
//! The forward transform maps coefficients → evaluations over a 2^k subgroup
//! (natural order), and the inverse transform maps evaluations → coefficients.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use crate::{goldilocks_primitive_root_2exp, Goldilocks as F};

#[inline]
fn bitrev(mut x: usize, bits: usize) -> usize {
    let mut y = 0usize;
    for _ in 0..bits {
        y = (y << 1) | (x & 1);
        x >>= 1;
    }
    y
}

fn bit_reverse_permute(a: &mut [F]) {
    let n = a.len();
    debug_assert!(n.is_power_of_two());
    let bits = n.trailing_zeros() as usize;
    for i in 0..n {
        let j = bitrev(i, bits);
        if j > i {
            a.swap(i, j);
        }
    }
}

/// Per-stage twiddles: stage `s` (1-based) holds `w_s^i` for `i < 2^(s-1)`,
/// where `w_s` is the primitive `2^s` root (or its inverse).
fn stage_twiddles(n_log2: usize, inverse: bool) -> Vec<Vec<F>> {
    (1..=n_log2)
        .map(|s| {
            let half = 1usize << (s - 1);
            let root = goldilocks_primitive_root_2exp(s as u32);
            let w_len = if inverse { root.inv() } else { root };
            let mut ws = Vec::with_capacity(half);
            let mut w = F::one();
            for _ in 0..half {
                ws.push(w);
                w *= w_len;
            }
            ws
        })
        .collect()
}

/// Shared DIT butterfly network; the direction is fixed by the twiddles.
fn transform(a: &mut [F], inverse: bool) {
    let n = a.len();
    if n <= 1 {
        return;
    }
    assert!(n.is_power_of_two(), "NTT size must be power of two");
    bit_reverse_permute(a);

    let tw = stage_twiddles(n.trailing_zeros() as usize, inverse);
    for (stage, ws) in tw.iter().enumerate() {
        let half = 1usize << stage;
        let len = half << 1;
        for block in a.chunks_exact_mut(len) {
            let (lo, hi) = block.split_at_mut(half);
            for ((u, v), w) in lo.iter_mut().zip(hi.iter_mut()).zip(ws) {
                let t = *v * *w;
                *v = *u - t;
                *u += t;
            }
        }
    }
}

/// Forward NTT in place (coefficients → values). Length must be a power of two.
pub fn forward_ntt_in_place(a: &mut [F]) {
    transform(a, false);
}

/// Inverse NTT in place (values → coefficients). Length must be a power of two.
pub fn inverse_ntt_in_place(a: &mut [F]) {
    let n = a.len();
    transform(a, true);
    if n > 1 {
        let inv_n = F::from_u64(n as u64).inv();
        for x in a.iter_mut() {
            *x *= inv_n;
        }
    }
}

/// Evaluate a polynomial (given by coefficients) on a `2^k` domain using NTT.
/// If `coeffs.len() < 2^k`, it is zero-padded. If `coeffs.len() > 2^k`, it is truncated.
#[must_use]
pub fn evaluate_on_pow2_domain(coeffs: &[F], k_log2: usize) -> Vec<F> {
    let n = 1usize << k_log2;
    let mut buf = vec![F::zero(); n];
    let m = coeffs.len().min(n);
    buf[..m].copy_from_slice(&coeffs[..m]);
    forward_ntt_in_place(&mut buf);
    buf
}

/// Interpolate coefficients from evaluations on a `2^k` domain using INTT.
#[must_use]
pub fn interpolate_from_evals(evals: &[F]) -> Vec<F> {
    let mut buf = evals.to_vec();
    inverse_ntt_in_place(&mut buf);
    buf
}
