//! Polynomial plumbing between the trace domain and the LDE coset.
//!
//! Committed columns arrive as coefficients (already blinded) and are
//! evaluated on the coset `shift · ⟨w⟩` of [`ProofShape::lde_size`] points.
//! Fixed columns are public: the prover evaluates them on the coset and the
//! verifier evaluates them at the handful of queried points directly.

use zkpv_field::{coset::evaluate_on_coset_pow2, ntt::interpolate_from_evals, Goldilocks as F};

use crate::params::{coset_shift, ProofShape};

/// Horner evaluation of ascending coefficients.
#[must_use]
pub fn horner(coeffs: &[F], x: F) -> F {
    coeffs.iter().rev().fold(F::zero(), |acc, &c| acc * x + c)
}

/// Evaluations of `coeffs` on the LDE coset, natural order.
#[must_use]
pub fn coset_lde(coeffs: &[F], shape: &ProofShape) -> Vec<F> {
    debug_assert!(coeffs.len() <= shape.lde_size());
    evaluate_on_coset_pow2(coeffs, shape.lde_log2, coset_shift())
}

/// Public columns known to both sides, kept in coefficient form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedColumns {
    coeffs: Vec<Vec<F>>,
}

impl FixedColumns {
    /// Interpolate each column over the trace domain.
    #[must_use]
    pub fn new(columns: &[Vec<F>]) -> Self {
        Self {
            coeffs: columns.iter().map(|c| interpolate_from_evals(c)).collect(),
        }
    }

    /// Number of fixed columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// No fixed columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Every column at `x`.
    #[must_use]
    pub fn eval(&self, x: F) -> Vec<F> {
        self.coeffs.iter().map(|c| horner(c, x)).collect()
    }

    /// Every column over the LDE coset.
    #[must_use]
    pub fn lde(&self, shape: &ProofShape) -> Vec<Vec<F>> {
        self.coeffs.iter().map(|c| coset_lde(c, shape)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkpv_core::StarkParams;

    #[test]
    fn coset_lde_matches_pointwise_horner() {
        let shape = ProofShape::new(4, 1, &StarkParams {
            blowup_log2: 1,
            num_queries: 2,
            col_chunk_log2: 2,
        });
        let coeffs: Vec<F> = [5u64, 0, 7, 1, 9].iter().map(|&c| F::from_u64(c)).collect();
        let evals = coset_lde(&coeffs, &shape);
        assert_eq!(evals.len(), shape.lde_size());
        for (i, &v) in evals.iter().enumerate() {
            assert_eq!(v, horner(&coeffs, shape.point(i)), "i={i}");
        }
    }

    #[test]
    fn fixed_columns_agree_on_the_coset_and_pointwise() {
        let shape = ProofShape::new(8, 1, &StarkParams::default());
        let col: Vec<F> = (0..8u64).map(|i| F::from_u64(1000 + 3 * i)).collect();
        let fixed = FixedColumns::new(&[col]);
        assert_eq!(fixed.len(), 1);
        let lde = fixed.lde(&shape);
        for i in [0, 1, 17, shape.lde_size() - 1] {
            assert_eq!(fixed.eval(shape.point(i)), vec![lde[0][i]]);
        }
        assert!(FixedColumns::default().is_empty());
    }
}
