//! Protocol constants, proof geometry and transcript challenge helpers.
//!
//! Tunable knobs (blowup, query count, chunk size) travel inside the keys as
//! [`zkpv_core::StarkParams`]; what lives here is fixed by the protocol or
//! derived from those knobs and the AIR.

use zkpv_core::{CircuitId, StarkParams};
use zkpv_crypto::{Blake3Transcript, Label, Transcript};
use zkpv_field::{coset::DEFAULT_SHIFT, goldilocks_primitive_root_2exp, Goldilocks as F};

/// Top-level protocol domain string.
pub const DS_DOMAIN: &str = "zkpv-stark/v2";

/// Domain separator for trace row leaf hashing.
pub const DS_ROW_LEAF: &str = "zkpv/row_leaf";

/// Domain separator for FRI leaf hashing.
pub const DS_FRI_LEAF: &str = "zkpv/fri_leaf";

/// Proof body format version.
pub const PROOF_VERSION: u16 = 2;

/// Label of the committed mask column, appended after the trace columns.
pub const MASK_LABEL: &str = "zk/mask";

/// Coset shift for the LDE domain.
#[must_use]
pub fn coset_shift() -> F {
    F::from_u64(DEFAULT_SHIFT)
}

/// Sizes every prover and verifier step agrees on.
///
/// The trace of `n` rows is blinded with `blinding` random coefficients per
/// column (two openings per query, so every opened value is masked). The
/// composition quotient then has degree below `quotient_degree`, which FRI
/// folds down to a constant over an LDE of `quotient_degree << blowup_log2`
/// points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofShape {
    /// Trace rows.
    pub n: usize,
    /// Random coefficients added to each column.
    pub blinding: usize,
    /// Power-of-two bound on the degree of the FRI input.
    pub quotient_degree: usize,
    /// `log2` of the LDE size.
    pub lde_log2: usize,
    /// FRI folding rounds.
    pub folds: usize,
    /// FRI query count.
    pub queries: usize,
    /// Requested commitment chunk size (`log2`).
    pub chunk_log2: usize,
}

impl ProofShape {
    /// Geometry for an `n`-row trace whose constraints have total degree
    /// `constraint_degree` in the trace values.
    #[must_use]
    pub fn new(n: usize, constraint_degree: usize, params: &StarkParams) -> Self {
        let queries = params.num_queries as usize;
        let blinding = 2 * queries;
        let quotient_degree = (constraint_degree.max(1) * (n + blinding)).next_power_of_two();
        let folds = quotient_degree.trailing_zeros() as usize;
        Self {
            n,
            blinding,
            quotient_degree,
            lde_log2: folds + params.blowup_log2 as usize,
            folds,
            queries,
            chunk_log2: params.col_chunk_log2 as usize,
        }
    }

    /// LDE size.
    #[must_use]
    pub const fn lde_size(&self) -> usize {
        1 << self.lde_log2
    }

    /// Index step from an LDE point `x` to `ω·x`, where `ω` generates the trace domain.
    #[must_use]
    pub const fn next_offset(&self) -> usize {
        self.lde_size() / self.n
    }

    /// Position of `ω·x` for the LDE point at `i`.
    #[must_use]
    pub const fn next_position(&self, i: usize) -> usize {
        (i + self.next_offset()) % self.lde_size()
    }

    /// Generator of the `n`-point trace domain.
    #[must_use]
    pub fn trace_generator(&self) -> F {
        goldilocks_primitive_root_2exp(self.n.trailing_zeros())
    }

    /// Generator of the LDE subgroup.
    #[must_use]
    pub fn lde_generator(&self) -> F {
        goldilocks_primitive_root_2exp(self.lde_log2 as u32)
    }

    /// LDE point `shift · w^i`.
    #[must_use]
    pub fn point(&self, i: usize) -> F {
        coset_shift() * self.lde_generator().pow(i as u64)
    }
}

/// Fresh transcript with the statement bound: circuit, shape, parameters and
/// the public vector. Prover and verifier both start here.
#[must_use]
pub fn statement_transcript(
    circuit_id: CircuitId,
    params: &StarkParams,
    n_rows: usize,
    width: usize,
    public: &[F],
) -> Blake3Transcript {
    let mut tr = Blake3Transcript::new(DS_DOMAIN);
    tr.absorb(Label::CircuitId.as_str(), circuit_id.as_bytes());
    tr.absorb_u64_slice(
        Label::Params.as_str(),
        &[
            n_rows as u64,
            width as u64,
            u64::from(params.blowup_log2),
            u64::from(params.num_queries),
            u64::from(params.col_chunk_log2),
        ],
    );
    let public_u64: Vec<u64> = public.iter().map(|v| v.as_canonical_u64()).collect();
    tr.absorb_u64_slice(Label::PublicInputs.as_str(), &public_u64);
    tr
}

/// Draw `k` field elements under `label`.
#[must_use]
pub fn derive_field_elems<T: Transcript>(tr: &mut T, label: Label, k: usize) -> Vec<F> {
    tr.challenge_u64s(label.as_str(), k)
        .into_iter()
        .map(F::from_u64)
        .collect()
}

/// Draw `k` indices in `[0, n)` under `label`.
///
/// # Panics
/// Panics if `n` is zero.
#[must_use]
pub fn derive_indices<T: Transcript>(tr: &mut T, label: Label, n: usize, k: usize) -> Vec<usize> {
    assert!(n > 0, "index domain must be non-empty");
    tr.challenge_u64s(label.as_str(), k)
        .into_iter()
        .map(|v| (v % n as u64) as usize)
        .collect()
}
