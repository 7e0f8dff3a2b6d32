//! Prover: trace → blinded commitment → composition quotient → FRI → openings.
//!
//! Transcript schedule (the verifier replays it verbatim):
//! 1. statement: circuit id, shape, parameters, public vector
//! 2. root over the blinded trace columns and the mask column
//! 3. composition coefficients, then one combination weight per trace column
//! 4. FRI layer roots, each followed by its folding challenge, then the final constant
//! 5. query positions over the LDE coset
//!
//! The first FRI layer is `Q + Σ γ_j T'_j + R`: the composition quotient,
//! the blinded trace columns and the mask. Every query opens the committed
//! columns at `x` and `ω·x`, both on the LDE coset and never on the trace
//! domain, so the verifier can recompute that layer value itself.

use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;
use tracing::{debug, info, info_span};
use zkpv_core::{
    BoundWitness, CancellationToken, CircuitId, ProofArtifact, ProverKey, PublicInputVector,
    StarkParams, ZkError, ZkResult,
};
use zkpv_crypto::{Label, Transcript};
use zkpv_field::Goldilocks as F;

use crate::air::{check_constraints, quotient_on_lde, Air, Alphas, TraceTable};
use crate::circuits::instantiate;
use crate::fri::{fri_commit, FriCommitment};
use crate::lde::{coset_lde, FixedColumns};
use crate::masking::{blind_column, mask_poly};
use crate::merkle::RowCommit;
use crate::params::{self, ProofShape};
use crate::proof::{ProofBody, QueryOpening};

/// Labels of the committed columns: the AIR's, then the mask.
#[must_use]
pub fn committed_labels<A: Air + ?Sized>(air: &A) -> Vec<String> {
    let mut labels = air.column_labels();
    labels.push(params::MASK_LABEL.to_owned());
    labels
}

/// Blind every trace column, sample the mask, and commit both on the LDE coset.
pub fn commit_trace<A: Air + ?Sized, R: Rng + ?Sized>(
    air: &A,
    trace: &TraceTable,
    shape: &ProofShape,
    rng: &mut R,
) -> RowCommit {
    let mut columns: Vec<Vec<F>> = trace
        .columns()
        .map(|c| coset_lde(&blind_column(c, shape.blinding, rng), shape))
        .collect();
    columns.push(coset_lde(&mask_poly(shape.quotient_degree, rng), shape));
    RowCommit::new(&committed_labels(air), columns, shape.chunk_log2)
}

/// First FRI layer: quotient plus the weighted trace columns plus the mask.
#[must_use]
pub fn combine_layer0(quotient: &[F], commit: &RowCommit, gammas: &[F]) -> Vec<F> {
    let mask = commit.column(commit.width() - 1);
    (0..quotient.len())
        .map(|i| {
            gammas
                .iter()
                .zip(commit.columns())
                .fold(quotient[i] + mask[i], |acc, (&g, col)| acc + g * col[i])
        })
        .collect()
}

/// Openings for the query at LDE position `pos`.
#[must_use]
pub fn open_query(commit: &RowCommit, fri: &FriCommitment, shape: &ProofShape, pos: usize) -> QueryOpening {
    QueryOpening {
        position: pos,
        cur: commit.open(pos),
        next: commit.open(shape.next_position(pos)),
        fri: fri.open(pos),
    }
}

/// Build the proof body for a trace already known to satisfy `air`.
pub fn prove_trace<A: Air + ?Sized, R: Rng + ?Sized>(
    air: &A,
    circuit_id: CircuitId,
    sp: &StarkParams,
    trace: &TraceTable,
    public: &[F],
    rng: &mut R,
    cancel: &CancellationToken,
) -> ZkResult<ProofBody> {
    let n = trace.n_rows();
    let width = trace.width();
    let shape = ProofShape::new(n, air.constraint_degree(), sp);
    let mut tr = params::statement_transcript(circuit_id, sp, n, width, public);

    let commit = commit_trace(air, trace, &shape, rng);
    tr.absorb(Label::TraceRoot.as_str(), &commit.root());
    info!(
        columns = commit.width(),
        lde_size = shape.lde_size(),
        blinding = shape.blinding,
        "trace committed"
    );
    cancel.check()?;

    let alphas = Alphas::derive(&mut tr);
    let gammas = params::derive_field_elems(&mut tr, Label::Combine, width);
    let fixed = FixedColumns::new(&air.fixed_columns()).lde(&shape);
    let quotient = quotient_on_lde(air, &shape, &commit.columns()[..width], &fixed, public, &alphas);
    let layer0 = combine_layer0(&quotient, &commit, &gammas);
    debug!(quotient_degree = shape.quotient_degree, "composition quotient ready");
    cancel.check()?;

    let fri = fri_commit(&mut tr, layer0, &shape);
    if !fri.final_is_constant() {
        return Err(ZkError::ProvingFailed(
            "composition quotient exceeds its degree bound".into(),
        ));
    }
    let fri_roots = fri.roots();
    info!(layers = fri_roots.len(), "FRI committed");
    cancel.check()?;

    let positions = params::derive_indices(&mut tr, Label::FriQueries, shape.lde_size(), shape.queries);
    let queries = positions
        .iter()
        .map(|&pos| open_query(&commit, &fri, &shape, pos))
        .collect();
    Ok(ProofBody {
        version: params::PROOF_VERSION,
        n_rows: n as u64,
        trace_root: commit.root(),
        fri_roots,
        fri_final_le: fri.final_value().to_le_bytes(),
        queries,
    })
}

/// Prove `witness` under `pk` with fresh OS randomness.
pub fn prove(
    pk: &ProverKey,
    witness: &BoundWitness,
    cancel: &CancellationToken,
) -> ZkResult<(ProofArtifact, PublicInputVector)> {
    prove_with_rng(pk, witness, cancel, &mut StdRng::from_os_rng())
}

/// Prove `witness` under `pk`, drawing the blinding and mask from `rng`.
pub fn prove_with_rng<R: Rng + ?Sized>(
    pk: &ProverKey,
    witness: &BoundWitness,
    cancel: &CancellationToken,
    rng: &mut R,
) -> ZkResult<(ProofArtifact, PublicInputVector)> {
    if witness.circuit_id() != pk.circuit_id() {
        return Err(ZkError::KeyMismatch(format!(
            "witness bound against circuit {} but prover key is for {}",
            witness.circuit_id(),
            pk.circuit_id()
        )));
    }
    let descriptor = *pk.descriptor();
    let sp = *pk.params();
    let _span = info_span!("stark.prove", circuit = %descriptor).entered();
    let started = Instant::now();

    let circuit = instantiate(&descriptor);
    let trace = circuit.generate_trace(witness)?;
    let public = circuit.public_vector(witness, &trace)?;
    check_constraints(circuit.as_ref(), &trace, &public)?;
    info!(rows = trace.n_rows(), width = trace.width(), "trace generated");
    cancel.check()?;

    let body = prove_trace(circuit.as_ref(), pk.circuit_id(), &sp, &trace, &public, rng, cancel)?;
    let proof_bytes = body
        .to_bytes()
        .map_err(|e| ZkError::ProvingFailed(format!("proof encoding failed: {e}")))?;
    if proof_bytes.is_empty() {
        return Err(ZkError::ProvingFailed("proof encoded to zero bytes".into()));
    }

    let shape = ProofShape::new(trace.n_rows(), circuit.constraint_degree(), &sp);
    let meta = json!({
        "backend": "stark",
        "version": params::PROOF_VERSION,
        "circuit": descriptor.to_string(),
        "rows": shape.n,
        "lde_size": shape.lde_size(),
        "num_queries": shape.queries,
        "fri_layers": body.fri_layers(),
    });
    info!(
        bytes = proof_bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "proof ready"
    );
    Ok((
        ProofArtifact::new(pk.circuit_id(), proof_bytes, meta),
        PublicInputVector::new(public),
    ))
}
