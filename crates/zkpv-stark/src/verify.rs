//! Verifier: replays the transcript and checks openings, the quotient and FRI.
//!
//! Structural mismatches between the key, the artifact header and the public
//! vector are errors (`KeyMismatch`). Everything about the proof body itself
//! (decoding, Merkle paths, quotient values, query positions, FRI folds)
//! yields `Ok(false)`, with the reason logged at `warn`.

use anyhow::{anyhow, ensure, Context, Result};
use tracing::{debug, info_span, warn};
use zkpv_core::{ProofArtifact, PublicInputVector, VerifierKey, ZkError, ZkResult};
use zkpv_crypto::{Label, Transcript};
use zkpv_field::Goldilocks as F;

use crate::air::{quotient_at, Air, Alphas};
use crate::circuits::instantiate;
use crate::fri::{fri_replay, fri_verify_query};
use crate::lde::FixedColumns;
use crate::merkle::{labels_digest, verify_row_opening, ChunkShape, Digest};
use crate::params::{self, ProofShape};
use crate::prover::committed_labels;
use crate::proof::{decode_felt, Opening, ProofBody};

/// Verify `artifact` against `vk` and `public`.
pub fn verify(vk: &VerifierKey, artifact: &ProofArtifact, public: &PublicInputVector) -> ZkResult<bool> {
    let descriptor = *vk.descriptor();
    let _span = info_span!("stark.verify", circuit = %descriptor).entered();

    if artifact.circuit_id() != vk.circuit_id() {
        return Err(ZkError::KeyMismatch(format!(
            "artifact is for circuit {} but verifier key is for {}",
            artifact.circuit_id(),
            vk.circuit_id()
        )));
    }
    let circuit = instantiate(&descriptor);
    if public.len() != circuit.public_len() {
        return Err(ZkError::KeyMismatch(format!(
            "{descriptor} expects {} public values, got {}",
            circuit.public_len(),
            public.len()
        )));
    }

    let outcome = ProofBody::from_bytes(artifact.bytes())
        .context("proof body does not decode")
        .and_then(|body| check_body(vk, circuit.as_ref(), &body, public.as_slice()));
    match outcome {
        Ok(()) => {
            debug!("proof accepted");
            Ok(true)
        }
        Err(e) => {
            warn!(reason = %format!("{e:#}"), "proof rejected");
            Ok(false)
        }
    }
}

/// What the verifier needs to check one committed-column opening.
struct RowCheck<'a> {
    root: &'a Digest,
    labels: Digest,
    width: usize,
    chunk: ChunkShape,
}

impl RowCheck<'_> {
    fn values(&self, pos: usize, open: &Opening) -> Result<Vec<F>> {
        ensure!(
            verify_row_opening(self.root, &self.labels, self.width, self.chunk, pos, open),
            "trace opening at position {pos} failed"
        );
        open.values_le
            .iter()
            .map(|&le| decode_felt(le).with_context(|| format!("non-canonical value at position {pos}")))
            .collect()
    }
}

fn check_body<A: Air + ?Sized>(vk: &VerifierKey, air: &A, body: &ProofBody, public: &[F]) -> Result<()> {
    let sp = *vk.params();
    let n = vk.descriptor().rows();
    let width = air.width();
    let shape = ProofShape::new(n, air.constraint_degree(), &sp);

    ensure!(body.version == params::PROOF_VERSION, "unsupported proof version {}", body.version);
    air.check_public(public)
        .map_err(|e| anyhow!("public values rejected: {e}"))?;
    ensure!(body.n_rows == n as u64, "proof is for {} rows, key says {n}", body.n_rows);

    // Replay the transcript.
    let mut tr = params::statement_transcript(vk.circuit_id(), &sp, n, width, public);
    tr.absorb(Label::TraceRoot.as_str(), &body.trace_root);
    let alphas = Alphas::derive(&mut tr);
    let gammas = params::derive_field_elems(&mut tr, Label::Combine, width);
    let final_value = decode_felt(body.fri_final_le).context("non-canonical FRI final value")?;
    let betas = fri_replay(&mut tr, &body.fri_roots, final_value, &shape)?;
    let positions = params::derive_indices(&mut tr, Label::FriQueries, shape.lde_size(), shape.queries);

    let rows = RowCheck {
        root: &body.trace_root,
        labels: labels_digest(&committed_labels(air)),
        width: width + 1,
        chunk: ChunkShape::new(shape.lde_size(), shape.chunk_log2),
    };
    let fixed = FixedColumns::new(&air.fixed_columns());
    let omega = shape.trace_generator();

    ensure!(body.queries.len() == shape.queries, "wrong number of queries");
    for (query, &pos) in body.queries.iter().zip(&positions) {
        ensure!(query.position == pos, "query at {} where transcript asked for {pos}", query.position);
        let mut cur = rows.values(pos, &query.cur)?;
        let mut next = rows.values(shape.next_position(pos), &query.next)?;

        // Layer 0 recomputed from the openings: Q(x) + Σ γ_j T'_j(x) + R(x).
        let x = shape.point(pos);
        let mask = cur[width];
        cur.truncate(width);
        next.truncate(width);
        let weighted = gammas.iter().zip(&cur).fold(mask, |acc, (&g, &v)| acc + g * v);
        cur.extend(fixed.eval(x));
        next.extend(fixed.eval(x * omega));
        let expected0 = quotient_at(air, &shape, x, &cur, &next, public, &alphas) + weighted;

        fri_verify_query(&shape, &body.fri_roots, &betas, final_value, pos, &query.fri, expected0)
            .with_context(|| format!("FRI query at {pos}"))?;
    }
    Ok(())
}
