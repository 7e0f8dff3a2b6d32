//! Backend abstraction for proving and verification.
//!
//! Implementors provide a stateless API (associated functions) over immutable
//! keys, so one loaded key can serve many concurrent calls.
//!
//! ## Contracts implementors uphold
//! - `prove` fails with `KeyMismatch` when the witness was bound against a
//!   different circuit than the key, and with `ProvingFailed` when the
//!   witness does not satisfy the circuit. A successful proof is never empty.
//! - `verify` returns `Ok(false)` for any malformed or tampered proof body
//!   and reserves `Err(KeyMismatch)` for structural mismatches: the artifact
//!   names another circuit, or the public vector has the wrong length.
//! - Neither function panics on malformed input.

use crate::{
    BoundWitness, CancellationToken, InputSchema, ProofArtifact, ProverKey, PublicInputVector,
    VerifierKey, ZkResult,
};

/// Minimal backend API the rest of the system depends on.
///
/// Backends are used as type parameters, e.g. `Pipeline::<StarkBackend>::new(..)`.
pub trait ProvingBackend {
    /// Input schema of the circuit a key is bound to.
    fn input_schema(pk: &ProverKey) -> InputSchema;

    /// Produce a proof and the public-input vector it commits to.
    fn prove(pk: &ProverKey, witness: &BoundWitness)
        -> ZkResult<(ProofArtifact, PublicInputVector)> {
        Self::prove_with_cancel(pk, witness, &CancellationToken::new())
    }

    /// [`ProvingBackend::prove`] that polls `cancel` between phases.
    fn prove_with_cancel(
        pk: &ProverKey,
        witness: &BoundWitness,
        cancel: &CancellationToken,
    ) -> ZkResult<(ProofArtifact, PublicInputVector)>;

    /// Check a proof against a verifier key and public inputs.
    fn verify(
        vk: &VerifierKey,
        artifact: &ProofArtifact,
        public: &PublicInputVector,
    ) -> ZkResult<bool>;
}
