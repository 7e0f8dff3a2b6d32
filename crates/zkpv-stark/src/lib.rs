//! ZKPV STARK backend.
//!
//! A zero-knowledge STARK over Goldilocks. The trace columns are blinded with
//! prover randomness, extended to a coset of the trace domain and committed
//! row-wise, together with a random mask, in a chunked BLAKE3 Merkle tree.
//! The AIR composition quotient plus the weighted columns and the mask forms
//! the first FRI layer; each query opens the commitment at `x` and `ω·x` so
//! the verifier can recompute that layer value, and FRI proves it has low
//! degree. [`StarkBackend`] plugs it into
//! [`zkpv_core::ProvingBackend`], so the CLI and the [`zkpv_core::Pipeline`]
//! can drive it.
//!
//! ```no_run
//! use zkpv_core::{CircuitDescriptor, CircuitInputMap, ProvingBackend, StarkParams, bind};
//! use zkpv_stark::{keygen, StarkBackend};
//!
//! let pair = keygen::generate(CircuitDescriptor::Fibonacci { rows: 64 }, StarkParams::default())?;
//! let inputs = CircuitInputMap::new().with("a", ["0"]).with("b", ["1"]);
//! let witness = bind(&StarkBackend::input_schema(&pair.prover), &inputs)?;
//! let (artifact, public) = StarkBackend::prove(&pair.prover, &witness)?;
//! assert!(StarkBackend::verify(&pair.verifier, &artifact, &public)?);
//! # Ok::<(), zkpv_core::ZkError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod air;
pub mod circuits;
pub mod fri;
pub mod keygen;
pub mod lde;
pub mod masking;
pub mod merkle;
pub mod params;
#[allow(missing_docs)]
pub mod proof;
pub mod prover;
pub mod verify;

use zkpv_core::{
    BoundWitness, CancellationToken, InputSchema, ProofArtifact, ProverKey, ProvingBackend,
    PublicInputVector, VerifierKey, ZkResult,
};

pub use keygen::KeyPair;

/// The STARK proving backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarkBackend;

impl ProvingBackend for StarkBackend {
    fn input_schema(pk: &ProverKey) -> InputSchema {
        circuits::input_schema(pk.circuit_id(), pk.descriptor())
    }

    fn prove_with_cancel(
        pk: &ProverKey,
        witness: &BoundWitness,
        cancel: &CancellationToken,
    ) -> ZkResult<(ProofArtifact, PublicInputVector)> {
        prover::prove(pk, witness, cancel)
    }

    fn verify(
        vk: &VerifierKey,
        artifact: &ProofArtifact,
        public: &PublicInputVector,
    ) -> ZkResult<bool> {
        verify::verify(vk, artifact, public)
    }
}
