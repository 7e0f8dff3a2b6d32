//! zkpv-core: the proving and verification contract.
//!
//! This crate defines the stable boundary shared by every ZKPV crate:
//! - key material and its envelope ([`keys`]), loaded through the
//!   [`ArtifactStore`],
//! - input binding from decimal-string maps to schema-typed witnesses
//!   ([`input`]),
//! - proof artifacts and public-input vectors ([`artifact`]),
//! - the error taxonomy ([`ZkError`]) and cooperative cancellation,
//! - the backend-agnostic [`ProvingBackend`] trait and [`Pipeline`] façade.
//!
//! ```no_run
//! use zkpv_core::{ArtifactStore, CircuitInputMap, Pipeline, ProvingBackend};
//! # fn run<B: ProvingBackend>() -> Result<(), zkpv_core::ZkError> {
//! let pipeline = Pipeline::<B>::new(ArtifactStore::new("keys"));
//! let pk = pipeline.load_prover_key("fib.pk")?;
//! let vk = pipeline.load_verifier_key("fib.vk")?;
//! let inputs = CircuitInputMap::new().with("a", ["0"]).with("b", ["1"]);
//! let (artifact, public) = pipeline.prove(&pk, &inputs)?;
//! assert!(pipeline.verify(&vk, &artifact, &public)?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Proof artifacts and public-input vectors.
pub mod artifact;
/// Stateless backend trait.
pub mod backend;
/// Cooperative cancellation token.
pub mod cancel;
/// Contract error taxonomy.
pub mod error;
/// Input maps, schemas and binding.
pub mod input;
/// JSON/CBOR/TOML file helpers.
pub mod io;
/// Key material, envelope and circuit identity.
pub mod keys;
/// Store → binder → prover → verifier façade.
pub mod prover;
/// Directory-rooted key store.
pub mod store;

pub use artifact::{ProofArtifact, PublicInputVector, PublicInputsDecodeError};
pub use backend::ProvingBackend;
pub use cancel::CancellationToken;
pub use error::{ZkError, ZkResult};
pub use input::{bind, BoundWitness, CircuitInputMap, InputDecl, InputSchema, Visibility};
pub use keys::{
    CircuitDescriptor, CircuitId, EnvelopeError, KeyMaterial, KeyRole, ProverKey, StarkParams,
    VerifierKey,
};
pub use prover::Pipeline;
pub use store::ArtifactStore;

/// Native field of every built-in circuit.
pub use zkpv_field::Goldilocks as Felt;

/// Commonly-used items for quick imports.
pub mod prelude {
    pub use crate::{
        bind, ArtifactStore, BoundWitness, CancellationToken, CircuitDescriptor, CircuitInputMap,
        Pipeline, ProofArtifact, ProverKey, ProvingBackend, PublicInputVector, StarkParams,
        VerifierKey, ZkError, ZkResult,
    };
}
