//! End-to-end façade: artifact store → input binder → prover → verifier.
//!
//! [`Pipeline`] is generic over a [`ProvingBackend`] and owns nothing but a
//! store handle, so it is cheap to clone and safe to share across threads.

use std::marker::PhantomData;
use std::path::Path;

use tracing::info_span;

use crate::{
    bind, ArtifactStore, CancellationToken, CircuitInputMap, ProofArtifact, ProverKey,
    ProvingBackend, PublicInputVector, VerifierKey, ZkResult,
};

/// Store-backed proving pipeline over a backend `B`.
#[derive(Debug)]
pub struct Pipeline<B: ProvingBackend> {
    store: ArtifactStore,
    backend: PhantomData<fn() -> B>,
}

impl<B: ProvingBackend> Clone for Pipeline<B> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<B: ProvingBackend> Pipeline<B> {
    /// Pipeline loading keys from `store`.
    #[must_use]
    pub const fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            backend: PhantomData,
        }
    }

    /// Store used for key loads.
    #[must_use]
    pub const fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Load a prover key by name.
    pub fn load_prover_key(&self, name: impl AsRef<Path>) -> ZkResult<ProverKey> {
        self.store.load_prover_key(name)
    }

    /// Load a verifier key by name.
    pub fn load_verifier_key(&self, name: impl AsRef<Path>) -> ZkResult<VerifierKey> {
        self.store.load_verifier_key(name)
    }

    /// Bind `inputs` against the key's schema, then prove.
    pub fn prove(
        &self,
        pk: &ProverKey,
        inputs: &CircuitInputMap,
    ) -> ZkResult<(ProofArtifact, PublicInputVector)> {
        self.prove_with_cancel(pk, inputs, &CancellationToken::new())
    }

    /// [`Pipeline::prove`] with cooperative cancellation.
    pub fn prove_with_cancel(
        &self,
        pk: &ProverKey,
        inputs: &CircuitInputMap,
        cancel: &CancellationToken,
    ) -> ZkResult<(ProofArtifact, PublicInputVector)> {
        let _span = info_span!("pipeline.prove", circuit = %pk.descriptor()).entered();
        let witness = bind(&B::input_schema(pk), inputs)?;
        B::prove_with_cancel(pk, &witness, cancel)
    }

    /// Load the prover key by name, bind and prove.
    pub fn prove_from_store(
        &self,
        prover_key: impl AsRef<Path>,
        inputs: &CircuitInputMap,
    ) -> ZkResult<(ProofArtifact, PublicInputVector)> {
        let pk = self.load_prover_key(prover_key)?;
        self.prove(&pk, inputs)
    }

    /// Verify with a loaded key.
    pub fn verify(
        &self,
        vk: &VerifierKey,
        artifact: &ProofArtifact,
        public: &PublicInputVector,
    ) -> ZkResult<bool> {
        let _span = info_span!("pipeline.verify", circuit = %vk.descriptor()).entered();
        B::verify(vk, artifact, public)
    }

    /// Load the verifier key by name and verify.
    pub fn verify_from_store(
        &self,
        verifier_key: impl AsRef<Path>,
        artifact: &ProofArtifact,
        public: &PublicInputVector,
    ) -> ZkResult<bool> {
        let vk = self.load_verifier_key(verifier_key)?;
        self.verify(&vk, artifact, public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The façade must be shareable across worker threads for any backend.
    fn _assert_send_sync<B: ProvingBackend>() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline<B>>();
        assert_send_sync::<ProverKey>();
        assert_send_sync::<VerifierKey>();
    }
}
