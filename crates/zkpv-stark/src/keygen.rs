//! Key generation: a matching (prover, verifier) key pair for a descriptor.
//!
//! The setup is transparent: both keys carry the descriptor and parameters,
//! and their circuit identity is derived from exactly those.

use std::path::PathBuf;

use tracing::info;
use zkpv_core::{ArtifactStore, CircuitDescriptor, ProverKey, StarkParams, VerifierKey, ZkResult};

/// Matching prover and verifier keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    /// Prover half.
    pub prover: ProverKey,
    /// Verifier half.
    pub verifier: VerifierKey,
}

/// Build a key pair. Unsupported sizes or parameters fail with `InvalidConfig`.
pub fn generate(descriptor: CircuitDescriptor, params: StarkParams) -> ZkResult<KeyPair> {
    let prover = ProverKey::new(descriptor, params)?;
    let verifier = VerifierKey::new(descriptor, params)?;
    info!(
        circuit = %descriptor,
        id = %prover.circuit_id(),
        blowup_log2 = params.blowup_log2,
        num_queries = params.num_queries,
        "keygen"
    );
    Ok(KeyPair { prover, verifier })
}

/// Generate and persist `<stem>.pk` and `<stem>.vk` under `store`.
pub fn generate_into(
    store: &ArtifactStore,
    stem: &str,
    descriptor: CircuitDescriptor,
    params: StarkParams,
) -> ZkResult<(KeyPair, PathBuf, PathBuf)> {
    let pair = generate(descriptor, params)?;
    let pk_path = store.store(format!("{stem}.pk"), pair.prover.material())?;
    let vk_path = store.store(format!("{stem}.vk"), pair.verifier.material())?;
    Ok((pair, pk_path, vk_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkpv_core::ZkError;

    #[test]
    fn pair_shares_circuit_id() {
        let pair = generate(CircuitDescriptor::Fibonacci { rows: 16 }, StarkParams::default()).unwrap();
        assert_eq!(pair.prover.circuit_id(), pair.verifier.circuit_id());
        let other = generate(CircuitDescriptor::Fibonacci { rows: 32 }, StarkParams::default()).unwrap();
        assert_ne!(pair.prover.circuit_id(), other.prover.circuit_id());
    }

    #[test]
    fn unsupported_sizes_are_invalid_config() {
        for d in [
            CircuitDescriptor::Fibonacci { rows: 2 },
            CircuitDescriptor::PolyEval { coeffs: 12 },
        ] {
            assert!(matches!(generate(d, StarkParams::default()), Err(ZkError::InvalidConfig(_))));
        }
        let bad = StarkParams {
            num_queries: 0,
            ..StarkParams::default()
        };
        assert!(matches!(
            generate(CircuitDescriptor::Fibonacci { rows: 8 }, bad),
            Err(ZkError::InvalidConfig(_))
        ));
    }
}
