//! Shared fixtures for the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use rand::{rngs::StdRng, SeedableRng};
use zkpv_core::{bind, BoundWitness, CircuitDescriptor, CircuitInputMap, ProvingBackend, StarkParams};
use zkpv_stark::{circuits::pad_single_block, keygen, KeyPair, StarkBackend};

/// Small parameters so exhaustive tamper sweeps stay fast.
pub fn small_params() -> StarkParams {
    StarkParams {
        blowup_log2: 1,
        num_queries: 4,
        col_chunk_log2: 2,
    }
}

pub fn fib_keys(rows: u32) -> KeyPair {
    keygen::generate(CircuitDescriptor::Fibonacci { rows }, StarkParams::default()).unwrap()
}

pub fn fib_inputs(a: &str, b: &str) -> CircuitInputMap {
    CircuitInputMap::new().with("a", [a]).with("b", [b])
}

/// `2x^3 + x + 5` (padded with leading zero coefficients to `m` terms) at `x`.
pub fn poly_inputs(m: usize, x: &str, y: &str) -> CircuitInputMap {
    let mut coeffs = vec!["0".to_string(); m - 4];
    coeffs.extend(["2", "0", "1", "5"].map(String::from));
    CircuitInputMap::new()
        .with("x", [x])
        .with("coeffs", coeffs)
        .with("y", [y])
}

pub fn bound(keys: &KeyPair, inputs: &CircuitInputMap) -> BoundWitness {
    bind(&StarkBackend::input_schema(&keys.prover), inputs).unwrap()
}

/// Padded single-block message and its claimed digest words.
pub fn sha256_inputs(msg: &[u8], digest: [u32; 8]) -> CircuitInputMap {
    let block = pad_single_block(msg).unwrap();
    CircuitInputMap::new()
        .with("block", block.iter().map(u32::to_string))
        .with("digest", digest.iter().map(u32::to_string))
}

/// Deterministic prover randomness for reproducible proofs.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
