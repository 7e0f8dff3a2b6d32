//! One shared prover key, many proving threads.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::thread;

use common::{bound, fib_inputs, fib_keys};
use zkpv_core::ProvingBackend;
use zkpv_stark::StarkBackend;

#[test]
fn shared_key_proves_from_several_threads() {
    let keys = fib_keys(32);
    let pk = Arc::new(keys.prover.clone());
    let seeds: Vec<(String, String)> = (0..4u64).map(|i| (i.to_string(), (i + 1).to_string())).collect();

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = seeds
            .iter()
            .map(|(a, b)| {
                let pk = Arc::clone(&pk);
                let w = bound(&keys, &fib_inputs(a, b));
                s.spawn(move || StarkBackend::prove(&pk, &w).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (artifact, public) in &results {
        assert!(StarkBackend::verify(&keys.verifier, artifact, public).unwrap());
    }
    // Distinct statements, distinct proofs.
    assert_ne!(results[0].0, results[1].0);
}
