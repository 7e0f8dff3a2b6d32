//! Happy paths: prove then verify with the matching key.

#![allow(clippy::unwrap_used)]

mod common;

use common::{bound, fib_inputs, fib_keys, poly_inputs, seeded, small_params};
use zkpv_core::{
    ArtifactStore, CancellationToken, CircuitDescriptor, Felt, Pipeline, ProvingBackend,
    PublicInputVector, StarkParams,
};
use zkpv_stark::{keygen, proof::ProofBody, prover::prove_with_rng, StarkBackend};

#[test]
fn fibonacci_zero_one_verifies() {
    let keys = fib_keys(8);
    let w = bound(&keys, &fib_inputs("0", "1"));
    let (artifact, public) = StarkBackend::prove(&keys.prover, &w).unwrap();

    assert!(!artifact.is_empty());
    assert_eq!(artifact.circuit_id(), keys.verifier.circuit_id());
    assert_eq!(public.to_decimal_strings(), ["0", "1", "21"]);
    assert!(StarkBackend::verify(&keys.verifier, &artifact, &public).unwrap());
}

#[test]
fn body_carries_one_opening_pair_per_query() {
    let keys = fib_keys(16);
    let w = bound(&keys, &fib_inputs("3", "4"));
    let (artifact, _) = StarkBackend::prove(&keys.prover, &w).unwrap();
    let body = ProofBody::from_bytes(artifact.bytes()).unwrap();
    let q = StarkParams::default().num_queries as usize;
    assert_eq!(body.n_rows, 16);
    assert_eq!(body.queries.len(), q);
    // 16 rows + 60 blinding coefficients: quotient degree 128, LDE 1024.
    assert_eq!(body.fri_layers(), 7);
    assert_eq!(artifact.meta["lde_size"], 1024);
    for query in &body.queries {
        assert_eq!(query.cur.index, query.position);
        assert_eq!(query.next.index, (query.position + 64) % 1024);
        // Two fibonacci columns plus the mask.
        assert_eq!(query.cur.values_le.len(), 3);
        assert_eq!(query.fri.len(), 7);
    }
    assert_eq!(artifact.meta["rows"], 16);
}

#[test]
fn poly_eval_verifies_with_correct_claim() {
    let keys =
        keygen::generate(CircuitDescriptor::PolyEval { coeffs: 8 }, small_params()).unwrap();
    // 2*3^3 + 3 + 5 = 62
    let w = bound(&keys, &poly_inputs(8, "3", "62"));
    let (artifact, public) = StarkBackend::prove(&keys.prover, &w).unwrap();
    assert_eq!(public.as_slice(), &[Felt::from_u64(3), Felt::from_u64(62)]);
    assert!(StarkBackend::verify(&keys.verifier, &artifact, &public).unwrap());
}

#[test]
fn large_field_values_round_trip_through_the_proof() {
    let keys = keygen::generate(CircuitDescriptor::Fibonacci { rows: 32 }, small_params()).unwrap();
    let w = bound(&keys, &fib_inputs("18446744069414584320", "18446744069414584319"));
    let (artifact, public) = StarkBackend::prove(&keys.prover, &w).unwrap();
    let reparsed = PublicInputVector::from_decimal_strings(&public.to_decimal_strings()).unwrap();
    assert!(StarkBackend::verify(&keys.verifier, &artifact, &reparsed).unwrap());
}

#[test]
fn proofs_are_randomized_and_verification_is_pure() {
    let keys = fib_keys(8);
    let w = bound(&keys, &fib_inputs("5", "8"));
    let (a1, p1) = StarkBackend::prove(&keys.prover, &w).unwrap();
    let (a2, p2) = StarkBackend::prove(&keys.prover, &w).unwrap();
    assert_ne!(a1.proof_bytes, a2.proof_bytes);
    assert_eq!(p1, p2);
    for _ in 0..3 {
        assert!(StarkBackend::verify(&keys.verifier, &a1, &p1).unwrap());
        assert!(StarkBackend::verify(&keys.verifier, &a2, &p2).unwrap());
    }
}

#[test]
fn seeded_rng_reproduces_the_proof() {
    let keys = keygen::generate(CircuitDescriptor::Fibonacci { rows: 8 }, small_params()).unwrap();
    let w = bound(&keys, &fib_inputs("5", "8"));
    let cancel = CancellationToken::new();
    let (a1, _) = prove_with_rng(&keys.prover, &w, &cancel, &mut seeded(7)).unwrap();
    let (a2, _) = prove_with_rng(&keys.prover, &w, &cancel, &mut seeded(7)).unwrap();
    let (a3, public) = prove_with_rng(&keys.prover, &w, &cancel, &mut seeded(8)).unwrap();
    assert_eq!(a1, a2);
    assert_ne!(a1, a3);
    assert!(StarkBackend::verify(&keys.verifier, &a3, &public).unwrap());
}

#[test]
fn pipeline_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    keygen::generate_into(
        &store,
        "fib",
        CircuitDescriptor::Fibonacci { rows: 8 },
        small_params(),
    )
    .unwrap();

    let pipeline = Pipeline::<StarkBackend>::new(store);
    let (artifact, public) = pipeline.prove_from_store("fib.pk", &fib_inputs("0", "1")).unwrap();
    assert!(pipeline.verify_from_store("fib.vk", &artifact, &public).unwrap());
}
