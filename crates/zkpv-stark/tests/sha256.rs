//! SHA-256 compression circuit against the `sha2` reference.

#![allow(clippy::unwrap_used)]

mod common;

use common::{bound, seeded, sha256_inputs, small_params};
use rand::Rng;
use sha2::{Digest, Sha256};
use zkpv_core::{CircuitDescriptor, Felt, ProvingBackend, PublicInputVector, ZkError};
use zkpv_stark::{keygen, KeyPair, StarkBackend};

fn keys() -> KeyPair {
    keygen::generate(CircuitDescriptor::Sha256, small_params()).unwrap()
}

fn reference(msg: &[u8]) -> [u32; 8] {
    let d = Sha256::digest(msg);
    let mut words = [0u32; 8];
    for (w, c) in words.iter_mut().zip(d.chunks_exact(4)) {
        *w = u32::from_be_bytes([c[0], c[1], c[2], c[3]]);
    }
    words
}

#[test]
fn abc_digest_verifies() {
    let keys = keys();
    let digest = reference(b"abc");
    assert_eq!(digest[0], 0xba78_16bf);
    let (artifact, public) = StarkBackend::prove(&keys.prover, &bound(&keys, &sha256_inputs(b"abc", digest))).unwrap();
    assert_eq!(public.len(), 8);
    assert_eq!(public.as_slice()[7], Felt::from_u64(0xf200_15ad));
    assert!(StarkBackend::verify(&keys.verifier, &artifact, &public).unwrap());
    assert_eq!(artifact.meta["circuit"], "sha256(64)");
}

#[test]
fn random_short_messages_match_the_reference() {
    let keys = keys();
    let mut rng = seeded(2024);
    for len in [0usize, 1, 31, 55] {
        let msg: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        let w = bound(&keys, &sha256_inputs(&msg, reference(&msg)));
        let (artifact, public) = StarkBackend::prove(&keys.prover, &w).unwrap();
        assert!(StarkBackend::verify(&keys.verifier, &artifact, &public).unwrap(), "len {len}");
    }
}

#[test]
fn wrong_digest_cannot_be_proved() {
    let keys = keys();
    let mut digest = reference(b"abc");
    digest[2] = digest[2].wrapping_add(1);
    match StarkBackend::prove(&keys.prover, &bound(&keys, &sha256_inputs(b"abc", digest))) {
        Err(ZkError::ProvingFailed(msg)) => assert!(msg.contains("last-row"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn proof_does_not_transfer_to_another_digest() {
    let keys = keys();
    let digest = reference(b"abc");
    let (artifact, public) = StarkBackend::prove(&keys.prover, &bound(&keys, &sha256_inputs(b"abc", digest))).unwrap();

    let other = PublicInputVector::new(
        reference(b"abd").iter().map(|&w| Felt::from_u64(u64::from(w))).collect(),
    );
    assert!(!StarkBackend::verify(&keys.verifier, &artifact, &other).unwrap());

    // Unreduced words satisfy the feed-forward wherever the sum carried out.
    let unreduced = PublicInputVector::new(
        public.as_slice().iter().map(|&w| w + Felt::from_u64(1 << 32)).collect(),
    );
    assert!(!StarkBackend::verify(&keys.verifier, &artifact, &unreduced).unwrap());
}

#[test]
fn schema_keeps_the_block_private() {
    let keys = keys();
    let schema = StarkBackend::input_schema(&keys.prover);
    assert_eq!(schema.public_arity(), 8);
    let block = schema.inputs.iter().find(|d| d.name == "block").unwrap();
    assert_eq!(block.arity, 16);
}
