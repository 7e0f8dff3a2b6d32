#![no_main]
use ciborium::de::from_reader;
use libfuzzer_sys::fuzz_target;
use zkpv_core::ProofArtifact;

fuzz_target!(|data: &[u8]| {
    let _ = from_reader::<ProofArtifact, _>(data);
    let _ = serde_json::from_slice::<ProofArtifact>(data);
});
