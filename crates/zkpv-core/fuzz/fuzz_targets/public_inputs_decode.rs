#![no_main]
use libfuzzer_sys::fuzz_target;
use zkpv_core::PublicInputVector;

fuzz_target!(|data: &[u8]| {
    if let Ok(v) = PublicInputVector::from_bytes(data) {
        // Accepted buffers are canonical: re-encoding is byte-identical.
        assert_eq!(v.to_bytes(), data);
    }
});
