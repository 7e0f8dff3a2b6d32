#![no_main]
use libfuzzer_sys::fuzz_target;
use zkpv_core::KeyMaterial;

fuzz_target!(|data: &[u8]| {
    if let Ok(m) = KeyMaterial::from_bytes(data) {
        assert_eq!(m.to_bytes().ok().as_deref(), Some(data));
    }
});
