//! Drive the binary end to end: keygen → prove → verify, and the exit codes.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn zkpv(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_zkpv"))
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn keygen_prove_verify_and_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    fs::write(d.join("params.toml"), "num_queries = 8\nblowup_log2 = 2\n").unwrap();
    fs::write(d.join("inputs.json"), r#"{"a":["0"],"b":["1"]}"#).unwrap();

    let out = zkpv(
        d,
        &["keygen", "--circuit", "fibonacci:16", "--params", "params.toml", "--out-dir", "keys", "--name", "fib"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = zkpv(
        d,
        &["prove", "--keys-dir", "keys", "--pk", "fib.pk", "--inputs", "inputs.json", "--out", "proof.cbor"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let public: Vec<String> = serde_json::from_slice(&fs::read(d.join("public.json")).unwrap()).unwrap();
    assert_eq!(public, ["0", "1", "987"]);

    let verify = |public: &str| {
        zkpv(
            d,
            &["verify", "--keys-dir", "keys", "--vk", "fib.vk", "--proof", "proof.cbor", "--public", public],
        )
    };
    let out = verify("public.json");
    assert_eq!(out.status.code(), Some(0));

    fs::write(d.join("bad.json"), r#"["0","1","988"]"#).unwrap();
    let out = verify("bad.json");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("INVALID"));

    let out = zkpv(
        d,
        &["verify", "--keys-dir", "keys", "--vk", "nope.vk", "--proof", "proof.cbor", "--public", "public.json"],
    );
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn public_inputs_binary_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    fs::write(d.join("public.json"), r#"["5","18446744069414584320"]"#).unwrap();

    assert!(zkpv(d, &["encode-inputs", "--input", "public.json", "--out", "public.bin"]).status.success());
    assert_eq!(fs::read(d.join("public.bin")).unwrap().len(), 24);
    assert!(zkpv(d, &["decode-inputs", "--input", "public.bin", "--out", "back.json"]).status.success());
    let back: Vec<String> = serde_json::from_slice(&fs::read(d.join("back.json")).unwrap()).unwrap();
    assert_eq!(back, ["5", "18446744069414584320"]);

    fs::write(d.join("short.bin"), [1u8, 0, 0]).unwrap();
    assert_eq!(zkpv(d, &["decode-inputs", "--input", "short.bin", "--out", "x.json"]).status.code(), Some(2));
}
