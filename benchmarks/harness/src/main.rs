//! zkpv-bench-harness
//!
//! Time the phases of one proof round trip (keygen -> bind -> prove -> verify)
//! and append CSV rows into `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage:
//!   cargo run --release -p zkpv-bench-harness -- --profile benchmarks/harness/profiles/small.toml

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use zkpv_core::{bind, CircuitDescriptor, CircuitInputMap, ProvingBackend, StarkParams};
use zkpv_stark::{keygen, StarkBackend};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Profile {
    /// Circuit descriptor, e.g. `fibonacci:1024`
    circuit: String,
    /// Repetitions of the whole round trip
    repeats: u32,
    /// Input map bound on every repeat
    inputs: CircuitInputMap,
    /// STARK parameters; absent fields take their defaults
    #[serde(default)]
    params: StarkParams,
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_us(d: Duration) -> u128 {
    d.as_micros()
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag(
        "profile",
        "benchmarks/harness/profiles/small.toml",
    ));
    let profile_src = fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {}", profile_path.display()))?;
    let profile: Profile = toml::from_str(&profile_src).context("parse profile toml")?;
    let descriptor: CircuitDescriptor = profile
        .circuit
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("profile circuit")?;
    profile
        .params
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("profile params")?;
    println!(
        "Profile: circuit={descriptor}, repeats={}, params={:?}",
        profile.repeats, profile.params
    );

    let reports = PathBuf::from("benchmarks/reports");
    fs::create_dir_all(&reports).with_context(|| format!("create {}", reports.display()))?;
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before UNIX epoch")?
        .as_secs();
    let csv_path = reports.join(format!("bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)
        .with_context(|| format!("open {}", csv_path.display()))?;
    writeln!(csv, "timestamp,circuit,repeat,stage,us,extra")?;

    for rep in 0..profile.repeats {
        // 1) keygen
        let t0 = Instant::now();
        let keys = keygen::generate(descriptor, profile.params)?;
        let t_keygen = t0.elapsed();
        writeln!(
            csv,
            "{ts},{descriptor},{rep},keygen,{},id={}",
            dur_us(t_keygen),
            hex::encode(keys.prover.circuit_id().as_bytes())
        )?;

        // 2) bind
        let t0 = Instant::now();
        let witness = bind(&StarkBackend::input_schema(&keys.prover), &profile.inputs)?;
        let t_bind = t0.elapsed();
        writeln!(csv, "{ts},{descriptor},{rep},bind,{},", dur_us(t_bind))?;

        // 3) prove
        let t0 = Instant::now();
        let (artifact, public) = StarkBackend::prove(&keys.prover, &witness)?;
        let t_prove = t0.elapsed();
        writeln!(
            csv,
            "{ts},{descriptor},{rep},prove,{},proof_bytes={}",
            dur_us(t_prove),
            artifact.len()
        )?;

        // 4) verify
        let t0 = Instant::now();
        let ok = StarkBackend::verify(&keys.verifier, &artifact, &public)?;
        let t_verify = t0.elapsed();
        writeln!(csv, "{ts},{descriptor},{rep},verify,{},valid={ok}", dur_us(t_verify))?;
        if !ok {
            bail!("repeat {rep}: proof did not verify");
        }
    }

    println!("Wrote report → {}", csv_path.display());
    Ok(())
}
