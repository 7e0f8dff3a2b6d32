// crates/zkpv-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zkpv_core::{
    io::{
        ensure_parent_dir, read_input_map, read_proof_artifact_auto, read_public_inputs,
        read_stark_params, write_proof_artifact_auto, write_public_inputs,
    },
    ArtifactStore, CircuitDescriptor, KeyMaterial, Pipeline, PublicInputVector, StarkParams,
};
use zkpv_stark::{keygen, proof::ProofBody, StarkBackend};

#[derive(Parser, Debug)]
#[command(
    name = "zkpv",
    about = "ZKPV proving CLI",
    long_about = "ZKPV proving CLI.\n\nGenerate circuit keys, prove statements over decimal-string inputs, and verify proof artifacts.\nExit status: 0 valid, 1 invalid proof, 2 error.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a matching prover/verifier key pair (<name>.pk, <name>.vk)
    Keygen {
        /// Circuit, e.g. `fibonacci:64`, `poly_eval:8` or `sha256`
        #[arg(long)]
        circuit: CircuitDescriptor,

        /// STARK parameters (TOML); defaults apply to absent fields
        #[arg(long)]
        params: Option<PathBuf>,

        /// Directory the keys are written to
        #[arg(long, default_value = "keys")]
        out_dir: PathBuf,

        /// File stem for the key pair
        #[arg(long, default_value = "circuit")]
        name: String,
    },

    /// Bind an input map and produce a proof artifact plus its public inputs
    Prove {
        /// Prover key path (relative paths resolve against --keys-dir)
        #[arg(long)]
        pk: PathBuf,

        /// Key directory
        #[arg(long, default_value = ".")]
        keys_dir: PathBuf,

        /// Input map, JSON `{ "name": ["decimal", ...] }`
        #[arg(long)]
        inputs: PathBuf,

        /// Output path for the proof artifact (.json or .cbor)
        #[arg(long, default_value = "proof.cbor")]
        out: PathBuf,

        /// Output path for the public-input vector (JSON)
        #[arg(long, default_value = "public.json")]
        public_out: PathBuf,
    },

    /// Verify a proof artifact; exits 1 and prints INVALID if it does not verify
    Verify {
        /// Verifier key path (relative paths resolve against --keys-dir)
        #[arg(long)]
        vk: PathBuf,

        /// Key directory
        #[arg(long, default_value = ".")]
        keys_dir: PathBuf,

        /// Proof artifact (.json or .cbor)
        #[arg(long)]
        proof: PathBuf,

        /// Public-input vector (JSON)
        #[arg(long)]
        public: PathBuf,
    },

    /// Print a JSON summary of a key file or a proof artifact
    Inspect {
        /// Key (.pk/.vk) or proof artifact (.json/.cbor)
        path: PathBuf,
    },

    /// Convert a JSON public-input vector to the binary form
    EncodeInputs {
        /// JSON array of decimal strings
        #[arg(long)]
        input: PathBuf,

        /// Binary output path
        #[arg(long)]
        out: PathBuf,
    },

    /// Convert a binary public-input vector to JSON
    DecodeInputs {
        /// Binary public-input file
        #[arg(long)]
        input: PathBuf,

        /// JSON output path
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli.cmd) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cmd: Cmd) -> Result<ExitCode> {
    match cmd {
        Cmd::Keygen {
            circuit,
            params,
            out_dir,
            name,
        } => keygen_cmd(circuit, params, out_dir, &name),
        Cmd::Prove {
            pk,
            keys_dir,
            inputs,
            out,
            public_out,
        } => prove(pk, keys_dir, inputs, out, public_out),
        Cmd::Verify {
            vk,
            keys_dir,
            proof,
            public,
        } => verify(vk, keys_dir, proof, public),
        Cmd::Inspect { path } => inspect(path),
        Cmd::EncodeInputs { input, out } => encode_inputs(input, out),
        Cmd::DecodeInputs { input, out } => decode_inputs(input, out),
    }
}

/// Initialize tracing with an env-driven filter (default INFO), on stderr.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn keygen_cmd(
    circuit: CircuitDescriptor,
    params: Option<PathBuf>,
    out_dir: PathBuf,
    name: &str,
) -> Result<ExitCode> {
    let params = match params {
        Some(p) => read_stark_params(&p)?,
        None => StarkParams::default(),
    };
    info!(%circuit, out_dir=%out_dir.display(), "generating keys");
    let store = ArtifactStore::new(out_dir);
    let (pair, pk_path, vk_path) = keygen::generate_into(&store, name, circuit, params)
        .with_context(|| format!("generating keys for {circuit}"))?;

    println!(
        "Generated {circuit} keys (id {}) → {}, {}",
        pair.prover.circuit_id(),
        pk_path.display(),
        vk_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn prove(
    pk: PathBuf,
    keys_dir: PathBuf,
    inputs: PathBuf,
    out: PathBuf,
    public_out: PathBuf,
) -> Result<ExitCode> {
    info!(pk=%pk.display(), inputs=%inputs.display(), out=%out.display(), "proving");
    let pipeline = Pipeline::<StarkBackend>::new(ArtifactStore::new(keys_dir));
    let map = read_input_map(&inputs)?;
    let (artifact, public) = pipeline
        .prove_from_store(&pk, &map)
        .with_context(|| format!("proving with {}", pk.display()))?;

    write_proof_artifact_auto(&out, &artifact)
        .with_context(|| format!("writing proof to {}", out.display()))?;
    write_public_inputs(&public_out, &public)
        .with_context(|| format!("writing public inputs to {}", public_out.display()))?;

    println!(
        "Proved {}, wrote {} ({} bytes) and {} {}",
        artifact.circuit_id(),
        out.display(),
        artifact.len(),
        public_out.display(),
        public
    );
    Ok(ExitCode::SUCCESS)
}

fn verify(vk: PathBuf, keys_dir: PathBuf, proof: PathBuf, public: PathBuf) -> Result<ExitCode> {
    info!(vk=%vk.display(), proof=%proof.display(), public=%public.display(), "verifying proof");
    let pipeline = Pipeline::<StarkBackend>::new(ArtifactStore::new(keys_dir));
    let artifact = read_proof_artifact_auto(&proof)
        .with_context(|| format!("reading proof artifact from {}", proof.display()))?;
    let public = read_public_inputs(&public)?;

    if pipeline
        .verify_from_store(&vk, &artifact, &public)
        .context("verification could not be attempted")?
    {
        println!("OK: proof verified");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("INVALID");
        Ok(ExitCode::from(1))
    }
}

fn inspect(path: PathBuf) -> Result<ExitCode> {
    let summary = if matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "cbor")
    ) {
        let artifact = read_proof_artifact_auto(&path)?;
        let body = ProofBody::from_bytes(artifact.bytes()).ok();
        json!({
            "kind": "proof",
            "circuit_id": artifact.circuit_id(),
            "proof_bytes": artifact.len(),
            "body_decodes": body.is_some(),
            "rows": body.as_ref().map(|b| b.n_rows),
            "queries": body.as_ref().map(|b| b.queries.len()),
            "fri_layers": body.as_ref().map(ProofBody::fri_layers),
            "meta": artifact.meta,
        })
    } else {
        let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        let key = KeyMaterial::from_bytes(&bytes)
            .with_context(|| format!("{} is not a key envelope", path.display()))?;
        json!({
            "kind": "key",
            "role": key.role().to_string(),
            "circuit": key.descriptor(),
            "params": key.params(),
            "circuit_id": key.circuit_id(),
        })
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}

fn encode_inputs(input: PathBuf, out: PathBuf) -> Result<ExitCode> {
    let public = read_public_inputs(&input)?;
    ensure_parent_dir(&out)?;
    fs::write(&out, public.to_bytes()).with_context(|| format!("write {}", out.display()))?;
    println!("Encoded {} values → {}", public.len(), out.display());
    Ok(ExitCode::SUCCESS)
}

fn decode_inputs(input: PathBuf, out: PathBuf) -> Result<ExitCode> {
    let bytes = fs::read(&input).with_context(|| format!("read {}", input.display()))?;
    let public = PublicInputVector::from_bytes(&bytes)
        .with_context(|| format!("decoding public inputs from {}", input.display()))?;
    write_public_inputs(&out, &public)?;
    println!("Decoded {} values → {}", public.len(), out.display());
    Ok(ExitCode::SUCCESS)
}
