//! File helpers for proof artifacts, input maps, public inputs and params.
//!
//! Proof artifacts are JSON or CBOR, chosen by extension (case-insensitive).
//! Unknown extensions are rejected for reads and default to JSON for writes.
//! These are caller-side conveniences and return `anyhow::Result`; the
//! contract types themselves never touch the filesystem except through
//! [`crate::ArtifactStore`].

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{CircuitInputMap, ProofArtifact, PublicInputVector, StarkParams};

/// Ensure the parent directory for a file exists (no-op if none).
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open {}", display(path)))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("deserialize JSON {what} from {}", display(path)))
}

fn write_json<T: Serialize>(path: &Path, v: &T, what: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", display(path)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| format!("serialize JSON {what}"))?;
    w.flush()
        .with_context(|| format!("flush {}", display(path)))
}

/* ------------------------------ Proof artifacts ------------------------------ */

/// Read a [`ProofArtifact`] from JSON.
pub fn read_proof_artifact_json<P: AsRef<Path>>(path: P) -> Result<ProofArtifact> {
    read_json(path.as_ref(), "proof artifact")
}

/// Write a [`ProofArtifact`] as pretty JSON.
pub fn write_proof_artifact_json<P: AsRef<Path>>(path: P, v: &ProofArtifact) -> Result<()> {
    write_json(path.as_ref(), v, "proof artifact")
}

/// Read a [`ProofArtifact`] from CBOR.
pub fn read_proof_artifact_cbor<P: AsRef<Path>>(path: P) -> Result<ProofArtifact> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR proof artifact")
}

/// Write a [`ProofArtifact`] as CBOR.
pub fn write_proof_artifact_cbor<P: AsRef<Path>>(path: P, v: &ProofArtifact) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| "serialize CBOR proof artifact")?;
    w.flush()
        .with_context(|| format!("flush {}", display(path_ref)))
}

/// Read a [`ProofArtifact`], picking the format from the extension.
pub fn read_proof_artifact_auto<P: AsRef<Path>>(path: P) -> Result<ProofArtifact> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_proof_artifact_json(path),
        Some("cbor") => read_proof_artifact_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported proof extension: {other} (supported: .json, .cbor)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Write a [`ProofArtifact`]; `.cbor` selects CBOR, anything else JSON.
pub fn write_proof_artifact_auto<P: AsRef<Path>>(path: P, v: &ProofArtifact) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_proof_artifact_cbor(path, v),
        _ => write_proof_artifact_json(path, v),
    }
}

/* --------------------------- Inputs and public values --------------------------- */

/// Read a JSON input map `{ name: [decimal, ...] }`.
pub fn read_input_map<P: AsRef<Path>>(path: P) -> Result<CircuitInputMap> {
    read_json(path.as_ref(), "input map")
}

/// Write a JSON input map.
pub fn write_input_map<P: AsRef<Path>>(path: P, v: &CircuitInputMap) -> Result<()> {
    write_json(path.as_ref(), v, "input map")
}

/// Read a JSON array of decimal strings.
pub fn read_public_inputs<P: AsRef<Path>>(path: P) -> Result<PublicInputVector> {
    read_json(path.as_ref(), "public inputs")
}

/// Write a JSON array of decimal strings.
pub fn write_public_inputs<P: AsRef<Path>>(path: P, v: &PublicInputVector) -> Result<()> {
    write_json(path.as_ref(), v, "public inputs")
}

/// Read [`StarkParams`] from a TOML file.
pub fn read_stark_params<P: AsRef<Path>>(path: P) -> Result<StarkParams> {
    let path_ref = path.as_ref();
    let s = fs::read_to_string(path_ref)
        .with_context(|| format!("read {}", display(path_ref)))?;
    StarkParams::from_toml_str(&s).with_context(|| format!("parse params {}", display(path_ref)))
}

/* ------------------------------ In-memory CBOR ------------------------------ */

/// Serialize any `T: Serialize` to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).with_context(|| "serialize CBOR (to_cbor)")?;
    Ok(buf)
}

/// Deserialize any `T: DeserializeOwned` from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cur = Cursor::new(bytes);
    ciborium::de::from_reader(&mut cur).with_context(|| "deserialize CBOR (from_cbor)")
}

/// Lowercase extension (without dot), if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
