//! Artifact store: loads opaque key material from named locations.
//!
//! Names resolve against the store root; absolute paths are used as-is. A
//! load performs exactly one read and never caches: ownership of the decoded
//! keys stays with the caller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ZkError, ZkResult};
use crate::keys::{KeyMaterial, ProverKey, VerifierKey};

/// Directory-rooted key store.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl Default for ArtifactStore {
    /// Rooted at the current directory.
    fn default() -> Self {
        Self::new(".")
    }
}

impl ArtifactStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a name against the root.
    #[must_use]
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.root.join(name)
        }
    }

    /// Read and validate key material.
    pub fn load(&self, name: impl AsRef<Path>) -> ZkResult<KeyMaterial> {
        let path = self.resolve(name);
        let location = path.display().to_string();
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ZkError::ArtifactNotFound {
                location: location.clone(),
            },
            _ => ZkError::Io {
                location: location.clone(),
                source: e,
            },
        })?;
        let material = KeyMaterial::from_bytes(&bytes).map_err(|source| ZkError::ArtifactCorrupt {
            location: location.clone(),
            source,
        })?;
        debug!(
            path = %location,
            bytes = bytes.len(),
            role = %material.role(),
            circuit = %material.circuit_id(),
            "loaded key material"
        );
        Ok(material)
    }

    /// Load a key that must carry the prover role.
    pub fn load_prover_key(&self, name: impl AsRef<Path>) -> ZkResult<ProverKey> {
        let path = self.resolve(name);
        let m = self.load(&path)?;
        ProverKey::from_material(m).map_err(|source| ZkError::ArtifactCorrupt {
            location: path.display().to_string(),
            source,
        })
    }

    /// Load a key that must carry the verifier role.
    pub fn load_verifier_key(&self, name: impl AsRef<Path>) -> ZkResult<VerifierKey> {
        let path = self.resolve(name);
        let m = self.load(&path)?;
        VerifierKey::from_material(m).map_err(|source| ZkError::ArtifactCorrupt {
            location: path.display().to_string(),
            source,
        })
    }

    /// Write key material, creating parent directories. Returns the path written.
    pub fn store(&self, name: impl AsRef<Path>, material: &KeyMaterial) -> ZkResult<PathBuf> {
        let path = self.resolve(name);
        let location = path.display().to_string();
        let bytes = material
            .to_bytes()
            .map_err(|source| ZkError::ArtifactCorrupt {
                location: location.clone(),
                source,
            })?;
        let io_err = |source| ZkError::Io {
            location: location.clone(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(&path, &bytes).map_err(io_err)?;
        info!(
            path = %location,
            bytes = bytes.len(),
            role = %material.role(),
            circuit = %material.circuit_id(),
            "stored key material"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{CircuitDescriptor, EnvelopeError, KeyRole, StarkParams};

    fn material(role: KeyRole) -> KeyMaterial {
        KeyMaterial::new(
            role,
            CircuitDescriptor::Fibonacci { rows: 4 },
            StarkParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn store_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let written = store.store("keys/fib.pk", &material(KeyRole::Prover)).unwrap();
        assert!(written.starts_with(dir.path()));
        let pk = store.load_prover_key("keys/fib.pk").unwrap();
        assert_eq!(pk.material(), &material(KeyRole::Prover));
        // Absolute paths bypass the root.
        assert!(ArtifactStore::new("/nonexistent-root").load(&written).is_ok());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            store.load("nope.vk"),
            Err(ZkError::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn corrupted_and_wrong_role_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = store.store("a.vk", &material(KeyRole::Verifier)).unwrap();

        assert!(matches!(
            store.load_prover_key("a.vk"),
            Err(ZkError::ArtifactCorrupt {
                source: EnvelopeError::WrongRole { .. },
                ..
            })
        ));

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, &bytes).unwrap();
        assert!(matches!(
            store.load_verifier_key("a.vk"),
            Err(ZkError::ArtifactCorrupt {
                source: EnvelopeError::ChecksumMismatch,
                ..
            })
        ));

        fs::write(&path, b"ZKPV").unwrap();
        assert!(matches!(
            store.load("a.vk"),
            Err(ZkError::ArtifactCorrupt {
                source: EnvelopeError::Truncated { len: 4 },
                ..
            })
        ));
    }
}
