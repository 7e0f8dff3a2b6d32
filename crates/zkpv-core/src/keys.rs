//! Prover/verifier key material and its on-disk envelope.
//!
//! Wire layout (all integers little-endian):
//!
//! ```text
//! magic "ZKPVKEY\0" (8) ‖ version u16 ‖ role u8 ‖ body_len u32 ‖ body ‖ blake3(body) (32)
//! ```
//!
//! The body is a bincode-encoded [`KeyBody`]: the circuit descriptor plus the
//! proof parameters. The circuit identity is a BLAKE3 digest over both, so two
//! keys agree on the circuit exactly when their ids are equal.

use core::fmt;
use std::str::FromStr;

use bincode::Options;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ZkError, ZkResult};

/// Envelope magic.
pub const KEY_MAGIC: [u8; 8] = *b"ZKPVKEY\0";
/// Current envelope version.
pub const KEY_VERSION: u16 = 1;

const HEADER_LEN: usize = 8 + 2 + 1 + 4;
const CHECKSUM_LEN: usize = 32;
const MAX_BODY_LEN: u64 = 1 << 16;

/// Smallest supported trace length.
pub const MIN_ROWS: u32 = 4;
/// Largest supported trace length.
pub const MAX_ROWS: u32 = 1 << 20;

/// Why a key blob failed its format check.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// Shorter than header plus checksum.
    #[error("blob is {len} bytes, shorter than the envelope minimum")]
    Truncated {
        /// Observed length.
        len: usize,
    },
    /// Wrong leading magic.
    #[error("bad magic")]
    BadMagic,
    /// Version this build cannot read.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u16),
    /// Role byte is neither prover nor verifier.
    #[error("unknown key role byte {0:#04x}")]
    UnknownRole(u8),
    /// Key has the other role.
    #[error("expected a {expected} key, found a {found} key")]
    WrongRole {
        /// Role the caller asked for.
        expected: KeyRole,
        /// Role recorded in the envelope.
        found: KeyRole,
    },
    /// Declared body length disagrees with the blob size.
    #[error("declared body length {declared} but {available} bytes follow the header")]
    LengthMismatch {
        /// `body_len` field.
        declared: usize,
        /// Bytes actually present between header and checksum.
        available: usize,
    },
    /// Body digest does not match the trailer.
    #[error("checksum mismatch")]
    ChecksumMismatch,
    /// Body bytes are not a valid encoding.
    #[error("body does not decode: {0}")]
    Body(#[from] bincode::Error),
    /// Body too long for the `u32` length field.
    #[error("body of {len} bytes does not fit the u32 length field")]
    BodyTooLarge {
        /// Encoded body length.
        len: usize,
    },
    /// Body decodes but describes an unsupported circuit or parameter set.
    #[error("invalid key body: {0}")]
    InvalidBody(String),
}

/* ------------------------------ Circuit identity ------------------------------ */

/// Built-in circuit kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitDescriptor {
    /// Fibonacci recurrence over `rows` steps, seeded by public `a`, `b`.
    Fibonacci {
        /// Trace length (power of two).
        rows: u32,
    },
    /// Horner evaluation of a private polynomial with `coeffs` coefficients.
    PolyEval {
        /// Number of coefficients, which is also the trace length.
        coeffs: u32,
    },
    /// One SHA-256 compression of a private message block under the standard IV.
    Sha256,
}

/// Rounds of the SHA-256 compression function, one trace row each.
pub const SHA256_ROUNDS: u32 = 64;

impl CircuitDescriptor {
    /// Human-readable kind name.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Fibonacci { .. } => "fibonacci",
            Self::PolyEval { .. } => "poly_eval",
            Self::Sha256 => "sha256",
        }
    }

    /// Trace length of the circuit.
    #[must_use]
    pub const fn rows(&self) -> usize {
        match *self {
            Self::Fibonacci { rows } => rows as usize,
            Self::PolyEval { coeffs } => coeffs as usize,
            Self::Sha256 => SHA256_ROUNDS as usize,
        }
    }

    const fn tag(&self) -> u8 {
        match self {
            Self::Fibonacci { .. } => 1,
            Self::PolyEval { .. } => 2,
            Self::Sha256 => 3,
        }
    }

    /// Check the size is a power of two in `MIN_ROWS..=MAX_ROWS`.
    pub fn validate(&self) -> Result<(), String> {
        let rows = self.rows();
        if !rows.is_power_of_two() || rows < MIN_ROWS as usize || rows > MAX_ROWS as usize {
            return Err(format!(
                "{} size {rows} must be a power of two in {MIN_ROWS}..={MAX_ROWS}",
                self.kind_name()
            ));
        }
        Ok(())
    }
}

impl fmt::Display for CircuitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind_name(), self.rows())
    }
}

impl FromStr for CircuitDescriptor {
    type Err = String;

    /// Parses `fibonacci:<rows>`, `poly_eval:<coeffs>` or `sha256`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "sha256" {
            return Ok(Self::Sha256);
        }
        let (kind, size) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <kind>:<size>, got {s:?}"))?;
        let size: u32 = size
            .parse()
            .map_err(|e| format!("bad size {size:?}: {e}"))?;
        match kind {
            "fibonacci" | "fib" => Ok(Self::Fibonacci { rows: size }),
            "poly_eval" | "poly" => Ok(Self::PolyEval { coeffs: size }),
            other => Err(format!("unknown circuit kind {other:?}")),
        }
    }
}

/// STARK proof parameters carried inside every key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StarkParams {
    /// log2 of the LDE blowup factor.
    pub blowup_log2: u32,
    /// Number of trace rows and FRI positions sampled per proof.
    pub num_queries: u32,
    /// log2 of the column commitment chunk size.
    pub col_chunk_log2: u32,
}

impl Default for StarkParams {
    fn default() -> Self {
        Self {
            blowup_log2: 3,
            num_queries: 30,
            col_chunk_log2: 10,
        }
    }
}

impl StarkParams {
    /// Parse from TOML; absent fields take their defaults.
    pub fn from_toml_str(s: &str) -> ZkResult<Self> {
        let p: Self = toml::from_str(s).map_err(|e| ZkError::InvalidConfig(e.to_string()))?;
        p.validate().map_err(ZkError::InvalidConfig)?;
        Ok(p)
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=4).contains(&self.blowup_log2) {
            return Err(format!("blowup_log2 {} not in 1..=4", self.blowup_log2));
        }
        if !(1..=128).contains(&self.num_queries) {
            return Err(format!("num_queries {} not in 1..=128", self.num_queries));
        }
        if !(1..=20).contains(&self.col_chunk_log2) {
            return Err(format!("col_chunk_log2 {} not in 1..=20", self.col_chunk_log2));
        }
        Ok(())
    }
}

/// 32-byte circuit identity digest. Serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircuitId(pub [u8; 32]);

impl CircuitId {
    /// Digest of a descriptor and parameter set.
    #[must_use]
    pub fn derive(descriptor: &CircuitDescriptor, params: &StarkParams) -> Self {
        let mut h = blake3::Hasher::new();
        h.update(b"zkpv.circuit_id.v1");
        h.update(&[descriptor.tag()]);
        h.update(&(descriptor.rows() as u64).to_le_bytes());
        h.update(&params.blowup_log2.to_le_bytes());
        h.update(&params.num_queries.to_le_bytes());
        h.update(&params.col_chunk_log2.to_le_bytes());
        Self(*h.finalize().as_bytes())
    }

    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CircuitId({})", &self.to_hex()[..16])
    }
}

impl Serialize for CircuitId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CircuitId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&s, &mut out).map_err(serde::de::Error::custom)?;
        Ok(Self(out))
    }
}

/* --------------------------------- Envelope ---------------------------------- */

/// Which side of the protocol a key serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum KeyRole {
    /// Used by `prove`.
    Prover = 1,
    /// Used by `verify`.
    Verifier = 2,
}

impl TryFrom<u8> for KeyRole {
    type Error = EnvelopeError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            1 => Ok(Self::Prover),
            2 => Ok(Self::Verifier),
            other => Err(EnvelopeError::UnknownRole(other)),
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prover => "prover",
            Self::Verifier => "verifier",
        })
    }
}

/// Envelope body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBody {
    /// Circuit the key is bound to.
    pub descriptor: CircuitDescriptor,
    /// Proof parameters.
    pub params: StarkParams,
}

fn body_codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_BODY_LEN)
        .reject_trailing_bytes()
}

fn body_len_field(len: usize) -> Result<[u8; 4], EnvelopeError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| EnvelopeError::BodyTooLarge { len })
}

/// Decoded, validated key blob. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMaterial {
    role: KeyRole,
    body: KeyBody,
    circuit_id: CircuitId,
}

impl KeyMaterial {
    /// Build key material, validating descriptor and parameters.
    pub fn new(role: KeyRole, descriptor: CircuitDescriptor, params: StarkParams) -> ZkResult<Self> {
        descriptor.validate().map_err(ZkError::InvalidConfig)?;
        params.validate().map_err(ZkError::InvalidConfig)?;
        Ok(Self::from_body(role, KeyBody { descriptor, params }))
    }

    fn from_body(role: KeyRole, body: KeyBody) -> Self {
        let circuit_id = CircuitId::derive(&body.descriptor, &body.params);
        Self {
            role,
            body,
            circuit_id,
        }
    }

    /// Role recorded in the envelope.
    #[must_use]
    pub const fn role(&self) -> KeyRole {
        self.role
    }

    /// Circuit descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &CircuitDescriptor {
        &self.body.descriptor
    }

    /// Proof parameters.
    #[must_use]
    pub const fn params(&self) -> &StarkParams {
        &self.body.params
    }

    /// Circuit identity.
    #[must_use]
    pub const fn circuit_id(&self) -> CircuitId {
        self.circuit_id
    }

    /// Serialize into the envelope format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        let body = body_codec().serialize(&self.body)?;
        let mut out = Vec::with_capacity(HEADER_LEN + body.len() + CHECKSUM_LEN);
        out.extend_from_slice(&KEY_MAGIC);
        out.extend_from_slice(&KEY_VERSION.to_le_bytes());
        out.push(self.role as u8);
        out.extend_from_slice(&body_len_field(body.len())?);
        out.extend_from_slice(&body);
        out.extend_from_slice(blake3::hash(&body).as_bytes());
        Ok(out)
    }

    /// Parse and validate an envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(EnvelopeError::Truncated { len: bytes.len() });
        }
        let (header, rest) = bytes.split_at(HEADER_LEN);
        if header[..8] != KEY_MAGIC {
            return Err(EnvelopeError::BadMagic);
        }
        let version = u16::from_le_bytes([header[8], header[9]]);
        if version != KEY_VERSION {
            return Err(EnvelopeError::UnsupportedVersion(version));
        }
        let role = KeyRole::try_from(header[10])?;
        let declared =
            u32::from_le_bytes([header[11], header[12], header[13], header[14]]) as usize;
        let available = rest.len() - CHECKSUM_LEN;
        if declared != available {
            return Err(EnvelopeError::LengthMismatch {
                declared,
                available,
            });
        }
        let (body, checksum) = rest.split_at(available);
        if blake3::hash(body).as_bytes() != checksum {
            return Err(EnvelopeError::ChecksumMismatch);
        }
        let body: KeyBody = body_codec().deserialize(body)?;
        body.descriptor
            .validate()
            .and_then(|()| body.params.validate())
            .map_err(EnvelopeError::InvalidBody)?;
        Ok(Self::from_body(role, body))
    }

    fn expect_role(self, expected: KeyRole) -> Result<Self, EnvelopeError> {
        if self.role == expected {
            Ok(self)
        } else {
            Err(EnvelopeError::WrongRole {
                expected,
                found: self.role,
            })
        }
    }
}

macro_rules! role_key {
    ($(#[$doc:meta])* $name:ident, $role:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name(KeyMaterial);

        impl $name {
            /// Wrap material of the matching role.
            pub fn from_material(m: KeyMaterial) -> Result<Self, EnvelopeError> {
                m.expect_role($role).map(Self)
            }

            /// Build fresh key material for this role.
            pub fn new(descriptor: CircuitDescriptor, params: StarkParams) -> ZkResult<Self> {
                KeyMaterial::new($role, descriptor, params).map(Self)
            }

            /// Underlying material.
            #[must_use]
            pub const fn material(&self) -> &KeyMaterial {
                &self.0
            }

            /// Circuit descriptor.
            #[must_use]
            pub const fn descriptor(&self) -> &CircuitDescriptor {
                self.0.descriptor()
            }

            /// Proof parameters.
            #[must_use]
            pub const fn params(&self) -> &StarkParams {
                self.0.params()
            }

            /// Circuit identity.
            #[must_use]
            pub const fn circuit_id(&self) -> CircuitId {
                self.0.circuit_id()
            }

            /// Envelope bytes.
            pub fn to_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
                self.0.to_bytes()
            }
        }
    };
}

role_key!(
    /// Key material for the prover.
    ProverKey,
    KeyRole::Prover
);
role_key!(
    /// Key material for the verifier.
    VerifierKey,
    KeyRole::Verifier
);

#[cfg(test)]
mod tests {
    use super::*;

    fn fib8() -> KeyMaterial {
        KeyMaterial::new(
            KeyRole::Prover,
            CircuitDescriptor::Fibonacci { rows: 8 },
            StarkParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn envelope_roundtrip_preserves_identity() {
        let m = fib8();
        let bytes = m.to_bytes().unwrap();
        assert_eq!(&bytes[..8], b"ZKPVKEY\0");
        let back = KeyMaterial::from_bytes(&bytes).unwrap();
        assert_eq!(back, m);
        assert_eq!(back.circuit_id(), m.circuit_id());
    }

    #[test]
    fn every_single_byte_corruption_is_detected() {
        let bytes = fib8().to_bytes().unwrap();
        for i in 0..bytes.len() {
            let mut bad = bytes.clone();
            bad[i] ^= 0x01;
            // Role byte 1 flips to 0, which is unknown.
            assert!(KeyMaterial::from_bytes(&bad).is_err(), "flip at {i} accepted");
        }
    }

    #[test]
    fn truncation_and_trailing_bytes_are_rejected() {
        let bytes = fib8().to_bytes().unwrap();
        assert!(matches!(
            KeyMaterial::from_bytes(&bytes[..10]),
            Err(EnvelopeError::Truncated { len: 10 })
        ));
        assert!(matches!(
            KeyMaterial::from_bytes(&bytes[..bytes.len() - 1]),
            Err(EnvelopeError::LengthMismatch { .. })
        ));
        let mut longer = bytes;
        longer.push(0);
        assert!(matches!(
            KeyMaterial::from_bytes(&longer),
            Err(EnvelopeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn body_length_field_rejects_oversized_bodies() {
        assert_eq!(body_len_field(17).unwrap(), 17u32.to_le_bytes());
        assert_eq!(body_len_field(u32::MAX as usize).unwrap(), [0xFF; 4]);
        #[cfg(target_pointer_width = "64")]
        {
            let len = u32::MAX as usize + 1;
            assert!(matches!(
                body_len_field(len),
                Err(EnvelopeError::BodyTooLarge { len: l }) if l == len
            ));
        }
    }

    #[test]
    fn role_wrappers_enforce_role() {
        let m = fib8();
        assert!(ProverKey::from_material(m.clone()).is_ok());
        assert!(matches!(
            VerifierKey::from_material(m),
            Err(EnvelopeError::WrongRole {
                expected: KeyRole::Verifier,
                found: KeyRole::Prover
            })
        ));
    }

    #[test]
    fn circuit_id_depends_on_descriptor_and_params() {
        let p = StarkParams::default();
        let a = CircuitId::derive(&CircuitDescriptor::Fibonacci { rows: 8 }, &p);
        let b = CircuitId::derive(&CircuitDescriptor::Fibonacci { rows: 16 }, &p);
        let c = CircuitId::derive(&CircuitDescriptor::PolyEval { coeffs: 8 }, &p);
        let d = CircuitId::derive(
            &CircuitDescriptor::Fibonacci { rows: 8 },
            &StarkParams {
                num_queries: 31,
                ..p
            },
        );
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn invalid_descriptors_are_config_errors() {
        for d in [
            CircuitDescriptor::Fibonacci { rows: 6 },
            CircuitDescriptor::Fibonacci { rows: 2 },
            CircuitDescriptor::PolyEval { coeffs: 0 },
        ] {
            assert!(matches!(
                KeyMaterial::new(KeyRole::Prover, d, StarkParams::default()),
                Err(ZkError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn params_from_toml_fill_defaults() {
        let p = StarkParams::from_toml_str("num_queries = 12\n").unwrap();
        assert_eq!(p.num_queries, 12);
        assert_eq!(p.blowup_log2, 3);
        assert!(StarkParams::from_toml_str("blowup_log2 = 9\n").is_err());
        assert!(StarkParams::from_toml_str("unknown = 1\n").is_err());
    }

    #[test]
    fn descriptor_parses_from_cli_form() {
        assert_eq!(
            "fibonacci:16".parse::<CircuitDescriptor>(),
            Ok(CircuitDescriptor::Fibonacci { rows: 16 })
        );
        assert_eq!(
            "poly:8".parse::<CircuitDescriptor>(),
            Ok(CircuitDescriptor::PolyEval { coeffs: 8 })
        );
        assert_eq!(
            "sha256".parse::<CircuitDescriptor>(),
            Ok(CircuitDescriptor::Sha256)
        );
        assert_eq!(CircuitDescriptor::Sha256.rows(), 64);
        assert!(CircuitDescriptor::Sha256.validate().is_ok());
        assert!("sha256:8".parse::<CircuitDescriptor>().is_err());
    }

    #[test]
    fn circuit_id_serializes_as_hex() {
        let id = fib8().circuit_id();
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s.len(), 66);
        let back: CircuitId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }
}
