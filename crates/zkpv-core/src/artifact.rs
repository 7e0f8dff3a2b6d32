//! Proof artifacts and public-input vectors.
//!
//! [`ProofArtifact`] pins the circuit identity the proof claims, the
//! backend-opaque `proof_bytes` body, and a free-form `meta` JSON value for
//! diagnostics. Only the body is covered by verification: a flipped byte in
//! `proof_bytes` makes verification return `false`, whereas a header naming a
//! different circuit is a key mismatch.
//!
//! ## Compatibility
//! - No `deny_unknown_fields`, so newer producers stay readable.
//! - `meta` is for humans and ops (timings, parameter echoes). If a value
//!   matters at runtime, promote it into a typed field.

use core::fmt;

use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zkpv_field::Goldilocks as F;

use crate::keys::CircuitId;

/// Serialized proof produced by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofArtifact {
    /// Circuit the proof was produced for.
    pub circuit_id: CircuitId,
    /// Opaque, backend-specific encoding of the proof. Non-empty on success.
    pub proof_bytes: Vec<u8>,
    /// Free-form metadata; omitted values deserialize as `Null`.
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl ProofArtifact {
    /// Construct a new [`ProofArtifact`].
    #[inline]
    #[must_use]
    pub const fn new(circuit_id: CircuitId, proof_bytes: Vec<u8>, meta: serde_json::Value) -> Self {
        Self {
            circuit_id,
            proof_bytes,
            meta,
        }
    }

    /// Returns the proof bytes.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.proof_bytes
    }

    /// Length of the proof body.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.proof_bytes.len()
    }

    /// Whether the proof body is empty (never true for a produced proof).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proof_bytes.is_empty()
    }

    /// Circuit identity in the header.
    #[inline]
    #[must_use]
    pub const fn circuit_id(&self) -> CircuitId {
        self.circuit_id
    }
}

/* ---------------------------- Public-input vector ---------------------------- */

/// Why a binary public-input buffer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublicInputsDecodeError {
    /// Fewer than 8 bytes for the length prefix.
    #[error("missing length prefix")]
    MissingLength,
    /// Buffer size disagrees with the length prefix.
    #[error("length prefix says {declared} elements but buffer holds {available} bytes of payload")]
    LengthMismatch {
        /// Elements announced by the prefix.
        declared: u64,
        /// Payload bytes after the prefix.
        available: usize,
    },
    /// An element is not below the field modulus.
    #[error("element {index} = {value} is not canonical")]
    NonCanonical {
        /// Position of the element.
        index: usize,
        /// Raw value read.
        value: u64,
    },
}

/// Public inputs (then public outputs) committed by a proof.
///
/// JSON form is an array of canonical decimal strings; the binary form is a
/// `u64` LE element count followed by `u64` LE canonical elements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PublicInputVector(Vec<F>);

impl PublicInputVector {
    /// Wrap field elements.
    #[must_use]
    pub const fn new(values: Vec<F>) -> Self {
        Self(values)
    }

    /// Borrow the elements.
    #[must_use]
    pub fn as_slice(&self) -> &[F] {
        &self.0
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical decimal strings.
    #[must_use]
    pub fn to_decimal_strings(&self) -> Vec<String> {
        zkpv_field::codec::to_decimal_vec(&self.0)
    }

    /// Parse canonical decimal strings; the error carries the failing index.
    pub fn from_decimal_strings<S: AsRef<str>>(
        items: &[S],
    ) -> Result<Self, (usize, zkpv_field::ParseFieldError)> {
        zkpv_field::codec::parse_decimal_vec(items).map(Self)
    }

    /// Binary encoding.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 * (self.0.len() + 1));
        out.extend_from_slice(&(self.0.len() as u64).to_le_bytes());
        for v in &self.0 {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    /// Strict binary decoding: exact length, canonical elements only.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PublicInputsDecodeError> {
        if bytes.len() < 8 {
            return Err(PublicInputsDecodeError::MissingLength);
        }
        let (len_le, payload) = bytes.split_at(8);
        let mut le = [0u8; 8];
        le.copy_from_slice(len_le);
        let declared = u64::from_le_bytes(le);
        let expected = usize::try_from(declared)
            .ok()
            .and_then(|n| n.checked_mul(8))
            .filter(|&b| b == payload.len());
        if expected.is_none() {
            return Err(PublicInputsDecodeError::LengthMismatch {
                declared,
                available: payload.len(),
            });
        }
        payload
            .chunks_exact(8)
            .enumerate()
            .map(|(index, c)| {
                le.copy_from_slice(c);
                let value = u64::from_le_bytes(le);
                F::from_canonical_u64(value)
                    .ok_or(PublicInputsDecodeError::NonCanonical { index, value })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<Vec<F>> for PublicInputVector {
    fn from(v: Vec<F>) -> Self {
        Self(v)
    }
}

impl fmt::Display for PublicInputVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}

impl Serialize for PublicInputVector {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(self.0.iter().map(ToString::to_string))
    }
}

impl<'de> Deserialize<'de> for PublicInputVector {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct DecimalSeq;

        impl<'de> Visitor<'de> for DecimalSeq {
            type Value = PublicInputVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of decimal field elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1024));
                while let Some(s) = seq.next_element::<String>()? {
                    let v = s.parse::<F>().map_err(|e| {
                        serde::de::Error::custom(format!("element {}: {e}", out.len()))
                    })?;
                    out.push(v);
                }
                Ok(PublicInputVector(out))
            }
        }

        d.deserialize_seq(DecimalSeq)
    }
}
