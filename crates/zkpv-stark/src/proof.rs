//! Proof body carried inside `ProofArtifact::proof_bytes`.

use bincode::Options;
use serde::{Deserialize, Serialize};
use zkpv_field::Goldilocks as F;

use crate::merkle::Digest;

/// Upper bound on an encoded body. Bodies are a few hundred KiB at most.
pub const MAX_BODY_BYTES: u64 = 64 << 20;

/// Every committed column at one LDE position (little-endian), with a chunked Merkle path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub values_le: Vec<[u8; 8]>,
    pub index: usize,

    pub chunk_index: usize,
    pub index_in_chunk: usize,
    pub chunk_root: Digest,
    pub path_in_chunk: Vec<Digest>,
    pub path_to_chunk: Vec<Digest>,
}

/// One FRI layer at a query position: the value, its folding partner, and both paths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriLayerOpening {
    pub value_le: [u8; 8],
    pub path: Vec<Digest>,
    pub sibling_le: [u8; 8],
    pub sibling_path: Vec<Digest>,
}

/// One query: the committed columns at `x` and `ω·x`, and the FRI chain from `x`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOpening {
    pub position: usize,
    pub cur: Opening,
    pub next: Opening,
    pub fri: Vec<FriLayerOpening>,
}

/// Proof body, version 2.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBody {
    pub version: u16,
    /// Trace length; must equal the verifier key's.
    pub n_rows: u64,

    /// Root over the blinded trace columns and the mask, on the LDE coset.
    pub trace_root: Digest,

    /// Roots of every FRI layer before its fold, layer 0 first.
    pub fri_roots: Vec<Digest>,
    /// Constant the last layer folds to.
    pub fri_final_le: [u8; 8],

    pub queries: Vec<QueryOpening>,
}

/// Decode an opened value, rejecting non-canonical encodings.
#[must_use]
pub fn decode_felt(le: [u8; 8]) -> Option<F> {
    F::from_canonical_u64(u64::from_le_bytes(le))
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_BODY_BYTES)
        .reject_trailing_bytes()
}

impl ProofBody {
    /// Encode with the bounded bincode codec.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        codec().serialize(self)
    }

    /// Decode; trailing bytes and oversize lengths are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        codec().deserialize(bytes)
    }

    /// Number of FRI folding layers.
    #[must_use]
    pub fn fri_layers(&self) -> usize {
        self.fri_roots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> ProofBody {
        ProofBody {
            version: 2,
            n_rows: 4,
            trace_root: [1; 32],
            fri_roots: vec![[2; 32]],
            fri_final_le: [0; 8],
            queries: vec![],
        }
    }

    #[test]
    fn body_codec_roundtrip_and_rejects_trailing() {
        let b = tiny();
        let mut bytes = b.to_bytes().unwrap();
        assert_eq!(ProofBody::from_bytes(&bytes).unwrap(), b);
        bytes.push(0);
        assert!(ProofBody::from_bytes(&bytes).is_err());
        assert!(ProofBody::from_bytes(&[]).is_err());
    }

    #[test]
    fn absurd_length_prefix_is_rejected() {
        let mut bytes = tiny().to_bytes().unwrap();
        // version (2) + n_rows (8) + trace_root (32), then the fri_roots length prefix.
        bytes[42..50].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(ProofBody::from_bytes(&bytes).is_err());
    }

    #[test]
    fn non_canonical_values_do_not_decode() {
        assert_eq!(decode_felt(7u64.to_le_bytes()), Some(F::from_u64(7)));
        assert!(decode_felt(u64::MAX.to_le_bytes()).is_none());
    }
}
