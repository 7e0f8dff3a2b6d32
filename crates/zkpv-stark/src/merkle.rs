//! BLAKE3 Merkle trees and the chunked row commitment.
//!
//! Trees are always built over a power-of-two number of leaves (padded with
//! zero digests), so every authentication path has exactly `log2(width)`
//! siblings and the verifier can insist on that depth.
//!
//! The blinded trace and the mask are committed together over the LDE coset:
//! leaf `i` hashes the value of every column at point `i`, bound to the column
//! labels. Leaves are grouped into chunks of `2^chunk_log2`, each chunk gets its
//! own tree, and an outer tree commits to the chunk roots. Openings carry both
//! paths plus the coordinates `(chunk_index, index_in_chunk)`, which the
//! verifier recomputes from the position it asked for.

use blake3::Hasher;
use zkpv_field::Goldilocks as F;

use crate::params;
use crate::proof::Opening;

/// 32-byte digest.
pub type Digest = [u8; 32];

#[inline]
fn hash_pair(l: &Digest, r: &Digest) -> Digest {
    let mut h = Hasher::new();
    h.update(l);
    h.update(r);
    *h.finalize().as_bytes()
}

/// Merkle tree over 32-byte leaves, levels stored bottom-up.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build from leaves, padding to the next power of two.
    #[must_use]
    pub fn from_leaves(leaves: &[Digest]) -> Self {
        let width = leaves.len().max(1).next_power_of_two();
        let mut level = leaves.to_vec();
        level.resize(width, [0u8; 32]);
        let mut levels = vec![level];
        while levels[levels.len() - 1].len() > 1 {
            let next = levels[levels.len() - 1]
                .chunks_exact(2)
                .map(|p| hash_pair(&p[0], &p[1]))
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    /// Root digest.
    #[must_use]
    pub fn root(&self) -> Digest {
        self.levels[self.levels.len() - 1][0]
    }

    /// Path length (`log2` of the padded width).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Siblings bottom→top for leaf `idx`.
    ///
    /// # Panics
    /// Panics if `idx` is outside the padded width.
    #[must_use]
    pub fn open(&self, mut idx: usize) -> Vec<Digest> {
        assert!(idx < self.levels[0].len(), "leaf index out of range");
        let mut path = Vec::with_capacity(self.depth());
        for level in &self.levels[..self.depth()] {
            path.push(level[idx ^ 1]);
            idx >>= 1;
        }
        path
    }

    /// Check `leaf` sits at `idx` under `root` with a path of exactly `depth` siblings.
    #[must_use]
    pub fn verify(root: &Digest, leaf: Digest, mut idx: usize, path: &[Digest], depth: usize) -> bool {
        if path.len() != depth || idx >> depth != 0 {
            return false;
        }
        let mut cur = leaf;
        for sib in path {
            cur = if idx & 1 == 0 {
                hash_pair(&cur, sib)
            } else {
                hash_pair(sib, &cur)
            };
            idx >>= 1;
        }
        &cur == root
    }
}

/// Digest of the ordered column labels, mixed into every row leaf.
#[must_use]
pub fn labels_digest<S: AsRef<str>>(labels: &[S]) -> Digest {
    let mut h = Hasher::new();
    h.update(&(labels.len() as u64).to_le_bytes());
    for l in labels {
        let l = l.as_ref();
        h.update(&(l.len() as u32).to_le_bytes());
        h.update(l.as_bytes());
    }
    *h.finalize().as_bytes()
}

/// Leaf digest of one row of encoded values.
#[must_use]
pub fn row_leaf(labels: &Digest, values_le: &[[u8; 8]]) -> Digest {
    let mut h = Hasher::new();
    h.update(params::DS_ROW_LEAF.as_bytes());
    h.update(labels);
    h.update(&(values_le.len() as u64).to_le_bytes());
    for v in values_le {
        h.update(v);
    }
    *h.finalize().as_bytes()
}

/// Leaf digest of a FRI layer value.
#[must_use]
pub fn fri_leaf(value_le: [u8; 8]) -> Digest {
    let mut h = Hasher::new();
    h.update(params::DS_FRI_LEAF.as_bytes());
    h.update(&value_le);
    *h.finalize().as_bytes()
}

/// Merkle tree over a FRI layer.
#[must_use]
pub fn fri_layer_tree(values: &[F]) -> MerkleTree {
    let leaves: Vec<Digest> = values.iter().map(|v| fri_leaf(v.to_le_bytes())).collect();
    MerkleTree::from_leaves(&leaves)
}

/* ------------------------- Chunked row commitment ------------------------- */

/// Chunk geometry shared by prover and verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkShape {
    /// `log2` of leaves per chunk (clamped to the domain size).
    pub chunk_log2: usize,
    /// `log2` of the number of chunks.
    pub outer_log2: usize,
}

impl ChunkShape {
    /// Geometry for a power-of-two domain of `size` and requested chunk size.
    #[must_use]
    pub fn new(size: usize, requested_chunk_log2: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        let size_log2 = size.trailing_zeros() as usize;
        let chunk_log2 = requested_chunk_log2.min(size_log2);
        Self {
            chunk_log2,
            outer_log2: size_log2 - chunk_log2,
        }
    }

    /// `(chunk_index, index_in_chunk)` of a position.
    #[must_use]
    pub const fn locate(&self, pos: usize) -> (usize, usize) {
        (pos >> self.chunk_log2, pos & ((1 << self.chunk_log2) - 1))
    }
}

/// In-memory chunked commitment to a set of equal-length columns.
#[derive(Clone, Debug)]
pub struct RowCommit {
    labels: Digest,
    shape: ChunkShape,
    columns: Vec<Vec<F>>,
    inner: Vec<MerkleTree>,
    outer: MerkleTree,
}

impl RowCommit {
    /// Commit `columns` (column-major, equal power-of-two heights) under `labels`.
    ///
    /// # Panics
    /// Panics if `columns` is empty or the label count differs from the column count.
    #[must_use]
    pub fn new<S: AsRef<str>>(labels: &[S], columns: Vec<Vec<F>>, chunk_log2: usize) -> Self {
        assert!(!columns.is_empty(), "nothing to commit");
        assert_eq!(labels.len(), columns.len(), "one label per column");
        let size = columns[0].len();
        let labels = labels_digest(labels);
        let shape = ChunkShape::new(size, chunk_log2);
        let leaves: Vec<Digest> = (0..size)
            .map(|i| row_leaf(&labels, &Self::encode(&columns, i)))
            .collect();
        let inner: Vec<MerkleTree> = leaves
            .chunks(1 << shape.chunk_log2)
            .map(MerkleTree::from_leaves)
            .collect();
        let chunk_roots: Vec<Digest> = inner.iter().map(MerkleTree::root).collect();
        let outer = MerkleTree::from_leaves(&chunk_roots);
        Self {
            labels,
            shape,
            columns,
            inner,
            outer,
        }
    }

    fn encode(columns: &[Vec<F>], i: usize) -> Vec<[u8; 8]> {
        columns.iter().map(|c| c[i].to_le_bytes()).collect()
    }

    /// Outer root.
    #[must_use]
    pub fn root(&self) -> Digest {
        self.outer.root()
    }

    /// Committed column `j`.
    #[must_use]
    pub fn column(&self, j: usize) -> &[F] {
        &self.columns[j]
    }

    /// Every committed column.
    #[must_use]
    pub fn columns(&self) -> &[Vec<F>] {
        &self.columns
    }

    /// Number of committed columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Digest of the labels the leaves are bound to.
    #[must_use]
    pub const fn labels(&self) -> &Digest {
        &self.labels
    }

    /// Open every column at `pos`.
    #[must_use]
    pub fn open(&self, pos: usize) -> Opening {
        let (chunk_index, index_in_chunk) = self.shape.locate(pos);
        let chunk = &self.inner[chunk_index];
        Opening {
            values_le: Self::encode(&self.columns, pos),
            index: pos,
            chunk_index,
            index_in_chunk,
            chunk_root: chunk.root(),
            path_in_chunk: chunk.open(index_in_chunk),
            path_to_chunk: self.outer.open(chunk_index),
        }
    }
}

/// Verify an opening of `pos` against a row commitment root. Coordinates,
/// width, path depths and both Merkle paths must all agree.
#[must_use]
pub fn verify_row_opening(
    root: &Digest,
    labels: &Digest,
    width: usize,
    shape: ChunkShape,
    pos: usize,
    open: &Opening,
) -> bool {
    let (chunk_index, index_in_chunk) = shape.locate(pos);
    if open.index != pos
        || open.chunk_index != chunk_index
        || open.index_in_chunk != index_in_chunk
        || open.values_le.len() != width
    {
        return false;
    }
    let leaf = row_leaf(labels, &open.values_le);
    MerkleTree::verify(
        &open.chunk_root,
        leaf,
        index_in_chunk,
        &open.path_in_chunk,
        shape.chunk_log2,
    ) && MerkleTree::verify(
        root,
        open.chunk_root,
        chunk_index,
        &open.path_to_chunk,
        shape.outer_log2,
    )
}
