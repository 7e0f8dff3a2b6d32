//! FRI low-degree test over the LDE coset.
//!
//! Folding rule: a layer `y` on the coset `s·⟨w⟩` of size `N` pairs position
//! `i` with `i + N/2` (the points `x` and `-x`) and maps them to
//!
//! ```text
//! y'[i] = ((a + b) + β · (a - b) / x) / 2        a = y[i], b = y[i + N/2], x = s·w^i
//! ```
//!
//! on the coset `s²·⟨w²⟩`. A polynomial of degree below `2^folds` folds to a
//! constant after `folds` rounds. Every layer root is absorbed before that
//! layer's `β` is drawn, and the final constant is absorbed before any query
//! position, so the prover cannot adapt a layer to its challenge.

use anyhow::{bail, ensure, Result};
use zkpv_crypto::{Label, Transcript};
use zkpv_field::{batch_inverse, Goldilocks as F};

use crate::merkle::{fri_layer_tree, fri_leaf, Digest, MerkleTree};
use crate::params::{self, ProofShape};
use crate::proof::{decode_felt, FriLayerOpening};

/// Fold the pair `(f(x), f(-x))` with challenge `beta`.
#[must_use]
pub fn fold_pair(a: F, b: F, x: F, beta: F) -> F {
    ((a + b) + beta * (a - b) * x.inv()) * F::from_u64(2).inv()
}

fn fold_layer(cur: &[F], beta: F, shift: F, w: F) -> Vec<F> {
    let half = cur.len() / 2;
    let mut xs = Vec::with_capacity(half);
    let mut x = shift;
    for _ in 0..half {
        xs.push(x);
        x *= w;
    }
    let x_inv = batch_inverse(&xs);
    let inv2 = F::from_u64(2).inv();
    (0..half)
        .map(|i| {
            let (a, b) = (cur[i], cur[i + half]);
            ((a + b) + beta * (a - b) * x_inv[i]) * inv2
        })
        .collect()
}

/// Prover-side FRI state: every committed layer, its tree, and the last fold.
#[derive(Debug)]
pub struct FriCommitment {
    layers: Vec<Vec<F>>,
    trees: Vec<MerkleTree>,
    last: Vec<F>,
}

/// Commit to `layer0` (evaluations on the LDE coset) and fold it
/// `shape.folds` times. The value absorbed as the final constant is the
/// first entry of the last layer; [`FriCommitment::final_is_constant`] says
/// whether the rest agree.
#[must_use]
pub fn fri_commit<T: Transcript>(tr: &mut T, layer0: Vec<F>, shape: &ProofShape) -> FriCommitment {
    assert_eq!(layer0.len(), shape.lde_size(), "FRI layer 0 must cover the LDE");
    let mut layers = Vec::with_capacity(shape.folds);
    let mut trees = Vec::with_capacity(shape.folds);
    let mut cur = layer0;
    let mut shift = params::coset_shift();
    let mut w = shape.lde_generator();
    for _ in 0..shape.folds {
        let tree = fri_layer_tree(&cur);
        tr.absorb(Label::FriRoot.as_str(), &tree.root());
        let beta = params::derive_field_elems(tr, Label::FriBeta, 1)[0];
        let next = fold_layer(&cur, beta, shift, w);
        layers.push(cur);
        trees.push(tree);
        cur = next;
        shift *= shift;
        w *= w;
    }
    tr.absorb(Label::FriFinal.as_str(), &cur[0].to_le_bytes());
    FriCommitment {
        layers,
        trees,
        last: cur,
    }
}

impl FriCommitment {
    /// Layer roots, layer 0 first.
    #[must_use]
    pub fn roots(&self) -> Vec<Digest> {
        self.trees.iter().map(MerkleTree::root).collect()
    }

    /// The constant the last layer is claimed to be.
    #[must_use]
    pub fn final_value(&self) -> F {
        self.last[0]
    }

    /// Whether the last layer really is constant, i.e. layer 0 had low degree.
    #[must_use]
    pub fn final_is_constant(&self) -> bool {
        self.last.iter().all(|&v| v == self.last[0])
    }

    /// Open the chain starting at layer-0 position `index`.
    #[must_use]
    pub fn open(&self, mut index: usize) -> Vec<FriLayerOpening> {
        let mut out = Vec::with_capacity(self.layers.len());
        for (layer, tree) in self.layers.iter().zip(&self.trees) {
            let half = layer.len() / 2;
            let sib = index ^ half;
            out.push(FriLayerOpening {
                value_le: layer[index].to_le_bytes(),
                path: tree.open(index),
                sibling_le: layer[sib].to_le_bytes(),
                sibling_path: tree.open(sib),
            });
            index %= half;
        }
        out
    }
}

/// Re-absorb `roots` and the final value, re-deriving the folding challenges
/// the way [`fri_commit`] drew them.
pub fn fri_replay<T: Transcript>(
    tr: &mut T,
    roots: &[Digest],
    final_value: F,
    shape: &ProofShape,
) -> Result<Vec<F>> {
    ensure!(
        roots.len() == shape.folds,
        "expected {} FRI roots, got {}",
        shape.folds,
        roots.len()
    );
    let betas = roots
        .iter()
        .map(|root| {
            tr.absorb(Label::FriRoot.as_str(), root);
            params::derive_field_elems(tr, Label::FriBeta, 1)[0]
        })
        .collect();
    tr.absorb(Label::FriFinal.as_str(), &final_value.to_le_bytes());
    Ok(betas)
}

/// Check the chain for one query. `expected0` is the layer-0 value the
/// verifier computed independently at `position`.
pub fn fri_verify_query(
    shape: &ProofShape,
    roots: &[Digest],
    betas: &[F],
    final_value: F,
    position: usize,
    chain: &[FriLayerOpening],
    expected0: F,
) -> Result<()> {
    ensure!(
        roots.len() == shape.folds && betas.len() == shape.folds,
        "FRI roots/betas disagree with the proof shape"
    );
    ensure!(
        chain.len() == shape.folds,
        "FRI query has {} layers, expected {}",
        chain.len(),
        shape.folds
    );
    ensure!(position < shape.lde_size(), "FRI query position out of range");

    let mut index = position;
    let mut expected = expected0;
    let mut shift = params::coset_shift();
    let mut w = shape.lde_generator();
    for (l, open) in chain.iter().enumerate() {
        let depth = shape.lde_log2 - l;
        let half = 1usize << (depth - 1);
        let sib = index ^ half;

        let (Some(v), Some(s)) = (decode_felt(open.value_le), decode_felt(open.sibling_le)) else {
            bail!("non-canonical FRI value at layer {l}");
        };
        ensure!(v == expected, "FRI layer {l} value does not match fold");
        ensure!(
            MerkleTree::verify(&roots[l], fri_leaf(open.value_le), index, &open.path, depth),
            "FRI path failed at layer {l}"
        );
        ensure!(
            MerkleTree::verify(&roots[l], fri_leaf(open.sibling_le), sib, &open.sibling_path, depth),
            "FRI sibling path failed at layer {l}"
        );

        let (a, b) = if index < half { (v, s) } else { (s, v) };
        let lo = index % half;
        expected = fold_pair(a, b, shift * w.pow(lo as u64), betas[l]);
        index = lo;
        shift *= shift;
        w *= w;
    }
    ensure!(expected == final_value, "FRI final value mismatch");
    Ok(())
}
