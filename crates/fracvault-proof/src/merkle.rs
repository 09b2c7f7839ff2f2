//! Sorted-pair Merkle trees over `(index, units)` leaves.
//!
//! Each pair of sibling digests is sorted before hashing, so a proof is just
//! the list of siblings from leaf to root; no left/right flags. Leaf and
//! inner-node preimages carry distinct domain tags so a leaf can never be
//! passed off as an inner node.
//!
//! Leaf preimage: `"fracvault:leaf:v1:" || index(32 BE) || units(32 BE)`
//! Node preimage: `"fracvault:node:v1:" || min(a, b) || max(a, b)`
//!
//! [`MerkleTree`] is the oracle-side builder; it must stay byte-for-byte
//! consistent with [`verify`], which the contract tests in this crate pin.

use fracvault_types::{ContributorIndex, Digest, Units, constants};
use sha2::{Digest as _, Sha256};

/// Left-pad a `u64` to a 32-byte big-endian word.
fn word(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Hash of the leaf committing `(index, units)`.
#[must_use]
pub fn leaf_hash(index: ContributorIndex, units: Units) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(constants::MERKLE_LEAF_TAG);
    hasher.update(word(index));
    hasher.update(word(units));
    hasher.finalize().into()
}

/// Order-independent hash of two sibling digests.
#[must_use]
pub fn hash_pair(a: &Digest, b: &Digest) -> Digest {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(constants::MERKLE_NODE_TAG);
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// Fold `proof` onto `leaf` and return the resulting root.
#[must_use]
pub fn compute_root(leaf: Digest, proof: &[Digest]) -> Digest {
    proof.iter().fold(leaf, |acc, sibling| hash_pair(&acc, sibling))
}

/// Verify that `(index, units)` is a leaf of the tree committed by `root`.
///
/// Fails closed: proofs deeper than [`constants::MAX_PROOF_DEPTH`] are
/// rejected without hashing.
#[must_use]
pub fn verify(root: &Digest, index: ContributorIndex, units: Units, proof: &[Digest]) -> bool {
    if proof.len() > constants::MAX_PROOF_DEPTH {
        tracing::debug!(depth = proof.len(), "Merkle proof too deep");
        return false;
    }
    compute_root(leaf_hash(index, units), proof) == *root
}

// ---------------------------------------------------------------------------
// MerkleTree: oracle-side builder
// ---------------------------------------------------------------------------

/// A fully materialized sorted-pair Merkle tree.
///
/// Leaves are sorted by digest before the first layer is built, so the root
/// and every proof are independent of the order entries were supplied in.
/// A lone node at the end of a layer is promoted unchanged.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `layers[0]` holds the sorted leaf digests; the last layer holds the root.
    layers: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree from `(index, units)` entries.
    #[must_use]
    pub fn from_entries(entries: &[(ContributorIndex, Units)]) -> Self {
        let mut leaves: Vec<Digest> = entries
            .iter()
            .map(|&(index, units)| leaf_hash(index, units))
            .collect();
        leaves.sort_unstable();

        let mut layers = vec![leaves];
        loop {
            let current = &layers[layers.len() - 1];
            if current.len() <= 1 {
                break;
            }
            let next: Vec<Digest> = current
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(a, b),
                    _ => pair[0],
                })
                .collect();
            layers.push(next);
        }
        Self { layers }
    }

    /// The committed root. An empty tree has the all-zero root, which no
    /// leaf can reproduce.
    #[must_use]
    pub fn root(&self) -> Digest {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or([0u8; 32])
    }

    /// Number of leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    /// Whether the tree has no leaves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sibling path for `(index, units)`, or `None` if it is not a leaf.
    #[must_use]
    pub fn proof(&self, index: ContributorIndex, units: Units) -> Option<Vec<Digest>> {
        let leaf = leaf_hash(index, units);
        let mut pos = self.layers.first()?.binary_search(&leaf).ok()?;

        let mut proof = Vec::with_capacity(self.layers.len());
        for layer in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = layer.get(pos ^ 1) {
                proof.push(*sibling);
            }
            pos /= 2;
        }
        Some(proof)
    }

    /// Root as lowercase hex, for logs and fixtures.
    #[must_use]
    pub fn root_hex(&self) -> String {
        hex::encode(self.root())
    }
}
