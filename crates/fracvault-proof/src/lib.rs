//! # fracvault-proof
//!
//! **Proof verifier** for ownership deeds. Stateless and side-effect free.
//!
//! - [`merkle`]: sorted-pair Merkle inclusion proofs over `(index, units)`
//!   leaves, plus the oracle-side [`MerkleTree`] builder
//! - [`signature`]: ed25519 verification of the canonical deed payload,
//!   plus the attester-side [`DeedSigner`]
//! - [`DeedVerifier`]: the injectable capability the redemption registry
//!   consumes; [`ProofVerifier`] is the production implementation
//!
//! Every predicate fails closed: malformed input yields `false`, never a panic.

pub mod merkle;
pub mod signature;
pub mod verifier;

pub use merkle::{MerkleTree, compute_root, hash_pair, leaf_hash};
pub use signature::{DeedSigner, verify_deed_signature, verify_signature};
pub use verifier::{DeedVerifier, ProofVerifier};
