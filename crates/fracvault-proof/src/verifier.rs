//! The `DeedVerifier` capability.
//!
//! Redemption is gated on two pure predicates: the deed is signed by the
//! attester, and its `(index, units)` is a leaf of the committed root. The
//! registry depends only on this trait, so tests can inject a mock and
//! other hosts can swap in a different signature scheme.

use fracvault_types::{AttesterKey, ContributorIndex, Digest, OwnershipDeed, Units};

use crate::{merkle, signature};

/// Pure verification predicates consumed by the redemption registry.
pub trait DeedVerifier: Send + Sync {
    /// Is `(index, units)` committed by `root` under `proof`?
    fn verify_proof(
        &self,
        root: &Digest,
        index: ContributorIndex,
        units: Units,
        proof: &[Digest],
    ) -> bool;

    /// Was `deed` signed by `expected_signer`?
    fn verify_signer(&self, deed: &OwnershipDeed, expected_signer: &AttesterKey) -> bool;
}

/// Production verifier: sorted-pair SHA-256 Merkle proofs and ed25519
/// signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofVerifier;

impl ProofVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DeedVerifier for ProofVerifier {
    fn verify_proof(
        &self,
        root: &Digest,
        index: ContributorIndex,
        units: Units,
        proof: &[Digest],
    ) -> bool {
        merkle::verify(root, index, units, proof)
    }

    fn verify_signer(&self, deed: &OwnershipDeed, expected_signer: &AttesterKey) -> bool {
        signature::verify_deed_signature(deed, expected_signer)
    }
}

#[cfg(test)]
mod tests {
    use fracvault_types::Address;

    use super::*;
    use crate::{DeedSigner, MerkleTree};

    #[test]
    fn verifier_accepts_valid_deed() {
        let tree = MerkleTree::from_entries(&[(17, 23), (0, 5)]);
        let signer = DeedSigner::from_secret(&[5u8; 32]);
        let deed = signer.signed(OwnershipDeed {
            parent_collection: Address::from_low_u64(1),
            parent_token_id: 1,
            claimant: Address::from_low_u64(2),
            index: 17,
            units: 23,
            proof: tree.proof(17, 23).unwrap(),
            signature: Vec::new(),
        });

        let verifier = ProofVerifier::new();
        assert!(verifier.verify_signer(&deed, &signer.attester_key()));
        assert!(verifier.verify_proof(&tree.root(), deed.index, deed.units, &deed.proof));
        assert!(!verifier.verify_proof(&tree.root(), deed.index, 0, &deed.proof));
    }

    #[test]
    fn usable_as_trait_object() {
        let verifier: Box<dyn DeedVerifier> = Box::new(ProofVerifier);
        assert!(!verifier.verify_proof(&[0u8; 32], 0, 0, &[]));
    }
}
