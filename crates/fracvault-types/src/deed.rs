//! # OwnershipDeed: the signed, proof-carrying redemption claim
//!
//! A deed binds one contributor index of the committed leaf set to a
//! claimant wallet. It is consumed once: after a successful redemption the
//! index is marked claimed and the same deed is rejected forever.
//!
//! ## Security Properties
//!
//! - **Vault-bound**: carries the parent collection and token id of exactly
//!   one vault; any other vault rejects it with `UnknownToken`
//! - **Signature-bound**: the attester signs the canonical payload, so the
//!   claimant, index and units cannot be altered in transit
//! - **Root-bound**: the Merkle proof ties `(index, units)` to the committed root
//! - **Single-use**: replay of a claimed index fails `AlreadyRedeemed`

use serde::{Deserialize, Serialize};

use crate::{Address, ContributorIndex, Digest, Units, constants};

/// Claim message presented by (or on behalf of) a contributor.
///
/// The transaction sender is irrelevant: shares always go to `claimant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipDeed {
    /// Collection that owns the fractionalized collectible.
    pub parent_collection: Address,
    /// Id of the fractionalized collectible inside the collection.
    pub parent_token_id: u64,
    /// Wallet that receives the minted shares and contribution score.
    pub claimant: Address,
    /// Position in the committed leaf set.
    pub index: ContributorIndex,
    /// Contribution units committed for `index`.
    pub units: Units,
    /// Sibling digests from leaf to root.
    pub proof: Vec<Digest>,
    /// Ed25519 signature over [`OwnershipDeed::signing_payload`].
    pub signature: Vec<u8>,
}

impl OwnershipDeed {
    /// Canonical signing payload.
    ///
    /// Format: `"fracvault:deed:v1:" || collection(20) || token_id(8 LE) || claimant(20) || index(8 LE) || units(8 LE)`
    ///
    /// The proof and the signature itself are not covered.
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(constants::DEED_SIGNING_TAG.len() + 64);
        payload.extend_from_slice(constants::DEED_SIGNING_TAG);
        payload.extend_from_slice(self.parent_collection.as_bytes());
        payload.extend_from_slice(&self.parent_token_id.to_le_bytes());
        payload.extend_from_slice(self.claimant.as_bytes());
        payload.extend_from_slice(&self.index.to_le_bytes());
        payload.extend_from_slice(&self.units.to_le_bytes());
        payload
    }

    /// Whether the deed targets the collectible `(collection, token_id)`.
    #[must_use]
    pub fn is_bound_to(&self, collection: &Address, token_id: u64) -> bool {
        self.parent_collection == *collection && self.parent_token_id == token_id
    }
}
