//! One-shot redemption of ownership deeds.
//!
//! Like a UTXO set: each contributor index can be consumed exactly once.
//! A redemption runs four checks in a fixed order and only then mutates:
//!
//! 1. Deed bound to this vault's collectible, else `UnknownToken`
//! 2. Index not yet claimed, else `AlreadyRedeemed`
//! 3. Attester signature valid, else `BadSignature`
//! 4. Merkle proof valid against the committed root, else `FalseDeeds`
//! 5. Mint `units × scale` shares to the claimant
//! 6. Record the claim (claimed index, author, wallet index)
//!
//! The mint runs before the claim is recorded so that a `SupplyExceeded`
//! rejection leaves the registry untouched.

use std::collections::BTreeMap;

use fracvault_proof::DeedVerifier;
use fracvault_types::{
    Address, AttesterKey, AuthorEntry, ContributorIndex, ContributorInfo, Digest, OwnershipDeed,
    Result, Shares, Units, VaultError, WalletInfo, constants,
};
use serde::{Deserialize, Serialize};

use crate::ShareLedger;

/// Outcome of a successful redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    pub claimant: Address,
    pub index: ContributorIndex,
    pub units: Units,
    /// Shares minted to `claimant`.
    pub shares: Shares,
}

/// Claimed-index set and authorship records of one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRegistry {
    parent_collection: Address,
    parent_token_id: u64,
    #[serde(with = "fracvault_types::hex_bytes")]
    committed_root: Digest,
    attester: AttesterKey,
    /// `index → (claimant, units)`. Keys form the claimed set; first write wins.
    authors: BTreeMap<ContributorIndex, ContributorInfo>,
    /// `claimant → indices`, in redemption order.
    wallet_indices: BTreeMap<Address, Vec<ContributorIndex>>,
    /// Distinct claimants in order of first redemption.
    author_order: Vec<Address>,
    redeemed_units: Units,
}

impl RedemptionRegistry {
    /// Registry bound to one collectible, committed root and attester.
    #[must_use]
    pub fn new(
        parent_collection: Address,
        parent_token_id: u64,
        committed_root: Digest,
        attester: AttesterKey,
    ) -> Self {
        Self {
            parent_collection,
            parent_token_id,
            committed_root,
            attester,
            authors: BTreeMap::new(),
            wallet_indices: BTreeMap::new(),
            author_order: Vec::new(),
            redeemed_units: 0,
        }
    }

    /// Redeem `deed`, minting into `ledger`.
    ///
    /// Whoever submits the deed is irrelevant: shares and score always go
    /// to `deed.claimant`. The caller is responsible for the lifecycle gate.
    ///
    /// # Errors
    /// `UnknownToken`, `AlreadyRedeemed`, `BadSignature`, `FalseDeeds` (in
    /// that order), or `SupplyExceeded` from the ledger. Nothing is mutated
    /// on error.
    pub fn redeem(
        &mut self,
        deed: &OwnershipDeed,
        verifier: &dyn DeedVerifier,
        ledger: &mut ShareLedger,
    ) -> Result<Redemption> {
        if !deed.is_bound_to(&self.parent_collection, self.parent_token_id) {
            tracing::warn!(
                index = deed.index,
                deed_collection = %deed.parent_collection,
                deed_token = deed.parent_token_id,
                vault_token = self.parent_token_id,
                "Deed rejected: bound to another collectible"
            );
            return Err(VaultError::UnknownToken {
                deed_token: deed.parent_token_id,
                vault_token: self.parent_token_id,
            });
        }

        if self.is_claimed(deed.index) {
            tracing::warn!(index = deed.index, claimant = %deed.claimant, "Deed rejected: replay");
            return Err(VaultError::AlreadyRedeemed(deed.index));
        }

        if !verifier.verify_signer(deed, &self.attester) {
            tracing::warn!(index = deed.index, claimant = %deed.claimant, "Deed rejected: bad signature");
            return Err(VaultError::BadSignature);
        }

        if !verifier.verify_proof(&self.committed_root, deed.index, deed.units, &deed.proof) {
            tracing::warn!(
                index = deed.index,
                units = deed.units,
                proof_len = deed.proof.len(),
                "Deed rejected: proof does not match committed root"
            );
            return Err(VaultError::FalseDeeds { index: deed.index });
        }

        let shares = ledger.mint(deed.claimant, deed.units)?;

        self.authors.insert(
            deed.index,
            ContributorInfo {
                claimant: deed.claimant,
                units: deed.units,
            },
        );
        let indices = self.wallet_indices.entry(deed.claimant).or_default();
        if indices.is_empty() {
            self.author_order.push(deed.claimant);
        }
        indices.push(deed.index);
        self.redeemed_units = self.redeemed_units.saturating_add(deed.units);

        Ok(Redemption {
            claimant: deed.claimant,
            index: deed.index,
            units: deed.units,
            shares,
        })
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn is_claimed(&self, index: ContributorIndex) -> bool {
        self.authors.contains_key(&index)
    }

    /// Who redeemed `index`, if anyone.
    #[must_use]
    pub fn contributor_info(&self, index: ContributorIndex) -> Option<ContributorInfo> {
        self.authors.get(&index).copied()
    }

    /// Aggregate view of `address`: balance from `ledger`, units and
    /// indices from the registry.
    #[must_use]
    pub fn wallet_info(&self, address: &Address, ledger: &ShareLedger) -> WalletInfo {
        let indices = self.wallet_indices.get(address).cloned().unwrap_or_default();
        WalletInfo {
            address: *address,
            balance: ledger.balance_of(address),
            units: self.units_of(&indices),
            indices,
        }
    }

    /// Number of redeemed contributor indices.
    #[must_use]
    pub fn contributor_count(&self) -> usize {
        self.authors.len()
    }

    /// Number of distinct claimant wallets.
    #[must_use]
    pub fn authors_count(&self) -> usize {
        self.author_order.len()
    }

    /// Page of authors in order of first redemption.
    ///
    /// `limit` is clamped to [`constants::MAX_AUTHORS_PAGE`]; an `offset`
    /// past the end yields an empty page.
    #[must_use]
    pub fn authors_range(&self, offset: usize, limit: usize) -> Vec<AuthorEntry> {
        self.author_order
            .iter()
            .skip(offset)
            .take(limit.min(constants::MAX_AUTHORS_PAGE))
            .map(|address| AuthorEntry {
                address: *address,
                units: self
                    .wallet_indices
                    .get(address)
                    .map_or(0, |indices| self.units_of(indices)),
            })
            .collect()
    }

    /// Units redeemed so far across all indices.
    #[must_use]
    pub fn redeemed_units(&self) -> Units {
        self.redeemed_units
    }

    #[must_use]
    pub fn committed_root(&self) -> &Digest {
        &self.committed_root
    }

    #[must_use]
    pub fn attester(&self) -> &AttesterKey {
        &self.attester
    }

    #[must_use]
    pub fn parent_collection(&self) -> &Address {
        &self.parent_collection
    }

    #[must_use]
    pub fn parent_token_id(&self) -> u64 {
        self.parent_token_id
    }

    fn units_of(&self, indices: &[ContributorIndex]) -> Units {
        indices
            .iter()
            .filter_map(|i| self.authors.get(i))
            .fold(0, |acc: Units, info| acc.saturating_add(info.units))
    }
}
