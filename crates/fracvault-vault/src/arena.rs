//! Arena of independent vaults.
//!
//! Each vault sits behind its own reader/writer lock, so vaults never
//! contend with one another. Readers of one vault run concurrently; a
//! mutation holds that vault's write lock until it commits or fails.
//!
//! Lock order: the arena index lock is only ever held while a vault lock
//! is *not*. Operations clone the vault's `Arc` out of the index and drop
//! the index guard before locking the vault.

use std::collections::HashMap;
use std::sync::Arc;

use fracvault_ledger::Redemption;
use fracvault_proof::{DeedVerifier, ProofVerifier};
use fracvault_types::{Address, OwnershipDeed, Result, VaultConfig, VaultError, VaultId, constants};
use parking_lot::RwLock;
use tracing::info;

use crate::vault::Vault;

#[derive(Default)]
struct ArenaIndex {
    vaults: HashMap<VaultId, Arc<RwLock<Vault>>>,
    /// One vault per collectible.
    by_collectible: HashMap<(Address, u64), VaultId>,
}

/// All vaults known to this process, addressed by [`VaultId`].
pub struct VaultArena {
    index: RwLock<ArenaIndex>,
    verifier: Arc<dyn DeedVerifier>,
}

impl VaultArena {
    /// Arena verifying deeds with `verifier`.
    #[must_use]
    pub fn new(verifier: Arc<dyn DeedVerifier>) -> Self {
        info!(engine = constants::ENGINE_NAME, version = constants::VERSION, "Vault arena started");
        Self {
            index: RwLock::new(ArenaIndex::default()),
            verifier,
        }
    }

    /// Arena using the production [`ProofVerifier`].
    #[must_use]
    pub fn with_proof_verifier() -> Self {
        Self::new(Arc::new(ProofVerifier::new()))
    }

    /// Create the vault for a freshly fractionalized collectible.
    ///
    /// # Errors
    /// `DuplicateVault` if the collectible already has one, or the
    /// configuration errors of [`Vault::new`].
    pub fn fractionalize(&self, config: &VaultConfig, now: u64) -> Result<VaultId> {
        let key = (config.parent_collection, config.parent_token_id);
        let mut index = self.index.write();
        if index.by_collectible.contains_key(&key) {
            return Err(VaultError::DuplicateVault {
                collection: config.parent_collection.to_string(),
                token_id: config.parent_token_id,
            });
        }
        let vault = Vault::new(VaultId::new(), config, now)?;
        let id = vault.id();
        index.by_collectible.insert(key, id);
        index.vaults.insert(id, Arc::new(RwLock::new(vault)));
        info!(vault = %id, vaults = index.vaults.len(), "Vault registered");
        Ok(id)
    }

    fn handle(&self, id: &VaultId) -> Result<Arc<RwLock<Vault>>> {
        self.index
            .read()
            .vaults
            .get(id)
            .cloned()
            .ok_or(VaultError::VaultNotFound(*id))
    }

    /// Run `f` under the vault's read lock.
    ///
    /// # Errors
    /// `VaultNotFound`.
    pub fn read<R>(&self, id: &VaultId, f: impl FnOnce(&Vault) -> R) -> Result<R> {
        let handle = self.handle(id)?;
        let vault = handle.read();
        Ok(f(&vault))
    }

    /// Run `f` under the vault's write lock.
    ///
    /// # Errors
    /// `VaultNotFound`, or whatever `f` returns.
    pub fn write<R>(&self, id: &VaultId, f: impl FnOnce(&mut Vault) -> Result<R>) -> Result<R> {
        let handle = self.handle(id)?;
        let mut vault = handle.write();
        f(&mut vault)
    }

    /// Redeem `deed` against vault `id` with the arena's verifier.
    ///
    /// # Errors
    /// `VaultNotFound` or any [`Vault::redeem`] rejection.
    pub fn redeem(&self, id: &VaultId, deed: &OwnershipDeed) -> Result<Redemption> {
        let verifier = Arc::clone(&self.verifier);
        self.write(id, |vault| vault.redeem(deed, verifier.as_ref()))
    }

    /// Vault bound to `(collection, token_id)`, if any.
    #[must_use]
    pub fn find(&self, collection: &Address, token_id: u64) -> Option<VaultId> {
        self.index
            .read()
            .by_collectible
            .get(&(*collection, token_id))
            .copied()
    }

    /// Snapshot of vault `id` as JSON.
    ///
    /// # Errors
    /// `VaultNotFound` or `Serialization`.
    pub fn export(&self, id: &VaultId) -> Result<String> {
        self.read(id, Vault::to_json)?
    }

    /// Load a snapshot written by [`export`](Self::export).
    ///
    /// # Errors
    /// `Serialization`, `SupplyInvariantViolation`, or `DuplicateVault` if
    /// the id or the collectible is already present.
    pub fn restore(&self, json: &str) -> Result<VaultId> {
        let vault = Vault::from_json(json)?;
        let id = vault.id();
        let key = (*vault.parent_collection(), vault.parent_token_id());
        let mut index = self.index.write();
        if index.vaults.contains_key(&id) || index.by_collectible.contains_key(&key) {
            return Err(VaultError::DuplicateVault {
                collection: key.0.to_string(),
                token_id: key.1,
            });
        }
        index.by_collectible.insert(key, id);
        index.vaults.insert(id, Arc::new(RwLock::new(vault)));
        info!(vault = %id, "Vault restored from snapshot");
        Ok(id)
    }

    /// Ids of all vaults, in creation order (UUIDv7 sorts by time).
    #[must_use]
    pub fn ids(&self) -> Vec<VaultId> {
        let mut ids: Vec<VaultId> = self.index.read().vaults.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().vaults.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VaultArena {
    fn default() -> Self {
        Self::with_proof_verifier()
    }
}

#[cfg(test)]
mod tests {
    use fracvault_proof::{DeedSigner, MerkleTree};
    use fracvault_types::{AuctionSettings, VaultStatus};

    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn config(token_id: u64, tree: &MerkleTree, signer: &DeedSigner) -> VaultConfig {
        VaultConfig {
            parent_collection: Address::from_low_u64(0xc011),
            parent_token_id: token_id,
            curator: Address::from_low_u64(0xc0),
            total_contribution_units: 174,
            committed_root: tree.root(),
            attester_key: signer.attester_key(),
            share_scale: constants::SHARE_SCALE,
            auction: Some(AuctionSettings::with_defaults(NOW)),
        }
    }

    fn fixture() -> (MerkleTree, DeedSigner) {
        (
            MerkleTree::from_entries(&[(17, 23), (0, 5), (3, 77), (123, 0), (521, 69)]),
            DeedSigner::from_secret(&[9u8; 32]),
        )
    }

    #[test]
    fn fractionalize_once_per_collectible() {
        let (tree, signer) = fixture();
        let arena = VaultArena::default();
        let id = arena.fractionalize(&config(1, &tree, &signer), NOW).unwrap();
        assert_eq!(arena.find(&Address::from_low_u64(0xc011), 1), Some(id));

        let err = arena.fractionalize(&config(1, &tree, &signer), NOW).unwrap_err();
        assert!(matches!(err, VaultError::DuplicateVault { token_id: 1, .. }));

        let other = arena.fractionalize(&config(2, &tree, &signer), NOW).unwrap();
        assert_ne!(id, other);
        assert_eq!(arena.ids(), vec![id, other]);
    }

    #[test]
    fn unknown_vault() {
        let arena = VaultArena::default();
        let id = VaultId::new();
        assert!(matches!(arena.read(&id, Vault::status), Err(VaultError::VaultNotFound(_))));
    }

    #[test]
    fn redeem_through_arena() {
        let (tree, signer) = fixture();
        let arena = VaultArena::default();
        let id = arena.fractionalize(&config(1, &tree, &signer), NOW).unwrap();
        let claimant = Address::from_low_u64(0xa11ce);
        let deed = signer.signed(OwnershipDeed {
            parent_collection: Address::from_low_u64(0xc011),
            parent_token_id: 1,
            claimant,
            index: 17,
            units: 23,
            proof: tree.proof(17, 23).unwrap(),
            signature: Vec::new(),
        });
        arena.redeem(&id, &deed).unwrap();
        let balance = arena.read(&id, |v| v.balance_of(&claimant)).unwrap();
        assert_eq!(balance, 23 * constants::SHARE_SCALE);
    }

    #[test]
    fn export_restore_into_fresh_arena() {
        let (tree, signer) = fixture();
        let arena = VaultArena::default();
        let id = arena.fractionalize(&config(1, &tree, &signer), NOW).unwrap();
        arena
            .write(&id, |v| v.enter_auctioning(&Address::from_low_u64(0xc0)))
            .unwrap();
        let json = arena.export(&id).unwrap();

        let fresh = VaultArena::default();
        assert_eq!(fresh.restore(&json).unwrap(), id);
        assert_eq!(fresh.read(&id, Vault::status).unwrap(), VaultStatus::Auctioning);
        assert!(matches!(fresh.restore(&json), Err(VaultError::DuplicateVault { .. })));
    }

    #[test]
    fn vaults_are_independent_across_threads() {
        let (tree, signer) = fixture();
        let arena = Arc::new(VaultArena::default());
        let ids: Vec<VaultId> = (1..=4)
            .map(|t| arena.fractionalize(&config(t, &tree, &signer), NOW).unwrap())
            .collect();

        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let arena = Arc::clone(&arena);
                let id = *id;
                std::thread::spawn(move || {
                    arena
                        .write(&id, |v| v.enter_auctioning(&Address::from_low_u64(0xc0)))
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        for id in &ids {
            assert_eq!(arena.read(id, Vault::status).unwrap(), VaultStatus::Auctioning);
        }
    }
}
