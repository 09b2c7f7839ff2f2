//! External collaborators the vault moves value through.
//!
//! Both report success or failure synchronously. The vault performs ledger
//! mutations first, calls the collaborator last, and rolls its own state
//! back if the collaborator reports failure.

use std::collections::{BTreeMap, BTreeSet};

use fracvault_types::{Address, Wei};

/// Custody of the fractionalized collectible (the parent collection).
pub trait CollectibleCustody {
    /// Hand the collectible `(collection, token_id)` to `to`.
    fn transfer_collectible(
        &mut self,
        collection: &Address,
        token_id: u64,
        to: &Address,
    ) -> Result<(), String>;

    /// Take the collectible back from `from` after a failed acquisition.
    fn revert_collectible(&mut self, collection: &Address, token_id: u64, from: &Address);
}

/// Native-currency transfer primitive used for refunds and payouts.
pub trait NativeTransfer {
    fn send(&mut self, to: &Address, amount: Wei) -> Result<(), String>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// Collectible custody kept in a map. Absent entries are held by their vault.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    owners: BTreeMap<(Address, u64), Address>,
    failing: bool,
}

impl InMemoryCustody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent transfer fail (or succeed again).
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Current external owner, `None` while the vault holds it.
    #[must_use]
    pub fn owner_of(&self, collection: &Address, token_id: u64) -> Option<Address> {
        self.owners.get(&(*collection, token_id)).copied()
    }
}

impl CollectibleCustody for InMemoryCustody {
    fn transfer_collectible(
        &mut self,
        collection: &Address,
        token_id: u64,
        to: &Address,
    ) -> Result<(), String> {
        if self.failing {
            return Err(format!("collectible {collection}#{token_id} is not transferable"));
        }
        self.owners.insert((*collection, token_id), *to);
        Ok(())
    }

    fn revert_collectible(&mut self, collection: &Address, token_id: u64, from: &Address) {
        if self.owners.get(&(*collection, token_id)) == Some(from) {
            self.owners.remove(&(*collection, token_id));
        }
    }
}

/// Payment rail that records what each address received.
#[derive(Debug, Default)]
pub struct InMemoryPayments {
    received: BTreeMap<Address, Wei>,
    rejecting: BTreeSet<Address>,
}

impl InMemoryPayments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make transfers to `address` fail until [`accept`](Self::accept) is called.
    pub fn reject(&mut self, address: Address) {
        self.rejecting.insert(address);
    }

    pub fn accept(&mut self, address: &Address) {
        self.rejecting.remove(address);
    }

    #[must_use]
    pub fn received(&self, address: &Address) -> Wei {
        self.received.get(address).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_sent(&self) -> Wei {
        self.received.values().sum()
    }
}

impl NativeTransfer for InMemoryPayments {
    fn send(&mut self, to: &Address, amount: Wei) -> Result<(), String> {
        if self.rejecting.contains(to) {
            return Err(format!("{to} rejected transfer of {amount}"));
        }
        *self.received.entry(*to).or_default() += amount;
        Ok(())
    }
}
