//! Read models returned by vault accessors.

use serde::{Deserialize, Serialize};

use crate::{Address, ContributorIndex, Shares, Units, VaultStatus, Wei};

/// Snapshot of a vault's headline state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultInfo {
    pub status: VaultStatus,
    /// [`VaultStatus::code`] of `status`.
    pub status_code: u8,
    pub curator: Address,
    /// Units committed by the oracle at creation.
    pub total_contribution_units: Units,
    /// Units already redeemed through deeds.
    pub redeemed_units: Units,
    /// Auction price at the query instant (`None` without settings).
    pub current_price: Option<Wei>,
    /// Next instant the price drops (`None` once at reserve or without settings).
    pub next_price_ts: Option<u64>,
    pub proceeds_pool: Wei,
    pub total_supply: Shares,
    /// Redeemed contributor indices.
    pub contributor_count: usize,
    /// Distinct claimant wallets.
    pub authors_count: usize,
}

/// Who claimed a contributor index, and for how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorInfo {
    pub claimant: Address,
    pub units: Units,
}

/// Aggregate view of one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: Address,
    /// Current transferable share balance.
    pub balance: Shares,
    /// Units summed over every index this wallet redeemed.
    pub units: Units,
    /// Indices redeemed into this wallet, in redemption order.
    pub indices: Vec<ContributorIndex>,
}

/// One entry of the ordered authors list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub address: Address,
    pub units: Units,
}
