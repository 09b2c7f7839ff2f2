//! The vault state machine.
//!
//! Owns the `Awaiting → Auctioning → Acquired` lifecycle and gates every
//! operation on it:
//!
//! | operation              | Awaiting | Auctioning | Acquired |
//! |------------------------|----------|------------|----------|
//! | `redeem`               | yes      | yes        | `BadMood` |
//! | `set_auction_settings` | yes      | `BadMood`  | `BadMood` |
//! | `enter_auctioning`     | yes      | `BadMood`  | `BadMood` |
//! | `acquire`              | `BadMood`| yes        | `BadMood` |
//! | `withdraw`             | `NotAcquiredYet` | `NotAcquiredYet` | yes |
//! | `transfer`, `set_curator` | yes   | yes        | yes      |
//!
//! Every mutating operation either commits completely and appends one
//! [`VaultEvent`], or returns an error with the vault unchanged.

use chrono::Utc;
use fracvault_auction::DutchAuction;
use fracvault_ledger::{Redemption, RedemptionRegistry, ShareLedger};
use fracvault_proof::DeedVerifier;
use fracvault_types::{
    Address, AuctionSettings, AuthorEntry, ContributorIndex, ContributorInfo, OwnershipDeed,
    Result, Shares, Units, VaultConfig, VaultError, VaultEvent, VaultEventKind, VaultId, VaultInfo,
    VaultStatus, WalletInfo, Wei,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::collaborators::{CollectibleCustody, NativeTransfer};
use crate::settlement::SettlementPool;

/// One fractionalized collectible and everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    id: VaultId,
    status: VaultStatus,
    curator: Address,
    total_contribution_units: Units,
    ledger: ShareLedger,
    registry: RedemptionRegistry,
    auction: DutchAuction,
    pool: SettlementPool,
    journal: Vec<VaultEvent>,
}

impl Vault {
    /// Create a vault in `Awaiting` from a fractionalization event.
    ///
    /// # Errors
    /// `Configuration` if `config` is invalid, `InvalidAuctionSettings` if
    /// its initial auction settings are.
    pub fn new(id: VaultId, config: &VaultConfig, now: u64) -> Result<Self> {
        config.validate()?;
        let mut auction = DutchAuction::new();
        if let Some(settings) = config.auction {
            auction.set_settings(settings, now)?;
        }
        let vault = Self {
            id,
            status: VaultStatus::Awaiting,
            curator: config.curator,
            total_contribution_units: config.total_contribution_units,
            ledger: ShareLedger::new(config.total_contribution_units, config.share_scale)?,
            registry: RedemptionRegistry::new(
                config.parent_collection,
                config.parent_token_id,
                config.committed_root,
                config.attester_key,
            ),
            auction,
            pool: SettlementPool::new(),
            journal: Vec::new(),
        };
        info!(
            vault = %id,
            collection = %config.parent_collection,
            token_id = config.parent_token_id,
            total_units = config.total_contribution_units,
            curator = %config.curator,
            "Vault created"
        );
        Ok(vault)
    }

    // =================================================================
    // Redemption
    // =================================================================

    /// Redeem an ownership deed, minting shares to `deed.claimant`.
    ///
    /// # Errors
    /// `BadMood` once acquired, otherwise the registry's rejections.
    pub fn redeem(
        &mut self,
        deed: &OwnershipDeed,
        verifier: &dyn DeedVerifier,
    ) -> Result<Redemption> {
        if !self.status.accepts_redemptions() {
            return Err(self.bad_mood("redeem"));
        }
        let redemption = self.registry.redeem(deed, verifier, &mut self.ledger)?;
        info!(
            vault = %self.id,
            claimant = %redemption.claimant,
            index = redemption.index,
            units = redemption.units,
            shares = redemption.shares,
            "Deed redeemed"
        );
        self.record(VaultEventKind::Redeemed {
            claimant: redemption.claimant,
            index: redemption.index,
            units: redemption.units,
            shares: redemption.shares,
        });
        Ok(redemption)
    }

    // =================================================================
    // Auction
    // =================================================================

    /// Replace the auction settings. Curator only, `Awaiting` only.
    ///
    /// # Errors
    /// `NotCurator`, `BadMood`, or `InvalidAuctionSettings`.
    pub fn set_auction_settings(
        &mut self,
        caller: &Address,
        settings: AuctionSettings,
        now: u64,
    ) -> Result<()> {
        self.require_curator(caller)?;
        if self.status != VaultStatus::Awaiting {
            return Err(self.bad_mood("set_auction_settings"));
        }
        self.auction.set_settings(settings, now)?;
        info!(
            vault = %self.id,
            starting_price = settings.starting_price,
            reserve_price = settings.reserve_price,
            delta_price = settings.delta_price,
            delta_period = settings.delta_period,
            starting_timestamp = settings.starting_timestamp,
            "Auction settings changed"
        );
        self.record(VaultEventKind::AuctionSettingsChanged { settings });
        Ok(())
    }

    #[must_use]
    pub fn auction_settings(&self) -> Option<&AuctionSettings> {
        self.auction.settings()
    }

    /// `Awaiting → Auctioning`. Curator only; settings must be set.
    ///
    /// # Errors
    /// `NotCurator`, `BadMood`, or `AuctionNotConfigured`.
    pub fn enter_auctioning(&mut self, caller: &Address) -> Result<()> {
        self.require_curator(caller)?;
        if !self.status.can_transition_to(VaultStatus::Auctioning) {
            return Err(self.bad_mood("enter_auctioning"));
        }
        if !self.auction.is_configured() {
            return Err(VaultError::AuctionNotConfigured);
        }
        self.status = VaultStatus::Auctioning;
        info!(vault = %self.id, "Auction started");
        self.record(VaultEventKind::AuctioningStarted);
        Ok(())
    }

    /// Asking price at `now`.
    ///
    /// # Errors
    /// `AuctionNotConfigured` without settings.
    pub fn current_price(&self, now: u64) -> Result<Wei> {
        self.auction.current_price(now)
    }

    /// Buy the collectible at the current price. Returns the refunded excess.
    ///
    /// The pool is credited with the price only; `paid − price` goes back to
    /// the buyer. The collectible moves first, the refund second. If either
    /// fails, whatever already happened is reverted and the vault stays in
    /// `Auctioning`.
    ///
    /// # Errors
    /// `BadMood`, `InsufficientValue`, or `TransferFailed`.
    pub fn acquire(
        &mut self,
        buyer: &Address,
        paid: Wei,
        now: u64,
        custody: &mut dyn CollectibleCustody,
        payments: &mut dyn NativeTransfer,
    ) -> Result<Wei> {
        if !self.status.can_transition_to(VaultStatus::Acquired) {
            return Err(self.bad_mood("acquire"));
        }
        let price = self.auction.current_price(now)?;
        if paid < price {
            return Err(VaultError::InsufficientValue { paid, price });
        }
        let refund = paid - price;

        self.pool.fund(price)?;

        let collection = *self.registry.parent_collection();
        let token_id = self.registry.parent_token_id();
        if let Err(reason) = custody.transfer_collectible(&collection, token_id, buyer) {
            error!(vault = %self.id, buyer = %buyer, %reason, "Collectible transfer failed, acquisition rolled back");
            self.pool.unfund();
            return Err(VaultError::TransferFailed { reason });
        }
        if refund > 0 {
            if let Err(reason) = payments.send(buyer, refund) {
                error!(vault = %self.id, buyer = %buyer, refund, %reason, "Refund failed, acquisition rolled back");
                custody.revert_collectible(&collection, token_id, buyer);
                self.pool.unfund();
                return Err(VaultError::TransferFailed { reason });
            }
        }

        self.status = VaultStatus::Acquired;
        info!(vault = %self.id, buyer = %buyer, price, refund, "Collectible acquired");
        self.record(VaultEventKind::Acquired {
            buyer: *buyer,
            price,
            refund,
        });
        Ok(refund)
    }

    // =================================================================
    // Settlement
    // =================================================================

    /// Burn all of `holder`'s shares and pay out its pro-rata share of the
    /// proceeds. Returns the amount paid.
    ///
    /// # Errors
    /// `NotAcquiredYet`, `NoBalance`, or `TransferFailed` (shares and pool
    /// reinstated).
    pub fn withdraw(&mut self, holder: &Address, payments: &mut dyn NativeTransfer) -> Result<Wei> {
        if self.status != VaultStatus::Acquired {
            return Err(VaultError::NotAcquiredYet);
        }
        let payout = self.pool.withdraw(*holder, &mut self.ledger)?;
        if payout.amount > 0 {
            if let Err(reason) = payments.send(holder, payout.amount) {
                error!(vault = %self.id, holder = %holder, amount = payout.amount, %reason, "Payout failed, withdrawal rolled back");
                self.pool.revert(&payout, &mut self.ledger)?;
                return Err(VaultError::TransferFailed { reason });
            }
        }
        info!(
            vault = %self.id,
            holder = %holder,
            burned = payout.burned,
            paid = payout.amount,
            pool_remaining = self.pool.balance(),
            "Proceeds withdrawn"
        );
        self.record(VaultEventKind::Withdrawal {
            holder: *holder,
            burned: payout.burned,
            paid: payout.amount,
        });
        Ok(payout.amount)
    }

    // =================================================================
    // Shares and curatorship
    // =================================================================

    /// Move shares between holders. Contribution scores do not move.
    ///
    /// # Errors
    /// `InsufficientBalance`.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Shares) -> Result<()> {
        self.ledger.transfer(*from, *to, amount)?;
        debug!(vault = %self.id, from = %from, to = %to, amount, "Shares transferred");
        self.record(VaultEventKind::Transfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Hand curatorship to `new_curator`.
    ///
    /// # Errors
    /// `NotCurator`, or `Configuration` for the zero address.
    pub fn set_curator(&mut self, caller: &Address, new_curator: Address) -> Result<()> {
        self.require_curator(caller)?;
        if new_curator.is_zero() {
            return Err(VaultError::Configuration("curator cannot be the zero address".into()));
        }
        let previous = self.curator;
        self.curator = new_curator;
        info!(vault = %self.id, from = %previous, to = %new_curator, "Curator changed");
        self.record(VaultEventKind::CuratorChanged {
            from: previous,
            to: new_curator,
        });
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Headline state at `now`.
    #[must_use]
    pub fn info(&self, now: u64) -> VaultInfo {
        VaultInfo {
            status: self.status,
            status_code: self.status.code(),
            curator: self.curator,
            total_contribution_units: self.total_contribution_units,
            redeemed_units: self.registry.redeemed_units(),
            current_price: self.auction.current_price(now).ok(),
            next_price_ts: self.auction.next_price_timestamp(now),
            proceeds_pool: self.pool.balance(),
            total_supply: self.ledger.total_supply(),
            contributor_count: self.registry.contributor_count(),
            authors_count: self.registry.authors_count(),
        }
    }

    #[must_use]
    pub fn id(&self) -> VaultId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> VaultStatus {
        self.status
    }

    #[must_use]
    pub fn curator(&self) -> &Address {
        &self.curator
    }

    #[must_use]
    pub fn parent_collection(&self) -> &Address {
        self.registry.parent_collection()
    }

    #[must_use]
    pub fn parent_token_id(&self) -> u64 {
        self.registry.parent_token_id()
    }

    #[must_use]
    pub fn contributor_info(&self, index: ContributorIndex) -> Option<ContributorInfo> {
        self.registry.contributor_info(index)
    }

    #[must_use]
    pub fn wallet_info(&self, address: &Address) -> WalletInfo {
        self.registry.wallet_info(address, &self.ledger)
    }

    #[must_use]
    pub fn contributor_count(&self) -> usize {
        self.registry.contributor_count()
    }

    #[must_use]
    pub fn authors_count(&self) -> usize {
        self.registry.authors_count()
    }

    #[must_use]
    pub fn authors_range(&self, offset: usize, limit: usize) -> Vec<AuthorEntry> {
        self.registry.authors_range(offset, limit)
    }

    /// Soulbound contribution score of `address`.
    #[must_use]
    pub fn pixels_of(&self, address: &Address) -> Units {
        self.ledger.contribution_score(address)
    }

    #[must_use]
    pub fn balance_of(&self, address: &Address) -> Shares {
        self.ledger.balance_of(address)
    }

    #[must_use]
    pub fn total_supply(&self) -> Shares {
        self.ledger.total_supply()
    }

    /// Divisor of the next payout: outstanding shares plus unredeemed units.
    #[must_use]
    pub fn entitled_supply(&self) -> Shares {
        self.ledger.entitled_supply()
    }

    #[must_use]
    pub fn proceeds_pool(&self) -> Wei {
        self.pool.balance()
    }

    /// Append-only journal of committed mutations.
    #[must_use]
    pub fn events(&self) -> &[VaultEvent] {
        &self.journal
    }

    // =================================================================
    // Invariants and snapshots
    // =================================================================

    /// Check supply conservation, pool conservation, and that the pool is
    /// funded exactly when the vault is acquired.
    ///
    /// # Errors
    /// `SupplyInvariantViolation`.
    pub fn check_invariants(&self) -> Result<()> {
        self.ledger.verify_supply()?;
        self.pool.verify()?;
        let funded = self.pool.funded_with().is_some();
        if funded != (self.status == VaultStatus::Acquired) {
            let reason = format!("pool funded = {funded} while {}", self.status);
            error!(vault = %self.id, %reason, "Vault invariant violated");
            return Err(VaultError::SupplyInvariantViolation { reason });
        }
        Ok(())
    }

    /// Serialize the whole per-vault record.
    ///
    /// # Errors
    /// `Serialization`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a record written by [`to_json`](Self::to_json). The restored
    /// vault must pass [`check_invariants`](Self::check_invariants).
    ///
    /// # Errors
    /// `Serialization` or `SupplyInvariantViolation`.
    pub fn from_json(json: &str) -> Result<Self> {
        let vault: Self = serde_json::from_str(json)?;
        vault.check_invariants()?;
        Ok(vault)
    }

    // =================================================================
    // Internals
    // =================================================================

    fn require_curator(&self, caller: &Address) -> Result<()> {
        if *caller == self.curator {
            Ok(())
        } else {
            Err(VaultError::NotCurator)
        }
    }

    fn bad_mood(&self, operation: &'static str) -> VaultError {
        VaultError::BadMood {
            operation,
            status: self.status,
        }
    }

    fn record(&mut self, kind: VaultEventKind) {
        let seq = self.journal.len() as u64;
        self.journal.push(VaultEvent {
            seq,
            kind,
            recorded_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use fracvault_proof::{DeedSigner, MerkleTree, ProofVerifier};
    use fracvault_types::{AttesterKey, constants};

    use super::*;
    use crate::collaborators::{InMemoryCustody, InMemoryPayments};

    const E18: Wei = constants::SHARE_SCALE;
    const NOW: u64 = 1_700_000_000;

    fn curator() -> Address {
        Address::from_low_u64(0xc0)
    }

    fn alice() -> Address {
        Address::from_low_u64(0xa11ce)
    }

    fn buyer() -> Address {
        Address::from_low_u64(0xb1)
    }

    struct Fixture {
        vault: Vault,
        tree: MerkleTree,
        signer: DeedSigner,
    }

    impl Fixture {
        fn new() -> Self {
            let tree = MerkleTree::from_entries(&[(17, 23), (0, 5), (3, 77), (123, 0), (521, 69)]);
            let signer = DeedSigner::from_secret(&[3u8; 32]);
            let config = VaultConfig {
                parent_collection: Address::from_low_u64(0xc011),
                parent_token_id: 1,
                curator: curator(),
                total_contribution_units: 174,
                committed_root: tree.root(),
                attester_key: signer.attester_key(),
                share_scale: E18,
                auction: None,
            };
            Self {
                vault: Vault::new(VaultId::new(), &config, NOW).unwrap(),
                tree,
                signer,
            }
        }

        fn redeem(&mut self, claimant: Address, index: ContributorIndex, units: Units) -> Result<Redemption> {
            let deed = self.signer.signed(OwnershipDeed {
                parent_collection: Address::from_low_u64(0xc011),
                parent_token_id: 1,
                claimant,
                index,
                units,
                proof: self.tree.proof(index, units).unwrap_or_default(),
                signature: Vec::new(),
            });
            self.vault.redeem(&deed, &ProofVerifier)
        }

        fn start_auction(&mut self) {
            self.vault
                .set_auction_settings(&curator(), AuctionSettings::with_defaults(NOW), NOW)
                .unwrap();
            self.vault.enter_auctioning(&curator()).unwrap();
        }

        fn acquire(&mut self, paid: Wei) -> Result<Wei> {
            self.vault.acquire(
                &buyer(),
                paid,
                NOW,
                &mut InMemoryCustody::new(),
                &mut InMemoryPayments::new(),
            )
        }
    }

    #[test]
    fn new_vault_is_awaiting() {
        let f = Fixture::new();
        let info = f.vault.info(NOW);
        assert_eq!(info.status, VaultStatus::Awaiting);
        assert_eq!(info.status_code, 0);
        assert_eq!(info.total_contribution_units, 174);
        assert_eq!(info.current_price, None);
        assert_eq!(info.total_supply, 0);
        assert!(f.vault.events().is_empty());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = VaultConfig {
            parent_collection: Address::from_low_u64(1),
            parent_token_id: 1,
            curator: curator(),
            total_contribution_units: 0,
            committed_root: [0u8; 32],
            attester_key: AttesterKey([0u8; 32]),
            share_scale: E18,
            auction: None,
        };
        assert!(matches!(
            Vault::new(VaultId::new(), &config, NOW),
            Err(VaultError::Configuration(_))
        ));
    }

    #[test]
    fn off_curve_attester_key_rejected_at_creation() {
        let signer = DeedSigner::from_secret(&[3u8; 32]);
        let mut config = VaultConfig {
            parent_collection: Address::from_low_u64(1),
            parent_token_id: 1,
            curator: curator(),
            total_contribution_units: 174,
            committed_root: [0u8; 32],
            attester_key: signer.attester_key(),
            share_scale: E18,
            auction: None,
        };
        assert!(Vault::new(VaultId::new(), &config, NOW).is_ok());

        config.attester_key = AttesterKey([0x02; 32]);
        assert!(matches!(
            Vault::new(VaultId::new(), &config, NOW),
            Err(VaultError::Configuration(_))
        ));
    }

    #[test]
    fn redeem_records_event() {
        let mut f = Fixture::new();
        f.redeem(alice(), 17, 23).unwrap();
        assert_eq!(f.vault.balance_of(&alice()), 23 * E18);
        assert_eq!(f.vault.pixels_of(&alice()), 23);
        assert_eq!(f.vault.events().len(), 1);
        assert_eq!(f.vault.events()[0].kind.label(), "REDEEMED");
    }

    #[test]
    fn rejected_redeem_records_nothing() {
        let mut f = Fixture::new();
        f.redeem(alice(), 17, 23).unwrap();
        assert!(f.redeem(alice(), 17, 23).is_err());
        assert_eq!(f.vault.events().len(), 1);
    }

    #[test]
    fn settings_require_curator() {
        let mut f = Fixture::new();
        let err = f
            .vault
            .set_auction_settings(&alice(), AuctionSettings::with_defaults(NOW), NOW)
            .unwrap_err();
        assert!(matches!(err, VaultError::NotCurator));
        assert!(f.vault.auction_settings().is_none());
    }

    #[test]
    fn auctioning_requires_settings() {
        let mut f = Fixture::new();
        assert!(matches!(
            f.vault.enter_auctioning(&curator()),
            Err(VaultError::AuctionNotConfigured)
        ));
        assert_eq!(f.vault.status(), VaultStatus::Awaiting);
    }

    #[test]
    fn settings_frozen_once_auctioning() {
        let mut f = Fixture::new();
        f.start_auction();
        let err = f
            .vault
            .set_auction_settings(&curator(), AuctionSettings::with_defaults(NOW), NOW)
            .unwrap_err();
        assert!(matches!(err, VaultError::BadMood { status: VaultStatus::Auctioning, .. }));
        assert!(matches!(f.vault.enter_auctioning(&curator()), Err(VaultError::BadMood { .. })));
    }

    #[test]
    fn acquire_requires_auctioning() {
        let mut f = Fixture::new();
        assert!(matches!(f.acquire(100 * E18), Err(VaultError::BadMood { .. })));
    }

    #[test]
    fn acquire_below_price_rejected() {
        let mut f = Fixture::new();
        f.start_auction();
        let err = f.acquire(E18).unwrap_err();
        assert!(matches!(err, VaultError::InsufficientValue { paid, price } if paid == E18 && price == 32 * E18));
        assert_eq!(f.vault.status(), VaultStatus::Auctioning);
    }

    #[test]
    fn acquire_refunds_excess() {
        let mut f = Fixture::new();
        f.start_auction();
        let refund = f.acquire(64 * E18).unwrap();
        assert_eq!(refund, 32 * E18);
        assert_eq!(f.vault.proceeds_pool(), 32 * E18);
        assert_eq!(f.vault.status(), VaultStatus::Acquired);
        assert_eq!(f.vault.info(NOW).status_code, 2);
        assert!(f.vault.check_invariants().is_ok());
    }

    #[test]
    fn redeem_closed_after_acquisition() {
        let mut f = Fixture::new();
        f.start_auction();
        f.acquire(32 * E18).unwrap();
        let err = f.redeem(alice(), 17, 23).unwrap_err();
        assert!(matches!(err, VaultError::BadMood { operation: "redeem", .. }));
    }

    #[test]
    fn withdraw_before_acquisition_rejected() {
        let mut f = Fixture::new();
        f.redeem(alice(), 17, 23).unwrap();
        let err = f.vault.withdraw(&alice(), &mut InMemoryPayments::new()).unwrap_err();
        assert!(matches!(err, VaultError::NotAcquiredYet));
    }

    #[test]
    fn curator_handover() {
        let mut f = Fixture::new();
        f.vault.set_curator(&curator(), alice()).unwrap();
        assert_eq!(f.vault.curator(), &alice());
        assert!(matches!(
            f.vault.set_curator(&curator(), curator()),
            Err(VaultError::NotCurator)
        ));
        assert!(f.vault.set_curator(&alice(), Address::ZERO).is_err());
        assert_eq!(f.vault.events().last().map(|e| e.kind.label()), Some("CURATOR_CHANGED"));
    }

    #[test]
    fn transfer_moves_shares_not_pixels() {
        let mut f = Fixture::new();
        f.redeem(alice(), 17, 23).unwrap();
        f.vault.transfer(&alice(), &buyer(), 3 * E18).unwrap();
        assert_eq!(f.vault.balance_of(&buyer()), 3 * E18);
        assert_eq!(f.vault.pixels_of(&buyer()), 0);
        assert_eq!(f.vault.wallet_info(&alice()).units, 23);
    }

    #[test]
    fn info_reports_price_schedule() {
        let mut f = Fixture::new();
        f.start_auction();
        let info = f.vault.info(NOW + 3600);
        assert_eq!(info.current_price, Some(315 * E18 / 10));
        assert_eq!(info.next_price_ts, Some(NOW + 7200));
    }

    #[test]
    fn snapshot_roundtrip() {
        let mut f = Fixture::new();
        f.redeem(alice(), 17, 23).unwrap();
        f.start_auction();
        let json = f.vault.to_json().unwrap();
        let back = Vault::from_json(&json).unwrap();
        assert_eq!(back, f.vault);
    }

    #[test]
    fn corrupted_snapshot_rejected() {
        let mut f = Fixture::new();
        f.start_auction();
        f.acquire(32 * E18).unwrap();
        let json = f.vault.to_json().unwrap();
        let tampered = json.replace(r#""status":"Acquired""#, r#""status":"Auctioning""#);
        assert!(matches!(
            Vault::from_json(&tampered),
            Err(VaultError::SupplyInvariantViolation { .. })
        ));
    }
}
