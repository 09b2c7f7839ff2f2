//! Fungible share balances plus soulbound contribution scores.
//!
//! The [`ShareLedger`] tracks two independent maps:
//! - **Balances**: transferable shares, minted on redemption and burned on
//!   withdrawal
//! - **Contribution scores**: units credited on redemption; append-only and
//!   never moved by a transfer
//!
//! Supply conservation is checked by [`ShareLedger::verify_supply`]:
//! ```text
//! Σ balances == total_supply == minted − burned <= cap
//! ```

use std::collections::BTreeMap;

use fracvault_types::{Address, Result, Shares, Units, VaultError};
use serde::{Deserialize, Serialize};

/// Per-vault share ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    /// `Address → transferable shares`. Zero balances are pruned.
    balances: BTreeMap<Address, Shares>,
    /// `Address → contribution units`. Only ever increases.
    scores: BTreeMap<Address, Units>,
    total_supply: Shares,
    /// `total_contribution_units × scale`.
    cap: Shares,
    /// Shares minted per unit.
    scale: Shares,
    /// Shares minted since creation.
    minted: Shares,
    /// Shares burned since creation.
    burned: Shares,
}

impl ShareLedger {
    /// Create an empty ledger capped at `total_units × scale`.
    ///
    /// # Errors
    /// Returns [`VaultError::Configuration`] if the cap overflows or the
    /// scale is zero.
    pub fn new(total_units: Units, scale: Shares) -> Result<Self> {
        if scale == 0 {
            return Err(VaultError::Configuration("share scale must be greater than zero".into()));
        }
        let cap = Shares::from(total_units)
            .checked_mul(scale)
            .ok_or_else(|| VaultError::Configuration("supply cap overflows".into()))?;
        Ok(Self {
            balances: BTreeMap::new(),
            scores: BTreeMap::new(),
            total_supply: 0,
            cap,
            scale,
            minted: 0,
            burned: 0,
        })
    }

    // =================================================================
    // Core operations
    // =================================================================

    /// Mint `units × scale` shares to `address` and credit `units` to its
    /// contribution score. Returns the number of shares minted.
    ///
    /// # Errors
    /// Returns [`VaultError::SupplyExceeded`] if the mint would push total
    /// supply past the cap. Nothing is mutated in that case.
    pub fn mint(&mut self, address: Address, units: Units) -> Result<Shares> {
        let amount = Shares::from(units).checked_mul(self.scale);
        let attempted = amount.and_then(|a| self.total_supply.checked_add(a));
        let (amount, attempted) = match (amount, attempted) {
            (Some(amount), Some(attempted)) if attempted <= self.cap => (amount, attempted),
            _ => {
                return Err(VaultError::SupplyExceeded {
                    attempted: attempted.unwrap_or(Shares::MAX),
                    cap: self.cap,
                });
            }
        };

        if amount > 0 {
            *self.balances.entry(address).or_default() += amount;
        }
        let score = self.scores.entry(address).or_default();
        *score = score.saturating_add(units);
        self.total_supply = attempted;
        self.minted += amount;

        tracing::debug!(holder = %address, units, amount, total_supply = self.total_supply, "Shares minted");
        Ok(amount)
    }

    /// Move `amount` shares from `from` to `to`. Scores are untouched.
    ///
    /// # Errors
    /// Returns [`VaultError::InsufficientBalance`] if `amount` exceeds the
    /// sender's balance.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Shares) -> Result<()> {
        let available = self.balance_of(&from);
        if available < amount {
            return Err(VaultError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        self.debit(from, amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    /// Destroy `amount` shares held by `address`.
    ///
    /// # Errors
    /// Returns [`VaultError::InsufficientBalance`] if `amount` exceeds the
    /// holder's balance.
    pub fn burn(&mut self, address: Address, amount: Shares) -> Result<()> {
        let available = self.balance_of(&address);
        if available < amount {
            return Err(VaultError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.debit(address, amount);
        self.total_supply -= amount;
        self.burned += amount;
        Ok(())
    }

    /// Undo a [`burn`](Self::burn) whose surrounding operation failed.
    ///
    /// # Errors
    /// Returns [`VaultError::Internal`] if more is reinstated than was ever burned.
    pub fn reinstate(&mut self, address: Address, amount: Shares) -> Result<()> {
        if amount > self.burned {
            return Err(VaultError::Internal(format!(
                "cannot reinstate {amount} shares, only {} burned",
                self.burned
            )));
        }
        *self.balances.entry(address).or_default() += amount;
        self.total_supply += amount;
        self.burned -= amount;
        Ok(())
    }

    /// Caller has checked `amount <= balance_of(address)`.
    fn debit(&mut self, address: Address, amount: Shares) {
        if let Some(balance) = self.balances.get_mut(&address) {
            *balance -= amount;
            if *balance == 0 {
                self.balances.remove(&address);
            }
        }
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn balance_of(&self, address: &Address) -> Shares {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Soulbound units credited to `address` across all its redemptions.
    #[must_use]
    pub fn contribution_score(&self, address: &Address) -> Units {
        self.scores.get(address).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_supply(&self) -> Shares {
        self.total_supply
    }

    #[must_use]
    pub fn supply_cap(&self) -> Shares {
        self.cap
    }

    #[must_use]
    pub fn scale(&self) -> Shares {
        self.scale
    }

    #[must_use]
    pub fn total_minted(&self) -> Shares {
        self.minted
    }

    #[must_use]
    pub fn total_burned(&self) -> Shares {
        self.burned
    }

    /// Shares with a claim on sale proceeds: the outstanding supply plus
    /// the part of the cap never minted.
    #[must_use]
    pub fn entitled_supply(&self) -> Shares {
        self.cap.saturating_sub(self.burned)
    }

    /// Holders with a non-zero balance, in address order.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Shares)> {
        self.balances.iter()
    }

    /// Number of holders with a non-zero balance.
    #[must_use]
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    // =================================================================
    // Invariants
    // =================================================================

    /// Verify `Σ balances == total_supply == minted − burned <= cap`.
    ///
    /// # Errors
    /// Returns [`VaultError::SupplyInvariantViolation`] describing the first
    /// broken equation.
    pub fn verify_supply(&self) -> Result<()> {
        let sum = self
            .balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b));

        let violation = match sum {
            None => Some("sum of balances overflows".to_string()),
            Some(sum) if sum != self.total_supply => Some(format!(
                "sum of balances {sum} != total supply {}",
                self.total_supply
            )),
            Some(_) if self.minted.checked_sub(self.burned) != Some(self.total_supply) => {
                Some(format!(
                    "total supply {} != minted {} - burned {}",
                    self.total_supply, self.minted, self.burned
                ))
            }
            Some(_) if self.total_supply > self.cap => Some(format!(
                "total supply {} exceeds cap {}",
                self.total_supply, self.cap
            )),
            Some(_) => None,
        };

        match violation {
            Some(reason) => {
                tracing::error!(%reason, "Share supply invariant violated");
                Err(VaultError::SupplyInvariantViolation { reason })
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: Shares = 1_000_000_000_000_000_000;

    fn alice() -> Address {
        Address::from_low_u64(0xa11ce)
    }

    fn bob() -> Address {
        Address::from_low_u64(0xb0b)
    }

    fn ledger(total_units: Units) -> ShareLedger {
        ShareLedger::new(total_units, SCALE).unwrap()
    }

    #[test]
    fn mint_credits_balance_score_and_supply() {
        let mut l = ledger(174);
        let minted = l.mint(alice(), 23).unwrap();
        assert_eq!(minted, 23 * SCALE);
        assert_eq!(l.balance_of(&alice()), 23 * SCALE);
        assert_eq!(l.contribution_score(&alice()), 23);
        assert_eq!(l.total_supply(), 23 * SCALE);
        assert!(l.verify_supply().is_ok());
    }

    #[test]
    fn repeated_mints_accumulate_score() {
        let mut l = ledger(174);
        l.mint(alice(), 23).unwrap();
        l.mint(alice(), 5).unwrap();
        assert_eq!(l.contribution_score(&alice()), 28);
        assert_eq!(l.balance_of(&alice()), 28 * SCALE);
    }

    #[test]
    fn mint_up_to_cap_then_exceeded() {
        let mut l = ledger(10);
        l.mint(alice(), 10).unwrap();
        let err = l.mint(bob(), 1).unwrap_err();
        assert!(
            matches!(err, VaultError::SupplyExceeded { attempted, cap } if attempted == 11 * SCALE && cap == 10 * SCALE),
            "Expected SupplyExceeded, got: {err:?}"
        );
        // Nothing mutated.
        assert_eq!(l.balance_of(&bob()), 0);
        assert_eq!(l.contribution_score(&bob()), 0);
        assert_eq!(l.total_supply(), 10 * SCALE);
    }

    #[test]
    fn zero_unit_mint_is_noop_on_supply() {
        let mut l = ledger(10);
        assert_eq!(l.mint(alice(), 0).unwrap(), 0);
        assert_eq!(l.total_supply(), 0);
        assert_eq!(l.holder_count(), 0);
        assert!(l.verify_supply().is_ok());
    }

    #[test]
    fn transfer_moves_balance_not_score() {
        let mut l = ledger(100);
        l.mint(alice(), 40).unwrap();
        l.transfer(alice(), bob(), 15 * SCALE).unwrap();
        assert_eq!(l.balance_of(&alice()), 25 * SCALE);
        assert_eq!(l.balance_of(&bob()), 15 * SCALE);
        assert_eq!(l.contribution_score(&alice()), 40);
        assert_eq!(l.contribution_score(&bob()), 0);
        assert!(l.verify_supply().is_ok());
    }

    #[test]
    fn transfer_insufficient_balance() {
        let mut l = ledger(100);
        l.mint(alice(), 1).unwrap();
        let err = l.transfer(alice(), bob(), SCALE + 1).unwrap_err();
        assert!(matches!(err, VaultError::InsufficientBalance { .. }));
        assert_eq!(l.balance_of(&alice()), SCALE);
    }

    #[test]
    fn self_transfer_is_noop() {
        let mut l = ledger(100);
        l.mint(alice(), 3).unwrap();
        l.transfer(alice(), alice(), 3 * SCALE).unwrap();
        assert_eq!(l.balance_of(&alice()), 3 * SCALE);
    }

    #[test]
    fn full_transfer_prunes_sender() {
        let mut l = ledger(100);
        l.mint(alice(), 3).unwrap();
        l.transfer(alice(), bob(), 3 * SCALE).unwrap();
        assert_eq!(l.holder_count(), 1);
    }

    #[test]
    fn burn_reduces_supply() {
        let mut l = ledger(100);
        l.mint(alice(), 10).unwrap();
        l.burn(alice(), 4 * SCALE).unwrap();
        assert_eq!(l.balance_of(&alice()), 6 * SCALE);
        assert_eq!(l.total_supply(), 6 * SCALE);
        assert_eq!(l.total_burned(), 4 * SCALE);
        assert_eq!(l.contribution_score(&alice()), 10);
        assert!(l.verify_supply().is_ok());
    }

    #[test]
    fn burn_insufficient_balance() {
        let mut l = ledger(100);
        let err = l.burn(alice(), 1).unwrap_err();
        assert!(matches!(err, VaultError::InsufficientBalance { needed: 1, available: 0 }));
    }

    #[test]
    fn reinstate_undoes_burn() {
        let mut l = ledger(100);
        l.mint(alice(), 10).unwrap();
        let before = l.clone();
        l.burn(alice(), 10 * SCALE).unwrap();
        l.reinstate(alice(), 10 * SCALE).unwrap();
        assert_eq!(l, before);
    }

    #[test]
    fn reinstate_more_than_burned_rejected() {
        let mut l = ledger(100);
        assert!(matches!(l.reinstate(alice(), 1), Err(VaultError::Internal(_))));
    }

    #[test]
    fn verify_supply_detects_tampering() {
        let mut l = ledger(100);
        l.mint(alice(), 10).unwrap();
        l.total_supply += 1;
        let err = l.verify_supply().unwrap_err();
        assert!(matches!(err, VaultError::SupplyInvariantViolation { .. }));
    }

    #[test]
    fn entitled_supply_counts_unminted_units() {
        let mut l = ledger(174);
        assert_eq!(l.entitled_supply(), 174 * SCALE);
        l.mint(alice(), 23).unwrap();
        assert_eq!(l.entitled_supply(), 174 * SCALE);
        l.burn(alice(), 23 * SCALE).unwrap();
        assert_eq!(l.entitled_supply(), 151 * SCALE);
        l.reinstate(alice(), 23 * SCALE).unwrap();
        assert_eq!(l.entitled_supply(), 174 * SCALE);
    }

    #[test]
    fn cap_overflow_rejected() {
        let err = ShareLedger::new(u64::MAX, u128::MAX).unwrap_err();
        assert!(matches!(err, VaultError::Configuration(_)));
        assert!(ShareLedger::new(10, 0).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let mut l = ledger(100);
        l.mint(alice(), 10).unwrap();
        l.transfer(alice(), bob(), SCALE).unwrap();
        let json = serde_json::to_string(&l).unwrap();
        let back: ShareLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(l, back);
    }
}
