//! Proceeds pool and proportional burn-on-withdraw payout.
//!
//! Each withdrawal pays `pool × balance / entitled` (floor) and burns the
//! holder's whole balance, where `entitled` is the share cap minus every
//! share burned so far. Both the pool and the entitled supply shrink by the
//! same fraction, so the pool-per-share rate seen by the remaining holders
//! does not depend on who withdraws first:
//! ```text
//! (P − P·b₁/E) · b₂ / (E − b₁) == P·b₂/E
//! ```
//!
//! Units that are never redeemed are never minted but still count toward
//! `entitled`, so their slice of the proceeds stays in the pool after every
//! holder has withdrawn.
//!
//! `pool × balance` routinely exceeds `u128` (32e18 × 174e18), so the
//! product is taken in arbitrary precision.

use fracvault_ledger::ShareLedger;
use fracvault_types::{Address, Result, Shares, VaultError, Wei};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// `⌊a × b / d⌋` without intermediate overflow.
///
/// # Errors
/// Returns [`VaultError::Internal`] if `d` is zero or the quotient does not
/// fit in `u128`.
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128> {
    if d == 0 {
        return Err(VaultError::Internal("pro-rata division by zero supply".into()));
    }
    let quotient = BigUint::from(a) * BigUint::from(b) / BigUint::from(d);
    u128::try_from(&quotient)
        .map_err(|_| VaultError::Internal(format!("pro-rata quotient {quotient} overflows u128")))
}

/// Ledger effects of one withdrawal, kept so they can be undone if the
/// payout transfer fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub holder: Address,
    pub burned: Shares,
    pub amount: Wei,
}

/// Native-currency proceeds held by a vault after its sale.
///
/// Credited exactly once, on acquisition. Afterwards it only decreases, by
/// exactly the amount paid out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPool {
    balance: Wei,
    /// Amount credited at acquisition; `None` before.
    funded_with: Option<Wei>,
    paid_out: Wei,
}

impl SettlementPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit the sale price.
    ///
    /// # Errors
    /// Returns [`VaultError::Internal`] if the pool was already funded.
    pub fn fund(&mut self, price: Wei) -> Result<()> {
        if let Some(previous) = self.funded_with {
            return Err(VaultError::Internal(format!(
                "proceeds pool already funded with {previous}"
            )));
        }
        self.balance = price;
        self.funded_with = Some(price);
        Ok(())
    }

    /// Undo [`fund`](Self::fund) when the acquisition it belongs to fails.
    pub(crate) fn unfund(&mut self) {
        self.balance = 0;
        self.funded_with = None;
        self.paid_out = 0;
    }

    /// Burn `holder`'s whole balance from `ledger` and debit its pro-rata
    /// share of the pool, measured against [`ShareLedger::entitled_supply`].
    /// The caller performs the transfer and, if it fails, hands the result
    /// to [`revert`](Self::revert).
    ///
    /// # Errors
    /// - `NoBalance` if the holder has no shares
    /// - `Internal` if the arithmetic is inconsistent (nothing mutated)
    pub fn withdraw(&mut self, holder: Address, ledger: &mut ShareLedger) -> Result<Payout> {
        let burned = ledger.balance_of(&holder);
        if burned == 0 {
            return Err(VaultError::NoBalance);
        }
        let amount = mul_div(self.balance, burned, ledger.entitled_supply())?;
        let remaining = self.balance.checked_sub(amount).ok_or_else(|| {
            VaultError::Internal(format!("payout {amount} exceeds pool {}", self.balance))
        })?;

        ledger.burn(holder, burned)?;
        self.balance = remaining;
        self.paid_out += amount;

        Ok(Payout {
            holder,
            burned,
            amount,
        })
    }

    /// Reverse a [`withdraw`](Self::withdraw) whose payout transfer failed.
    ///
    /// # Errors
    /// Propagates [`ShareLedger::reinstate`] failures.
    pub fn revert(&mut self, payout: &Payout, ledger: &mut ShareLedger) -> Result<()> {
        ledger.reinstate(payout.holder, payout.burned)?;
        self.balance += payout.amount;
        self.paid_out -= payout.amount;
        Ok(())
    }

    /// Current pool balance.
    #[must_use]
    pub fn balance(&self) -> Wei {
        self.balance
    }

    /// Pool balance at acquisition, if funded.
    #[must_use]
    pub fn funded_with(&self) -> Option<Wei> {
        self.funded_with
    }

    #[must_use]
    pub fn paid_out(&self) -> Wei {
        self.paid_out
    }

    /// Verify `balance + paid_out == funded_with`.
    ///
    /// # Errors
    /// Returns [`VaultError::SupplyInvariantViolation`] on mismatch.
    pub fn verify(&self) -> Result<()> {
        let expected = self.funded_with.unwrap_or(0);
        if self.balance.checked_add(self.paid_out) != Some(expected) {
            let reason = format!(
                "pool {} + paid out {} != funded {expected}",
                self.balance, self.paid_out
            );
            tracing::error!(%reason, "Proceeds pool invariant violated");
            return Err(VaultError::SupplyInvariantViolation { reason });
        }
        Ok(())
    }
}
