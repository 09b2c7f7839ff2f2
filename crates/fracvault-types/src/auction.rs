//! Dutch auction settings.
//!
//! The price engine lives in `fracvault-auction`; this module only carries
//! the curator-supplied parameters and their validation rules.

use serde::{Deserialize, Serialize};

use crate::{Result, VaultError, Wei, constants};

/// Parameters of the decaying-price auction.
///
/// Replaced wholesale by the curator while the vault is `Awaiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSettings {
    /// Amount subtracted from the price at every elapsed period.
    pub delta_price: Wei,
    /// Length of one decay period in seconds. Must be non-zero.
    pub delta_period: u64,
    /// Floor price; the auction never asks less.
    pub reserve_price: Wei,
    /// Price at (and before) `starting_timestamp`.
    pub starting_price: Wei,
    /// Unix timestamp (seconds) at which the price starts decaying.
    pub starting_timestamp: u64,
}

impl AuctionSettings {
    /// Default settings starting at `starting_timestamp`.
    #[must_use]
    pub fn with_defaults(starting_timestamp: u64) -> Self {
        Self {
            delta_price: constants::DEFAULT_DELTA_PRICE,
            delta_period: constants::DEFAULT_DELTA_PERIOD_SECS,
            reserve_price: constants::DEFAULT_RESERVE_PRICE,
            starting_price: constants::DEFAULT_STARTING_PRICE,
            starting_timestamp,
        }
    }

    /// Validate against the current time.
    ///
    /// # Errors
    /// Returns [`VaultError::InvalidAuctionSettings`] when the period is zero,
    /// the starting price is below reserve, or the start lies in the past.
    pub fn validate(&self, now: u64) -> Result<()> {
        if self.delta_period == 0 {
            return Err(VaultError::InvalidAuctionSettings {
                reason: "delta period must be greater than zero".into(),
            });
        }
        if self.starting_price < self.reserve_price {
            return Err(VaultError::InvalidAuctionSettings {
                reason: format!(
                    "starting price {} below reserve price {}",
                    self.starting_price, self.reserve_price
                ),
            });
        }
        if self.starting_timestamp < now {
            return Err(VaultError::InvalidAuctionSettings {
                reason: format!(
                    "starting timestamp {} is in the past (now {now})",
                    self.starting_timestamp
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn defaults_are_valid() {
        let s = AuctionSettings::with_defaults(NOW);
        assert!(s.validate(NOW).is_ok());
        assert_eq!(s.starting_price, 32 * constants::SHARE_SCALE);
    }

    #[test]
    fn zero_period_rejected() {
        let mut s = AuctionSettings::with_defaults(NOW);
        s.delta_period = 0;
        let err = s.validate(NOW).unwrap_err();
        assert!(matches!(err, VaultError::InvalidAuctionSettings { .. }));
    }

    #[test]
    fn starting_below_reserve_rejected() {
        let mut s = AuctionSettings::with_defaults(NOW);
        s.starting_price = s.reserve_price - 1;
        assert!(s.validate(NOW).is_err());
    }

    #[test]
    fn starting_equal_reserve_accepted() {
        let mut s = AuctionSettings::with_defaults(NOW);
        s.starting_price = s.reserve_price;
        assert!(s.validate(NOW).is_ok());
    }

    #[test]
    fn past_start_rejected() {
        let s = AuctionSettings::with_defaults(NOW - 1);
        assert!(s.validate(NOW).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let s = AuctionSettings::with_defaults(NOW);
        let json = serde_json::to_string(&s).unwrap();
        let back: AuctionSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
