//! Dutch auction price engine.
//!
//! The asking price is a pure function of the settings and the clock:
//! ```text
//! now <  start : price = starting
//! now >= start : price = max(reserve, starting − delta × ⌊(now − start) / period⌋)
//! ```
//! Same inputs, same price. The price never rises with time and never falls
//! below the reserve.

use fracvault_types::{AuctionSettings, Result, VaultError, Wei};
use serde::{Deserialize, Serialize};

/// Asking price under `settings` at unix time `now`.
#[must_use]
pub fn price_at(settings: &AuctionSettings, now: u64) -> Wei {
    if now < settings.starting_timestamp {
        return settings.starting_price;
    }
    let steps = elapsed_steps(settings, now);
    let decrease = settings.delta_price.checked_mul(Wei::from(steps));
    match decrease {
        Some(decrease) => settings
            .starting_price
            .saturating_sub(decrease)
            .max(settings.reserve_price),
        None => settings.reserve_price,
    }
}

/// Unix time of the next price drop after `now`.
///
/// Before the start this is the starting timestamp. `None` once the price
/// sits at the reserve (or never moves because `delta_price` is zero).
#[must_use]
pub fn next_drop_at(settings: &AuctionSettings, now: u64) -> Option<u64> {
    if now < settings.starting_timestamp {
        return Some(settings.starting_timestamp);
    }
    if settings.delta_price == 0 || price_at(settings, now) <= settings.reserve_price {
        return None;
    }
    let steps = elapsed_steps(settings, now);
    steps
        .checked_add(1)
        .and_then(|n| n.checked_mul(settings.delta_period))
        .and_then(|offset| settings.starting_timestamp.checked_add(offset))
}

/// Whole periods elapsed since the start. `delta_period` is validated
/// non-zero; a zero period is treated as one second.
fn elapsed_steps(settings: &AuctionSettings, now: u64) -> u64 {
    now.saturating_sub(settings.starting_timestamp) / settings.delta_period.max(1)
}

/// Auction state of one vault: the curator's settings, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutchAuction {
    settings: Option<AuctionSettings>,
}

impl DutchAuction {
    /// Auction with no settings yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the settings wholesale after validating them against `now`.
    ///
    /// # Errors
    /// Returns [`VaultError::InvalidAuctionSettings`]; the previous settings
    /// are kept.
    pub fn set_settings(&mut self, settings: AuctionSettings, now: u64) -> Result<()> {
        settings.validate(now)?;
        self.settings = Some(settings);
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> Option<&AuctionSettings> {
        self.settings.as_ref()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.settings.is_some()
    }

    /// Asking price at `now`.
    ///
    /// # Errors
    /// Returns [`VaultError::AuctionNotConfigured`] without settings.
    pub fn current_price(&self, now: u64) -> Result<Wei> {
        let settings = self.settings.as_ref().ok_or(VaultError::AuctionNotConfigured)?;
        let price = price_at(settings, now);
        tracing::debug!(now, price, "Auction price computed");
        Ok(price)
    }

    /// See [`next_drop_at`]. `None` without settings.
    #[must_use]
    pub fn next_price_timestamp(&self, now: u64) -> Option<u64> {
        self.settings.as_ref().and_then(|s| next_drop_at(s, now))
    }
}
