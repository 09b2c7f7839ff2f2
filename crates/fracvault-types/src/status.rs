//! Vault lifecycle status.
//!
//! ```text
//!   ┌──────────┐ enter_auctioning ┌────────────┐  acquire  ┌──────────┐
//!   │ AWAITING ├─────────────────▶│ AUCTIONING ├──────────▶│ ACQUIRED │
//!   └──────────┘                  └────────────┘           └──────────┘
//! ```
//!
//! Transitions are **monotonic**: a vault never returns to an earlier status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VaultStatus {
    /// Created from a settlement event; redemptions open, settings mutable.
    Awaiting,
    /// Dutch auction running; redemptions still open.
    Auctioning,
    /// Collectible sold; only withdrawals remain.
    Acquired,
}

impl VaultStatus {
    /// Can the vault move from this status to `target`?
    ///
    /// Only the single forward step is legal.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Awaiting, Self::Auctioning) | (Self::Auctioning, Self::Acquired)
        )
    }

    /// Whether contributor deeds may still be redeemed.
    #[must_use]
    pub fn accepts_redemptions(&self) -> bool {
        matches!(self, Self::Awaiting | Self::Auctioning)
    }

    /// Numeric code reported in [`VaultInfo::status_code`](crate::VaultInfo::status_code) (0, 1, 2).
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Awaiting => 0,
            Self::Auctioning => 1,
            Self::Acquired => 2,
        }
    }
}

impl fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Awaiting => write!(f, "AWAITING"),
            Self::Auctioning => write!(f, "AUCTIONING"),
            Self::Acquired => write!(f, "ACQUIRED"),
        }
    }
}
