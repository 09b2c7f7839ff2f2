//! Append-only vault event journal.
//!
//! Every committed mutation appends exactly one [`VaultEvent`]; rejected
//! operations append nothing. The journal is persisted with the vault
//! record and forms its settlement audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, AuctionSettings, ContributorIndex, Shares, Units, Wei};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEventKind {
    /// A deed was redeemed and shares minted.
    Redeemed {
        claimant: Address,
        index: ContributorIndex,
        units: Units,
        shares: Shares,
    },
    /// Shares moved between holders.
    Transfer {
        from: Address,
        to: Address,
        amount: Shares,
    },
    /// The curator replaced the auction settings.
    AuctionSettingsChanged { settings: AuctionSettings },
    /// `Awaiting → Auctioning`.
    AuctioningStarted,
    /// `Auctioning → Acquired`.
    Acquired {
        buyer: Address,
        price: Wei,
        refund: Wei,
    },
    /// A holder burned shares for proceeds.
    Withdrawal {
        holder: Address,
        burned: Shares,
        paid: Wei,
    },
    /// Curatorship moved to a new address.
    CuratorChanged { from: Address, to: Address },
}

impl VaultEventKind {
    /// Stable upper-case label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Redeemed { .. } => "REDEEMED",
            Self::Transfer { .. } => "TRANSFER",
            Self::AuctionSettingsChanged { .. } => "AUCTION_SETTINGS_CHANGED",
            Self::AuctioningStarted => "AUCTIONING_STARTED",
            Self::Acquired { .. } => "ACQUIRED",
            Self::Withdrawal { .. } => "WITHDRAWAL",
            Self::CuratorChanged { .. } => "CURATOR_CHANGED",
        }
    }
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEvent {
    /// Position in the journal, starting at 0.
    pub seq: u64,
    pub kind: VaultEventKind,
    pub recorded_at: DateTime<Utc>,
}
