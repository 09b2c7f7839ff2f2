//! Configuration for creating a vault from a fractionalization event.

use serde::{Deserialize, Serialize};

use crate::{Address, AttesterKey, AuctionSettings, Digest, Result, Shares, Units, VaultError, constants};

fn default_share_scale() -> Shares {
    constants::SHARE_SCALE
}

/// Everything the parent collection and oracle supply when a collectible
/// is fractionalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Collection that owns the collectible.
    pub parent_collection: Address,
    /// Collectible id inside the collection.
    pub parent_token_id: u64,
    /// Initial curator.
    pub curator: Address,
    /// Oracle-reported total of committed contribution units.
    pub total_contribution_units: Units,
    /// Oracle-committed Merkle root over `(index, units)` leaves.
    #[serde(with = "crate::hex_bytes")]
    pub committed_root: Digest,
    /// Ed25519 key that signs ownership deeds.
    pub attester_key: AttesterKey,
    /// Shares minted per unit.
    #[serde(default = "default_share_scale")]
    pub share_scale: Shares,
    /// Auction settings supplied at fractionalization, if any.
    #[serde(default)]
    pub auction: Option<AuctionSettings>,
}

impl VaultConfig {
    /// Parse a config from JSON.
    ///
    /// # Errors
    /// Returns [`VaultError::Configuration`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VaultError::Configuration(e.to_string()))
    }

    /// Supply cap in shares: `total_contribution_units × share_scale`.
    ///
    /// # Errors
    /// Returns [`VaultError::Configuration`] if the product overflows.
    pub fn supply_cap(&self) -> Result<Shares> {
        Shares::from(self.total_contribution_units)
            .checked_mul(self.share_scale)
            .ok_or_else(|| VaultError::Configuration("supply cap overflows".into()))
    }

    /// Structural validation. Auction settings are validated separately
    /// against the clock when they are applied.
    ///
    /// # Errors
    /// Returns [`VaultError::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.total_contribution_units == 0 {
            return Err(VaultError::Configuration(
                "total contribution units must be greater than zero".into(),
            ));
        }
        if self.share_scale == 0 {
            return Err(VaultError::Configuration("share scale must be greater than zero".into()));
        }
        if self.curator.is_zero() {
            return Err(VaultError::Configuration("curator cannot be the zero address".into()));
        }
        self.supply_cap()?;
        self.attester_key.verifying_key()?;
        Ok(())
    }
}
