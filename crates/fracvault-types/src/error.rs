//! Error types for the FracVault fractional-ownership vault.
//!
//! All errors use the `FV_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Redemption errors
//! - 2xx: Share ledger errors
//! - 3xx: Lifecycle / authorization errors
//! - 4xx: Auction errors
//! - 5xx: Settlement errors
//! - 6xx: Vault arena errors
//! - 9xx: General / internal errors
//!
//! Every variant is a rejected operation, never a crash: the check that
//! raises it runs before any state is mutated.

use thiserror::Error;

use crate::{ContributorIndex, Shares, VaultId, VaultStatus, Wei};

/// Central error enum for all FracVault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    // =================================================================
    // Redemption Errors (1xx)
    // =================================================================
    /// The deed is bound to a different collectible than this vault.
    #[error("FV_ERR_100: unknown token: deed references token {deed_token}, vault holds {vault_token}")]
    UnknownToken { deed_token: u64, vault_token: u64 },

    /// The contributor index was already claimed.
    #[error("FV_ERR_101: already redeemed: contributor index {0}")]
    AlreadyRedeemed(ContributorIndex),

    /// The deed signature does not verify against the attester key.
    #[error("FV_ERR_102: bad signature")]
    BadSignature,

    /// The Merkle proof does not verify against the committed root.
    #[error("FV_ERR_103: false deeds: proof for index {index} does not match committed root")]
    FalseDeeds { index: ContributorIndex },

    // =================================================================
    // Share Ledger Errors (2xx)
    // =================================================================
    /// Transfer or burn exceeds the holder's balance.
    #[error("FV_ERR_200: insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Shares, available: Shares },

    /// A mint would push total supply past `total_units × scale`.
    #[error("FV_ERR_201: supply exceeded: {attempted} > cap {cap}")]
    SupplyExceeded { attempted: Shares, cap: Shares },

    // =================================================================
    // Lifecycle / Authorization Errors (3xx)
    // =================================================================
    /// The operation is not legal in the vault's current status.
    #[error("FV_ERR_300: bad mood: {operation} not allowed while {status}")]
    BadMood {
        operation: &'static str,
        status: VaultStatus,
    },

    /// The caller is not the vault curator.
    #[error("FV_ERR_301: not the curator")]
    NotCurator,

    // =================================================================
    // Auction Errors (4xx)
    // =================================================================
    /// Auction settings failed validation.
    #[error("FV_ERR_400: invalid auction settings: {reason}")]
    InvalidAuctionSettings { reason: String },

    /// Payment is below the current auction price.
    #[error("FV_ERR_401: insufficient value: paid {paid}, price {price}")]
    InsufficientValue { paid: Wei, price: Wei },

    /// Auctioning was requested before any settings were set.
    #[error("FV_ERR_402: auction settings not configured")]
    AuctionNotConfigured,

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// Withdrawal attempted before the collectible was acquired.
    #[error("FV_ERR_500: not acquired yet")]
    NotAcquiredYet,

    /// Withdrawal attempted by a holder with zero shares.
    #[error("FV_ERR_501: no balance")]
    NoBalance,

    /// An external transfer (collectible, refund, payout) failed; every
    /// ledger effect of the operation has been rolled back.
    #[error("FV_ERR_502: transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// Supply or pool conservation invariant violated. Critical safety alert.
    #[error("FV_ERR_503: supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Vault Arena Errors (6xx)
    // =================================================================
    /// No vault with this ID exists.
    #[error("FV_ERR_600: vault not found: {0}")]
    VaultNotFound(VaultId),

    /// The collectible has already been fractionalized.
    #[error("FV_ERR_601: collectible {collection}#{token_id} already has a vault")]
    DuplicateVault { collection: String, token_id: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("FV_ERR_900: internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("FV_ERR_901: serialization error: {0}")]
    Serialization(String),

    /// Configuration error (bad vault config, unparseable key, etc.).
    #[error("FV_ERR_902: configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, VaultError>;

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
