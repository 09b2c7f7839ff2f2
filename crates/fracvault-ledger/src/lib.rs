//! # fracvault-ledger
//!
//! Per-vault share accounting and deed redemption.
//!
//! - [`ShareLedger`]: transferable share balances, soulbound contribution
//!   scores, and the supply conservation check
//! - [`RedemptionRegistry`]: the one-shot claim protocol that turns a valid
//!   [`OwnershipDeed`](fracvault_types::OwnershipDeed) into minted shares

pub mod redemption;
pub mod share_ledger;

pub use redemption::{Redemption, RedemptionRegistry};
pub use share_ledger::ShareLedger;
