//! # fracvault-vault
//!
//! The fractional-ownership vault: wires the proof verifier, share ledger,
//! redemption registry, Dutch auction and settlement pool into one
//! monotonic state machine.
//!
//! ## Lifecycle
//!
//! 1. **Awaiting**: created by [`VaultArena::fractionalize`]; contributors
//!    redeem deeds; the curator sets auction settings
//! 2. **Auctioning**: the curator starts the auction; redemptions continue;
//!    a buyer calls [`Vault::acquire`] at the current price
//! 3. **Acquired**: holders call [`Vault::withdraw`] to burn their shares
//!    for a pro-rata slice of the proceeds
//!
//! Value leaves the vault only through the [`CollectibleCustody`] and
//! [`NativeTransfer`] collaborators; a failed transfer rolls the whole
//! operation back.

pub mod arena;
pub mod collaborators;
pub mod settlement;
pub mod vault;

pub use arena::VaultArena;
pub use collaborators::{CollectibleCustody, InMemoryCustody, InMemoryPayments, NativeTransfer};
pub use settlement::{Payout, SettlementPool, mul_div};
pub use vault::Vault;
