//! # fracvault-types
//!
//! Shared types, errors, and configuration for the **FracVault**
//! fractional-ownership vault.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`VaultId`], [`Address`], [`AttesterKey`], [`ContributorIndex`]
//! - **Lifecycle**: [`VaultStatus`]
//! - **Claims**: [`OwnershipDeed`]
//! - **Auction**: [`AuctionSettings`]
//! - **Read models**: [`VaultInfo`], [`ContributorInfo`], [`WalletInfo`], [`AuthorEntry`]
//! - **Journal**: [`VaultEvent`], [`VaultEventKind`]
//! - **Configuration**: [`VaultConfig`]
//! - **Errors**: [`VaultError`] with `FV_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod auction;
pub mod config;
pub mod constants;
pub mod deed;
pub mod error;
pub mod event;
pub mod ids;
pub mod info;
pub mod status;

pub use auction::*;
pub use config::*;
pub use deed::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use info::*;
pub use status::*;

// Constants are accessed via `fracvault_types::constants::FOO`
// (not re-exported to avoid name collisions).
