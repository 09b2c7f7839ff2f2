//! # fracvault-auction
//!
//! Decaying-price (Dutch) auction for the fractionalized collectible.
//!
//! [`price_at`] and [`next_drop_at`] are pure functions of the settings and
//! the clock; [`DutchAuction`] holds the curator-supplied settings for one
//! vault. The `Auctioning → Acquired` transition itself lives in the vault.

pub mod dutch_auction;

pub use dutch_auction::{DutchAuction, next_drop_at, price_at};
