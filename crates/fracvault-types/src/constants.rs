//! System-wide constants for the FracVault vault.

/// Shares minted per redeemed contribution unit (18 decimals).
pub const SHARE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Longest Merkle proof accepted. Deeper proofs fail closed.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Length of an ed25519 signature in bytes.
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// Domain tag prefixed to every Merkle leaf preimage.
pub const MERKLE_LEAF_TAG: &[u8] = b"fracvault:leaf:v1:";

/// Domain tag prefixed to every Merkle inner-node preimage.
pub const MERKLE_NODE_TAG: &[u8] = b"fracvault:node:v1:";

/// Domain tag prefixed to the canonical deed signing payload.
pub const DEED_SIGNING_TAG: &[u8] = b"fracvault:deed:v1:";

/// Default price decrement per period (0.05 in 18-decimal units).
pub const DEFAULT_DELTA_PRICE: u128 = 50_000_000_000_000_000;

/// Default decay period in seconds (one hour).
pub const DEFAULT_DELTA_PERIOD_SECS: u64 = 3600;

/// Default reserve price (1.0 in 18-decimal units).
pub const DEFAULT_RESERVE_PRICE: u128 = 1_000_000_000_000_000_000;

/// Default starting price (32.0 in 18-decimal units).
pub const DEFAULT_STARTING_PRICE: u128 = 32_000_000_000_000_000_000;

/// Maximum authors returned by a single range query.
pub const MAX_AUTHORS_PAGE: usize = 1_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "FracVault";
