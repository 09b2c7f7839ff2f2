//! Identifiers used throughout FracVault.
//!
//! Vault IDs use UUIDv7 for time-ordered sorting. Wallet addresses and the
//! attester key are fixed-size byte strings that (de)serialize as `0x`-prefixed
//! hex so they can key JSON maps in persisted vault records.

use std::{fmt, str::FromStr};

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::VaultError;

/// Position of a contributor inside the committed Merkle leaf set.
pub type ContributorIndex = u64;

/// Soulbound contribution quantity attributed to a contributor index.
pub type Units = u64;

/// Transferable share amount (`units × share_scale`).
pub type Shares = u128;

/// Native-currency amount in base units.
pub type Wei = u128;

/// 256-bit digest (Merkle nodes, leaves, roots).
pub type Digest = [u8; 32];

/// Decode a `0x`-optional hex string into exactly `N` bytes.
pub fn decode_fixed<const N: usize>(s: &str) -> std::result::Result<[u8; N], String> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|e| format!("invalid hex '{s}': {e}"))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| format!("expected {N} bytes, got {len}"))
}

/// Serde adapter: fixed-size byte arrays as `0x`-prefixed hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode_fixed::<N>(&s).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// VaultId
// ---------------------------------------------------------------------------

/// Opaque identifier of one vault record in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct VaultId(pub Uuid);

impl VaultId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for VaultId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vault:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address (wallets, curator, buyer, parent collection).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(#[serde(with = "hex_bytes")] pub [u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(s)
            .map(Self)
            .map_err(|reason| VaultError::Configuration(format!("bad address: {reason}")))
    }
}

/// Test-only address constructors. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// Random address.
    pub fn random() -> Self {
        Self(rand::random::<[u8; 20]>())
    }

    /// Deterministic address whose low 8 bytes hold `n` (big-endian).
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }
}

// ---------------------------------------------------------------------------
// AttesterKey
// ---------------------------------------------------------------------------

/// Raw ed25519 public key of the trusted deed attester.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttesterKey(#[serde(with = "hex_bytes")] pub [u8; 32]);

impl AttesterKey {
    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decompress the key into an ed25519 point.
    ///
    /// # Errors
    /// Returns [`VaultError::Configuration`] if the bytes are not a valid
    /// compressed Edwards point.
    pub fn verifying_key(&self) -> Result<VerifyingKey, VaultError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|e| VaultError::Configuration(format!("bad attester key {self}: {e}")))
    }
}

impl fmt::Display for AttesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attester:{}", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for AttesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttesterKey(0x{})", hex::encode(self.0))
    }
}

impl FromStr for AttesterKey {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s)
            .map(Self)
            .map_err(|reason| VaultError::Configuration(format!("bad attester key: {reason}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_id_ordering() {
        let a = VaultId::new();
        let b = VaultId::new();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn address_display_and_parse() {
        let addr = Address::from_low_u64(0xdead_beef);
        let text = addr.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        let back: Address = text.parse().unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn address_parse_without_prefix() {
        let addr: Address = "00000000000000000000000000000000000000ff".parse().unwrap();
        assert_eq!(addr, Address::from_low_u64(0xff));
    }

    #[test]
    fn address_parse_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, VaultError::Configuration(_)));
    }

    #[test]
    fn address_serializes_as_hex_string() {
        let addr = Address::from_low_u64(7);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn address_keys_a_json_map() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Address::from_low_u64(1), 10u64);
        map.insert(Address::from_low_u64(2), 20u64);
        let json = serde_json::to_string(&map).unwrap();
        let back: std::collections::BTreeMap<Address, u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }

    #[test]
    fn attester_key_parse() {
        let hex_key = format!("0x{}", "ab".repeat(32));
        let key: AttesterKey = hex_key.parse().unwrap();
        assert_eq!(key.as_bytes(), &[0xab; 32]);
        assert!("0xabcd".parse::<AttesterKey>().is_err());
    }

    #[test]
    fn zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_low_u64(1).is_zero());
    }
}
