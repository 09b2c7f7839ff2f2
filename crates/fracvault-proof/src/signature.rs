//! Ed25519 deed signatures.
//!
//! The attester (the external collection's oracle backend) signs the
//! canonical deed payload; the vault only ever verifies. [`DeedSigner`]
//! is the attester-side half, used by fixtures and off-line tooling.

use ed25519_dalek::{Signature, Signer, SigningKey};
use fracvault_types::{AttesterKey, OwnershipDeed, constants};

/// Verify `signature` over `message` against `expected_signer`.
///
/// Returns `false` on a malformed signature (wrong length), an invalid
/// public key, or a verification failure. Never panics.
#[must_use]
pub fn verify_signature(message: &[u8], signature: &[u8], expected_signer: &AttesterKey) -> bool {
    let Ok(sig_bytes) = <[u8; constants::ED25519_SIGNATURE_LEN]>::try_from(signature) else {
        tracing::debug!(len = signature.len(), "Malformed deed signature");
        return false;
    };
    let Ok(verifying_key) = expected_signer.verifying_key() else {
        tracing::debug!(signer = %expected_signer, "Attester key is not a valid ed25519 point");
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);
    verifying_key.verify_strict(message, &signature).is_ok()
}

/// Verify the attester signature carried by `deed`.
#[must_use]
pub fn verify_deed_signature(deed: &OwnershipDeed, expected_signer: &AttesterKey) -> bool {
    verify_signature(&deed.signing_payload(), &deed.signature, expected_signer)
}

/// Attester-side deed signing.
pub struct DeedSigner {
    signing_key: SigningKey,
}

impl DeedSigner {
    /// Signer from a 32-byte ed25519 secret.
    #[must_use]
    pub fn from_secret(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Fresh random signer.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn generate<R: rand::CryptoRng + rand::RngCore>(rng: &mut R) -> Self {
        Self {
            signing_key: SigningKey::generate(rng),
        }
    }

    /// Public key vaults must be configured with.
    #[must_use]
    pub fn attester_key(&self) -> AttesterKey {
        AttesterKey::from_pubkey(self.signing_key.verifying_key().to_bytes())
    }

    /// Overwrite `deed.signature` with a signature over its canonical payload.
    pub fn sign(&self, deed: &mut OwnershipDeed) {
        let signature = self.signing_key.sign(&deed.signing_payload());
        deed.signature = signature.to_bytes().to_vec();
    }

    /// Consume and return a signed deed.
    #[must_use]
    pub fn signed(&self, mut deed: OwnershipDeed) -> OwnershipDeed {
        self.sign(&mut deed);
        deed
    }
}
