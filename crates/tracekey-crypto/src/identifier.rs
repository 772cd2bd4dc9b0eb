//! Identifier derivation
//!
//! A day secret is expanded into a broadcast key with HMAC-SHA256; the
//! broadcast key is an AES-256 key, and the identifier for a period is the
//! encryption of the big-endian period counter in the low four bytes of an
//! otherwise zero block. Deriving the broadcast key once per day keeps batch
//! derivation to a single block encryption per identifier.

use aes::{
    Aes256, Block,
    cipher::{BlockEncrypt, KeyInit},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::types::{DaySecret, IDENTIFIER_LEN, Identifier, SECRET_LEN};

type HmacSha256 = Hmac<Sha256>;

/// Label for deriving the broadcast key from a day secret
const BROADCAST_LABEL: &[u8] = b"Broadcast key";

/// Offset of the big-endian period counter inside the plaintext block
const COUNTER_OFFSET: usize = IDENTIFIER_LEN - 4;

/// Per-day PRF key.
///
/// Derived from a [`DaySecret`]; holding it is equivalent to holding the
/// day's identifier schedule, so it is zeroized on drop like the secret.
pub struct BroadcastKey {
    key: [u8; SECRET_LEN],
    cipher: Aes256,
}

impl BroadcastKey {
    /// Derive the broadcast key for the day owning `secret`.
    pub fn derive(secret: &DaySecret) -> Self {
        let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(BROADCAST_LABEL);
        let mut result = mac.finalize().into_bytes();

        let mut key = [0u8; SECRET_LEN];
        key.copy_from_slice(&result);
        result.as_mut_slice().zeroize();

        let Ok(cipher) = Aes256::new_from_slice(&key) else {
            unreachable!("broadcast key is exactly 32 bytes");
        };

        Self { key, cipher }
    }

    /// Identifier broadcast during `period`.
    ///
    /// `AES-256(broadcast_key, [0; 12] || period_be)`.
    pub fn identifier(&self, period: u32) -> Identifier {
        let mut block = Block::default();
        block[COUNTER_OFFSET..].copy_from_slice(&period.to_be_bytes());
        self.cipher.encrypt_block(&mut block);

        let mut id = [0u8; IDENTIFIER_LEN];
        id.copy_from_slice(&block);
        Identifier::from_bytes(id)
    }

    /// Identifiers for periods `0..count`, in period order.
    pub fn identifiers(&self, count: u32) -> Vec<Identifier> {
        (0..count).map(|period| self.identifier(period)).collect()
    }
}

impl std::fmt::Debug for BroadcastKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BroadcastKey(<redacted>)")
    }
}

impl Drop for BroadcastKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Derive the identifier for `period` of the day owning `secret`.
///
/// # Security
///
/// - Deterministic: same `(secret, period)` always yields the same identifier
/// - Different periods of one day are unlinkable without the secret
/// - Different days are unlinkable without the secrets
pub fn derive_identifier(secret: &DaySecret, period: u32) -> Identifier {
    BroadcastKey::derive(secret).identifier(period)
}

/// Derive identifiers for periods `0..count` of the day owning `secret`.
///
/// Equivalent to calling [`derive_identifier`] for each period, but derives
/// the broadcast key only once.
pub fn derive_identifiers(secret: &DaySecret, count: u32) -> Vec<Identifier> {
    BroadcastKey::derive(secret).identifiers(count)
}
