//! One-way day ratchet
//!
//! # Security Properties
//!
//! - Forward Secrecy: SHA-256 is preimage resistant, so a day secret does not
//!   reveal the previous day's secret
//! - Determinism: the same root always produces the same chain
//! - No inverse: this module exposes no way to step a secret backwards

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::types::{DaySecret, SECRET_LEN};

/// Derive the next day's secret from the current day's secret.
///
/// `next = SHA-256(current)`. The intermediate digest buffer is zeroized
/// before returning.
pub fn ratchet(secret: &DaySecret) -> DaySecret {
    let mut digest = Sha256::digest(secret.as_bytes());

    let mut next = [0u8; SECRET_LEN];
    next.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();

    let secret = DaySecret::from_bytes(next);
    next.zeroize();
    secret
}

/// Apply [`ratchet`] `steps` times in sequence.
///
/// There is no shortcut across days: the cost is `steps` hash evaluations.
/// Each intermediate secret is dropped (and therefore zeroized) as soon as
/// its successor exists. `steps == 0` returns a copy of the input.
pub fn ratchet_by(secret: &DaySecret, steps: u32) -> DaySecret {
    let mut current = secret.clone();
    for _ in 0..steps {
        current = ratchet(&current);
    }
    current
}
