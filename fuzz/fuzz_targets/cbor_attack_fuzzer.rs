//! Fuzz target for CBOR attacks on persisted session state
//!
//! A device restores whatever bytes its store hands back, so the session
//! decoder must withstand hostile or damaged records.
//!
//! # Strategy
//!
//! - Deeply nested: Arrays/maps nested to arbitrary depth (stack overflow)
//! - Huge lengths: CBOR claiming massive byte/string/array lengths (memory)
//! - Field tampering: A valid record with one field replaced or dropped
//! - Duplicate keys: Session maps with repeated field names
//! - Bit flips: A valid record with one byte altered
//!
//! # Invariants
//!
//! - Decoding completes quickly (no infinite loops)
//! - Huge claimed lengths rejected (not allocated)
//! - A tampered record never restores as a different session silently:
//!   it is either rejected or decodes to a record that re-encodes to itself
//! - NEVER panic on malformed CBOR

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tracekey_core::{DayIndex, DaySecret, Session, codec};

#[derive(Debug, Clone, Arbitrary)]
enum CborAttack {
    DeeplyNested { depth: u8, map: bool },
    HugeLength { claimed_len_exponent: u8 },
    FieldTampering { day: u32, secret: [u8; 32], field: Field, replacement: Vec<u8> },
    DuplicateKeys { count: u8 },
    BitFlip { day: u32, secret: [u8; 32], position: u16, mask: u8 },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Field {
    Format,
    Version,
    Day,
    Secret,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Version => "version",
            Self::Day => "day",
            Self::Secret => "secret",
        }
    }
}

fuzz_target!(|attack: CborAttack| {
    match attack {
        CborAttack::DeeplyNested { depth, map } => {
            let _ = Session::restore(&create_nested_cbor(depth as usize, map));
        }

        CborAttack::HugeLength { claimed_len_exponent } => {
            let exponent = (claimed_len_exponent % 33) as u32;
            let claimed_length = if exponent < 32 { 1u32 << exponent } else { u32::MAX };

            for major in [0x5A, 0x7A, 0x9A, 0xBA] {
                let mut bytes = vec![major];
                bytes.extend_from_slice(&claimed_length.to_be_bytes());
                bytes.extend(vec![0x01; (claimed_length as usize).min(10)]);
                assert!(Session::restore(&bytes).is_err());
            }
        }

        CborAttack::FieldTampering { day, secret, field, replacement } => {
            let bytes = create_record_with(day, &secret, field, &replacement);
            check_restore(&bytes);
        }

        CborAttack::DuplicateKeys { count } => {
            let count = (count % 10).max(2);
            let mut bytes = vec![0xA0 | count];
            for _ in 0..count {
                bytes.push(0x63);
                bytes.extend_from_slice(b"day");
                bytes.push(0x01);
            }
            assert!(Session::restore(&bytes).is_err());
        }

        CborAttack::BitFlip { day, secret, position, mask } => {
            let mut bytes = codec::encode(DayIndex::new(day), &DaySecret::from_bytes(secret)).to_vec();
            let index = position as usize % bytes.len();
            bytes[index] ^= mask;
            check_restore(&bytes);
        }
    }
});

/// Restore must either fail or produce a session stable under re-encoding.
fn check_restore(bytes: &[u8]) {
    if let Ok(session) = Session::restore(bytes) {
        let again = Session::restore(&session.to_bytes());
        assert!(again.is_ok(), "re-encoded session rejected");
    }
}

fn create_nested_cbor(depth: usize, map: bool) -> Vec<u8> {
    let mut bytes = Vec::new();
    for _ in 0..depth {
        if map {
            bytes.extend_from_slice(&[0xA1, 0x63]);
            bytes.extend_from_slice(b"day");
        } else {
            bytes.push(0x81);
        }
    }
    bytes.push(0x01);
    bytes
}

/// Session map with every field written normally except `tampered`, whose
/// value is `replacement` interpreted as raw CBOR (empty = field dropped).
fn create_record_with(day: u32, secret: &[u8; 32], tampered: Field, replacement: &[u8]) -> Vec<u8> {
    let fields = [Field::Format, Field::Version, Field::Day, Field::Secret];
    let present = if replacement.is_empty() { 3 } else { 4 };

    let mut bytes = vec![0xA0 | present];
    for field in fields {
        let is_tampered = std::mem::discriminant(&field) == std::mem::discriminant(&tampered);
        if is_tampered && replacement.is_empty() {
            continue;
        }

        let name = field.name();
        bytes.push(0x60 | name.len() as u8);
        bytes.extend_from_slice(name.as_bytes());

        if is_tampered {
            bytes.extend_from_slice(replacement);
            continue;
        }

        match field {
            Field::Format => {
                let tag = codec::SESSION_FORMAT.as_bytes();
                bytes.push(0x60 | tag.len() as u8);
                bytes.extend_from_slice(tag);
            }
            Field::Version => {
                let version = codec::SESSION_FORMAT_VERSION;
                assert!(version < 24, "version must fit a one-byte CBOR integer");
                bytes.push(version as u8);
            }
            Field::Day => {
                bytes.push(0x1A);
                bytes.extend_from_slice(&day.to_be_bytes());
            }
            Field::Secret => {
                bytes.push(0x98);
                bytes.push(32);
                for b in secret {
                    if *b < 24 {
                        bytes.push(*b);
                    } else {
                        bytes.push(0x18);
                        bytes.push(*b);
                    }
                }
            }
        }
    }
    bytes
}
