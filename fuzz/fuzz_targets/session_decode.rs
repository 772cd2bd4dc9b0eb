//! Fuzz target for persisted session decoding
//!
//! Feeds arbitrary bytes to `Session::restore` to find:
//! - Decoder crashes or panics
//! - Accepted records that do not survive a re-encode
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tracekey_core::Session;

fuzz_target!(|data: &[u8]| {
    let Ok(session) = Session::restore(data) else {
        return;
    };

    let Ok(again) = Session::restore(&session.to_bytes()) else {
        panic!("re-encoded session rejected");
    };
    assert_eq!(again.day(), session.day());
    assert_eq!(again.export_day_key(), session.export_day_key());
});
