#![no_main]

use hyper_tag::{decode, encode, DEFAULT_MAX_DEPTH};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever decodes must re-encode to a stable stream (NaN payloads rule out tree equality)
    if let Ok(tag) = decode(data, DEFAULT_MAX_DEPTH) {
        let first = encode(&tag, DEFAULT_MAX_DEPTH).expect("decoded tree must encode");
        let again = decode(&first, DEFAULT_MAX_DEPTH).expect("encoded tree must decode");
        assert_eq!(encode(&again, DEFAULT_MAX_DEPTH).ok(), Some(first));
    }
});
