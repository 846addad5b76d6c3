#![no_main]
use libfuzzer_sys::fuzz_target;
use msgstore_migrate::{decode_message, encode_message};

fuzz_target!(|data: &[u8]| {
    if let Ok(m) = decode_message(data) {
        let again = encode_message(&m);
        assert_eq!(decode_message(&again).unwrap(), m);
    }
});
