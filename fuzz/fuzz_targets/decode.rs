#![no_main]

use libfuzzer_sys::fuzz_target;
use snapcodec::{is_valid_compressed, uncompress, uncompressed_length};

fuzz_target!(|data: &[u8]| {
    let valid = is_valid_compressed(data);
    match uncompress(data) {
        Ok(output) => {
            assert!(valid);
            assert_eq!(Ok(output.len()), uncompressed_length(data));
        }
        Err(err) => {
            assert!(!valid);
            assert!(err.is_malformed());
        }
    }
});
