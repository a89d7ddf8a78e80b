#![no_main]

use libfuzzer_sys::fuzz_target;
use snapcodec::block::{BlockDecoder, BlockEncoder};
use snapcodec::{max_compressed_len, Decoder, Encoder};

fuzz_target!(|data: &[u8]| {
    let mut compressed: Vec<u8> = Vec::new();

    {
        let mut encoder = BlockEncoder::new(data, &mut compressed);
        let written = encoder.encode().unwrap();
        assert_eq!(written, compressed.len());
        assert!(written <= max_compressed_len(data.len()));
    }

    let mut decompressed: Vec<u8> = Vec::new();
    {
        let mut decoder = BlockDecoder::new(&compressed, &mut decompressed);
        let (consumed, written) = decoder.decode().unwrap();
        assert_eq!(consumed, compressed.len());
        assert_eq!(written, decompressed.len());
    }
    assert_eq!(decompressed, data);
});
