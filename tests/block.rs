use snapcodec::block::{validate, BlockDecoder, BlockEncoder};
use snapcodec::utils::varint;
use snapcodec::{Decoder, Encoder, Error};

/// "abcd" followed by a one-byte-offset copy of itself.
const COPY1_BLOCK: [u8; 8] = [0x08, 0x0c, b'a', b'b', b'c', b'd', 0x01, 0x04];

/// "ab" expanded to 8 bytes by an overlapping two-byte-offset copy.
const COPY2_BLOCK: [u8; 7] = [0x08, 0x04, b'a', b'b', 0x16, 0x02, 0x00];

/// "xyz" followed by a four-byte-offset copy of itself.
const COPY4_BLOCK: [u8; 10] =
    [0x06, 0x08, b'x', b'y', b'z', 0x0b, 0x03, 0x00, 0x00, 0x00];

/// Blocks written by the C++ reference encoder (google/snappy).
const REF_HELLO: [u8; 7] = [0x05, 0x10, b'h', b'e', b'l', b'l', b'o'];
const REF_RUN: [u8; 6] = [0x14, 0x00, b'a', 0x4a, 0x01, 0x00];
const REF_REPEAT: [u8; 13] = [
    0x20, 0x1c, b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h', 0x5e, 0x08, 0x00,
];

fn decode(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut stream: Vec<u8> = Vec::new();
    let mut decoder = BlockDecoder::new(input, &mut stream);
    let (consumed, written) = decoder.decode()?;
    assert_eq!(consumed, input.len());
    assert_eq!(written, stream.len());
    Ok(stream)
}

#[test]
fn test_block_decoder_const_inputs() {
    assert_eq!(decode(&COPY1_BLOCK).unwrap(), b"abcdabcd");
    assert_eq!(decode(&COPY2_BLOCK).unwrap(), b"abababab");
    assert_eq!(decode(&COPY4_BLOCK).unwrap(), b"xyzxyz");
    assert_eq!(decode(&[0x00]).unwrap(), b"");

    // A literal with a one byte length extension.
    let mut block = vec![100, 60 << 2, 99];
    block.extend(0..100u8);
    assert_eq!(decode(&block).unwrap(), (0..100u8).collect::<Vec<u8>>());
}

#[test]
fn test_block_encoder_const_inputs() {
    let mut stream: Vec<u8> = Vec::new();
    let mut encoder = BlockEncoder::new(b"abcdabcdabcd", &mut stream);
    let written = encoder.encode().unwrap();
    assert_eq!(stream, [12, 0x0c, b'a', b'b', b'c', b'd', 0x11, 0x04]);
    assert_eq!(stream.len(), written);

    let mut stream: Vec<u8> = Vec::new();
    let _ = BlockEncoder::new(&[b'a'; 20], &mut stream).encode().unwrap();
    assert_eq!(stream, [20, 0x00, b'a', 0x4a, 0x01, 0x00]);

    let mut stream: Vec<u8> = Vec::new();
    let _ = BlockEncoder::new(&[], &mut stream).encode().unwrap();
    assert_eq!(stream, [0x00]);
}

fn round_trip(input: &[u8]) {
    let mut compressed: Vec<u8> = Vec::new();
    {
        let mut encoder = BlockEncoder::new(input, &mut compressed);
        let written = encoder.encode().unwrap();
        assert_eq!(written, compressed.len());
    }

    assert_eq!(validate(&compressed), Ok(input.len()));
    assert_eq!(decode(&compressed).unwrap(), input);
}

#[test]
fn test_block_round_trip() {
    {
        round_trip(&[]);
        round_trip(&[1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 0, 0, 0, 0]);
        round_trip(&[1, 0, 0, 1, 0, 0, 0, 0, 2, 2, 2, 2, 0, 0, 0, 0]);
        round_trip(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 5, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
    }
    {
        let test_str = "123456789abcd&ef&gh&ijk&lm7no*aaaa aaaa aaaaaaaa";
        round_trip(test_str.as_bytes());
    }
    {
        let mut vec = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                vec.push(i);
                vec.push(j);
                vec.push(j * 2);
            }
        }
        round_trip(&vec);
    }
    {
        // Long runs need several copy tokens.
        let mut vec = vec![0u8; 5000];
        vec.extend(vec![0xffu8; 300]);
        vec.extend(b"tail");
        round_trip(&vec);
    }
}

#[test]
fn test_block_decoder_malformed() {
    // Copy offset of zero.
    assert_eq!(
        decode(&[5, 0x00, b'a', 0x01, 0x00]),
        Err(Error::InvalidOffset { offset: 0, produced: 1 })
    );
    // Copy reaches before the start of the output.
    assert_eq!(
        decode(&[5, 0x00, b'a', 0x01, 0x02]),
        Err(Error::InvalidOffset { offset: 2, produced: 1 })
    );
    // A literal writes past the declared length.
    assert_eq!(
        decode(&[2, 0x08, b'a', b'b', b'c']),
        Err(Error::Overrun { declared: 2 })
    );
    // A copy writes past the declared length.
    assert_eq!(
        decode(&[4, 0x00, b'a', 0x01, 0x01]),
        Err(Error::Overrun { declared: 4 })
    );
    // The tokens end early.
    assert_eq!(
        decode(&[5, 0x00, b'a']),
        Err(Error::LengthMismatch { declared: 5, produced: 1 })
    );
    // Truncated fields.
    assert_eq!(decode(&[3, 0x08, b'a', b'b']), Err(Error::Truncated("literal")));
    assert_eq!(
        decode(&[5, 0x00, b'a', 0x02, 0x01]),
        Err(Error::Truncated("copy offset"))
    );
    assert_eq!(
        decode(&[3, 0xf4, 0x45]),
        Err(Error::Truncated("literal length"))
    );
    // Bad headers.
    assert_eq!(decode(&[]), Err(Error::BadVarint));
    assert_eq!(decode(&[0x80, 0x80]), Err(Error::BadVarint));
    assert!(matches!(
        decode(&[0xff, 0xff, 0x03, 0x00, b'a']),
        Err(Error::ImpossibleLength { .. })
    ));
}

#[test]
fn test_block_decoder_keeps_output_on_failure() {
    let mut stream: Vec<u8> = vec![9, 9, 9];
    let res = BlockDecoder::new(&[5, 0x00, b'a', 0x01, 0x02], &mut stream).decode();
    assert!(res.unwrap_err().is_malformed());
    assert_eq!(stream, [9, 9, 9]);

    // Back-references can't reach into bytes that were already in the buffer.
    let res = BlockDecoder::new(&[5, 0x00, b'a', 0x01, 0x03], &mut stream).decode();
    assert!(res.is_err());
    assert_eq!(stream, [9, 9, 9]);

    // Successful decoding appends.
    let (_, written) = BlockDecoder::new(&COPY1_BLOCK, &mut stream).decode().unwrap();
    assert_eq!(written, 8);
    assert_eq!(stream, b"\x09\x09\x09abcdabcd");
}

#[test]
fn test_validate_matches_decoder() {
    let blocks: [&[u8]; 6] = [
        &COPY1_BLOCK,
        &COPY2_BLOCK,
        &COPY4_BLOCK,
        &[5, 0x00, b'a', 0x01, 0x02],
        &[2, 0x08, b'a', b'b', b'c'],
        &[0x80],
    ];
    for block in blocks {
        assert_eq!(validate(block).is_ok(), decode(block).is_ok());
    }
}

fn encode(input: &[u8]) -> Vec<u8> {
    let mut stream: Vec<u8> = Vec::new();
    let _ = BlockEncoder::new(input, &mut stream).encode().unwrap();
    stream
}

#[test]
fn test_reference_encoder_blocks() {
    let repeat = b"abcdefgh".repeat(4);
    let distinct: Vec<u8> = (0..64u8).collect();
    let mut literal64 = vec![0x40, 60 << 2, 63];
    literal64.extend(&distinct);

    let cases: [(&[u8], &[u8]); 4] = [
        (&REF_HELLO[..], &b"hello"[..]),
        (&REF_RUN[..], &[b'a'; 20][..]),
        (&REF_REPEAT[..], &repeat[..]),
        (&literal64[..], &distinct[..]),
    ];
    for (block, raw) in cases {
        assert_eq!(decode(block).unwrap(), raw);
        // The greedy matcher picks the same tokens on these inputs.
        assert_eq!(encode(raw), block);
    }
}

/// Build a block that declares 'declared' bytes, with a one byte literal and
/// 'copies' copies of 64 bytes each. Copy2 tokens are the densest tokens.
fn dense_block(declared: u32, copies: usize) -> Vec<u8> {
    let mut block = Vec::new();
    varint::encode(declared, &mut block);
    block.extend([0x00, b'z']);
    for _ in 0..copies {
        block.extend([63 << 2 | 2, 1, 0]);
    }
    block
}

#[test]
fn test_densest_blocks_are_accepted() {
    for k in [1usize, 10, 1000, 20000] {
        let len = 1 + 64 * k;
        let block = dense_block(len as u32, k);
        assert_eq!(validate(&block), Ok(len));
        assert_eq!(decode(&block).unwrap(), vec![b'z'; len]);

        // One more byte is a short stream, not an impossible one.
        assert_eq!(
            decode(&dense_block(len as u32 + 1, k)),
            Err(Error::LengthMismatch {
                declared: len + 1,
                produced: len
            })
        );

        // The largest length the token bytes could describe is still read
        // as a length mismatch. One past it is rejected up front.
        let available = 2 + 3 * k;
        let limit = available * 64 / 3;
        assert!(matches!(
            validate(&dense_block(limit as u32, k)),
            Err(Error::LengthMismatch { .. })
        ));
        assert_eq!(
            validate(&dense_block(limit as u32 + 1, k)),
            Err(Error::ImpossibleLength {
                declared: limit + 1,
                available
            })
        );
    }
}
