//! A collection of utilities for handling numbers and well-known byte strings.

/// Well-known byte sequences and file names.
pub mod signatures {
    /// The extension used by the command line tool for compressed files.
    pub const FILE_EXTENSION: &str = ".snappy";

    /// The canonical encoding of the empty input: a zero length header and no
    /// tokens.
    pub const EMPTY_BLOCK: [u8; 1] = [0x00];
}

/// Implements encoding and decoding of little-endian numbers of 1 to 4 bytes.
pub mod number_encoding {
    /// Write the low 'width' bytes of 'num' into the stream, least significant
    /// byte first. Returns the number of bytes written.
    pub fn encode_le(num: u32, width: usize, stream: &mut Vec<u8>) -> usize {
        debug_assert!((1..=4).contains(&width), "Invalid width");
        stream.extend_from_slice(&num.to_le_bytes()[..width]);
        width
    }

    /// Decode a 'width' byte little-endian number from the start of 'stream'.
    pub fn decode_le(stream: &[u8], width: usize) -> Option<u32> {
        if width > 4 || stream.len() < width {
            return None;
        }
        let mut bytes = [0u8; 4];
        bytes[..width].copy_from_slice(&stream[..width]);
        Some(u32::from_le_bytes(bytes))
    }

    #[test]
    fn test_le_round_trip() {
        for (val, width) in [(0, 1), (255, 1), (258, 2), (1 << 20, 3), (u32::MAX, 4)] {
            let mut stream = Vec::new();
            assert_eq!(encode_le(val, width, &mut stream), width);
            assert_eq!(stream.len(), width);
            assert_eq!(decode_le(&stream, width), Some(val));
        }
        assert_eq!(decode_le(&[1, 2], 3), None);
        assert_eq!(decode_le(&[1, 2, 3, 4, 5], 5), None);
    }
}

/// Implements the block header: a little-endian base-128 varint. Each byte
/// carries 7 bits of the number, and the high bit is set on every byte except
/// the last. A 32-bit number takes at most 5 bytes.
/// The number 300 is serialized as [0xac, 0x02].
pub mod varint {
    use crate::error::{Error, Result};

    /// The maximum number of bytes in an encoded u32.
    pub const MAX_VARINT_LEN: usize = 5;

    /// Encode the number 'num' into the stream and return the number of bytes
    /// written.
    pub fn encode(num: u32, stream: &mut Vec<u8>) -> usize {
        let mut val = num;
        let mut written = 1;
        while val >= 0x80 {
            stream.push((val as u8) | 0x80);
            val >>= 7;
            written += 1;
        }
        stream.push(val as u8);
        written
    }

    /// Decode a number from the start of the stream. Returns the number of
    /// bytes read and the value.
    pub fn decode(stream: &[u8]) -> Result<(usize, u32)> {
        let mut val: u32 = 0;
        for (i, &c) in stream.iter().take(MAX_VARINT_LEN).enumerate() {
            // The fifth byte holds the top 4 bits and must terminate.
            if i == MAX_VARINT_LEN - 1 && c > 0x0f {
                return Err(Error::BadVarint);
            }
            val |= ((c & 0x7f) as u32) << (7 * i);
            if c & 0x80 == 0 {
                return Ok((i + 1, val));
            }
        }
        Err(Error::BadVarint)
    }

    #[test]
    fn test_varint_known_values() {
        let mut stream = Vec::new();
        assert_eq!(encode(0, &mut stream), 1);
        assert_eq!(stream, [0x00]);

        stream.clear();
        assert_eq!(encode(300, &mut stream), 2);
        assert_eq!(stream, [0xac, 0x02]);

        stream.clear();
        assert_eq!(encode(u32::MAX, &mut stream), 5);
        assert_eq!(stream, [0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(decode(&stream), Ok((5, u32::MAX)));
    }
}
