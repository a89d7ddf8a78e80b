//! Serialization of the block token stream, compatible with the Snappy raw
//! block format described in
//! <https://github.com/google/snappy/blob/main/format_description.txt>
//!
//! Each token starts with a tag byte. The low two bits select the token kind:
//! - 0: Literal. The high 6 bits 'm' hold 'length - 1' when m < 60. Otherwise
//!   the next 'm - 59' bytes hold 'length - 1', little-endian.
//! - 1: Copy with a 1-byte offset. Length is 4 + bits 2..4 (4..=11), bits 5..7
//!   are bits 8..10 of the offset, and the next byte is the low offset byte.
//! - 2: Copy with a 2-byte little-endian offset. Length is 1 + (tag >> 2).
//! - 3: Copy with a 4-byte little-endian offset. Length is 1 + (tag >> 2).

use crate::error::{Error, Result};
use crate::utils::number_encoding::{decode_le, encode_le};

pub const TAG_LITERAL: u8 = 0x00;
pub const TAG_COPY_1: u8 = 0x01;
pub const TAG_COPY_2: u8 = 0x02;
pub const TAG_COPY_4: u8 = 0x03;

/// Literal lengths up to this value are stored in the tag byte.
const MAX_INLINE_LITERAL: usize = 60;
/// The longest copy that a single token can express.
const MAX_COPY_LEN: usize = 64;

/// A single decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Copy these bytes to the output.
    Literal(&'a [u8]),
    /// Copy 'len' bytes that start 'offset' bytes before the output cursor.
    Copy { offset: usize, len: usize },
}

/// Write a literal token for 'literals' into the stream and return the
/// number of bytes written. The literal must be non-empty and shorter than
/// 1 << 32 bytes.
pub fn emit_literal(literals: &[u8], output: &mut Vec<u8>) -> usize {
    debug_assert!(!literals.is_empty(), "Empty literal");
    let n = literals.len() - 1;
    let mut written = 1;

    if n < MAX_INLINE_LITERAL {
        output.push((n as u8) << 2 | TAG_LITERAL);
    } else {
        // Number of bytes needed to store 'n'.
        let width = 4 - (n as u32).leading_zeros() as usize / 8;
        output.push(((59 + width) as u8) << 2 | TAG_LITERAL);
        written += encode_le(n as u32, width, output);
    }

    output.extend_from_slice(literals);
    written + literals.len()
}

/// Write a single copy token of 1..=64 bytes.
fn emit_copy_upto64(offset: usize, len: usize, output: &mut Vec<u8>) -> usize {
    debug_assert!((1..=MAX_COPY_LEN).contains(&len), "Invalid copy length");
    if (4..12).contains(&len) && offset < 2048 {
        output.push(
            ((offset >> 8) as u8) << 5 | ((len - 4) as u8) << 2 | TAG_COPY_1,
        );
        output.push(offset as u8);
        return 2;
    }
    if offset < 65536 {
        output.push(((len - 1) as u8) << 2 | TAG_COPY_2);
        return 1 + encode_le(offset as u32, 2, output);
    }
    output.push(((len - 1) as u8) << 2 | TAG_COPY_4);
    1 + encode_le(offset as u32, 4, output)
}

/// Write copy tokens for a match of 'len' bytes at distance 'offset' and
/// return the number of bytes written. Long matches are split into 64-byte
/// pieces, and the last piece is kept at 4 bytes or more so that it can use
/// the short form.
pub fn emit_copy(offset: usize, len: usize, output: &mut Vec<u8>) -> usize {
    debug_assert!(offset > 0, "Invalid offset");
    let mut len = len;
    let mut written = 0;

    while len >= 68 {
        written += emit_copy_upto64(offset, 64, output);
        len -= 64;
    }
    if len > 64 {
        written += emit_copy_upto64(offset, 60, output);
        len -= 60;
    }
    written + emit_copy_upto64(offset, len, output)
}

/// Parse the token at the start of 'input'. Returns the token and the number
/// of bytes that it occupies. Only the token's own fields are checked here;
/// the caller validates offsets and lengths against the output.
pub fn parse_token(input: &[u8]) -> Result<(Token<'_>, usize)> {
    let tag = *input.first().ok_or(Error::Truncated("tag"))?;
    let fields = &input[1..];

    match tag & 0x03 {
        TAG_LITERAL => {
            let m = (tag >> 2) as usize;
            let (len, header) = if m < MAX_INLINE_LITERAL {
                (m + 1, 1)
            } else {
                let width = m - 59;
                let n = decode_le(fields, width)
                    .ok_or(Error::Truncated("literal length"))?;
                (n as usize + 1, 1 + width)
            };
            // The length may not fit before the end of the input. Note that
            // 'n + 1' may wrap on 32-bit targets, which this also rejects.
            if len == 0 || input.len() - header < len {
                return Err(Error::Truncated("literal"));
            }
            Ok((Token::Literal(&input[header..header + len]), header + len))
        }
        TAG_COPY_1 => {
            let low = *fields.first().ok_or(Error::Truncated("copy offset"))?;
            let len = 4 + ((tag >> 2) & 0x07) as usize;
            let offset = ((tag >> 5) as usize) << 8 | low as usize;
            Ok((Token::Copy { offset, len }, 2))
        }
        TAG_COPY_2 => {
            let offset = decode_le(fields, 2)
                .ok_or(Error::Truncated("copy offset"))?;
            let len = 1 + (tag >> 2) as usize;
            Ok((Token::Copy { offset: offset as usize, len }, 3))
        }
        _ => {
            let offset = decode_le(fields, 4)
                .ok_or(Error::Truncated("copy offset"))?;
            let len = 1 + (tag >> 2) as usize;
            Ok((Token::Copy { offset: offset as usize, len }, 5))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_headers() {
        for (len, header) in [(1, 1), (60, 1), (61, 2), (256, 2), (257, 3)] {
            let lit = vec![7u8; len];
            let mut out = Vec::new();
            let written = emit_literal(&lit, &mut out);
            assert_eq!(written, out.len());
            assert_eq!(written, header + len);

            let (tok, read) = parse_token(&out).unwrap();
            assert_eq!(read, out.len());
            assert_eq!(tok, Token::Literal(&lit[..]));
        }
    }

    #[test]
    fn test_copy_classes() {
        let mut out = Vec::new();
        assert_eq!(emit_copy(10, 4, &mut out), 2);
        assert_eq!(out, [TAG_COPY_1, 10]);

        out.clear();
        assert_eq!(emit_copy(2047, 11, &mut out), 2);
        assert_eq!(out, [0xe0 | 7 << 2 | TAG_COPY_1, 0xff]);

        out.clear();
        assert_eq!(emit_copy(2048, 4, &mut out), 3);
        assert_eq!(out, [3 << 2 | TAG_COPY_2, 0x00, 0x08]);

        out.clear();
        assert_eq!(emit_copy(70000, 64, &mut out), 5);
        assert_eq!(parse_token(&out).unwrap().0, Token::Copy { offset: 70000, len: 64 });
    }

    #[test]
    fn test_long_copy_split() {
        // 130 = 64 + 60 + 6: every piece is 4 bytes or longer.
        for len in [4, 12, 64, 65, 67, 68, 130, 1000] {
            let mut out = Vec::new();
            let written = emit_copy(100, len, &mut out);
            assert_eq!(written, out.len());

            let mut cursor = 0;
            let mut total = 0;
            while cursor < out.len() {
                let (tok, read) = parse_token(&out[cursor..]).unwrap();
                match tok {
                    Token::Copy { offset, len } => {
                        assert_eq!(offset, 100);
                        assert!(len >= 4);
                        total += len;
                    }
                    Token::Literal(_) => panic!("Unexpected literal"),
                }
                cursor += read;
            }
            assert_eq!(total, len);
        }
    }

    #[test]
    fn test_truncated_tokens() {
        assert_eq!(parse_token(&[]), Err(Error::Truncated("tag")));
        assert_eq!(parse_token(&[TAG_COPY_1]), Err(Error::Truncated("copy offset")));
        assert_eq!(parse_token(&[TAG_COPY_2, 1]), Err(Error::Truncated("copy offset")));
        assert_eq!(parse_token(&[TAG_COPY_4, 1, 2, 3]), Err(Error::Truncated("copy offset")));
        assert_eq!(parse_token(&[61 << 2, 1]), Err(Error::Truncated("literal length")));
        assert_eq!(parse_token(&[2 << 2, b'a', b'b']), Err(Error::Truncated("literal")));
    }
}
