//! This module handles the encoding and decoding of a single block: the
//! varint length header followed by the literal/copy token stream.

use crate::error::{Error, Result};
use crate::lz::matcher::HashMatchFinder;
use crate::lz::tokens::{emit_copy, emit_literal, parse_token, Token};
use crate::utils::varint;
use crate::{Decoder, Encoder};

/// The largest input that fits in a block.
pub const MAX_INPUT_LEN: usize = u32::MAX as usize;

/// No token produces more than 64 output bytes from 3 input bytes.
const MAX_EXPANSION_NUM: u64 = 64;
const MAX_EXPANSION_DEN: u64 = 3;

/// Returns the maximum length of a block, given its uncompressed length.
pub fn max_compressed_len(input_len: usize) -> usize {
    32 + input_len + input_len / 6
}

/// Fail if 'len' bytes can't be described by the 32-bit length header.
pub fn check_input_len(len: usize) -> Result<()> {
    if len > MAX_INPUT_LEN {
        return Err(Error::InputTooLarge { len });
    }
    Ok(())
}

/// Read the uncompressed length from the block header. Returns the number of
/// header bytes and the length. The token stream is not inspected.
pub fn decoded_len(input: &[u8]) -> Result<(usize, usize)> {
    let (read, len) = varint::decode(input)?;
    Ok((read, len as usize))
}

/// The destination of a decoded token stream.
pub trait Sink {
    /// Returns the number of bytes produced so far.
    fn produced(&self) -> usize;

    /// Append the bytes of a literal token.
    fn literal(&mut self, bytes: &[u8]);

    /// Append 'len' bytes that start 'offset' bytes before the end of the
    /// output. The caller guarantees 0 < offset <= produced().
    fn back_reference(&mut self, offset: usize, len: usize);
}

/// Writes decoded bytes to the end of a vector. Back-references never reach
/// below 'base', the length of the vector when decoding started.
pub struct VecSink<'a> {
    output: &'a mut Vec<u8>,
    base: usize,
}

impl<'a> VecSink<'a> {
    pub fn new(output: &'a mut Vec<u8>) -> Self {
        let base = output.len();
        Self { output, base }
    }
}

impl<'a> Sink for VecSink<'a> {
    fn produced(&self) -> usize {
        self.output.len() - self.base
    }

    fn literal(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    fn back_reference(&mut self, offset: usize, len: usize) {
        // The source may overlap the bytes that this copy writes, so copy one
        // byte at a time.
        let start = self.output.len() - offset;
        for i in 0..len {
            let b = self.output[start + i];
            self.output.push(b);
        }
    }
}

/// Counts the decoded bytes without storing them. Used for validation.
#[derive(Default)]
pub struct DryRunSink {
    produced: usize,
}

impl Sink for DryRunSink {
    fn produced(&self) -> usize {
        self.produced
    }

    fn literal(&mut self, bytes: &[u8]) {
        self.produced += bytes.len();
    }

    fn back_reference(&mut self, _offset: usize, len: usize) {
        self.produced += len;
    }
}

/// Decode the token stream 'tokens' into 'sink'. The stream must produce
/// exactly 'declared' bytes. Returns the number of bytes produced.
fn decode_tokens<S: Sink>(
    tokens: &[u8],
    declared: usize,
    sink: &mut S,
) -> Result<usize> {
    let mut cursor = 0;
    while cursor < tokens.len() {
        let (token, read) = parse_token(&tokens[cursor..])?;
        cursor += read;

        let produced = sink.produced();
        match token {
            Token::Literal(bytes) => {
                if bytes.len() > declared - produced {
                    return Err(Error::Overrun { declared });
                }
                sink.literal(bytes);
            }
            Token::Copy { offset, len } => {
                if offset == 0 || offset > produced {
                    return Err(Error::InvalidOffset { offset, produced });
                }
                if len > declared - produced {
                    return Err(Error::Overrun { declared });
                }
                sink.back_reference(offset, len);
            }
        }
    }

    let produced = sink.produced();
    if produced != declared {
        return Err(Error::LengthMismatch { declared, produced });
    }
    Ok(produced)
}

/// Parse the header and reject lengths that the token stream can't produce.
/// Returns the header size and the declared length.
fn read_header(input: &[u8]) -> Result<(usize, usize)> {
    let (read, declared) = decoded_len(input)?;
    let available = input.len() - read;
    if declared as u64 * MAX_EXPANSION_DEN > available as u64 * MAX_EXPANSION_NUM
    {
        return Err(Error::ImpossibleLength {
            declared,
            available,
        });
    }
    Ok((read, declared))
}

/// Check that 'input' is a complete and well formed block, without
/// allocating the decoded output.
pub fn validate(input: &[u8]) -> Result<usize> {
    let (read, declared) = read_header(input)?;
    decode_tokens(&input[read..], declared, &mut DryRunSink::default())
}

/// Drives the encoding of a single block.
pub struct BlockEncoder<'a> {
    /// The uncompressed input.
    input: &'a [u8],
    /// The output stream.
    output: &'a mut Vec<u8>,
}

impl<'a> BlockEncoder<'a> {
    fn encode_impl(&mut self) -> Result<usize> {
        check_input_len(self.input.len())?;
        self.output.reserve(max_compressed_len(self.input.len()));

        let mut written = varint::encode(self.input.len() as u32, self.output);

        let mut last_encoded = 0;
        for (lit, mat) in HashMatchFinder::new(self.input) {
            // Emit the pending literals, if there are any.
            if !lit.is_empty() {
                written += emit_literal(&self.input[lit.clone()], self.output);
            }
            last_encoded = lit.end;

            // Don't encode empty matches. These show up at stream ends.
            if mat.is_empty() {
                continue;
            }
            written += emit_copy(lit.end - mat.start, mat.len(), self.output);
            last_encoded += mat.len();
        }
        debug_assert_eq!(last_encoded, self.input.len());

        log::trace!(
            "Encoded block of {} bytes into {} bytes",
            self.input.len(),
            written
        );
        Ok(written)
    }
}

/// Drives the decoding of a single block.
pub struct BlockDecoder<'a> {
    /// The compressed input.
    input: &'a [u8],
    /// The output stream.
    output: &'a mut Vec<u8>,
}

impl<'a> BlockDecoder<'a> {
    fn decode_impl(&mut self) -> Result<(usize, usize)> {
        let (read, declared) = read_header(self.input)?;

        // Size the output up front, and drop partial output on failure.
        let start = self.output.len();
        self.output.reserve(declared);
        let res = decode_tokens(
            &self.input[read..],
            declared,
            &mut VecSink::new(self.output),
        );

        match res {
            Ok(written) => {
                log::trace!(
                    "Decoded block of {} bytes into {} bytes",
                    self.input.len(),
                    written
                );
                Ok((self.input.len(), written))
            }
            Err(err) => {
                self.output.truncate(start);
                Err(err)
            }
        }
    }
}

impl<'a> Encoder<'a> for BlockEncoder<'a> {
    fn new(input: &'a [u8], output: &'a mut Vec<u8>) -> Self {
        BlockEncoder { input, output }
    }

    fn encode(&mut self) -> Result<usize> {
        self.encode_impl()
    }
}

impl<'a> Decoder<'a> for BlockDecoder<'a> {
    fn new(input: &'a [u8], output: &'a mut Vec<u8>) -> Self {
        BlockDecoder { input, output }
    }

    fn decode(&mut self) -> Result<(usize, usize)> {
        self.decode_impl()
    }
}

#[test]
fn test_impossible_length_is_rejected_early() {
    // Claims 4 GiB from a two byte token stream.
    let input = [0xff, 0xff, 0xff, 0xff, 0x0f, 0x00, b'a'];
    let mut output = Vec::new();
    let res = BlockDecoder::new(&input, &mut output).decode();
    assert!(matches!(res, Err(Error::ImpossibleLength { .. })));
    assert_eq!(output.capacity(), 0);
}
