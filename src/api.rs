//! The buffer-to-buffer entry points of the crate.

use crate::block::{self, BlockDecoder, BlockEncoder};
use crate::error::Result;
use crate::{Decoder, Encoder};

/// Compress 'input' into a new block. Fails only if the input is larger than
/// the 32-bit length header allows.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    let mut compressed = Vec::new();
    BlockEncoder::new(input, &mut compressed).encode()?;
    Ok(compressed)
}

/// Decompress a block that was created by 'compress'. Fails if the block is
/// malformed in any way.
pub fn uncompress(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    BlockDecoder::new(compressed, &mut decompressed).decode()?;
    Ok(decompressed)
}

/// Another name for 'uncompress'.
pub use self::uncompress as decompress;

/// Returns the uncompressed length that the block header declares, without
/// decoding the tokens.
pub fn uncompressed_length(compressed: &[u8]) -> Result<usize> {
    let (_, len) = block::decoded_len(compressed)?;
    Ok(len)
}

/// Returns true if 'compressed' decodes cleanly. The output is not stored.
pub fn is_valid_compressed(compressed: &[u8]) -> bool {
    block::validate(compressed).is_ok()
}

pub use crate::block::max_compressed_len;
