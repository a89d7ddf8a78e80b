//! A fast, single-pass block compressor that reads and writes the Snappy raw
//! block format.
//!
//! ```
//! let data = b"hello hello hello hello hello";
//! let compressed = snapcodec::compress(data).unwrap();
//! assert_eq!(snapcodec::uncompressed_length(&compressed).unwrap(), data.len());
//! assert_eq!(snapcodec::uncompress(&compressed).unwrap(), data);
//! ```

pub mod api;
pub mod block;
pub mod error;
pub mod lz;
pub mod text;
pub mod utils;
pub mod worker;

pub use api::{
    compress, decompress, is_valid_compressed, max_compressed_len, uncompress,
    uncompressed_length,
};
pub use error::{Error, Result};
pub use text::{compress_str, decompress_str, uncompress_str, TextEncoding};

/// A trait that defines the interface for encoding buffers.
pub trait Encoder<'a> {
    /// Creates a new Encoder that reads from 'input' and writes into 'output'.
    fn new(input: &'a [u8], output: &'a mut Vec<u8>) -> Self;

    /// Encode the whole input buffer and return the number of bytes that were
    /// written into the output stream.
    fn encode(&mut self) -> Result<usize>;
}

/// A trait that defines the interface for decoding buffers.
pub trait Decoder<'a> {
    /// Creates a new Decoder that reads from 'input' and writes into 'output'.
    fn new(input: &'a [u8], output: &'a mut Vec<u8>) -> Self;

    /// Try to decode the buffer 'input', and return the number of input bytes
    /// that were consumed followed by the number of bytes written. Nothing is
    /// written to 'output' if the input is invalid.
    fn decode(&mut self) -> Result<(usize, usize)>;
}
