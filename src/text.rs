//! Convenience wrappers that compress text. The text is turned into bytes with
//! a caller-selected encoding before compression, and decoded with the same
//! encoding after decompression.

use std::fmt;
use std::str::FromStr;

use crate::api::{compress, uncompress};
use crate::error::{Error, Result};

/// The supported text encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// Two bytes per UTF-16 code unit, little-endian.
    Utf16Le,
    /// One byte per char, for chars up to U+00FF.
    Latin1,
    /// One byte per char, for chars up to U+007F.
    Ascii,
    /// Two hex digits per byte.
    Hex,
}

impl TextEncoding {
    fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Utf16Le => "utf16le",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Hex => "hex",
        }
    }

    /// Convert 'text' to bytes.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let err = || Error::TextEncoding(self.name());
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Utf16Le => {
                Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect())
            }
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(c).map_err(|_| err()))
                .collect(),
            TextEncoding::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { Ok(c as u8) } else { Err(err()) })
                .collect(),
            TextEncoding::Hex => {
                let digits = text.as_bytes();
                if digits.len() % 2 != 0 {
                    return Err(err());
                }
                digits
                    .chunks(2)
                    .map(|pair| -> Result<u8> {
                        let hi = hex_value(pair[0]).ok_or_else(err)?;
                        let lo = hex_value(pair[1]).ok_or_else(err)?;
                        Ok(hi << 4 | lo)
                    })
                    .collect()
            }
        }
    }

    /// Convert 'bytes' back to text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let err = || Error::TextEncoding(self.name());
        match self {
            TextEncoding::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|_| err())
            }
            TextEncoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(err());
                }
                let units = bytes
                    .chunks(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .map(|c| c.map_err(|_| err()))
                    .collect()
            }
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { Ok(b as char) } else { Err(err()) })
                .collect(),
            TextEncoding::Hex => {
                Ok(bytes.iter().map(|b| format!("{:02x}", b)).collect())
            }
        }
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|v| v as u8)
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => {
                Ok(TextEncoding::Utf16Le)
            }
            "latin1" | "binary" => Ok(TextEncoding::Latin1),
            "ascii" => Ok(TextEncoding::Ascii),
            "hex" => Ok(TextEncoding::Hex),
            _ => Err(Error::InputType(format!("unknown text encoding '{}'", name))),
        }
    }
}

/// Encode 'text' with 'encoding' and compress the bytes.
pub fn compress_str(text: &str, encoding: TextEncoding) -> Result<Vec<u8>> {
    compress(&encoding.encode(text)?)
}

/// Decompress 'compressed' and decode the bytes as text with 'encoding'.
pub fn uncompress_str(compressed: &[u8], encoding: TextEncoding) -> Result<String> {
    encoding.decode(&uncompress(compressed)?)
}

/// Another name for 'uncompress_str'.
pub use self::uncompress_str as decompress_str;
