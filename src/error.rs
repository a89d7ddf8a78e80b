//! The error type shared by the encoder, the decoder and the public API.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Encode errors
    #[error("Input of {len} bytes exceeds the 4 GiB block limit")]
    InputTooLarge { len: usize },

    // Malformed input
    #[error("Malformed length header")]
    BadVarint,

    #[error("Truncated {0}")]
    Truncated(&'static str),

    #[error("Copy offset {offset} is outside the {produced} bytes produced so far")]
    InvalidOffset { offset: usize, produced: usize },

    #[error("Token writes past the declared length of {declared} bytes")]
    Overrun { declared: usize },

    #[error("Header declares {declared} bytes but the block produced {produced}")]
    LengthMismatch { declared: usize, produced: usize },

    #[error("Header declares {declared} bytes, more than {available} token bytes can produce")]
    ImpossibleLength { declared: usize, available: usize },

    // API boundary errors
    #[error("Decoded bytes are not valid {0}")]
    TextEncoding(&'static str),

    #[error("Unsupported argument: {0}")]
    InputType(String),

    #[error("Background worker exited before finishing the job")]
    WorkerGone,
}

impl Error {
    /// Returns true for the errors that describe a structurally invalid
    /// compressed block.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::BadVarint
                | Error::Truncated(_)
                | Error::InvalidOffset { .. }
                | Error::Overrun { .. }
                | Error::LengthMismatch { .. }
                | Error::ImpossibleLength { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
