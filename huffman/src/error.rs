//! Error types for the adaptive Huffman codec.

use std::fmt;

/// Result type for Huffman operations.
pub type HuffResult<T> = Result<T, HuffError>;

/// Errors that can occur while encoding or decoding a Huffman stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffError {
    /// Tree navigation reached a missing child or an internal node
    /// presented itself as a symbol.
    InvalidStream {
        /// Bit offset at which navigation failed.
        bit_position: usize,
    },

    /// The fixed node pool ran out during a split.
    ///
    /// Cannot happen for well-formed streams; kept as a defect trap.
    PoolExhausted,

    /// The input ended before a full raw symbol could be read after an
    /// NYT escape.
    TruncatedSymbol {
        /// Bit offset at which the raw byte started.
        bit_position: usize,
    },
}

impl fmt::Display for HuffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStream { bit_position } => {
                write!(f, "invalid huffman stream at bit {bit_position}")
            }
            Self::PoolExhausted => write!(f, "huffman node pool exhausted"),
            Self::TruncatedSymbol { bit_position } => {
                write!(f, "truncated raw symbol at bit {bit_position}")
            }
        }
    }
}

impl std::error::Error for HuffError {}
