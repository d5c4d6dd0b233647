//! Error types for bit-level message buffers.

use std::fmt;

use huffman::HuffError;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitError {
    /// Attempted to read past the end of the buffer.
    Underflow {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// Attempted to write more bits than the buffer's fixed capacity.
    Overflow {
        /// Number of bits attempted to write.
        attempted: usize,
        /// Capacity of the buffer, in bits.
        capacity: usize,
    },

    /// Invalid bit count for the operation.
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u8,
        /// Maximum allowed bits for this operation.
        max_bits: u8,
    },

    /// Value exceeds the range representable by the field width.
    ValueOutOfRange {
        /// The value that was out of range, widened for reporting.
        value: i64,
        /// Width of the field in bits.
        bits: u8,
    },

    /// A string field exceeded its bounded maximum length.
    StringTooLong {
        /// Maximum permitted length in bytes, excluding the terminator.
        limit: usize,
    },

    /// The tunneled Huffman stream was corrupt.
    Huffman(HuffError),
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underflow {
                requested,
                available,
            } => {
                write!(
                    f,
                    "buffer underflow: requested {requested} bits, {available} available"
                )
            }
            Self::Overflow {
                attempted,
                capacity,
            } => {
                write!(
                    f,
                    "buffer overflow: attempted {attempted} bits, capacity {capacity}"
                )
            }
            Self::InvalidBitCount { bits, max_bits } => {
                write!(f, "invalid bit count {bits}, maximum allowed is {max_bits}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} cannot be represented in {bits} bits")
            }
            Self::StringTooLong { limit } => {
                write!(f, "string exceeds the {limit}-byte limit")
            }
            Self::Huffman(e) => write!(f, "huffman stream error: {e}"),
        }
    }
}

impl std::error::Error for BitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Huffman(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HuffError> for BitError {
    fn from(err: HuffError) -> Self {
        Self::Huffman(err)
    }
}
