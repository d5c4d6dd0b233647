//! Error types for demo file framing.

use std::fmt;
use std::io;

use huffman::HuffError;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while framing or unframing demo messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The byte source or sink failed, or the stream was truncated.
    Io {
        /// The underlying error kind.
        kind: io::ErrorKind,
    },

    /// A frame declared an impossible payload length.
    BadLength {
        /// The declared length.
        length: i32,
    },

    /// The message payload's Huffman stream was corrupt.
    Huffman(HuffError),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { kind } => write!(f, "io error: {kind}"),
            Self::BadLength { length } => write!(f, "bad frame length {length}"),
            Self::Huffman(e) => write!(f, "huffman error: {e}"),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Huffman(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        Self::Io { kind: err.kind() }
    }
}

impl From<HuffError> for WireError {
    fn from(err: HuffError) -> Self {
        Self::Huffman(err)
    }
}
