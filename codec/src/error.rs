//! Error types for message decoding and delta application.

use std::fmt;

use bitstream::BitError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding or re-encoding demo messages.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Bit-level read or write failed.
    Bit(BitError),

    /// Unknown or `Bad` opcode encountered during message decode.
    InvalidOpcode {
        /// The offending opcode byte.
        opcode: u8,
    },

    /// A mod-extended field was rejected in strict mode.
    InvalidField {
        /// Canonical name of the unrecognized field.
        name: String,
    },

    /// A delta snapshot references a baseline that has been evicted or
    /// was never decoded.
    DeltaUnresolved {
        /// Index of the message being resolved.
        message_index: usize,
        /// Index of the missing baseline message.
        referenced: usize,
    },

    /// Structural impossibility in the stream.
    ProtocolViolation(Violation),
}

/// The concrete shape of a protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Entity number outside `0..1024`.
    EntityNumber {
        /// The offending number.
        number: u32,
    },

    /// Area mask longer than the 32-byte maximum.
    AreaMaskLength {
        /// The declared length.
        len: usize,
    },

    /// Configuration string index outside `0..1700`.
    ConfigStringIndex {
        /// The offending index.
        index: u32,
    },

    /// Client number at or above the client slot count.
    ClientNumber {
        /// The offending client number.
        client: u32,
    },

    /// A delta offset pointing before the first message.
    DeltaBeforeStart {
        /// Index of the message being resolved.
        message_index: usize,
        /// The backward offset that underflowed.
        offset: u8,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityNumber { number } => write!(f, "entity number {number} out of range"),
            Self::AreaMaskLength { len } => write!(f, "area mask of {len} bytes exceeds 32"),
            Self::ConfigStringIndex { index } => {
                write!(f, "configstring index {index} out of range")
            }
            Self::ClientNumber { client } => write!(f, "client number {client} out of range"),
            Self::DeltaBeforeStart {
                message_index,
                offset,
            } => write!(
                f,
                "message {message_index} delta offset {offset} points before the stream start"
            ),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(e) => write!(f, "bit buffer error: {e}"),
            Self::InvalidOpcode { opcode } => write!(f, "invalid opcode {opcode}"),
            Self::InvalidField { name } => write!(f, "unrecognized field {name:?} in strict mode"),
            Self::DeltaUnresolved {
                message_index,
                referenced,
            } => write!(
                f,
                "message {message_index} deltas against unavailable message {referenced}"
            ),
            Self::ProtocolViolation(v) => write!(f, "protocol violation: {v}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BitError> for CodecError {
    fn from(err: BitError) -> Self {
        Self::Bit(err)
    }
}

impl From<Violation> for CodecError {
    fn from(v: Violation) -> Self {
        Self::ProtocolViolation(v)
    }
}
