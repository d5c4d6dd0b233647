//! Error type for facade operations.

use std::fmt;

/// Result type for facade operations that surface structured errors.
pub type DemoResult<T> = Result<T, DemoError>;

/// Errors crossing the facade boundary.
///
/// The public `open`/`save` entry points translate these to `bool` per
/// their contract; everything else stays structured.
#[derive(Debug, Clone, PartialEq)]
pub enum DemoError {
    /// Framing or payload-compression failure.
    Wire(wire::WireError),
    /// Instruction or delta codec failure.
    Codec(codec::CodecError),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Codec(e) => write!(f, "codec error: {e}"),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Codec(e) => Some(e),
        }
    }
}

impl From<wire::WireError> for DemoError {
    fn from(err: wire::WireError) -> Self {
        Self::Wire(err)
    }
}

impl From<codec::CodecError> for DemoError {
    fn from(err: codec::CodecError) -> Self {
        Self::Codec(err)
    }
}
