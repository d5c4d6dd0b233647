//! On-disk framing for dm_26 demo files.
//!
//! This crate reads and writes the outermost layer of a demo: the
//! sequence/length-prefixed message frames, the `-1` end sentinels, and
//! the adaptive-Huffman wrap around each message payload. It knows
//! nothing about instructions or snapshots; the payloads it produces
//! and consumes are opaque byte runs for the codec layer.
//!
//! # Design Principles
//!
//! - **Frames are opaque** - No instruction knowledge here.
//! - **Byte fidelity** - Reading a frame and writing it back reproduces
//!   the input exactly; re-compression is only for newly built payloads.
//! - **Explicit errors** - Truncation and impossible lengths are
//!   structured errors, never panics.

mod error;
mod frame;

pub use error::{WireError, WireResult};
pub use frame::{
    decode_payload, encode_payload, read_frame, write_end, write_frame, MessageFrame,
    MAX_WIRE_PAYLOAD, SENTINEL,
};
