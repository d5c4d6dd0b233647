//! Adaptive Huffman coding for demo message payloads.
//!
//! This crate implements the order-0 adaptive Huffman code (FGK) used to
//! wrap every message payload in a dm_26 demo: 256 byte symbols plus an
//! NYT escape, bits packed least-significant-first within each output
//! byte, and an online tree update applied identically by encoder and
//! decoder.
//!
//! # Design Principles
//!
//! - **No unsafe code** - The tree is an index-linked pool, not pointers.
//! - **Fixed memory** - Node and head-slot pools never grow past their
//!   initial capacity; `reset` reuses them.
//! - **Explicit errors** - Corrupt streams return structured errors, never
//!   panic.
//!
//! # Example
//!
//! ```
//! use huffman::Codec;
//!
//! let mut codec = Codec::new();
//! let packed = codec.compress(b"payload payload payload").unwrap();
//! let plain = codec.decompress(&packed, 23).unwrap();
//! assert_eq!(plain, b"payload payload payload");
//! ```

mod codec;
mod error;
mod tree;

pub use codec::{BitRead, BitWrite, Codec, SliceSource, VecSink};
pub use error::{HuffError, HuffResult};
