//! Bit-level message buffers for the dm_26 demo codec.
//!
//! This crate provides the bounded [`BitWriter`] and [`BitReader`] used to
//! build and parse decoded message payloads: unsigned and sign-extended
//! integer fields of arbitrary width up to 32 bits, little-endian typed
//! fields, NUL-terminated bounded strings, and single bytes tunneled
//! through a shared adaptive Huffman codec.
//!
//! Bits are packed least-significant-bit first within each byte; the
//! Huffman layer and every delta payload share that bit order.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about entities,
//!   snapshots, or field tables.
//! - **Explicit errors** - All failures return structured errors, never
//!   panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::with_capacity(8);
//! writer.write_bool(true).unwrap();
//! writer.write_bits(42, 7).unwrap();
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bool().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;
