//! Streaming symbol codec over the adaptive tree.

use crate::error::{HuffError, HuffResult};
use crate::tree::{Tree, INTERNAL, NYT};

/// Sink for individual bits, least-significant-bit first within each byte.
pub trait BitWrite {
    /// Appends one bit.
    fn put_bit(&mut self, bit: bool);
}

/// Source of individual bits, least-significant-bit first within each byte.
pub trait BitRead {
    /// Returns the next bit, or `None` at the end of input.
    fn get_bit(&mut self) -> Option<bool>;

    /// Current absolute bit offset, for error reporting.
    fn bit_position(&self) -> usize;
}

/// Growable LSB-first bit sink backed by a byte vector.
#[derive(Debug, Default)]
pub struct VecSink {
    bytes: Vec<u8>,
    bit_count: u8,
}

impl VecSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pads the final partial byte with zero bits and returns the buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of bits written so far.
    #[must_use]
    pub fn bits_written(&self) -> usize {
        if self.bit_count == 0 {
            self.bytes.len() * 8
        } else {
            (self.bytes.len() - 1) * 8 + self.bit_count as usize
        }
    }
}

impl BitWrite for VecSink {
    fn put_bit(&mut self, bit: bool) {
        if self.bit_count == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << self.bit_count;
        }
        self.bit_count = (self.bit_count + 1) % 8;
    }
}

/// LSB-first bit source over a borrowed slice.
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a source over `data`, starting at bit zero.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }
}

impl BitRead for SliceSource<'_> {
    fn get_bit(&mut self) -> Option<bool> {
        let byte = self.bit_pos / 8;
        if byte >= self.data.len() {
            return None;
        }
        let bit = (self.data[byte] >> (self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Some(bit == 1)
    }

    fn bit_position(&self) -> usize {
        self.bit_pos
    }
}

/// Adaptive Huffman codec holding one tree per direction.
///
/// The encoder- and decoder-direction trees are independent: feeding the
/// same symbol sequence through both leaves them in identical states. A
/// codec is not shareable across threads; each demo owns its own.
#[derive(Debug)]
pub struct Codec {
    encode: Tree,
    decode: Tree,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Creates a codec with both trees in the single-NYT initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            encode: Tree::new(),
            decode: Tree::new(),
        }
    }

    /// Resets both directions to the initial state.
    pub fn reset(&mut self) {
        self.encode.reset();
        self.decode.reset();
    }

    /// Encodes one symbol into `sink` and updates the encoder tree.
    ///
    /// An unseen symbol is sent as the NYT path followed by its raw 8 bits
    /// (LSB first).
    ///
    /// # Errors
    ///
    /// Returns [`HuffError::PoolExhausted`] if the tree update cannot
    /// allocate (a defect, not an input condition).
    pub fn send_symbol(&mut self, symbol: u8, sink: &mut impl BitWrite) -> HuffResult<()> {
        let mut path = Vec::new();
        match self.encode.leaf_for(u16::from(symbol)) {
            Some(leaf) => {
                self.encode.path_to(leaf, &mut path);
                for bit in &path {
                    sink.put_bit(*bit);
                }
            }
            None => {
                if let Some(nyt) = self.encode.leaf_for(NYT) {
                    self.encode.path_to(nyt, &mut path);
                }
                for bit in &path {
                    sink.put_bit(*bit);
                }
                for i in 0..8 {
                    sink.put_bit((symbol >> i) & 1 == 1);
                }
            }
        }
        self.encode.add_ref(u16::from(symbol))
    }

    /// Decodes one symbol from `source` and updates the decoder tree.
    ///
    /// Returns `Ok(None)` when the input ends cleanly between symbols
    /// (including mid-path on the zero padding of a flushed stream).
    ///
    /// # Errors
    ///
    /// Returns [`HuffError::InvalidStream`] if navigation reaches a missing
    /// child, or [`HuffError::TruncatedSymbol`] if the input ends inside
    /// the raw byte of an NYT escape after at least one raw bit was read.
    pub fn recv_symbol(&mut self, source: &mut impl BitRead) -> HuffResult<Option<u8>> {
        let mut node = match self.decode.root() {
            Some(root) => root,
            None => return Err(HuffError::InvalidStream { bit_position: 0 }),
        };

        while !self.decode.is_leaf(node) {
            let bit = match source.get_bit() {
                Some(bit) => bit,
                None => return Ok(None),
            };
            node = match self.decode.child(node, bit) {
                Some(child) => child,
                None => {
                    return Err(HuffError::InvalidStream {
                        bit_position: source.bit_position(),
                    })
                }
            };
        }

        let symbol = match self.decode.symbol_of(node) {
            NYT => {
                let start = source.bit_position();
                let mut value = 0u8;
                for i in 0..8 {
                    match source.get_bit() {
                        Some(true) => value |= 1 << i,
                        Some(false) => {}
                        None if i == 0 => return Ok(None),
                        None => {
                            return Err(HuffError::TruncatedSymbol {
                                bit_position: start,
                            })
                        }
                    }
                }
                value
            }
            INTERNAL => {
                return Err(HuffError::InvalidStream {
                    bit_position: source.bit_position(),
                })
            }
            sym => sym as u8,
        };

        self.decode.add_ref(u16::from(symbol))?;
        Ok(Some(symbol))
    }

    /// Compresses a whole buffer through the encoder tree.
    ///
    /// # Errors
    ///
    /// Propagates tree update failures; see [`Codec::send_symbol`].
    pub fn compress(&mut self, input: &[u8]) -> HuffResult<Vec<u8>> {
        let mut sink = VecSink::new();
        for &byte in input {
            self.send_symbol(byte, &mut sink)?;
        }
        Ok(sink.finish())
    }

    /// Decompresses up to `max_symbols` symbols through the decoder tree.
    ///
    /// Decoding stops early when the input bits are exhausted; the outer
    /// framing supplies the expected symbol count, so trailing pad bits
    /// never produce an error here.
    ///
    /// # Errors
    ///
    /// Returns [`HuffError::InvalidStream`] for corrupt navigation.
    pub fn decompress(&mut self, input: &[u8], max_symbols: usize) -> HuffResult<Vec<u8>> {
        let mut source = SliceSource::new(input);
        let mut out = Vec::new();
        while out.len() < max_symbols {
            match self.recv_symbol(&mut source)? {
                Some(symbol) => out.push(symbol),
                None => break,
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let mut codec = Codec::new();
        let packed = codec.compress(data).unwrap();
        codec.decompress(&packed, data.len()).unwrap()
    }

    #[test]
    fn empty_roundtrip() {
        assert_eq!(roundtrip(&[]), Vec::<u8>::new());
    }

    #[test]
    fn single_byte_roundtrip() {
        assert_eq!(roundtrip(&[0x42]), vec![0x42]);
    }

    #[test]
    fn first_symbol_is_raw_escape() {
        let mut codec = Codec::new();
        let packed = codec.compress(&[0xA5]).unwrap();
        // Root is the NYT, so the path is empty and only the raw 8 bits
        // appear, LSB first.
        assert_eq!(packed, vec![0xA5]);
    }

    #[test]
    fn repeated_bytes_compress() {
        let data = vec![7u8; 1000];
        let mut codec = Codec::new();
        let packed = codec.compress(&data).unwrap();
        assert!(packed.len() < data.len() / 4, "got {} bytes", packed.len());
        assert_eq!(codec.decompress(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn all_byte_values_roundtrip() {
        let data: Vec<u8> = (0..=255u8).collect();
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn mixed_stream_roundtrip() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn decompress_respects_symbol_cap() {
        let mut codec = Codec::new();
        let packed = codec.compress(&[1, 2, 3, 4]).unwrap();
        let out = codec.decompress(&packed, 2).unwrap();
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn streaming_and_bulk_agree() {
        let data = b"abracadabra abracadabra";
        let mut bulk = Codec::new();
        let packed_bulk = bulk.compress(data).unwrap();

        let mut streaming = Codec::new();
        let mut sink = VecSink::new();
        for &byte in data.iter() {
            streaming.send_symbol(byte, &mut sink).unwrap();
        }
        assert_eq!(sink.finish(), packed_bulk);
    }

    #[test]
    fn encoder_and_decoder_trees_stay_in_lockstep() {
        // Encoding then decoding the same stream must leave both directions
        // able to continue: interleave per-symbol traffic.
        let mut left = Codec::new();
        let mut right = Codec::new();
        let data = b"the quick brown fox jumps over the lazy dog";

        for &byte in data.iter() {
            let mut sink = VecSink::new();
            left.send_symbol(byte, &mut sink).unwrap();
            let bytes = sink.finish();
            let mut source = SliceSource::new(&bytes);
            let got = right.recv_symbol(&mut source).unwrap();
            assert_eq!(got, Some(byte));
        }
    }

    #[test]
    fn reset_gives_fresh_streams() {
        let mut codec = Codec::new();
        let first = codec.compress(b"hello").unwrap();
        codec.reset();
        let second = codec.compress(b"hello").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn vec_sink_pads_with_zeros() {
        let mut sink = VecSink::new();
        sink.put_bit(true);
        sink.put_bit(true);
        assert_eq!(sink.bits_written(), 2);
        assert_eq!(sink.finish(), vec![0b0000_0011]);
    }

    #[test]
    fn slice_source_reads_lsb_first() {
        let data = [0b0000_0101u8];
        let mut source = SliceSource::new(&data);
        assert_eq!(source.get_bit(), Some(true));
        assert_eq!(source.get_bit(), Some(false));
        assert_eq!(source.get_bit(), Some(true));
        assert_eq!(source.bit_position(), 3);
    }
}
