//! Bit-level reader for decoded message payloads.

use crate::error::{BitError, BitResult};

/// A bounded bit-level reader, least-significant-bit first within bytes.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug)]
pub struct BitReader<'a> {
    /// The underlying byte buffer.
    data: &'a [u8],
    /// Current bit position (0 = LSB of first byte).
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` over a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Reads a single bit as a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underflow`] if no bits remain.
    pub fn read_bool(&mut self) -> BitResult<bool> {
        if self.bits_remaining() == 0 {
            return Err(BitError::Underflow {
                requested: 1,
                available: 0,
            });
        }
        let byte_idx = self.bit_pos / 8;
        let bit_idx = self.bit_pos % 8;
        let bit = (self.data[byte_idx] >> bit_idx) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 32 bits as an unsigned integer, LSB first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits` is 0 or above 32.
    /// Returns [`BitError::Underflow`] if insufficient bits remain.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u32> {
        if bits == 0 || bits > 32 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 32 });
        }
        if usize::from(bits) > self.bits_remaining() {
            return Err(BitError::Underflow {
                requested: usize::from(bits),
                available: self.bits_remaining(),
            });
        }

        let mut value = 0u32;
        for i in 0..bits {
            if self.read_bool()? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    /// Reads a signed integer of the given width, sign-extending from the
    /// top bit of the field.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`BitReader::read_bits`].
    pub fn read_signed(&mut self, bits: u8) -> BitResult<i32> {
        let raw = self.read_bits(bits)?;
        if bits == 32 {
            return Ok(raw as i32);
        }
        let sign = 1u32 << (bits - 1);
        if raw & sign != 0 {
            Ok((raw | !(sign | (sign - 1))) as i32)
        } else {
            Ok(raw as i32)
        }
    }

    /// Reads an 8-bit unsigned value.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underflow`] if fewer than 8 bits remain.
    pub fn read_byte(&mut self) -> BitResult<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Reads a 16-bit little-endian unsigned value.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underflow`] if fewer than 16 bits remain.
    pub fn read_short(&mut self) -> BitResult<u16> {
        Ok(self.read_bits(16)? as u16)
    }

    /// Reads a 32-bit little-endian signed value.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underflow`] if fewer than 32 bits remain.
    pub fn read_long(&mut self) -> BitResult<i32> {
        Ok(self.read_bits(32)? as i32)
    }

    /// Reads a 32-bit IEEE-754 float.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underflow`] if fewer than 32 bits remain.
    pub fn read_float(&mut self) -> BitResult<f32> {
        Ok(f32::from_bits(self.read_bits(32)?))
    }

    /// Reads `len` raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underflow`] if insufficient bits remain.
    pub fn read_data(&mut self, len: usize) -> BitResult<Vec<u8>> {
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.read_byte()?);
        }
        Ok(out)
    }

    /// Reads a NUL-terminated string of at most `max_len` bytes.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected, matching
    /// the tolerant handling of legacy demo strings.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::StringTooLong`] if no terminator appears within
    /// `max_len` bytes, or [`BitError::Underflow`] if the buffer ends first.
    pub fn read_string(&mut self, max_len: usize) -> BitResult<String> {
        let mut bytes = Vec::new();
        loop {
            let byte = self.read_byte()?;
            if byte == 0 {
                break;
            }
            if bytes.len() >= max_len {
                return Err(BitError::StringTooLong { limit: max_len });
            }
            bytes.push(byte);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads one byte tunneled through the supplied adaptive Huffman codec.
    ///
    /// The caller must use the same codec instance in the same direction
    /// for every tunneled byte of a message.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underflow`] if the stream ends mid-symbol, or
    /// [`BitError::Huffman`] if the tunneled stream is corrupt.
    pub fn read_huff_byte(&mut self, codec: &mut huffman::Codec) -> BitResult<u8> {
        let available = self.bits_remaining();
        match codec.recv_symbol(self)? {
            Some(byte) => Ok(byte),
            None => Err(BitError::Underflow {
                requested: 1,
                available,
            }),
        }
    }
}

impl huffman::BitRead for BitReader<'_> {
    fn get_bit(&mut self) -> Option<bool> {
        self.read_bool().ok()
    }

    fn bit_position(&self) -> usize {
        self.bit_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reader() {
        let reader = BitReader::new(&[]);
        assert!(reader.is_empty());
        assert_eq!(reader.bits_remaining(), 0);
        assert_eq!(reader.bit_position(), 0);
    }

    #[test]
    fn read_from_empty_fails() {
        let mut reader = BitReader::new(&[]);
        assert!(matches!(
            reader.read_bool(),
            Err(BitError::Underflow {
                requested: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn read_bool_lsb_first() {
        let mut reader = BitReader::new(&[0b0000_0001]);
        assert!(reader.read_bool().unwrap());
        assert!(!reader.read_bool().unwrap());
        assert_eq!(reader.bit_position(), 2);
    }

    #[test]
    fn read_bits_partial_byte() {
        let mut reader = BitReader::new(&[0b1100_1010]);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
        assert!(reader.is_empty());
    }

    #[test]
    fn read_bits_across_bytes() {
        let mut reader = BitReader::new(&[0x34, 0x12]);
        assert_eq!(reader.read_bits(16).unwrap(), 0x1234);
    }

    #[test]
    fn read_bits_invalid_count() {
        let mut reader = BitReader::new(&[0xFF; 8]);
        assert!(matches!(
            reader.read_bits(33),
            Err(BitError::InvalidBitCount {
                bits: 33,
                max_bits: 32
            })
        ));
        assert!(matches!(
            reader.read_bits(0),
            Err(BitError::InvalidBitCount { bits: 0, .. })
        ));
    }

    #[test]
    fn read_bits_underflow_reports_counts() {
        let mut reader = BitReader::new(&[0xFF]);
        assert!(matches!(
            reader.read_bits(16),
            Err(BitError::Underflow {
                requested: 16,
                available: 8
            })
        ));
    }

    #[test]
    fn read_signed_sign_extends() {
        // -1 in 4 bits is 0b1111.
        let mut reader = BitReader::new(&[0b0000_1111]);
        assert_eq!(reader.read_signed(4).unwrap(), -1);
    }

    #[test]
    fn read_signed_positive() {
        let mut reader = BitReader::new(&[0b0000_0111]);
        assert_eq!(reader.read_signed(4).unwrap(), 7);
    }

    #[test]
    fn read_signed_all_widths() {
        for bits in 1..=32u8 {
            // The most negative value of the width: only the sign bit set.
            let value: u32 = 1 << (bits - 1);
            let bytes = value.to_le_bytes();
            let mut reader = BitReader::new(&bytes);
            let expected = if bits == 32 {
                i32::MIN
            } else {
                -(1i64 << (bits - 1)) as i32
            };
            assert_eq!(reader.read_signed(bits).unwrap(), expected, "width {bits}");
        }
    }

    #[test]
    fn read_long_little_endian() {
        let mut reader = BitReader::new(&[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(reader.read_long().unwrap(), 0x1234_5678);
    }

    #[test]
    fn read_short_little_endian() {
        let mut reader = BitReader::new(&[0xCD, 0xAB]);
        assert_eq!(reader.read_short().unwrap(), 0xABCD);
    }

    #[test]
    fn read_float_bits() {
        let bits = 1.5f32.to_bits().to_le_bytes();
        let mut reader = BitReader::new(&bits);
        assert_eq!(reader.read_float().unwrap(), 1.5);
    }

    #[test]
    fn read_string_terminated() {
        let mut reader = BitReader::new(b"map_restart\0rest");
        assert_eq!(reader.read_string(1024).unwrap(), "map_restart");
        assert_eq!(reader.read_byte().unwrap(), b'r');
    }

    #[test]
    fn read_string_too_long() {
        let mut reader = BitReader::new(b"abcdef\0");
        assert!(matches!(
            reader.read_string(3),
            Err(BitError::StringTooLong { limit: 3 })
        ));
    }

    #[test]
    fn read_string_unterminated_underflows() {
        let mut reader = BitReader::new(b"abc");
        assert!(matches!(
            reader.read_string(1024),
            Err(BitError::Underflow { .. })
        ));
    }

    #[test]
    fn read_data_bytes() {
        let mut reader = BitReader::new(&[1, 2, 3, 4]);
        assert_eq!(reader.read_data(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(reader.bits_remaining(), 8);
    }

    #[test]
    fn read_huff_byte_roundtrips_with_writer() {
        let mut encode = huffman::Codec::new();
        let mut sink = huffman::VecSink::new();
        encode.send_symbol(0x5A, &mut sink).unwrap();
        encode.send_symbol(0x5A, &mut sink).unwrap();
        let bytes = sink.finish();

        let mut decode = huffman::Codec::new();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_huff_byte(&mut decode).unwrap(), 0x5A);
        assert_eq!(reader.read_huff_byte(&mut decode).unwrap(), 0x5A);
    }
}
