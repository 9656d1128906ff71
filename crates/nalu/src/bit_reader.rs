//! Emulation-aware bit cursor over a NAL unit.
//!
//! ISO/IEC 14496-10 - 7.2 / ISO/IEC 23008-2 - 7.2

use crate::{NaluError, Result};

/// The mutable part of a [`NaluBitReader`].
///
/// Lookahead reads copy this before reading and put it back afterwards, so
/// comparing two states tells whether the cursor moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    byte_position: usize,
    bit_position: u8,
    zero_count: u8,
    current_byte: u8,
}

impl CursorState {
    /// Index of the byte currently being read, emulation prevention bytes included.
    pub const fn byte_position(&self) -> usize {
        self.byte_position
    }

    /// Index of the next bit within the current byte, from 7 (most significant) down to 0.
    pub const fn bit_position(&self) -> u8 {
        self.bit_position
    }

    /// Number of consecutive zero bytes ending at the current byte.
    pub const fn zero_count(&self) -> u8 {
        self.zero_count
    }
}

/// A bit cursor over a single NAL unit.
///
/// Bits are read most significant first. Emulation prevention bytes
/// (`0x03` after two zero bytes) are skipped while reading, so the cursor
/// can be created straight from the output of the Annex B splitter.
///
/// The last set bit of the buffer is the `rbsp_stop_one_bit`. It and every
/// bit after it are not part of the payload and cannot be read.
#[derive(Debug, Clone)]
pub struct NaluBitReader<'a> {
    data: &'a [u8],
    state: CursorState,
    stop_byte: usize,
    stop_bit: u8,
}

impl<'a> NaluBitReader<'a> {
    /// Creates a new cursor, locating the stop bit by scanning `data` backwards.
    ///
    /// Fails with [`NaluError::StopBitNotFound`] when every byte is zero.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let stop_byte = data.iter().rposition(|&byte| byte != 0).ok_or(NaluError::StopBitNotFound)?;
        let stop_bit = data[stop_byte].trailing_zeros() as u8;

        let mut reader = Self {
            data,
            state: CursorState {
                byte_position: 0,
                bit_position: 7,
                zero_count: 0,
                current_byte: 0,
            },
            stop_byte,
            stop_bit,
        };
        reader.load_byte(0);

        Ok(reader)
    }

    /// Loads the byte at `position`, skipping an emulation prevention byte.
    fn load_byte(&mut self, mut position: usize) {
        let state = &mut self.state;
        loop {
            let Some(&byte) = self.data.get(position) else {
                state.byte_position = self.data.len();
                state.current_byte = 0;
                break;
            };

            if state.zero_count == 2 && byte == 0x03 {
                state.zero_count = 0;
                position += 1;
                continue;
            }

            state.zero_count = if byte == 0x00 { state.zero_count.saturating_add(1) } else { 0 };
            state.byte_position = position;
            state.current_byte = byte;
            break;
        }

        state.bit_position = 7;
    }

    /// Returns the position of the stop bit as `(byte index, bit index)`.
    pub const fn stop_position(&self) -> (usize, u8) {
        (self.stop_byte, self.stop_bit)
    }

    /// Returns a copy of the current cursor state.
    pub const fn state(&self) -> CursorState {
        self.state
    }

    /// Returns true when the cursor has reached the stop bit and no payload bits remain.
    pub const fn ended(&self) -> bool {
        self.state.byte_position > self.stop_byte
            || (self.state.byte_position == self.stop_byte && self.state.bit_position <= self.stop_bit)
    }

    /// Reads the next bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.ended() {
            return Err(NaluError::EndOfData);
        }

        let bit = (self.state.current_byte >> self.state.bit_position) & 1 == 1;
        if self.state.bit_position == 0 {
            self.load_byte(self.state.byte_position + 1);
        } else {
            self.state.bit_position -= 1;
        }

        Ok(bit)
    }

    /// Reads `count` bits as an unsigned integer, most significant bit first.
    ///
    /// At most 32 bits can be read at once.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        if count > 32 {
            return Err(NaluError::ReadTooLarge { bits: u32::from(count) });
        }

        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | u32::from(self.read_bit()?);
        }

        Ok(value)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Discards `count` bits.
    pub fn skip_bits(&mut self, count: u32) -> Result<()> {
        for _ in 0..count {
            self.read_bit()?;
        }

        Ok(())
    }

    /// Reads `count` bytes made up of 8 bit reads. The cursor is not aligned first.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        (0..count).map(|_| self.read_u8()).collect()
    }

    /// Runs `read` and restores the cursor afterwards, whether it succeeded or not.
    fn lookahead<T>(&mut self, read: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.state;
        let result = read(self);
        self.state = saved;
        result
    }

    /// Reads `count` bits without moving the cursor.
    pub fn peek_bits(&mut self, count: u8) -> Result<u32> {
        self.lookahead(|reader| reader.read_bits(count))
    }

    /// Reads `count` bytes without moving the cursor.
    pub fn peek_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.lookahead(|reader| reader.read_bytes(count))
    }

    /// Reads `N` bytes into an array without moving the cursor.
    pub fn peek_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.lookahead(|reader| {
            let mut bytes = [0; N];
            for byte in &mut bytes {
                *byte = reader.read_u8()?;
            }
            Ok(bytes)
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_read_until_stop_bit() {
        let mut reader = NaluBitReader::new(&[0b1010_0000]).unwrap();
        assert_eq!(reader.stop_position(), (0, 5));

        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(reader.ended());
        assert_eq!(reader.read_bit().unwrap_err(), NaluError::EndOfData);
    }

    #[test]
    fn test_trailing_zero_bytes() {
        let mut reader = NaluBitReader::new(&[0xab, 0x80, 0x00, 0x00]).unwrap();
        assert_eq!(reader.stop_position(), (1, 7));
        assert_eq!(reader.read_u8().unwrap(), 0xab);
        assert!(reader.ended());
    }

    #[test]
    fn test_all_zero() {
        assert_eq!(NaluBitReader::new(&[0, 0, 0]).unwrap_err(), NaluError::StopBitNotFound);
        assert_eq!(NaluBitReader::new(&[]).unwrap_err(), NaluError::StopBitNotFound);
    }

    #[test]
    fn test_skips_emulation_prevention() {
        let mut reader = NaluBitReader::new(&[0x00, 0x00, 0x03, 0x01, 0x80]).unwrap();
        assert_eq!(reader.read_bits(24).unwrap(), 0x000001);
        assert!(reader.ended());
    }

    #[test]
    fn test_consecutive_emulation_prevention() {
        let mut reader = NaluBitReader::new(&[0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x01, 0x80]).unwrap();
        assert_eq!(reader.read_bytes(5).unwrap(), vec![0x00, 0x00, 0x00, 0x00, 0x01]);
        assert!(reader.ended());
    }

    #[test]
    fn test_no_skip_after_three_zeros() {
        let mut reader = NaluBitReader::new(&[0x00, 0x00, 0x00, 0x03, 0x80]).unwrap();
        assert_eq!(reader.read_bytes(4).unwrap(), vec![0x00, 0x00, 0x00, 0x03]);
    }

    #[test]
    fn test_read_bits_across_bytes() {
        let mut reader = NaluBitReader::new(&[0b1100_1010, 0b0111_0001, 0x80]).unwrap();
        assert_eq!(reader.read_bits(3).unwrap(), 0b110);
        assert_eq!(reader.read_bits(7).unwrap(), 0b01010_01);
        reader.skip_bits(2).unwrap();
        assert_eq!(reader.read_bits(4).unwrap(), 0b0001);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
        assert!(reader.ended());
    }

    #[test]
    fn test_read_32_bits() {
        let mut reader = NaluBitReader::new(&[0xff, 0xff, 0xff, 0xff, 0x80]).unwrap();
        assert_eq!(reader.read_bits(33).unwrap_err(), NaluError::ReadTooLarge { bits: 33 });
        assert_eq!(reader.read_bits(32).unwrap(), u32::MAX);
    }

    #[test]
    fn test_peek_is_pure() {
        let mut reader = NaluBitReader::new(&[0xab, 0xcd, 0x80]).unwrap();
        reader.read_bits(4).unwrap();

        let before = reader.state();
        assert_eq!(reader.peek_bits(8).unwrap(), 0xbc);
        assert_eq!(reader.state(), before);
        assert_eq!(reader.peek_bytes(1).unwrap(), vec![0xbc]);
        assert_eq!(reader.peek_array::<1>().unwrap(), [0xbc]);
        assert_eq!(reader.state(), before);

        assert_eq!(reader.peek_bits(16).unwrap_err(), NaluError::EndOfData);
        assert_eq!(reader.state(), before);

        assert_eq!(reader.read_bits(8).unwrap(), 0xbc);
        assert_eq!(reader.state().byte_position(), 1);
        assert_eq!(reader.state().bit_position(), 3);
    }

    #[test]
    fn test_peek_then_read_matches_read() {
        let data = [0x00, 0x00, 0x03, 0x02, 0x5a, 0x80];

        let mut peeked = NaluBitReader::new(&data).unwrap();
        peeked.read_bits(12).unwrap();
        let value = peeked.peek_bits(20).unwrap();
        assert_eq!(peeked.read_bits(20).unwrap(), value);

        let mut direct = NaluBitReader::new(&data).unwrap();
        direct.read_bits(12).unwrap();
        direct.read_bits(20).unwrap();

        assert_eq!(peeked.state(), direct.state());
    }
}
