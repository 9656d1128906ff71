//! Bit writer used to synthesize RBSP payloads.

use std::io;

/// Writes bits, most significant first, to an [`io::Write`].
///
/// Used to build RBSP payloads. Emulation prevention is not applied here,
/// wrap the inner writer in an [`EmulationPreventionWriter`](crate::EmulationPreventionWriter)
/// to get an escaped NAL unit.
#[derive(Debug)]
#[must_use]
pub struct BitWriter<W> {
    writer: W,
    current_byte: u8,
    bit_count: u8,
}

impl<W: Default> Default for BitWriter<W> {
    fn default() -> Self {
        Self::new(W::default())
    }
}

impl<W> BitWriter<W> {
    /// Creates a new BitWriter from a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// Returns true if no partial byte is pending.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_count == 0
    }

    /// Returns a reference to the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: io::Write> BitWriter<W> {
    /// Writes a single bit.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.current_byte = (self.current_byte << 1) | u8::from(bit);
        self.bit_count += 1;

        if self.bit_count == 8 {
            self.writer.write_all(&[self.current_byte])?;
            self.current_byte = 0;
            self.bit_count = 0;
        }

        Ok(())
    }

    /// Writes the lowest `count` bits of `bits`, most significant first.
    pub fn write_bits(&mut self, bits: u64, count: u8) -> io::Result<()> {
        if count > 64 || (count < 64 && bits >> count != 0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{bits} does not fit in {count} bits"),
            ));
        }

        for shift in (0..count).rev() {
            self.write_bit((bits >> shift) & 1 == 1)?;
        }

        Ok(())
    }

    /// Pads the pending byte with zero bits.
    pub fn align(&mut self) -> io::Result<()> {
        while !self.is_aligned() {
            self.write_bit(false)?;
        }

        Ok(())
    }

    /// Writes the `rbsp_stop_one_bit` followed by `rbsp_alignment_zero_bit`s.
    ///
    /// ISO/IEC 23008-2 - 7.3.2.11
    pub fn write_rbsp_trailing_bits(&mut self) -> io::Result<()> {
        self.write_bit(true)?;
        self.align()
    }

    /// Aligns the writer and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.align()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::NaluBitReader;

    #[test]
    fn test_write_bits() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bits(0b101, 3).unwrap();
        assert!(!writer.is_aligned());
        writer.write_bits(0b1_1110, 5).unwrap();
        assert!(writer.is_aligned());
        writer.write_bits(0xabc, 12).unwrap();

        assert_eq!(writer.finish().unwrap(), vec![0b1011_1110, 0xab, 0xc0]);
    }

    #[test]
    fn test_write_bits_too_large() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        assert_eq!(writer.write_bits(4, 2).unwrap_err().kind(), io::ErrorKind::InvalidInput);
        writer.write_bits(u64::MAX, 64).unwrap();
    }

    #[test]
    fn test_trailing_bits_are_the_stop_bit() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bits(0b10, 2).unwrap();
        writer.write_rbsp_trailing_bits().unwrap();
        let rbsp = writer.finish().unwrap();
        assert_eq!(rbsp, vec![0b1010_0000]);

        let mut reader = NaluBitReader::new(&rbsp).unwrap();
        assert_eq!(reader.read_bits(2).unwrap(), 0b10);
        assert!(reader.ended());
    }
}
