//! Exponential-Golomb coding on top of the [`nalu`] bit cursor and bit writer.
//!
//! Unsigned codes are the `ue(v)` descriptor and signed codes the `se(v)`
//! descriptor of ISO/IEC 14496-10 and ISO/IEC 23008-2 (9.2).
//!
//! ```rust
//! # fn test() -> Result<(), Box<dyn std::error::Error>> {
//! use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};
//! use nalu::{BitWriter, NaluBitReader};
//!
//! let mut bit_writer = BitWriter::<Vec<u8>>::default();
//! bit_writer.write_exp_golomb(0)?;
//! bit_writer.write_exp_golomb(7)?;
//! bit_writer.write_signed_exp_golomb(-3)?;
//! bit_writer.write_rbsp_trailing_bits()?;
//!
//! let data = bit_writer.finish()?;
//! let mut reader = NaluBitReader::new(&data)?;
//!
//! assert_eq!(reader.read_exp_golomb()?, 0);
//! assert_eq!(reader.read_exp_golomb()?, 7);
//! assert_eq!(reader.read_signed_exp_golomb()?, -3);
//! assert!(reader.ended());
//! # Ok(())
//! # }
//! # test().expect("failed to run test");
//! ```
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

use std::io;

use nalu::{BitWriter, NaluBitReader, NaluError};

/// Extension trait for reading Exp-Golomb encoded numbers from a [`NaluBitReader`].
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
pub trait BitReaderExpGolombExt {
    /// Reads an unsigned Exp-Golomb encoded number, `ue(v)`.
    ///
    /// The value must fit in 32 bits. A prefix of more than 32 zero bits
    /// fails with [`NaluError::ReadTooLarge`], a larger value with
    /// [`NaluError::ExpGolombOverflow`].
    fn read_exp_golomb(&mut self) -> Result<u32, NaluError>;

    /// Reads a signed Exp-Golomb encoded number, `se(v)`.
    ///
    /// Odd code numbers map to positive values, even ones to zero or negative values.
    fn read_signed_exp_golomb(&mut self) -> Result<i32, NaluError> {
        let code_num = i64::from(self.read_exp_golomb()?);
        let value = if code_num % 2 == 0 { -(code_num / 2) } else { code_num / 2 + 1 };

        i32::try_from(value).map_err(|_| NaluError::ExpGolombOverflow)
    }
}

impl BitReaderExpGolombExt for NaluBitReader<'_> {
    fn read_exp_golomb(&mut self) -> Result<u32, NaluError> {
        let mut leading_zeros = 0u8;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > 32 {
                return Err(NaluError::ReadTooLarge {
                    bits: u32::from(leading_zeros),
                });
            }
        }

        let suffix = u64::from(self.read_bits(leading_zeros)?);
        let value = ((1u64 << leading_zeros) | suffix) - 1;

        u32::try_from(value).map_err(|_| NaluError::ExpGolombOverflow)
    }
}

/// Extension trait for writing Exp-Golomb encoded numbers to a [`BitWriter`].
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
pub trait BitWriterExpGolombExt {
    /// Writes an unsigned Exp-Golomb encoded number.
    fn write_exp_golomb(&mut self, input: u64) -> io::Result<()>;

    /// Writes a signed Exp-Golomb encoded number.
    fn write_signed_exp_golomb(&mut self, number: i64) -> io::Result<()> {
        let code_num = if number <= 0 {
            number.unsigned_abs() * 2
        } else {
            number.unsigned_abs() * 2 - 1
        };

        self.write_exp_golomb(code_num)
    }
}

impl<W: io::Write> BitWriterExpGolombExt for BitWriter<W> {
    fn write_exp_golomb(&mut self, input: u64) -> io::Result<()> {
        let code = input.checked_add(1).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "exp-golomb value too large")
        })?;
        let length = (u64::BITS - code.leading_zeros()) as u8;

        for _ in 1..length {
            self.write_bit(false)?;
        }
        self.write_bits(code, length)
    }
}
