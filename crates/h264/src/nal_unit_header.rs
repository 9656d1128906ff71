use nalu::{NaluBitReader, NaluError, Result};

use crate::NALUnitType;

/// The one byte H.264 NAL unit header.
///
/// ISO/IEC 14496-10 - 7.3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NALUnitHeader {
    /// `nal_ref_idc`, 2 bits. Non-zero for parameter sets and reference pictures.
    pub nal_ref_idc: u8,
    /// `nal_unit_type`, 5 bits.
    pub nal_unit_type: NALUnitType,
}

impl NALUnitHeader {
    /// Parses the header from the first byte of a NAL unit.
    ///
    /// Fails if `forbidden_zero_bit` is set.
    pub fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let forbidden_zero_bit = reader.read_bit()?;
        if forbidden_zero_bit {
            return Err(NaluError::invalid("forbidden_zero_bit", 1));
        }

        let nal_ref_idc = reader.read_bits(2)? as u8;
        let nal_unit_type = NALUnitType::try_from(reader.read_bits(5)? as u8)?;

        Ok(Self {
            nal_ref_idc,
            nal_unit_type,
        })
    }

    /// Returns the NAL unit type encoded in the first byte of a NAL unit,
    /// without any validation of the other header bits.
    pub fn peek_type(nal_unit: &[u8]) -> Option<NALUnitType> {
        let first = nal_unit.first()?;
        NALUnitType::try_from(first & 0x1f).ok()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut reader = NaluBitReader::new(&[0x67, 0x80]).unwrap();
        let header = NALUnitHeader::parse(&mut reader).unwrap();
        insta::assert_debug_snapshot!(header, @r"
        NALUnitHeader {
            nal_ref_idc: 3,
            nal_unit_type: SPS,
        }
        ");
    }

    #[test]
    fn test_forbidden_zero_bit() {
        let mut reader = NaluBitReader::new(&[0xe7, 0x80]).unwrap();
        assert_eq!(
            NALUnitHeader::parse(&mut reader).unwrap_err(),
            NaluError::invalid("forbidden_zero_bit", 1)
        );
    }

    #[test]
    fn test_peek_type() {
        assert_eq!(NALUnitHeader::peek_type(&[0x68, 0xce]), Some(NALUnitType::PPS));
        assert_eq!(NALUnitHeader::peek_type(&[0x09]), Some(NALUnitType::AccessUnitDelimiter));
        assert_eq!(NALUnitHeader::peek_type(&[]), None);
    }
}
