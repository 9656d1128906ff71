use std::num::NonZero;

use nalu::{NaluBitReader, NaluError, Result};

use crate::NALUnitType;

/// NAL unit header.
///
/// - ISO/IEC 23008-2 - 7.3.1.2
/// - ISO/IEC 23008-2 - 7.4.2.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NALUnitHeader {
    /// Specifies the type of RBSP data structure contained in the NAL unit as specified in ISO/IEC 23008-2 Table 7-1.
    pub nal_unit_type: NALUnitType,
    /// Specifies the identifier of the layer to which a VCL NAL unit belongs or the identifier of a
    /// layer to which a non-VCL NAL unit applies.
    ///
    /// This value is in range \[0, 63\], with 63 being reserved for future use.
    pub nuh_layer_id: u8,
    /// This value minus 1 specifies a temporal identifier for the NAL unit.
    ///
    /// This value is in range from \[1, 7\].
    pub nuh_temporal_id_plus1: NonZero<u8>,
}

impl NALUnitHeader {
    /// Parses the two header bytes at the cursor.
    pub fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let forbidden_zero_bit = reader.read_bit()?;
        if forbidden_zero_bit {
            return Err(NaluError::invalid("forbidden_zero_bit", 1));
        }

        let nal_unit_type = NALUnitType::try_from(reader.read_bits(6)? as u8)?;
        let nuh_layer_id = reader.read_bits(6)? as u8;

        if nal_unit_type == NALUnitType::EobNut && nuh_layer_id != 0 {
            return Err(NaluError::invalid("nuh_layer_id", nuh_layer_id));
        }

        let nuh_temporal_id_plus1 = reader.read_bits(3)? as u8;
        let nuh_temporal_id_plus1 =
            NonZero::new(nuh_temporal_id_plus1).ok_or(NaluError::invalid("nuh_temporal_id_plus1", 0))?;

        // TemporalId must be 0 for IRAP pictures, parameter sets other than the PPS and end of sequence/bitstream.
        if ((NALUnitType::BlaWLp..=NALUnitType::RsvIrapVcl23).contains(&nal_unit_type)
            || nal_unit_type == NALUnitType::VpsNut
            || nal_unit_type == NALUnitType::SpsNut
            || nal_unit_type == NALUnitType::EosNut
            || nal_unit_type == NALUnitType::EobNut)
            && nuh_temporal_id_plus1.get() != 1
        {
            return Err(NaluError::invalid("nuh_temporal_id_plus1", nuh_temporal_id_plus1.get()));
        }

        if (nal_unit_type == NALUnitType::TsaR || nal_unit_type == NALUnitType::TsaN)
            && nuh_temporal_id_plus1.get() == 1
        {
            return Err(NaluError::invalid("nuh_temporal_id_plus1", 1));
        }

        if nuh_layer_id == 0
            && (nal_unit_type == NALUnitType::StsaR || nal_unit_type == NALUnitType::StsaN)
            && nuh_temporal_id_plus1.get() == 1
        {
            return Err(NaluError::invalid("nuh_temporal_id_plus1", 1));
        }

        Ok(Self {
            nal_unit_type,
            nuh_layer_id,
            nuh_temporal_id_plus1,
        })
    }

    /// Returns the NAL unit type encoded in the first byte of a NAL unit,
    /// without validating the rest of the header.
    pub fn peek_type(nal_unit: &[u8]) -> Option<NALUnitType> {
        let first = nal_unit.first()?;
        NALUnitType::try_from((first >> 1) & 0x3f).ok()
    }

    /// Returns the temporal id of the NAL unit.
    ///
    /// Defined as `TemporalId` (7-1) by ISO/IEC 23008-2 - 7.4.2.2.
    pub fn temporal_id(&self) -> u8 {
        self.nuh_temporal_id_plus1.get() - 1
    }
}
