use nalu::NaluError;

/// NAL (Network Abstraction Layer) unit types as defined by ISO/IEC 23008-2 Table 7-1.
#[derive(Debug, Clone, PartialEq, Copy, PartialOrd, Ord, Eq)]
#[repr(u8)]
pub enum NALUnitType {
    /// Coded slice segment of a non-TSA, non-STSA trailing picture, VCL.
    TrailN = 0,
    /// Coded slice segment of a non-TSA, non-STSA trailing picture, VCL.
    TrailR = 1,
    /// Coded slice segment of a TSA picture, VCL.
    TsaN = 2,
    /// Coded slice segment of a TSA picture, VCL.
    TsaR = 3,
    /// Coded slice segment of an STSA picture, VCL.
    StsaN = 4,
    /// Coded slice segment of an STSA picture, VCL.
    StsaR = 5,
    /// Coded slice segment of a RADL picture, VCL.
    RadlN = 6,
    /// Coded slice segment of a RADL picture, VCL.
    RadlR = 7,
    /// Coded slice segment of a RASL picture, VCL.
    RaslN = 8,
    /// Coded slice segment of a RASL picture, VCL.
    RaslR = 9,
    /// Reserved non-IRAP SLNR VCL NAL unit types, VCL.
    RsvVclN10 = 10,
    /// Reserved non-IRAP sub-layer reference VCL NAL unit types, VCL.
    RsvVclR11 = 11,
    /// Reserved non-IRAP SLNR VCL NAL unit types, VCL.
    RsvVclN12 = 12,
    /// Reserved non-IRAP sub-layer reference VCL NAL unit types, VCL.
    RsvVclR13 = 13,
    /// Reserved non-IRAP SLNR VCL NAL unit types, VCL.
    RsvVclN14 = 14,
    /// Reserved non-IRAP sub-layer reference VCL NAL unit types, VCL.
    RsvVclR15 = 15,
    /// Coded slice segment of a BLA picture, VCL.
    BlaWLp = 16,
    /// Coded slice segment of a BLA picture, VCL.
    BlaWRadl = 17,
    /// Coded slice segment of a BLA picture, VCL.
    BlaNLp = 18,
    /// Coded slice segment of an IDR picture, VCL.
    IdrWRadl = 19,
    /// Coded slice segment of an IDR picture, VCL.
    IdrNLp = 20,
    /// Coded slice segment of a CRA picture, VCL.
    CraNut = 21,
    /// Reserved IRAP VCL NAL unit types, VCL.
    RsvIrapVcl22 = 22,
    /// Reserved IRAP VCL NAL unit types, VCL.
    RsvIrapVcl23 = 23,
    /// Reserved non-IRAP VCL NAL unit types, VCL.
    RsvVcl24 = 24,
    /// Reserved non-IRAP VCL NAL unit types, VCL.
    RsvVcl25 = 25,
    /// Reserved non-IRAP VCL NAL unit types, VCL.
    RsvVcl26 = 26,
    /// Reserved non-IRAP VCL NAL unit types, VCL.
    RsvVcl27 = 27,
    /// Reserved non-IRAP VCL NAL unit types, VCL.
    RsvVcl28 = 28,
    /// Reserved non-IRAP VCL NAL unit types, VCL.
    RsvVcl29 = 29,
    /// Reserved non-IRAP VCL NAL unit types, VCL.
    RsvVcl30 = 30,
    /// Reserved non-IRAP VCL NAL unit types, VCL.
    RsvVcl31 = 31,
    /// Video parameter set, non-VCL.
    VpsNut = 32,
    /// Sequence parameter set, non-VCL.
    SpsNut = 33,
    /// Picture parameter set, non-VCL.
    PpsNut = 34,
    /// Access unit delimiter, non-VCL.
    AudNut = 35,
    /// End of sequence, non-VCL.
    EosNut = 36,
    /// End of bitstream, non-VCL.
    EobNut = 37,
    /// Filler data, non-VCL.
    FdNut = 38,
    /// Supplemental enhancement information, non-VCL.
    PrefixSeiNut = 39,
    /// Supplemental enhancement information, non-VCL.
    SuffixSeiNut = 40,
    /// Reserved, non-VCL.
    RsvNvcl41 = 41,
    /// Reserved, non-VCL.
    RsvNvcl42 = 42,
    /// Reserved, non-VCL.
    RsvNvcl43 = 43,
    /// Reserved, non-VCL.
    RsvNvcl44 = 44,
    /// Reserved, non-VCL.
    RsvNvcl45 = 45,
    /// Reserved, non-VCL.
    RsvNvcl46 = 46,
    /// Reserved, non-VCL.
    RsvNvcl47 = 47,
    /// Unspecified (48..=63), non-VCL.
    Unspecified = 48,
}

impl TryFrom<u8> for NALUnitType {
    type Error = NaluError;

    /// Converts the 6 bit `nal_unit_type` to a `NALUnitType`.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => NALUnitType::TrailN,
            1 => NALUnitType::TrailR,
            2 => NALUnitType::TsaN,
            3 => NALUnitType::TsaR,
            4 => NALUnitType::StsaN,
            5 => NALUnitType::StsaR,
            6 => NALUnitType::RadlN,
            7 => NALUnitType::RadlR,
            8 => NALUnitType::RaslN,
            9 => NALUnitType::RaslR,
            10 => NALUnitType::RsvVclN10,
            11 => NALUnitType::RsvVclR11,
            12 => NALUnitType::RsvVclN12,
            13 => NALUnitType::RsvVclR13,
            14 => NALUnitType::RsvVclN14,
            15 => NALUnitType::RsvVclR15,
            16 => NALUnitType::BlaWLp,
            17 => NALUnitType::BlaWRadl,
            18 => NALUnitType::BlaNLp,
            19 => NALUnitType::IdrWRadl,
            20 => NALUnitType::IdrNLp,
            21 => NALUnitType::CraNut,
            22 => NALUnitType::RsvIrapVcl22,
            23 => NALUnitType::RsvIrapVcl23,
            24 => NALUnitType::RsvVcl24,
            25 => NALUnitType::RsvVcl25,
            26 => NALUnitType::RsvVcl26,
            27 => NALUnitType::RsvVcl27,
            28 => NALUnitType::RsvVcl28,
            29 => NALUnitType::RsvVcl29,
            30 => NALUnitType::RsvVcl30,
            31 => NALUnitType::RsvVcl31,
            32 => NALUnitType::VpsNut,
            33 => NALUnitType::SpsNut,
            34 => NALUnitType::PpsNut,
            35 => NALUnitType::AudNut,
            36 => NALUnitType::EosNut,
            37 => NALUnitType::EobNut,
            38 => NALUnitType::FdNut,
            39 => NALUnitType::PrefixSeiNut,
            40 => NALUnitType::SuffixSeiNut,
            41 => NALUnitType::RsvNvcl41,
            42 => NALUnitType::RsvNvcl42,
            43 => NALUnitType::RsvNvcl43,
            44 => NALUnitType::RsvNvcl44,
            45 => NALUnitType::RsvNvcl45,
            46 => NALUnitType::RsvNvcl46,
            47 => NALUnitType::RsvNvcl47,
            48..=63 => NALUnitType::Unspecified,
            _ => return Err(NaluError::invalid("nal_unit_type", value)),
        })
    }
}

impl NALUnitType {
    /// Returns `true` if the NAL unit type class of this NAL unit type is VCL (Video Coding Layer).
    ///
    /// See ISO/IEC 23008-2 - Table 7-1, NAL unit type class column.
    pub fn is_vcl(&self) -> bool {
        (*self as u8) <= 31
    }

    /// Returns `true` for the VPS, SPS and PPS NAL unit types.
    pub fn is_parameter_set(&self) -> bool {
        matches!(self, Self::VpsNut | Self::SpsNut | Self::PpsNut)
    }
}
