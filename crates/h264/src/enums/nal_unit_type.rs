use nalu::NaluError;

/// NAL (Network Abstraction Layer) unit types as defined by ISO/IEC 14496-10:2022 (Table 7-1).
///
/// Types 0 and 24 to 31 are unspecified and reserved values should be ignored
/// by decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NALUnitType {
    /// Unspecified
    Unspecified = 0,
    /// Coded slice of a non-IDR picture
    NonIDRSliceLayerWithoutPartitioning = 1,
    /// Coded slice data partition A
    SliceDataPartitionALayer = 2,
    /// Coded slice data partition B
    SliceDataPartitionBLayer = 3,
    /// Coded slice data partition C
    SliceDataPartitionCLayer = 4,
    /// Coded slice of an IDR picture
    IDRSliceLayerWithoutPartitioning = 5,
    /// Supplemental enhancement information
    SEI = 6,
    /// Sequence parameter set
    SPS = 7,
    /// Picture parameter set
    PPS = 8,
    /// Access unit delimiter
    AccessUnitDelimiter = 9,
    /// End of sequence
    EndOfSeq = 10,
    /// End of stream
    EndOfStream = 11,
    /// Filler data
    FillerData = 12,
    /// Sequence parameter set extension
    SPSExtension = 13,
    /// Prefix NAL unit
    PrefixNalUnit = 14,
    /// Subset sequence parameter set
    SubsetSPS = 15,
    /// Depth parameter set
    DepthParameterSet = 16,
    /// Reserved (17, 18)
    Reserved = 17,
    /// Coded slice of an auxiliary coded picture without partitioning
    AuxCodedPictureSliceLayerWithoutPartitioning = 19,
    /// Coded slice extension
    SliceLayerExtension = 20,
    /// Coded slice extension for a depth view component or a 3D-AVC texture view component
    SliceLayerExtensionForDepthView = 21,
    /// Reserved (22, 23)
    Reserved2 = 22,
    /// Unspecified (24..=31)
    Unspecified2 = 24,
}

impl TryFrom<u8> for NALUnitType {
    type Error = NaluError;

    /// Converts the 5 bit `nal_unit_type` to a `NALUnitType`.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Unspecified,
            1 => Self::NonIDRSliceLayerWithoutPartitioning,
            2 => Self::SliceDataPartitionALayer,
            3 => Self::SliceDataPartitionBLayer,
            4 => Self::SliceDataPartitionCLayer,
            5 => Self::IDRSliceLayerWithoutPartitioning,
            6 => Self::SEI,
            7 => Self::SPS,
            8 => Self::PPS,
            9 => Self::AccessUnitDelimiter,
            10 => Self::EndOfSeq,
            11 => Self::EndOfStream,
            12 => Self::FillerData,
            13 => Self::SPSExtension,
            14 => Self::PrefixNalUnit,
            15 => Self::SubsetSPS,
            16 => Self::DepthParameterSet,
            17 | 18 => Self::Reserved,
            19 => Self::AuxCodedPictureSliceLayerWithoutPartitioning,
            20 => Self::SliceLayerExtension,
            21 => Self::SliceLayerExtensionForDepthView,
            22 | 23 => Self::Reserved2,
            24..=31 => Self::Unspecified2,
            _ => return Err(NaluError::invalid("nal_unit_type", value)),
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_try_from() {
        assert_eq!(NALUnitType::try_from(7).unwrap(), NALUnitType::SPS);
        assert_eq!(NALUnitType::try_from(8).unwrap(), NALUnitType::PPS);
        assert_eq!(NALUnitType::try_from(18).unwrap(), NALUnitType::Reserved);
        assert_eq!(NALUnitType::try_from(31).unwrap(), NALUnitType::Unspecified2);
        assert_eq!(
            NALUnitType::try_from(32).unwrap_err(),
            NaluError::invalid("nal_unit_type", 32u8)
        );
    }
}
