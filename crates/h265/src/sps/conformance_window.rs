use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, Result};

/// Specifies the samples of the pictures in the CVS that are output from the decoding process, in terms of a rectangular
/// region specified in picture coordinates for output.
///
/// Offsets are in chroma sample units, multiply by [`SubWidthC`](crate::SpsRbsp::sub_width_c) and
/// [`SubHeightC`](crate::SpsRbsp::sub_height_c) to get luma samples.
///
/// Directly part of [SPS RBSP](crate::SpsRbsp). Every offset is 0 when `conformance_window_flag` is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConformanceWindow {
    /// The left crop offset which is used to compute the [`cropped_width`](crate::SpsRbsp::cropped_width).
    pub conf_win_left_offset: u32,
    /// The right crop offset which is used to compute the [`cropped_width`](crate::SpsRbsp::cropped_width).
    pub conf_win_right_offset: u32,
    /// The top crop offset which is used to compute the [`cropped_height`](crate::SpsRbsp::cropped_height).
    pub conf_win_top_offset: u32,
    /// The bottom crop offset which is used to compute the [`cropped_height`](crate::SpsRbsp::cropped_height).
    pub conf_win_bottom_offset: u32,
}

impl ConformanceWindow {
    pub(crate) fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        Ok(ConformanceWindow {
            conf_win_left_offset: reader.read_exp_golomb()?,
            conf_win_right_offset: reader.read_exp_golomb()?,
            conf_win_top_offset: reader.read_exp_golomb()?,
            conf_win_bottom_offset: reader.read_exp_golomb()?,
        })
    }
}
