use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, Result};

/// `FrameCropInfo` contains the frame cropping offsets, in units of two luma samples
/// for 4:2:0 content.
///
/// `cropped_width = encoded_width - 2 * (frame_crop_left_offset + frame_crop_right_offset)`
///
/// `cropped_height = encoded_height - 2 * (frame_crop_top_offset + frame_crop_bottom_offset)`
///
/// ISO/IEC-14496-10-2022 - 7.4.2.1.1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct FrameCropInfo {
    pub frame_crop_left_offset: u32,
    pub frame_crop_right_offset: u32,
    pub frame_crop_top_offset: u32,
    pub frame_crop_bottom_offset: u32,
}

impl FrameCropInfo {
    /// Parses the four offsets, left, right, top then bottom.
    pub fn parse(reader: &mut NaluBitReader<'_>) -> Result<Self> {
        Ok(FrameCropInfo {
            frame_crop_left_offset: reader.read_exp_golomb()?,
            frame_crop_right_offset: reader.read_exp_golomb()?,
            frame_crop_top_offset: reader.read_exp_golomb()?,
            frame_crop_bottom_offset: reader.read_exp_golomb()?,
        })
    }
}
