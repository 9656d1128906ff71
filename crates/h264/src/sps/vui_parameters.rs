use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result};
use tracing::warn;

/// `aspect_ratio_idc` value signalling an explicit `sar_width` and `sar_height`.
const EXTENDED_SAR: u8 = 255;

/// Video usability information.
/// ISO/IEC-14496-10-2022 - E.1.1
#[derive(Debug, Clone, PartialEq)]
pub struct VuiParameters {
    /// Present when `aspect_ratio_info_present_flag` is set.
    pub aspect_ratio_info: Option<AspectRatioInfo>,
    /// The `overscan_appropriate_flag`, present when `overscan_info_present_flag` is set.
    pub overscan_appropriate_flag: Option<bool>,
    /// Present when `video_signal_type_present_flag` is set.
    pub video_signal_type: Option<VideoSignalType>,
    /// Present when `chroma_loc_info_present_flag` is set.
    pub chroma_sample_loc: Option<ChromaSampleLoc>,
    /// Present when `timing_info_present_flag` is set.
    pub timing_info: Option<TimingInfo>,
    /// The `pic_struct_present_flag`.
    pub pic_struct_present_flag: bool,
    /// Present when `bitstream_restriction_flag` is set.
    pub bitstream_restriction: Option<BitstreamRestriction>,
}

/// The sample aspect ratio of the luma samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatioInfo {
    /// Index into Table E-1, 255 meaning `Extended_SAR`.
    pub aspect_ratio_idc: u8,
    /// The `sar_width`, only read for `Extended_SAR`.
    pub sar_width: Option<u16>,
    /// The `sar_height`, only read for `Extended_SAR`.
    pub sar_height: Option<u16>,
}

/// How the samples map to a video signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSignalType {
    /// The `video_format`, 3 bits. 5 means unspecified.
    pub video_format: u8,
    /// 1 means the samples use the full range rather than the studio swing.
    pub video_full_range_flag: bool,
    /// Present when `colour_description_present_flag` is set.
    pub colour_description: Option<ColourDescription>,
}

/// Colour primaries, transfer characteristics and matrix coefficients, as indexes into
/// Tables E-3, E-4 and E-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ColourDescription {
    pub colour_primaries: u8,
    pub transfer_characteristics: u8,
    pub matrix_coefficients: u8,
}

/// The location of chroma samples relative to luma samples, see Figure E-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaSampleLoc {
    /// The value of this ranges from \[0, 5\].
    pub chroma_sample_loc_type_top_field: u32,
    /// The value of this ranges from \[0, 5\].
    pub chroma_sample_loc_type_bottom_field: u32,
}

/// `TimingInfo` contains the fields used to derive the frame rate.
///
/// `frame_rate = time_scale / (2 * num_units_in_tick)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingInfo {
    /// The `num_units_in_tick`. It is never 0.
    pub num_units_in_tick: u32,
    /// The `time_scale`, the number of time units that pass in one second.
    pub time_scale: u32,
    /// 1 means the temporal distance between consecutive pictures is constant.
    pub fixed_frame_rate_flag: bool,
}

/// Limits the encoder promises to honour, used to size decoder buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct BitstreamRestriction {
    pub motion_vectors_over_pic_boundaries_flag: bool,
    pub max_bytes_per_pic_denom: u32,
    pub max_bits_per_mb_denom: u32,
    pub log2_max_mv_length_horizontal: u32,
    pub log2_max_mv_length_vertical: u32,
    pub max_num_reorder_frames: u32,
    pub max_dec_frame_buffering: u32,
}

impl VuiParameters {
    /// Parses `vui_parameters()`.
    ///
    /// HRD parameters are not supported: when either HRD flag is set this fails with
    /// [`NaluError::Unimplemented`].
    pub fn parse(reader: &mut NaluBitReader<'_>) -> Result<Self> {
        let aspect_ratio_info_present_flag = reader.read_bit()?;
        let aspect_ratio_info = if aspect_ratio_info_present_flag {
            let aspect_ratio_idc = reader.read_u8()?;
            let (sar_width, sar_height) = if aspect_ratio_idc == EXTENDED_SAR {
                (Some(reader.read_bits(16)? as u16), Some(reader.read_bits(16)? as u16))
            } else {
                (None, None)
            };
            Some(AspectRatioInfo {
                aspect_ratio_idc,
                sar_width,
                sar_height,
            })
        } else {
            None
        };

        let overscan_info_present_flag = reader.read_bit()?;
        let overscan_appropriate_flag = if overscan_info_present_flag {
            Some(reader.read_bit()?)
        } else {
            None
        };

        let video_signal_type_present_flag = reader.read_bit()?;
        let video_signal_type = if video_signal_type_present_flag {
            let video_format = reader.read_bits(3)? as u8;
            let video_full_range_flag = reader.read_bit()?;
            let colour_description_present_flag = reader.read_bit()?;
            let colour_description = if colour_description_present_flag {
                Some(ColourDescription {
                    colour_primaries: reader.read_u8()?,
                    transfer_characteristics: reader.read_u8()?,
                    matrix_coefficients: reader.read_u8()?,
                })
            } else {
                None
            };
            Some(VideoSignalType {
                video_format,
                video_full_range_flag,
                colour_description,
            })
        } else {
            None
        };

        let chroma_loc_info_present_flag = reader.read_bit()?;
        let chroma_sample_loc = if chroma_loc_info_present_flag {
            Some(ChromaSampleLoc {
                chroma_sample_loc_type_top_field: reader.read_exp_golomb()?,
                chroma_sample_loc_type_bottom_field: reader.read_exp_golomb()?,
            })
        } else {
            None
        };

        let timing_info_present_flag = reader.read_bit()?;
        let timing_info = if timing_info_present_flag {
            Some(TimingInfo::parse(reader)?)
        } else {
            None
        };

        let nal_hrd_parameters_present_flag = reader.read_bit()?;
        if nal_hrd_parameters_present_flag {
            warn!("nal_hrd_parameters_present_flag is set, hrd_parameters are not supported");
            return Err(NaluError::Unimplemented("hrd_parameters"));
        }
        let vcl_hrd_parameters_present_flag = reader.read_bit()?;
        if vcl_hrd_parameters_present_flag {
            warn!("vcl_hrd_parameters_present_flag is set, hrd_parameters are not supported");
            return Err(NaluError::Unimplemented("hrd_parameters"));
        }

        let pic_struct_present_flag = reader.read_bit()?;

        let bitstream_restriction_flag = reader.read_bit()?;
        let bitstream_restriction = if bitstream_restriction_flag {
            Some(BitstreamRestriction {
                motion_vectors_over_pic_boundaries_flag: reader.read_bit()?,
                max_bytes_per_pic_denom: reader.read_exp_golomb()?,
                max_bits_per_mb_denom: reader.read_exp_golomb()?,
                log2_max_mv_length_horizontal: reader.read_exp_golomb()?,
                log2_max_mv_length_vertical: reader.read_exp_golomb()?,
                max_num_reorder_frames: reader.read_exp_golomb()?,
                max_dec_frame_buffering: reader.read_exp_golomb()?,
            })
        } else {
            None
        };

        Ok(VuiParameters {
            aspect_ratio_info,
            overscan_appropriate_flag,
            video_signal_type,
            chroma_sample_loc,
            timing_info,
            pic_struct_present_flag,
            bitstream_restriction,
        })
    }
}

impl TimingInfo {
    fn parse(reader: &mut NaluBitReader<'_>) -> Result<Self> {
        let num_units_in_tick = reader.read_bits(32)?;
        if num_units_in_tick == 0 {
            return Err(NaluError::invalid("num_units_in_tick", 0));
        }

        Ok(TimingInfo {
            num_units_in_tick,
            time_scale: reader.read_bits(32)?,
            fixed_frame_rate_flag: reader.read_bit()?,
        })
    }

    /// `time_scale / (2 * num_units_in_tick)`
    pub fn frame_rate(&self) -> f64 {
        f64::from(self.time_scale) / (2.0 * f64::from(self.num_units_in_tick))
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use nalu::{BitWriter, NaluBitReader, NaluError};

    use super::VuiParameters;

    fn parse(writer: BitWriter<Vec<u8>>) -> Result<VuiParameters, NaluError> {
        let data = writer.finish().unwrap();
        let mut reader = NaluBitReader::new(&data).unwrap();
        VuiParameters::parse(&mut reader)
    }

    #[test]
    fn test_extended_sar_and_bitstream_restriction() {
        let mut writer = BitWriter::default();
        writer.write_bit(true).unwrap(); // aspect_ratio_info_present_flag
        writer.write_bits(255, 8).unwrap();
        writer.write_bits(4, 16).unwrap();
        writer.write_bits(3, 16).unwrap();
        writer.write_bits(0b10, 2).unwrap(); // overscan present, not appropriate
        writer.write_bits(0b0, 1).unwrap(); // video_signal_type_present_flag
        writer.write_bit(true).unwrap(); // chroma_loc_info_present_flag
        writer.write_bits(0b010, 3).unwrap(); // ue 1
        writer.write_bits(0b1, 1).unwrap(); // ue 0
        writer.write_bit(false).unwrap(); // timing_info_present_flag
        writer.write_bits(0b00, 2).unwrap(); // no hrd
        writer.write_bit(true).unwrap(); // pic_struct_present_flag
        writer.write_bit(true).unwrap(); // bitstream_restriction_flag
        writer.write_bit(true).unwrap();
        writer.write_bits(0b011, 3).unwrap(); // ue 2
        writer.write_bits(0b1, 1).unwrap();
        writer.write_bits(0b0001011, 7).unwrap(); // ue 10
        writer.write_bits(0b0001011, 7).unwrap();
        writer.write_bits(0b010, 3).unwrap();
        writer.write_bits(0b00100, 5).unwrap(); // ue 3
        writer.write_rbsp_trailing_bits().unwrap();

        let vui = parse(writer).unwrap();
        insta::assert_debug_snapshot!(vui, @r"
        VuiParameters {
            aspect_ratio_info: Some(
                AspectRatioInfo {
                    aspect_ratio_idc: 255,
                    sar_width: Some(
                        4,
                    ),
                    sar_height: Some(
                        3,
                    ),
                },
            ),
            overscan_appropriate_flag: Some(
                false,
            ),
            video_signal_type: None,
            chroma_sample_loc: Some(
                ChromaSampleLoc {
                    chroma_sample_loc_type_top_field: 1,
                    chroma_sample_loc_type_bottom_field: 0,
                },
            ),
            timing_info: None,
            pic_struct_present_flag: true,
            bitstream_restriction: Some(
                BitstreamRestriction {
                    motion_vectors_over_pic_boundaries_flag: true,
                    max_bytes_per_pic_denom: 2,
                    max_bits_per_mb_denom: 0,
                    log2_max_mv_length_horizontal: 10,
                    log2_max_mv_length_vertical: 10,
                    max_num_reorder_frames: 1,
                    max_dec_frame_buffering: 3,
                },
            ),
        }
        ");
    }

    #[test]
    fn test_zero_num_units_in_tick() {
        let mut writer = BitWriter::default();
        writer.write_bits(0b0000, 4).unwrap();
        writer.write_bit(true).unwrap(); // timing_info_present_flag
        writer.write_bits(0, 32).unwrap();
        writer.write_bits(50, 32).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_rbsp_trailing_bits().unwrap();

        assert_eq!(parse(writer).unwrap_err(), NaluError::invalid("num_units_in_tick", 0));
    }

    #[test]
    fn test_vcl_hrd_is_unimplemented() {
        let mut writer = BitWriter::default();
        writer.write_bits(0b00000, 5).unwrap();
        writer.write_bits(0b01, 2).unwrap(); // vcl_hrd_parameters_present_flag
        writer.write_bits(0xff, 8).unwrap();
        writer.write_rbsp_trailing_bits().unwrap();

        assert_eq!(parse(writer).unwrap_err(), NaluError::Unimplemented("hrd_parameters"));
    }
}
