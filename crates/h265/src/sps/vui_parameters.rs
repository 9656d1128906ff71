use std::num::NonZero;

use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};
use tracing::warn;

use super::ConformanceWindow;
use crate::{AspectRatioIdc, Profile, VideoFormat};

/// Values of the enclosing SPS that constrain the VUI syntax elements.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VuiContext<'a> {
    pub(crate) bit_depth_y: u8,
    pub(crate) bit_depth_c: u8,
    pub(crate) chroma_format_idc: u8,
    pub(crate) general_profile: Option<&'a Profile>,
    pub(crate) conformance_window: &'a ConformanceWindow,
    pub(crate) sub_width_c: u8,
    pub(crate) sub_height_c: u8,
    pub(crate) pic_width_in_luma_samples: u32,
    pub(crate) pic_height_in_luma_samples: u32,
}

/// VUI parameters.
///
/// `vui_parameters()`
///
/// - ISO/IEC 23008-2 - E.2.1
/// - ISO/IEC 23008-2 - E.3.1
#[derive(Debug, Clone, PartialEq)]
pub struct VuiParameters {
    /// [`AspectRatioInfo`] if `aspect_ratio_info_present_flag` is `true`.
    pub aspect_ratio_info: AspectRatioInfo,
    /// Equal to `true` indicates that the cropped decoded pictures output are suitable
    /// for display using overscan.
    ///
    /// Equal to `false` indicates that the cropped decoded pictures output contain visually important information
    /// in the entire region out to the edges of the conformance cropping window of the picture.
    ///
    /// Only present if `overscan_info_present_flag` is `true`.
    pub overscan_appropriate_flag: Option<bool>,
    /// `video_format`, `video_full_range_flag` and the colour description, if `video_signal_type_present_flag`
    /// is `true`. Otherwise the inferred values.
    pub video_signal_type: VideoSignalType,
    /// `chroma_sample_loc_type_top_field` and `chroma_sample_loc_type_bottom_field`, if
    /// `chroma_loc_info_present_flag` is `true`.
    pub chroma_loc_info: Option<ChromaLocInfo>,
    /// Equal to `true` indicates that the value of all decoded chroma samples is
    /// equal to [`1 << (BitDepthC − 1)`](crate::SpsRbsp::bit_depth_c).
    pub neutral_chroma_indication_flag: bool,
    /// Equal to `true` indicates that the CVS conveys pictures that represent fields.
    pub field_seq_flag: bool,
    /// Equal to `true` specifies that picture timing SEI messages are present for every
    /// picture and include the `pic_struct`, `source_scan_type`, and `duplicate_flag` syntax elements.
    pub frame_field_info_present_flag: bool,
    /// The default display window, all zero when `default_display_window_flag` is `false`.
    pub default_display_window: DefaultDisplayWindow,
    /// Present if `vui_timing_info_present_flag` is `true`.
    pub vui_timing_info: Option<VuiTimingInfo>,
    /// The bitstream restriction, or its inferred values when `bitstream_restriction_flag` is `false`.
    pub bitstream_restriction: BitStreamRestriction,
}

impl VuiParameters {
    /// Parses `vui_parameters()`.
    ///
    /// `vui_hrd_parameters_present_flag` equal to 1 is not supported and fails with
    /// [`NaluError::Unimplemented`].
    pub(crate) fn parse(reader: &mut NaluBitReader, ctx: VuiContext<'_>) -> Result<Self> {
        let mut aspect_ratio_info = AspectRatioInfo::Predefined(AspectRatioIdc::Unspecified);
        let aspect_ratio_info_present_flag = reader.read_bit()?;
        if aspect_ratio_info_present_flag {
            aspect_ratio_info = match AspectRatioIdc::from(reader.read_u8()?) {
                AspectRatioIdc::ExtendedSar => AspectRatioInfo::ExtendedSar {
                    sar_width: reader.read_bits(16)? as u16,
                    sar_height: reader.read_bits(16)? as u16,
                },
                aspect_ratio_idc => AspectRatioInfo::Predefined(aspect_ratio_idc),
            };
        }

        let overscan_info_present_flag = reader.read_bit()?;
        let overscan_appropriate_flag = if overscan_info_present_flag {
            Some(reader.read_bit()?)
        } else {
            None
        };

        let mut video_signal_type = VideoSignalType::default();
        let video_signal_type_present_flag = reader.read_bit()?;
        if video_signal_type_present_flag {
            video_signal_type.video_format = VideoFormat::from(reader.read_bits(3)? as u8);
            video_signal_type.video_full_range_flag = reader.read_bit()?;

            let colour_description_present_flag = reader.read_bit()?;
            if colour_description_present_flag {
                video_signal_type.colour_primaries = reader.read_u8()?;
                video_signal_type.transfer_characteristics = reader.read_u8()?;
                let matrix_coeffs = reader.read_u8()?;

                // E.3.1: identity matrix only for 4:4:4 with equal bit depths
                if matrix_coeffs == 0 && !(ctx.bit_depth_c == ctx.bit_depth_y && ctx.chroma_format_idc == 3) {
                    return Err(NaluError::invalid("matrix_coeffs", matrix_coeffs));
                }

                // YCgCo may add one bit of chroma depth, only in 4:4:4
                if matrix_coeffs == 8
                    && !(ctx.bit_depth_c == ctx.bit_depth_y
                        || (ctx.bit_depth_c == ctx.bit_depth_y + 1 && ctx.chroma_format_idc == 3))
                {
                    return Err(NaluError::invalid("matrix_coeffs", matrix_coeffs));
                }

                video_signal_type.matrix_coeffs = matrix_coeffs;
            }
        }

        let chroma_loc_info_present_flag = reader.read_bit()?;
        if chroma_loc_info_present_flag && ctx.chroma_format_idc != 1 {
            return Err(NaluError::invalid("chroma_loc_info_present_flag", 1));
        }

        let chroma_loc_info = if chroma_loc_info_present_flag {
            let chroma_sample_loc_type_top_field = reader.read_exp_golomb()?;
            range_check!(chroma_sample_loc_type_top_field, 0, 5)?;
            let chroma_sample_loc_type_bottom_field = reader.read_exp_golomb()?;
            range_check!(chroma_sample_loc_type_bottom_field, 0, 5)?;
            Some(ChromaLocInfo {
                top_field: chroma_sample_loc_type_top_field as u8,
                bottom_field: chroma_sample_loc_type_bottom_field as u8,
            })
        } else {
            None
        };

        let neutral_chroma_indication_flag = reader.read_bit()?;
        let field_seq_flag = reader.read_bit()?;

        let (frame_only, progressive, interlaced) = ctx.general_profile.map_or((false, false, false), |p| {
            (p.frame_only_constraint_flag, p.progressive_source_flag, p.interlaced_source_flag)
        });

        if frame_only && field_seq_flag {
            return Err(NaluError::invalid("field_seq_flag", 1));
        }

        let frame_field_info_present_flag = reader.read_bit()?;
        if !frame_field_info_present_flag && (field_seq_flag || (progressive && interlaced)) {
            return Err(NaluError::invalid("frame_field_info_present_flag", 0));
        }

        let mut default_display_window = DefaultDisplayWindow::default();
        let default_display_window_flag = reader.read_bit()?;
        if default_display_window_flag {
            default_display_window = DefaultDisplayWindow {
                def_disp_win_left_offset: reader.read_exp_golomb()?,
                def_disp_win_right_offset: reader.read_exp_golomb()?,
                def_disp_win_top_offset: reader.read_exp_golomb()?,
                def_disp_win_bottom_offset: reader.read_exp_golomb()?,
            };

            let window = &default_display_window;
            let conf = ctx.conformance_window;
            let horizontal = window.left_offset(conf) + window.right_offset(conf);
            if u64::from(ctx.sub_width_c) * horizontal >= u64::from(ctx.pic_width_in_luma_samples) {
                return Err(NaluError::invalid("def_disp_win_right_offset", window.def_disp_win_right_offset));
            }

            let vertical = window.top_offset(conf) + window.bottom_offset(conf);
            if u64::from(ctx.sub_height_c) * vertical >= u64::from(ctx.pic_height_in_luma_samples) {
                return Err(NaluError::invalid("def_disp_win_bottom_offset", window.def_disp_win_bottom_offset));
            }
        }

        let vui_timing_info_present_flag = reader.read_bit()?;
        let vui_timing_info = if vui_timing_info_present_flag {
            Some(VuiTimingInfo::parse(reader)?)
        } else {
            None
        };

        let bitstream_restriction_flag = reader.read_bit()?;
        let bitstream_restriction = if bitstream_restriction_flag {
            BitStreamRestriction::parse(reader)?
        } else {
            BitStreamRestriction::default()
        };

        Ok(Self {
            aspect_ratio_info,
            overscan_appropriate_flag,
            video_signal_type,
            chroma_loc_info,
            neutral_chroma_indication_flag,
            field_seq_flag,
            frame_field_info_present_flag,
            default_display_window,
            vui_timing_info,
            bitstream_restriction,
        })
    }
}

/// Specifies the value of the sample aspect ratio of the luma samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatioInfo {
    /// Any value other than [`AspectRatioIdc::ExtendedSar`].
    Predefined(AspectRatioIdc),
    /// [`AspectRatioIdc::ExtendedSar`].
    ExtendedSar {
        /// Indicates the horizontal size of the sample aspect ratio (in arbitrary units).
        sar_width: u16,
        /// Indicates the vertical size of the sample aspect ratio (in the same arbitrary units as `sar_width`).
        sar_height: u16,
    },
}

impl AspectRatioInfo {
    /// The sample aspect ratio as `(width, height)`, when known.
    ///
    /// An extended ratio with a zero term is unspecified (E.3.1).
    pub fn sample_aspect_ratio(&self) -> Option<(u16, u16)> {
        match *self {
            AspectRatioInfo::Predefined(aspect_ratio_idc) => aspect_ratio_idc.sample_aspect_ratio(),
            AspectRatioInfo::ExtendedSar { sar_width, sar_height } => {
                (sar_width != 0 && sar_height != 0).then_some((sar_width, sar_height))
            }
        }
    }
}

/// Directly part of [`VuiParameters`].
///
/// ISO/IEC 23008-2 - E.3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSignalType {
    /// Indicates the representation of the pictures, see [`VideoFormat`].
    pub video_format: VideoFormat,
    /// Indicates the black level and range of the luma and chroma signals.
    pub video_full_range_flag: bool,
    /// Indicates the chromaticity coordinates of the source primaries, Table E.3.
    pub colour_primaries: u8,
    /// Table E.4.
    pub transfer_characteristics: u8,
    /// Describes the matrix coefficients used in deriving luma and chroma signals, Table E.5.
    pub matrix_coeffs: u8,
}

impl Default for VideoSignalType {
    fn default() -> Self {
        Self {
            video_format: VideoFormat::Unspecified,
            video_full_range_flag: false,
            colour_primaries: 2,
            transfer_characteristics: 2,
            matrix_coeffs: 2,
        }
    }
}

/// Location of chroma samples, see Figure E.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaLocInfo {
    /// `chroma_sample_loc_type_top_field`, in range \[0, 5\].
    pub top_field: u8,
    /// `chroma_sample_loc_type_bottom_field`, in range \[0, 5\].
    pub bottom_field: u8,
}

/// Directly part of [`VuiParameters`].
///
/// Offsets are added to the [`ConformanceWindow`] ones, see [`left_offset`](Self::left_offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefaultDisplayWindow {
    /// Left offset of the window, in chroma sample units.
    pub def_disp_win_left_offset: u32,
    /// Right offset of the window, in chroma sample units.
    pub def_disp_win_right_offset: u32,
    /// Top offset of the window, in chroma sample units.
    pub def_disp_win_top_offset: u32,
    /// Bottom offset of the window, in chroma sample units.
    pub def_disp_win_bottom_offset: u32,
}

impl DefaultDisplayWindow {
    /// `leftOffset = conf_win_left_offset + def_disp_win_left_offset` (E-68)
    pub fn left_offset(&self, conformance_window: &ConformanceWindow) -> u64 {
        u64::from(conformance_window.conf_win_left_offset) + u64::from(self.def_disp_win_left_offset)
    }

    /// `rightOffset = conf_win_right_offset + def_disp_win_right_offset` (E-69)
    pub fn right_offset(&self, conformance_window: &ConformanceWindow) -> u64 {
        u64::from(conformance_window.conf_win_right_offset) + u64::from(self.def_disp_win_right_offset)
    }

    /// `topOffset = conf_win_top_offset + def_disp_win_top_offset` (E-70)
    pub fn top_offset(&self, conformance_window: &ConformanceWindow) -> u64 {
        u64::from(conformance_window.conf_win_top_offset) + u64::from(self.def_disp_win_top_offset)
    }

    /// `bottomOffset = conf_win_bottom_offset + def_disp_win_bottom_offset` (E-71)
    pub fn bottom_offset(&self, conformance_window: &ConformanceWindow) -> u64 {
        u64::from(conformance_window.conf_win_bottom_offset) + u64::from(self.def_disp_win_bottom_offset)
    }
}

/// Timing information of the CVS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VuiTimingInfo {
    /// The number of time units of a clock operating at the frequency `time_scale` Hz that
    /// corresponds to one increment (called a clock tick) of a clock tick counter.
    pub num_units_in_tick: NonZero<u32>,
    /// The number of time units that pass in one second.
    pub time_scale: NonZero<u32>,
    /// Equal to `true` indicates that the picture order count value is proportional to the output time.
    pub poc_proportional_to_timing_flag: bool,
    /// This value plus 1 specifies the number of clock ticks corresponding to a
    /// difference of picture order count values equal to 1.
    ///
    /// The value is in range \[0, 2^32 − 2\].
    pub num_ticks_poc_diff_one_minus1: Option<u32>,
}

impl VuiTimingInfo {
    fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let num_units_in_tick =
            NonZero::new(reader.read_bits(32)?).ok_or(NaluError::invalid("vui_num_units_in_tick", 0))?;
        let time_scale = NonZero::new(reader.read_bits(32)?).ok_or(NaluError::invalid("vui_time_scale", 0))?;

        let poc_proportional_to_timing_flag = reader.read_bit()?;
        let num_ticks_poc_diff_one_minus1 = if poc_proportional_to_timing_flag {
            let vui_num_ticks_poc_diff_one_minus1 = reader.read_exp_golomb()?;
            range_check!(vui_num_ticks_poc_diff_one_minus1, 0, u32::MAX - 1)?;
            Some(vui_num_ticks_poc_diff_one_minus1)
        } else {
            None
        };

        let vui_hrd_parameters_present_flag = reader.read_bit()?;
        if vui_hrd_parameters_present_flag {
            warn!("vui hrd_parameters are not supported");
            return Err(NaluError::Unimplemented("vui hrd_parameters"));
        }

        Ok(Self {
            num_units_in_tick,
            time_scale,
            poc_proportional_to_timing_flag,
            num_ticks_poc_diff_one_minus1,
        })
    }

    /// Frames per second, `time_scale / num_units_in_tick`.
    pub fn frame_rate(&self) -> f64 {
        f64::from(self.time_scale.get()) / f64::from(self.num_units_in_tick.get())
    }
}

/// Directly part of [`VuiParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitStreamRestriction {
    /// Equal to `true` indicates that each active PPS has the same tile syntax elements.
    pub tiles_fixed_structure_flag: bool,
    /// Equal to `false` indicates that no sample outside the picture boundaries is used for inter prediction.
    pub motion_vectors_over_pic_boundaries_flag: bool,
    /// Equal to `Some(true)` indicates that all P and B slices of a picture have identical reference picture lists.
    pub restricted_ref_pic_lists_flag: Option<bool>,
    /// When not equal to 0, establishes a bound on the maximum possible size
    /// of distinct coded spatial segmentation regions in the pictures of the CVS.
    ///
    /// The value is in range \[0, 4095\].
    pub min_spatial_segmentation_idc: u16,
    /// The value is in range \[0, 16\].
    pub max_bytes_per_pic_denom: u8,
    /// The value is in range \[0, 16\].
    pub max_bits_per_min_cu_denom: u8,
    /// Maximum absolute horizontal motion vector component, in quarter luma samples, as a power of two.
    ///
    /// The value is in range \[0, 15\].
    pub log2_max_mv_length_horizontal: u8,
    /// Same as [`log2_max_mv_length_horizontal`](Self::log2_max_mv_length_horizontal), vertically.
    pub log2_max_mv_length_vertical: u8,
}

impl Default for BitStreamRestriction {
    fn default() -> Self {
        Self {
            tiles_fixed_structure_flag: false,
            motion_vectors_over_pic_boundaries_flag: true,
            restricted_ref_pic_lists_flag: None,
            min_spatial_segmentation_idc: 0,
            max_bytes_per_pic_denom: 2,
            max_bits_per_min_cu_denom: 1,
            log2_max_mv_length_horizontal: 15,
            log2_max_mv_length_vertical: 15,
        }
    }
}

impl BitStreamRestriction {
    fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let tiles_fixed_structure_flag = reader.read_bit()?;
        let motion_vectors_over_pic_boundaries_flag = reader.read_bit()?;
        let restricted_ref_pic_lists_flag = Some(reader.read_bit()?);

        let min_spatial_segmentation_idc = reader.read_exp_golomb()?;
        range_check!(min_spatial_segmentation_idc, 0, 4095)?;
        let max_bytes_per_pic_denom = reader.read_exp_golomb()?;
        range_check!(max_bytes_per_pic_denom, 0, 16)?;
        let max_bits_per_min_cu_denom = reader.read_exp_golomb()?;
        range_check!(max_bits_per_min_cu_denom, 0, 16)?;
        let log2_max_mv_length_horizontal = reader.read_exp_golomb()?;
        range_check!(log2_max_mv_length_horizontal, 0, 15)?;
        let log2_max_mv_length_vertical = reader.read_exp_golomb()?;
        range_check!(log2_max_mv_length_vertical, 0, 15)?;

        Ok(Self {
            tiles_fixed_structure_flag,
            motion_vectors_over_pic_boundaries_flag,
            restricted_ref_pic_lists_flag,
            min_spatial_segmentation_idc: min_spatial_segmentation_idc as u16,
            max_bytes_per_pic_denom: max_bytes_per_pic_denom as u8,
            max_bits_per_min_cu_denom: max_bits_per_min_cu_denom as u8,
            log2_max_mv_length_horizontal: log2_max_mv_length_horizontal as u8,
            log2_max_mv_length_vertical: log2_max_mv_length_vertical as u8,
        })
    }

    /// `minSpatialSegmentationTimes4 = min_spatial_segmentation_idc + 4` (E-72)
    pub fn min_spatial_segmentation_times4(&self) -> u16 {
        self.min_spatial_segmentation_idc + 4
    }
}
