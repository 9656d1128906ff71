use std::num::NonZero;

use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};
use tracing::warn;

use crate::nal_unit_header::NALUnitHeader;
use crate::rbsp_trailing_bits::rbsp_trailing_bits;
use crate::{NALUnitType, ProfileTierLevel, ScalingListData, SubLayerOrderingInfo};

mod conformance_window;
mod long_term_ref_pics;
mod pcm;
mod sps_3d_extension;
mod sps_multilayer_extension;
mod st_ref_pic_set;
mod vui_parameters;

pub use conformance_window::*;
pub use long_term_ref_pics::*;
pub use pcm::*;
pub use sps_3d_extension::*;
pub use sps_multilayer_extension::*;
pub use st_ref_pic_set::*;
pub use vui_parameters::{
    AspectRatioInfo, BitStreamRestriction, ChromaLocInfo, DefaultDisplayWindow, VideoSignalType, VuiParameters,
    VuiTimingInfo,
};

use self::vui_parameters::VuiContext;

// The data appears like this on the wire: `NALU(RBSP(SODB))`
//
// NALU: NAL unit, what is sent over the wire.
// RBSP: Raw byte sequence payload, the SODB plus trailing bits and emulation prevention.
// SODB: String of data bits, the actual payload.

/// `SubWidthC` for a `chroma_format_idc`.
///
/// ISO/IEC 23008-2 - Table 6-1
pub(crate) fn sub_width_c(chroma_format_idc: u8) -> Result<u8> {
    match chroma_format_idc {
        0 | 3 => Ok(1),
        1 | 2 => Ok(2),
        _ => Err(NaluError::invalid("chroma_format_idc", chroma_format_idc)),
    }
}

/// `SubHeightC` for a `chroma_format_idc`.
///
/// ISO/IEC 23008-2 - Table 6-1
pub(crate) fn sub_height_c(chroma_format_idc: u8) -> Result<u8> {
    match chroma_format_idc {
        0 | 2 | 3 => Ok(1),
        1 => Ok(2),
        _ => Err(NaluError::invalid("chroma_format_idc", chroma_format_idc)),
    }
}

/// Sequence parameter set contained in a NAL unit.
///
/// This only represents sequence parameter sets that are part of NAL units.
/// Therefore the NAL unit header is included in this struct as [`SpsNALUnit::nal_unit_header`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpsNALUnit {
    /// The NAL unit header.
    pub nal_unit_header: NALUnitHeader,
    /// The SPS RBSP.
    pub rbsp: SpsRbsp,
}

impl SpsNALUnit {
    /// Parses an SPS NAL unit, header included. Emulation prevention bytes may still be present.
    pub fn parse(nal_unit: &[u8]) -> Result<Self> {
        let mut reader = NaluBitReader::new(nal_unit)?;

        let nal_unit_header = NALUnitHeader::parse(&mut reader)?;
        if nal_unit_header.nal_unit_type != NALUnitType::SpsNut {
            return Err(NaluError::invalid("nal_unit_type", nal_unit_header.nal_unit_type as u8));
        }

        let rbsp = SpsRbsp::parse(&mut reader, nal_unit_header.nuh_layer_id)?;

        Ok(SpsNALUnit { nal_unit_header, rbsp })
    }
}

/// Sequence parameter set RBSP.
///
/// For parsing SPS RBSPs that are part of NAL units, please use [`SpsNALUnit::parse`].
///
/// `seq_parameter_set_rbsp()`
///
/// - ISO/IEC 23008-2 - 7.3.2.2
/// - ISO/IEC 23008-2 - 7.4.3.2
#[derive(Debug, Clone, PartialEq)]
pub struct SpsRbsp {
    /// Specifies the value of the `vps_video_parameter_set_id` of the active VPS.
    pub sps_video_parameter_set_id: u8,
    /// This value plus 1 specifies the maximum number of temporal sub-layers that may be
    /// present in each CVS referring to the SPS.
    ///
    /// The value is in range \[0, 6\].
    pub sps_max_sub_layers_minus1: u8,
    /// Specifies whether inter prediction is additionally restricted for CVSs referring to the SPS.
    ///
    /// When `sps_max_sub_layers_minus1 == 0`, this flag is `true`.
    pub sps_temporal_id_nesting_flag: bool,
    /// The [`ProfileTierLevel`] structure contained in this SPS.
    pub profile_tier_level: ProfileTierLevel,
    /// Provides an identifier for the SPS for reference by other syntax elements.
    ///
    /// The value is in range \[0, 15\].
    pub sps_seq_parameter_set_id: u32,
    /// Specifies the chroma sampling relative to the luma sampling as specified in ISO/IEC 23008-2 - 6.2.
    ///
    /// The value is in range \[0, 3\].
    pub chroma_format_idc: u8,
    /// Equal to `true` specifies that the three colour components of the 4:4:4 chroma format are coded separately.
    ///
    /// Defines [`ChromaArrayType`](Self::chroma_array_type).
    pub separate_colour_plane_flag: bool,
    /// Specifies the width of each decoded picture in units of luma samples.
    ///
    /// An integer multiple of `MinCbSizeY`.
    pub pic_width_in_luma_samples: NonZero<u32>,
    /// Specifies the height of each decoded picture in units of luma samples.
    ///
    /// An integer multiple of `MinCbSizeY`.
    pub pic_height_in_luma_samples: NonZero<u32>,
    /// The cropping window, zero when `conformance_window_flag` is `false`.
    pub conformance_window: ConformanceWindow,
    /// [`BitDepthY`](Self::bit_depth_y) minus 8, in range \[0, 8\].
    pub bit_depth_luma_minus8: u8,
    /// [`BitDepthC`](Self::bit_depth_c) minus 8, in range \[0, 8\].
    pub bit_depth_chroma_minus8: u8,
    /// Specifies the value of `MaxPicOrderCntLsb`.
    ///
    /// The value is in range \[0, 12\].
    pub log2_max_pic_order_cnt_lsb_minus4: u8,
    /// `sps_max_dec_pic_buffering_minus1`, `sps_max_num_reorder_pics` and `sps_max_latency_increase_plus1`.
    pub sub_layer_ordering_info: SubLayerOrderingInfo,
    /// This value plus 3 specifies the minimum luma coding block size.
    pub log2_min_luma_coding_block_size_minus3: u32,
    /// Specifies the difference between the maximum and minimum luma coding block size.
    pub log2_diff_max_min_luma_coding_block_size: u32,
    /// This value plus 2 specifies the minimum luma transform block size.
    pub log2_min_luma_transform_block_size_minus2: u32,
    /// Specifies the difference between the maximum and minimum luma transform block size.
    pub log2_diff_max_min_luma_transform_block_size: u32,
    /// Specifies the maximum hierarchy depth for transform units of coding units coded in inter prediction mode.
    pub max_transform_hierarchy_depth_inter: u32,
    /// Specifies the maximum hierarchy depth for transform units of coding units coded in intra prediction mode.
    pub max_transform_hierarchy_depth_intra: u32,
    /// The `scaling_list_enabled_flag`.
    pub scaling_list_enabled_flag: bool,
    /// Present when `sps_scaling_list_data_present_flag` is `true`.
    ///
    /// When scaling lists are enabled but not signalled, [`ScalingListData::default`] applies.
    pub scaling_list_data: Option<ScalingListData>,
    /// Equal to `true` specifies that asymmetric motion partitions may be used in coding tree blocks.
    pub amp_enabled_flag: bool,
    /// Equal to `true` specifies that the sample adaptive offset process is applied after deblocking.
    pub sample_adaptive_offset_enabled_flag: bool,
    /// Present when `pcm_enabled_flag` is `true`.
    pub pcm: Option<Pcm>,
    /// `st_ref_pic_set(i)` for every `i` in `0..num_short_term_ref_pic_sets`.
    pub short_term_ref_pic_sets: Vec<ShortTermRefPicSet>,
    /// Present when `long_term_ref_pics_present_flag` is `true`.
    pub long_term_ref_pics: Option<LongTermRefPics>,
    /// Specifies whether temporal motion vector predictors may be used in the CVS.
    pub sps_temporal_mvp_enabled_flag: bool,
    /// Specifies whether bi-linear interpolation is conditionally used in the intra prediction filtering process.
    pub strong_intra_smoothing_enabled_flag: bool,
    /// Present when `vui_parameters_present_flag` is `true`.
    pub vui_parameters: Option<VuiParameters>,
    /// Present when `sps_multilayer_extension_flag` is `true`.
    pub multilayer_extension: Option<SpsMultilayerExtension>,
    /// Present when `sps_3d_extension_flag` is `true`.
    pub sps_3d_extension: Option<Sps3dExtension>,
    /// `sps_extension_4bits`, any extension data it announces is skipped.
    pub sps_extension_4bits: u8,
}

impl SpsRbsp {
    /// Parses the RBSP following the NAL unit header.
    ///
    /// The range and screen content coding extensions are not supported and fail with
    /// [`NaluError::Unimplemented`].
    pub fn parse(reader: &mut NaluBitReader, nuh_layer_id: u8) -> Result<Self> {
        let sps_video_parameter_set_id = reader.read_bits(4)? as u8;

        let sps_max_sub_layers_minus1 = reader.read_bits(3)? as u8;
        if nuh_layer_id != 0 && sps_max_sub_layers_minus1 == 7 {
            // MultiLayerExtSpsFlag, F.7.3.2.2.1
            warn!(nuh_layer_id, "multi-layer sps syntax is not supported");
            return Err(NaluError::Unimplemented("multi-layer sps"));
        }
        range_check!(sps_max_sub_layers_minus1, 0, 6)?;

        let sps_temporal_id_nesting_flag = reader.read_bit()?;
        if sps_max_sub_layers_minus1 == 0 && !sps_temporal_id_nesting_flag {
            return Err(NaluError::invalid("sps_temporal_id_nesting_flag", 0));
        }

        let profile_tier_level = ProfileTierLevel::parse(reader, true, sps_max_sub_layers_minus1)?;

        let sps_seq_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(sps_seq_parameter_set_id, 0, 15)?;

        let chroma_format_idc = reader.read_exp_golomb()?;
        range_check!(chroma_format_idc, 0, 3)?;
        let chroma_format_idc = chroma_format_idc as u8;

        let separate_colour_plane_flag = if chroma_format_idc == 3 { reader.read_bit()? } else { false };

        let pic_width_in_luma_samples = reader.read_exp_golomb()?;
        let pic_width_in_luma_samples =
            NonZero::new(pic_width_in_luma_samples).ok_or(NaluError::invalid("pic_width_in_luma_samples", 0))?;
        let pic_height_in_luma_samples = reader.read_exp_golomb()?;
        let pic_height_in_luma_samples =
            NonZero::new(pic_height_in_luma_samples).ok_or(NaluError::invalid("pic_height_in_luma_samples", 0))?;

        let conformance_window_flag = reader.read_bit()?;
        let conformance_window = if conformance_window_flag {
            ConformanceWindow::parse(reader)?
        } else {
            ConformanceWindow::default()
        };

        let sub_width_c = sub_width_c(chroma_format_idc)?;
        let sub_height_c = sub_height_c(chroma_format_idc)?;

        let horizontal_crop = u64::from(sub_width_c)
            * (u64::from(conformance_window.conf_win_left_offset) + u64::from(conformance_window.conf_win_right_offset));
        if horizontal_crop >= u64::from(pic_width_in_luma_samples.get()) {
            return Err(NaluError::invalid(
                "conf_win_right_offset",
                conformance_window.conf_win_right_offset,
            ));
        }
        let vertical_crop = u64::from(sub_height_c)
            * (u64::from(conformance_window.conf_win_top_offset) + u64::from(conformance_window.conf_win_bottom_offset));
        if vertical_crop >= u64::from(pic_height_in_luma_samples.get()) {
            return Err(NaluError::invalid(
                "conf_win_bottom_offset",
                conformance_window.conf_win_bottom_offset,
            ));
        }

        let bit_depth_luma_minus8 = reader.read_exp_golomb()?;
        range_check!(bit_depth_luma_minus8, 0, 8)?;
        let bit_depth_luma_minus8 = bit_depth_luma_minus8 as u8;
        let bit_depth_y = 8 + bit_depth_luma_minus8;

        let bit_depth_chroma_minus8 = reader.read_exp_golomb()?;
        range_check!(bit_depth_chroma_minus8, 0, 8)?;
        let bit_depth_chroma_minus8 = bit_depth_chroma_minus8 as u8;
        let bit_depth_c = 8 + bit_depth_chroma_minus8;

        let log2_max_pic_order_cnt_lsb_minus4 = reader.read_exp_golomb()?;
        range_check!(log2_max_pic_order_cnt_lsb_minus4, 0, 12)?;
        let log2_max_pic_order_cnt_lsb_minus4 = log2_max_pic_order_cnt_lsb_minus4 as u8;

        let sps_sub_layer_ordering_info_present_flag = reader.read_bit()?;
        let sub_layer_ordering_info =
            SubLayerOrderingInfo::parse(reader, sps_sub_layer_ordering_info_present_flag, sps_max_sub_layers_minus1)?;

        let log2_min_luma_coding_block_size_minus3 = reader.read_exp_golomb()?;
        range_check!(log2_min_luma_coding_block_size_minus3, 0, 3)?;
        let log2_diff_max_min_luma_coding_block_size = reader.read_exp_golomb()?;
        range_check!(log2_diff_max_min_luma_coding_block_size, 0, 3)?;

        let min_cb_log2_size_y = log2_min_luma_coding_block_size_minus3 + 3;
        let ctb_log2_size_y = min_cb_log2_size_y + log2_diff_max_min_luma_coding_block_size;
        if ctb_log2_size_y > 6 {
            return Err(NaluError::invalid(
                "log2_diff_max_min_luma_coding_block_size",
                log2_diff_max_min_luma_coding_block_size,
            ));
        }

        let min_cb_size_y = 1 << min_cb_log2_size_y;
        if pic_width_in_luma_samples.get() % min_cb_size_y != 0 {
            return Err(NaluError::invalid("pic_width_in_luma_samples", pic_width_in_luma_samples.get()));
        }
        if pic_height_in_luma_samples.get() % min_cb_size_y != 0 {
            return Err(NaluError::invalid("pic_height_in_luma_samples", pic_height_in_luma_samples.get()));
        }

        // MinTbLog2SizeY < MinCbLog2SizeY
        let log2_min_luma_transform_block_size_minus2 = reader.read_exp_golomb()?;
        range_check!(log2_min_luma_transform_block_size_minus2, 0, min_cb_log2_size_y - 3)?;
        let min_tb_log2_size_y = log2_min_luma_transform_block_size_minus2 + 2;

        // MaxTbLog2SizeY <= Min(CtbLog2SizeY, 5)
        let log2_diff_max_min_luma_transform_block_size = reader.read_exp_golomb()?;
        range_check!(
            log2_diff_max_min_luma_transform_block_size,
            0,
            ctb_log2_size_y.min(5) - min_tb_log2_size_y
        )?;

        let max_transform_hierarchy_depth_inter = reader.read_exp_golomb()?;
        range_check!(max_transform_hierarchy_depth_inter, 0, ctb_log2_size_y - min_tb_log2_size_y)?;
        let max_transform_hierarchy_depth_intra = reader.read_exp_golomb()?;
        range_check!(max_transform_hierarchy_depth_intra, 0, ctb_log2_size_y - min_tb_log2_size_y)?;

        let scaling_list_enabled_flag = reader.read_bit()?;
        let mut scaling_list_data = None;
        if scaling_list_enabled_flag {
            let sps_scaling_list_data_present_flag = reader.read_bit()?;
            if sps_scaling_list_data_present_flag {
                scaling_list_data = Some(ScalingListData::parse(reader)?);
            }
        }

        let amp_enabled_flag = reader.read_bit()?;
        let sample_adaptive_offset_enabled_flag = reader.read_bit()?;

        let pcm_enabled_flag = reader.read_bit()?;
        let pcm = if pcm_enabled_flag {
            Some(Pcm::parse(reader, bit_depth_y, bit_depth_c, min_cb_log2_size_y, ctb_log2_size_y)?)
        } else {
            None
        };

        let num_short_term_ref_pic_sets = reader.read_exp_golomb()? as usize;
        range_check!(num_short_term_ref_pic_sets, 0, 64)?;
        let mut short_term_ref_pic_sets = Vec::with_capacity(num_short_term_ref_pic_sets);
        for st_rps_idx in 0..num_short_term_ref_pic_sets {
            let set = ShortTermRefPicSet::parse(
                reader,
                st_rps_idx,
                num_short_term_ref_pic_sets,
                &short_term_ref_pic_sets,
            )?;
            short_term_ref_pic_sets.push(set);
        }

        let long_term_ref_pics_present_flag = reader.read_bit()?;
        let long_term_ref_pics = if long_term_ref_pics_present_flag {
            Some(LongTermRefPics::parse(reader, log2_max_pic_order_cnt_lsb_minus4)?)
        } else {
            None
        };

        let sps_temporal_mvp_enabled_flag = reader.read_bit()?;
        let strong_intra_smoothing_enabled_flag = reader.read_bit()?;

        let vui_parameters_present_flag = reader.read_bit()?;
        let vui_parameters = if vui_parameters_present_flag {
            Some(VuiParameters::parse(
                reader,
                VuiContext {
                    bit_depth_y,
                    bit_depth_c,
                    chroma_format_idc,
                    general_profile: profile_tier_level.general_profile.as_ref(),
                    conformance_window: &conformance_window,
                    sub_width_c,
                    sub_height_c,
                    pic_width_in_luma_samples: pic_width_in_luma_samples.get(),
                    pic_height_in_luma_samples: pic_height_in_luma_samples.get(),
                },
            )?)
        } else {
            None
        };

        let mut multilayer_extension = None;
        let mut sps_3d_extension = None;
        let mut sps_extension_4bits = 0;

        let sps_extension_present_flag = reader.read_bit()?;
        if sps_extension_present_flag {
            let sps_range_extension_flag = reader.read_bit()?;
            let sps_multilayer_extension_flag = reader.read_bit()?;
            let sps_3d_extension_flag = reader.read_bit()?;
            let sps_scc_extension_flag = reader.read_bit()?;
            sps_extension_4bits = reader.read_bits(4)? as u8;

            if sps_range_extension_flag {
                warn!("sps_range_extension is not supported");
                return Err(NaluError::Unimplemented("sps_range_extension"));
            }

            if sps_multilayer_extension_flag {
                multilayer_extension = Some(SpsMultilayerExtension::parse(reader)?);
            }

            if sps_3d_extension_flag {
                sps_3d_extension = Some(Sps3dExtension::parse(reader, min_cb_log2_size_y, ctb_log2_size_y)?);
            }

            if sps_scc_extension_flag {
                warn!("sps_scc_extension is not supported");
                return Err(NaluError::Unimplemented("sps_scc_extension"));
            }

            if sps_extension_4bits != 0 {
                // sps_extension_data_flag until the stop bit
                while !reader.ended() {
                    reader.read_bit()?;
                }
            }
        }

        rbsp_trailing_bits(reader)?;

        Ok(SpsRbsp {
            sps_video_parameter_set_id,
            sps_max_sub_layers_minus1,
            sps_temporal_id_nesting_flag,
            profile_tier_level,
            sps_seq_parameter_set_id,
            chroma_format_idc,
            separate_colour_plane_flag,
            pic_width_in_luma_samples,
            pic_height_in_luma_samples,
            conformance_window,
            bit_depth_luma_minus8,
            bit_depth_chroma_minus8,
            log2_max_pic_order_cnt_lsb_minus4,
            sub_layer_ordering_info,
            log2_min_luma_coding_block_size_minus3,
            log2_diff_max_min_luma_coding_block_size,
            log2_min_luma_transform_block_size_minus2,
            log2_diff_max_min_luma_transform_block_size,
            max_transform_hierarchy_depth_inter,
            max_transform_hierarchy_depth_intra,
            scaling_list_enabled_flag,
            scaling_list_data,
            amp_enabled_flag,
            sample_adaptive_offset_enabled_flag,
            pcm,
            short_term_ref_pic_sets,
            long_term_ref_pics,
            sps_temporal_mvp_enabled_flag,
            strong_intra_smoothing_enabled_flag,
            vui_parameters,
            multilayer_extension,
            sps_3d_extension,
            sps_extension_4bits,
        })
    }

    /// `SubWidthC`, see ISO/IEC 23008-2 - Table 6-1.
    ///
    /// Fails for a `chroma_format_idc` above 3.
    pub fn sub_width_c(&self) -> Result<u8> {
        sub_width_c(self.chroma_format_idc)
    }

    /// `SubHeightC`, see ISO/IEC 23008-2 - Table 6-1.
    ///
    /// Fails for a `chroma_format_idc` above 3.
    pub fn sub_height_c(&self) -> Result<u8> {
        sub_height_c(self.chroma_format_idc)
    }

    /// Width of the conformance cropping window in luma samples.
    ///
    /// `pic_width_in_luma_samples - SubWidthC * (conf_win_left_offset + conf_win_right_offset)`
    pub fn cropped_width(&self) -> Result<u64> {
        let crop = u64::from(self.sub_width_c()?)
            * (u64::from(self.conformance_window.conf_win_left_offset)
                + u64::from(self.conformance_window.conf_win_right_offset));
        u64::from(self.pic_width_in_luma_samples.get())
            .checked_sub(crop)
            .ok_or(NaluError::invalid("conf_win_right_offset", self.conformance_window.conf_win_right_offset))
    }

    /// Height of the conformance cropping window in luma samples.
    ///
    /// `pic_height_in_luma_samples - SubHeightC * (conf_win_top_offset + conf_win_bottom_offset)`
    pub fn cropped_height(&self) -> Result<u64> {
        let crop = u64::from(self.sub_height_c()?)
            * (u64::from(self.conformance_window.conf_win_top_offset)
                + u64::from(self.conformance_window.conf_win_bottom_offset));
        u64::from(self.pic_height_in_luma_samples.get())
            .checked_sub(crop)
            .ok_or(NaluError::invalid("conf_win_bottom_offset", self.conformance_window.conf_win_bottom_offset))
    }

    /// `ChromaArrayType`, 0 when the colour planes are coded separately.
    pub fn chroma_array_type(&self) -> u8 {
        if self.separate_colour_plane_flag {
            0
        } else {
            self.chroma_format_idc
        }
    }

    /// `BitDepthY = 8 + bit_depth_luma_minus8` (7-4)
    pub fn bit_depth_y(&self) -> u8 {
        8 + self.bit_depth_luma_minus8
    }

    /// `BitDepthC = 8 + bit_depth_chroma_minus8` (7-6)
    pub fn bit_depth_c(&self) -> u8 {
        8 + self.bit_depth_chroma_minus8
    }

    /// `MaxPicOrderCntLsb = 2^(log2_max_pic_order_cnt_lsb_minus4 + 4)` (7-8)
    pub fn max_pic_order_cnt_lsb(&self) -> u32 {
        1 << (u32::from(self.log2_max_pic_order_cnt_lsb_minus4) + 4)
    }

    /// `MinCbLog2SizeY = log2_min_luma_coding_block_size_minus3 + 3` (7-10)
    pub fn min_cb_log2_size_y(&self) -> u32 {
        self.log2_min_luma_coding_block_size_minus3 + 3
    }

    /// `CtbLog2SizeY = MinCbLog2SizeY + log2_diff_max_min_luma_coding_block_size` (7-11)
    pub fn ctb_log2_size_y(&self) -> u32 {
        self.min_cb_log2_size_y() + self.log2_diff_max_min_luma_coding_block_size
    }

    /// `CtbSizeY = 1 << CtbLog2SizeY` (7-13)
    pub fn ctb_size_y(&self) -> u32 {
        1 << self.ctb_log2_size_y()
    }

    /// `PicWidthInCtbsY = Ceil(pic_width_in_luma_samples ÷ CtbSizeY)` (7-15)
    pub fn pic_width_in_ctbs_y(&self) -> u32 {
        self.pic_width_in_luma_samples.get().div_ceil(self.ctb_size_y())
    }

    /// `PicHeightInCtbsY = Ceil(pic_height_in_luma_samples ÷ CtbSizeY)` (7-17)
    pub fn pic_height_in_ctbs_y(&self) -> u32 {
        self.pic_height_in_luma_samples.get().div_ceil(self.ctb_size_y())
    }

    /// The scaling lists in effect: the signalled ones, the defaults when enabled but not
    /// signalled, `None` when scaling lists are disabled.
    pub fn effective_scaling_list_data(&self) -> Option<ScalingListData> {
        self.scaling_list_enabled_flag
            .then(|| self.scaling_list_data.clone().unwrap_or_default())
    }
}
