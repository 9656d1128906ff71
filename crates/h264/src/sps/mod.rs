mod frame_crop_info;
mod pic_order_count_type1;
mod sps_ext;
mod vui_parameters;

use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};

pub use self::frame_crop_info::FrameCropInfo;
pub use self::pic_order_count_type1::PicOrderCountType1;
pub use self::sps_ext::{ScalingList, SpsExtended};
pub use self::vui_parameters::{
    AspectRatioInfo, BitstreamRestriction, ChromaSampleLoc, ColourDescription, TimingInfo, VideoSignalType,
    VuiParameters,
};
use crate::{NALUnitHeader, NALUnitType};

/// Profiles whose SPS carries the chroma format, bit depths and scaling matrices.
///
/// ISO/IEC 14496-10 - 7.3.2.1.1
const HIGH_PROFILES: [u8; 12] = [100, 110, 122, 244, 44, 83, 86, 118, 128, 138, 139, 134];

/// The Sequence Parameter Set.
/// ISO/IEC-14496-10-2022 - 7.3.2.1.1
#[derive(Debug, Clone, PartialEq)]
pub struct Sps {
    /// The `nal_ref_idc` of the NAL unit header. It is never 0 for an SPS.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.1
    pub nal_ref_idc: u8,

    /// The `nal_unit_type`, always [`NALUnitType::SPS`].
    pub nal_unit_type: NALUnitType,

    /// The `profile_idc` of the coded video sequence, 8 bits.
    pub profile_idc: u8,

    /// The byte holding the six constraint set flags and `reserved_zero_2bits`.
    ///
    /// This is what decoder configuration strings call the profile compatibility byte.
    pub constraint_set: u8,

    /// `constraint_set0_flag`: `1` if it abides by the constraints in A.2.1.
    pub constraint_set0_flag: bool,

    /// `constraint_set1_flag`: `1` if it abides by the constraints in A.2.2.
    pub constraint_set1_flag: bool,

    /// `constraint_set2_flag`: `1` if it abides by the constraints in A.2.3.
    pub constraint_set2_flag: bool,

    /// `constraint_set3_flag`. Its meaning depends on the profile, see 7.4.2.1.1.
    pub constraint_set3_flag: bool,

    /// `constraint_set4_flag`. Its meaning depends on the profile, see 7.4.2.1.1.
    pub constraint_set4_flag: bool,

    /// `constraint_set5_flag`. Its meaning depends on the profile, see 7.4.2.1.1.
    pub constraint_set5_flag: bool,

    /// The `level_idc` of the coded video sequence, 8 bits.
    pub level_idc: u8,

    /// The `seq_parameter_set_id`, used by PPS to refer to this SPS.
    ///
    /// The value of this ranges from \[0, 31\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    pub seq_parameter_set_id: u32,

    /// The chroma format, bit depth and scaling matrix fields.
    ///
    /// Only present for profiles 100, 110, 122, 244, 44, 83, 86, 118, 128, 138, 139 and 134.
    /// When absent `chroma_format_idc` is inferred to be 1 (4:2:0).
    pub sps_ext: Option<SpsExtended>,

    /// The `log2_max_frame_num_minus4`, used to derive `MaxFrameNum`.
    ///
    /// The value of this ranges from \[0, 12\].
    pub log2_max_frame_num_minus4: u32,

    /// The `pic_order_cnt_type`, the method used to decode the picture order count (8.2.1).
    ///
    /// The value of this ranges from \[0, 2\].
    pub pic_order_cnt_type: u8,

    /// The `log2_max_pic_order_cnt_lsb_minus4`, only present when `pic_order_cnt_type == 0`.
    ///
    /// The value of this ranges from \[0, 12\].
    pub log2_max_pic_order_cnt_lsb_minus4: Option<u32>,

    /// The fields present when `pic_order_cnt_type == 1`.
    pub pic_order_cnt_type1: Option<PicOrderCountType1>,

    /// The `max_num_ref_frames`, the maximum number of reference frames used for inter prediction.
    pub max_num_ref_frames: u32,

    /// The `gaps_in_frame_num_value_allowed_flag`.
    pub gaps_in_frame_num_value_allowed_flag: bool,

    /// The `pic_width_in_mbs_minus1`, the width of each decoded picture in macroblocks minus 1.
    ///
    /// `width = (pic_width_in_mbs_minus1 + 1) * 16`
    pub pic_width_in_mbs_minus1: u32,

    /// The `pic_height_in_map_units_minus1`, the height of a decoded frame or field in slice
    /// group map units minus 1.
    ///
    /// `height = (2 - frame_mbs_only_flag) * (pic_height_in_map_units_minus1 + 1) * 16`
    pub pic_height_in_map_units_minus1: u32,

    /// The `frame_mbs_only_flag`.
    ///
    /// 0 means coded pictures may be fields, so a map unit covers two macroblock rows.
    ///
    /// 1 means every coded picture is a frame.
    pub frame_mbs_only_flag: bool,

    /// The `mb_adaptive_frame_field_flag`, only present when `frame_mbs_only_flag` is 0.
    pub mb_adaptive_frame_field_flag: Option<bool>,

    /// The `direct_8x8_inference_flag`.
    pub direct_8x8_inference_flag: bool,

    /// The frame cropping offsets, present when `frame_cropping_flag` is set.
    ///
    /// Every offset is inferred to be 0 when absent.
    pub frame_crop_info: Option<FrameCropInfo>,

    /// The video usability information, present when `vui_parameters_present_flag` is set.
    pub vui_parameters: Option<VuiParameters>,
}

impl Sps {
    /// Parses an SPS NAL unit, header included.
    ///
    /// The input may still contain emulation prevention bytes.
    pub fn parse(nal_unit: &[u8]) -> Result<Self> {
        let mut reader = NaluBitReader::new(nal_unit)?;

        let header = NALUnitHeader::parse(&mut reader)?;
        if header.nal_unit_type != NALUnitType::SPS {
            return Err(NaluError::invalid("nal_unit_type", header.nal_unit_type as u8));
        }
        if header.nal_ref_idc == 0 {
            return Err(NaluError::invalid("nal_ref_idc", 0));
        }

        let profile_idc = reader.read_u8()?;
        let constraint_set = reader.peek_bits(8)? as u8;
        let constraint_set0_flag = reader.read_bit()?;
        let constraint_set1_flag = reader.read_bit()?;
        let constraint_set2_flag = reader.read_bit()?;
        let constraint_set3_flag = reader.read_bit()?;
        let constraint_set4_flag = reader.read_bit()?;
        let constraint_set5_flag = reader.read_bit()?;
        let reserved_zero_2bits = reader.read_bits(2)?;
        if reserved_zero_2bits != 0 {
            return Err(NaluError::invalid("reserved_zero_2bits", reserved_zero_2bits));
        }

        let level_idc = reader.read_u8()?;
        let seq_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(seq_parameter_set_id, 0, 31)?;

        let sps_ext = if HIGH_PROFILES.contains(&profile_idc) {
            Some(SpsExtended::parse(&mut reader)?)
        } else {
            None
        };

        let log2_max_frame_num_minus4 = reader.read_exp_golomb()?;
        range_check!(log2_max_frame_num_minus4, 0, 12)?;

        let pic_order_cnt_type = reader.read_exp_golomb()?;
        range_check!(pic_order_cnt_type, 0, 2)?;

        let (log2_max_pic_order_cnt_lsb_minus4, pic_order_cnt_type1) = match pic_order_cnt_type {
            0 => {
                let log2_max_pic_order_cnt_lsb_minus4 = reader.read_exp_golomb()?;
                range_check!(log2_max_pic_order_cnt_lsb_minus4, 0, 12)?;
                (Some(log2_max_pic_order_cnt_lsb_minus4), None)
            }
            1 => (None, Some(PicOrderCountType1::parse(&mut reader)?)),
            _ => (None, None),
        };

        let max_num_ref_frames = reader.read_exp_golomb()?;
        let gaps_in_frame_num_value_allowed_flag = reader.read_bit()?;
        let pic_width_in_mbs_minus1 = reader.read_exp_golomb()?;
        let pic_height_in_map_units_minus1 = reader.read_exp_golomb()?;

        let frame_mbs_only_flag = reader.read_bit()?;
        let mb_adaptive_frame_field_flag = if frame_mbs_only_flag { None } else { Some(reader.read_bit()?) };
        let direct_8x8_inference_flag = reader.read_bit()?;

        let frame_cropping_flag = reader.read_bit()?;
        let frame_crop_info = if frame_cropping_flag {
            Some(FrameCropInfo::parse(&mut reader)?)
        } else {
            None
        };

        let vui_parameters_present_flag = reader.read_bit()?;
        let vui_parameters = if vui_parameters_present_flag {
            Some(VuiParameters::parse(&mut reader)?)
        } else {
            None
        };

        Ok(Sps {
            nal_ref_idc: header.nal_ref_idc,
            nal_unit_type: header.nal_unit_type,
            profile_idc,
            constraint_set,
            constraint_set0_flag,
            constraint_set1_flag,
            constraint_set2_flag,
            constraint_set3_flag,
            constraint_set4_flag,
            constraint_set5_flag,
            level_idc,
            seq_parameter_set_id,
            sps_ext,
            log2_max_frame_num_minus4,
            pic_order_cnt_type: pic_order_cnt_type as u8,
            log2_max_pic_order_cnt_lsb_minus4,
            pic_order_cnt_type1,
            max_num_ref_frames,
            gaps_in_frame_num_value_allowed_flag,
            pic_width_in_mbs_minus1,
            pic_height_in_map_units_minus1,
            frame_mbs_only_flag,
            mb_adaptive_frame_field_flag,
            direct_8x8_inference_flag,
            frame_crop_info,
            vui_parameters,
        })
    }

    /// The `chroma_format_idc`, 1 (4:2:0) when the SPS does not carry it.
    pub fn chroma_format_idc(&self) -> u8 {
        self.sps_ext.as_ref().map_or(1, |ext| ext.chroma_format_idc)
    }

    /// Width of the decoded picture in luma samples, before cropping.
    pub fn encoded_width(&self) -> u64 {
        (u64::from(self.pic_width_in_mbs_minus1) + 1) * 16
    }

    /// Height of the decoded frame in luma samples, before cropping.
    pub fn encoded_height(&self) -> u64 {
        (2 - u64::from(self.frame_mbs_only_flag)) * (u64::from(self.pic_height_in_map_units_minus1) + 1) * 16
    }

    /// The frame rate from the VUI timing info, if present.
    ///
    /// `frame_rate = time_scale / (2 * num_units_in_tick)`
    pub fn frame_rate(&self) -> Option<f64> {
        self.vui_parameters
            .as_ref()
            .and_then(|vui| vui.timing_info.as_ref())
            .map(TimingInfo::frame_rate)
    }
}
