use std::num::NonZero;

use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};

use crate::nal_unit_header::NALUnitHeader;
use crate::rbsp_trailing_bits::rbsp_trailing_bits;
use crate::{HrdParameters, NALUnitType, ProfileTierLevel, SubLayerOrderingInfo};

/// Video parameter set contained in a NAL unit.
#[derive(Debug, Clone, PartialEq)]
pub struct VpsNALUnit {
    /// The NAL unit header.
    pub nal_unit_header: NALUnitHeader,
    /// The VPS RBSP.
    pub rbsp: VpsRbsp,
}

impl VpsNALUnit {
    /// Parses a VPS NAL unit, header included. Emulation prevention bytes may still be present.
    pub fn parse(nal_unit: &[u8]) -> Result<Self> {
        let mut reader = NaluBitReader::new(nal_unit)?;

        let nal_unit_header = NALUnitHeader::parse(&mut reader)?;
        if nal_unit_header.nal_unit_type != NALUnitType::VpsNut {
            return Err(NaluError::invalid("nal_unit_type", nal_unit_header.nal_unit_type as u8));
        }

        let rbsp = VpsRbsp::parse(&mut reader)?;

        Ok(Self { nal_unit_header, rbsp })
    }
}

/// Video parameter set RBSP.
///
/// `video_parameter_set_rbsp()`
///
/// - ISO/IEC 23008-2 - 7.3.2.1
/// - ISO/IEC 23008-2 - 7.4.3.1
#[derive(Debug, Clone, PartialEq)]
pub struct VpsRbsp {
    /// Identifies the VPS for reference by other syntax elements.
    pub vps_video_parameter_set_id: u8,
    /// `vps_base_layer_internal_flag`
    pub vps_base_layer_internal_flag: bool,
    /// `vps_base_layer_available_flag`
    pub vps_base_layer_available_flag: bool,
    /// This value plus 1 specifies the maximum allowed number of layers in each CVS referring to the VPS.
    pub vps_max_layers_minus1: u8,
    /// This value plus 1 specifies the maximum number of temporal sub-layers, in range \[0, 6\].
    pub vps_max_sub_layers_minus1: u8,
    /// `vps_temporal_id_nesting_flag`, `true` when there is a single sub-layer.
    pub vps_temporal_id_nesting_flag: bool,
    /// The general profile, tier and level of the CVS.
    pub profile_tier_level: ProfileTierLevel,
    /// `vps_max_dec_pic_buffering_minus1`, `vps_max_num_reorder_pics` and `vps_max_latency_increase_plus1`.
    pub sub_layer_ordering_info: SubLayerOrderingInfo,
    /// The maximum allowed `nuh_layer_id` of all NAL units in each CVS referring to the VPS.
    pub vps_max_layer_id: u8,
    /// `layer_id_included_flag[i][j]` for the layer sets `1..=vps_num_layer_sets_minus1`.
    ///
    /// Layer set 0 only contains layer 0 and is not signalled.
    pub layer_id_included_flag: Vec<Vec<bool>>,
    /// Present when `vps_timing_info_present_flag` is `true`.
    pub timing_info: Option<VpsTimingInfo>,
    /// `vps_extension_flag`, the extension data itself is skipped.
    pub vps_extension_flag: bool,
}

/// Timing and HRD information of a [`VpsRbsp`].
#[derive(Debug, Clone, PartialEq)]
pub struct VpsTimingInfo {
    /// `vps_num_units_in_tick`
    pub num_units_in_tick: NonZero<u32>,
    /// `vps_time_scale`
    pub time_scale: NonZero<u32>,
    /// `vps_poc_proportional_to_timing_flag`
    pub poc_proportional_to_timing_flag: bool,
    /// `vps_num_ticks_poc_diff_one_minus1`, present when the POC is proportional to timing.
    pub num_ticks_poc_diff_one_minus1: Option<u32>,
    /// One entry per `hrd_parameters()` of the VPS.
    pub hrd_parameters: Vec<VpsHrdParameters>,
}

/// An `hrd_parameters()` of the VPS and the layer set it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct VpsHrdParameters {
    /// `hrd_layer_set_idx[i]`
    pub hrd_layer_set_idx: u32,
    /// `cprms_present_flag[i]`, inferred `true` for the first entry.
    pub cprms_present_flag: bool,
    /// The parameters.
    pub hrd_parameters: HrdParameters,
}

impl VpsRbsp {
    /// Parses the RBSP following the NAL unit header.
    pub fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let vps_video_parameter_set_id = reader.read_bits(4)? as u8;
        let vps_base_layer_internal_flag = reader.read_bit()?;
        let vps_base_layer_available_flag = reader.read_bit()?;
        let vps_max_layers_minus1 = reader.read_bits(6)? as u8;

        let vps_max_sub_layers_minus1 = reader.read_bits(3)? as u8;
        range_check!(vps_max_sub_layers_minus1, 0, 6)?;

        let vps_temporal_id_nesting_flag = reader.read_bit()?;
        if vps_max_sub_layers_minus1 == 0 && !vps_temporal_id_nesting_flag {
            return Err(NaluError::invalid("vps_temporal_id_nesting_flag", 0));
        }

        // vps_reserved_0xffff_16bits, ignored by decoders
        reader.skip_bits(16)?;

        let profile_tier_level = ProfileTierLevel::parse(reader, true, vps_max_sub_layers_minus1)?;

        let vps_sub_layer_ordering_info_present_flag = reader.read_bit()?;
        let sub_layer_ordering_info =
            SubLayerOrderingInfo::parse(reader, vps_sub_layer_ordering_info_present_flag, vps_max_sub_layers_minus1)?;

        let vps_max_layer_id = reader.read_bits(6)? as u8;

        let vps_num_layer_sets_minus1 = reader.read_exp_golomb()?;
        range_check!(vps_num_layer_sets_minus1, 0, 1023)?;

        let layer_id_included_flag = (1..=vps_num_layer_sets_minus1)
            .map(|_| (0..=vps_max_layer_id).map(|_| reader.read_bit()).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;

        let vps_timing_info_present_flag = reader.read_bit()?;
        let timing_info = if vps_timing_info_present_flag {
            Some(VpsTimingInfo::parse(
                reader,
                vps_base_layer_internal_flag,
                vps_num_layer_sets_minus1,
                vps_max_sub_layers_minus1,
            )?)
        } else {
            None
        };

        let vps_extension_flag = reader.read_bit()?;
        if vps_extension_flag {
            // vps_extension() and vps_extension_data_flag until the stop bit
            while !reader.ended() {
                reader.read_bit()?;
            }
        }

        rbsp_trailing_bits(reader)?;

        Ok(Self {
            vps_video_parameter_set_id,
            vps_base_layer_internal_flag,
            vps_base_layer_available_flag,
            vps_max_layers_minus1,
            vps_max_sub_layers_minus1,
            vps_temporal_id_nesting_flag,
            profile_tier_level,
            sub_layer_ordering_info,
            vps_max_layer_id,
            layer_id_included_flag,
            timing_info,
            vps_extension_flag,
        })
    }
}

impl VpsTimingInfo {
    fn parse(
        reader: &mut NaluBitReader,
        vps_base_layer_internal_flag: bool,
        vps_num_layer_sets_minus1: u32,
        vps_max_sub_layers_minus1: u8,
    ) -> Result<Self> {
        let num_units_in_tick =
            NonZero::new(reader.read_bits(32)?).ok_or(NaluError::invalid("vps_num_units_in_tick", 0))?;
        let time_scale = NonZero::new(reader.read_bits(32)?).ok_or(NaluError::invalid("vps_time_scale", 0))?;

        let poc_proportional_to_timing_flag = reader.read_bit()?;
        let num_ticks_poc_diff_one_minus1 = if poc_proportional_to_timing_flag {
            let vps_num_ticks_poc_diff_one_minus1 = reader.read_exp_golomb()?;
            range_check!(vps_num_ticks_poc_diff_one_minus1, 0, u32::MAX - 1)?;
            Some(vps_num_ticks_poc_diff_one_minus1)
        } else {
            None
        };

        let vps_num_hrd_parameters = reader.read_exp_golomb()?;
        range_check!(vps_num_hrd_parameters, 0, vps_num_layer_sets_minus1 + 1)?;

        let mut hrd_parameters: Vec<VpsHrdParameters> = Vec::with_capacity(vps_num_hrd_parameters as usize);
        for i in 0..vps_num_hrd_parameters {
            let hrd_layer_set_idx = reader.read_exp_golomb()?;
            range_check!(
                hrd_layer_set_idx,
                u32::from(!vps_base_layer_internal_flag),
                vps_num_layer_sets_minus1
            )?;

            let cprms_present_flag = if i > 0 { reader.read_bit()? } else { true };

            let parameters = match hrd_parameters.last() {
                Some(previous) if !cprms_present_flag => HrdParameters::parse_with_common_inf(
                    reader,
                    previous.hrd_parameters.common_inf.clone(),
                    vps_max_sub_layers_minus1,
                )?,
                _ => HrdParameters::parse(reader, cprms_present_flag, vps_max_sub_layers_minus1)?,
            };

            hrd_parameters.push(VpsHrdParameters {
                hrd_layer_set_idx,
                cprms_present_flag,
                hrd_parameters: parameters,
            });
        }

        Ok(Self {
            num_units_in_tick,
            time_scale,
            poc_proportional_to_timing_flag,
            num_ticks_poc_diff_one_minus1,
            hrd_parameters,
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
pub(crate) mod tests {
    use expgolomb::BitWriterExpGolombExt;
    use nalu::{BitWriter, NaluError};

    use super::VpsNALUnit;

    /// Writes a main profile PTL for a single sub-layer.
    pub(crate) fn write_main_profile_tier_level(writer: &mut BitWriter<Vec<u8>>, level_idc: u64) {
        writer.write_bits(0, 2).unwrap(); // general_profile_space
        writer.write_bit(false).unwrap(); // general_tier_flag
        writer.write_bits(1, 5).unwrap(); // general_profile_idc
        writer.write_bits(0x6000_0000, 32).unwrap(); // general_profile_compatibility_flag
        writer.write_bits(0b1001, 4).unwrap(); // progressive, interlaced, non packed, frame only
        writer.write_bits(0, 43).unwrap();
        writer.write_bit(false).unwrap(); // general_inbld_flag
        writer.write_bits(level_idc, 8).unwrap();
    }

    /// A VPS NAL unit with a single layer and sub-layer, optionally carrying timing and HRD information.
    pub(crate) fn vps_nal_unit(timing: bool) -> Vec<u8> {
        let mut writer = BitWriter::default();
        writer.write_bits(0x4001, 16).unwrap(); // VPS_NUT, layer 0, temporal id 0

        writer.write_bits(0, 4).unwrap(); // vps_video_parameter_set_id
        writer.write_bit(true).unwrap(); // vps_base_layer_internal_flag
        writer.write_bit(true).unwrap(); // vps_base_layer_available_flag
        writer.write_bits(0, 6).unwrap(); // vps_max_layers_minus1
        writer.write_bits(0, 3).unwrap(); // vps_max_sub_layers_minus1
        writer.write_bit(true).unwrap(); // vps_temporal_id_nesting_flag
        writer.write_bits(0xffff, 16).unwrap();

        write_main_profile_tier_level(&mut writer, 93);

        writer.write_bit(true).unwrap(); // vps_sub_layer_ordering_info_present_flag
        writer.write_exp_golomb(3).unwrap();
        writer.write_exp_golomb(1).unwrap();
        writer.write_exp_golomb(0).unwrap();

        writer.write_bits(0, 6).unwrap(); // vps_max_layer_id
        writer.write_exp_golomb(1).unwrap(); // vps_num_layer_sets_minus1
        writer.write_bit(true).unwrap(); // layer_id_included_flag[1][0]

        writer.write_bit(timing).unwrap(); // vps_timing_info_present_flag
        if timing {
            writer.write_bits(1, 32).unwrap();
            writer.write_bits(50, 32).unwrap();
            writer.write_bit(false).unwrap(); // vps_poc_proportional_to_timing_flag
            writer.write_exp_golomb(2).unwrap(); // vps_num_hrd_parameters

            writer.write_exp_golomb(0).unwrap(); // hrd_layer_set_idx[0]
            writer.write_bit(true).unwrap(); // nal_hrd_parameters_present_flag
            writer.write_bit(false).unwrap(); // vcl_hrd_parameters_present_flag
            writer.write_bit(false).unwrap(); // sub_pic_hrd_params_present_flag
            writer.write_bits(0, 8 + 15).unwrap(); // scales and lengths
            writer.write_bit(true).unwrap(); // fixed_pic_rate_general_flag
            writer.write_exp_golomb(0).unwrap(); // elemental_duration_in_tc_minus1
            writer.write_exp_golomb(1).unwrap(); // cpb_cnt_minus1
            for (bit_rate, cpb_size) in [(999, 1999), (1999, 1999)] {
                // no cbr_flag on sub-layer 0
                writer.write_exp_golomb(bit_rate).unwrap();
                writer.write_exp_golomb(cpb_size).unwrap();
            }

            writer.write_exp_golomb(1).unwrap(); // hrd_layer_set_idx[1]
            writer.write_bit(false).unwrap(); // cprms_present_flag[1]
            writer.write_bit(false).unwrap(); // fixed_pic_rate_general_flag
            writer.write_bit(false).unwrap(); // fixed_pic_rate_within_cvs_flag
            writer.write_bit(true).unwrap(); // low_delay_hrd_flag
            writer.write_exp_golomb(499).unwrap(); // nal bit_rate_value_minus1, inherited nal flag
            writer.write_exp_golomb(999).unwrap();
        }

        writer.write_bit(false).unwrap(); // vps_extension_flag
        writer.write_rbsp_trailing_bits().unwrap();
        nalu::insert_emulation_prevention(&writer.finish().unwrap())
    }

    #[test]
    fn test_vps_without_timing() {
        let data = vps_nal_unit(false);
        let vps = VpsNALUnit::parse(&data).unwrap().rbsp;

        assert!(vps.vps_base_layer_internal_flag);
        assert_eq!(vps.vps_max_sub_layers_minus1, 0);
        assert_eq!(vps.profile_tier_level.general_level_idc, 93);
        let profile = vps.profile_tier_level.general_profile.as_ref().unwrap();
        assert_eq!(profile.profile_idc, 1);
        assert!(profile.frame_only_constraint_flag);
        assert_eq!(vps.sub_layer_ordering_info.max_dec_pic_buffering_minus1, vec![Some(3)]);
        assert_eq!(vps.layer_id_included_flag, vec![vec![true]]);
        assert_eq!(vps.timing_info, None);
        assert!(!vps.vps_extension_flag);
    }

    #[test]
    fn test_vps_with_hrd() {
        let data = vps_nal_unit(true);
        let vps = VpsNALUnit::parse(&data).unwrap().rbsp;

        let timing = vps.timing_info.unwrap();
        assert_eq!(timing.time_scale.get(), 50);
        assert_eq!(timing.num_ticks_poc_diff_one_minus1, None);
        assert_eq!(timing.hrd_parameters.len(), 2);

        let first = &timing.hrd_parameters[0];
        assert!(first.cprms_present_flag);
        let nal = &first.hrd_parameters.sub_layers[0].nal_hrd_parameters;
        assert_eq!(nal.len(), 2);
        assert_eq!(nal[0].bit_rate(0), 1000 * 64);
        assert_eq!(nal[1].bit_rate(0), 2000 * 64);
        assert_eq!(nal[1].cpb_size_value_minus1, 1999);
        assert!(nal.iter().all(|cpb| cpb.cbr_flag.is_none()));

        let second = &timing.hrd_parameters[1];
        assert_eq!(second.hrd_layer_set_idx, 1);
        assert!(!second.cprms_present_flag);
        assert_eq!(second.hrd_parameters.common_inf, first.hrd_parameters.common_inf);
        let sub_layer = &second.hrd_parameters.sub_layers[0];
        assert!(sub_layer.low_delay_hrd_flag);
        assert_eq!(sub_layer.nal_hrd_parameters[0].bit_rate_value_minus1, 499);
        assert_eq!(sub_layer.nal_hrd_parameters[0].cbr_flag, None);
    }

    #[test]
    fn test_wrong_nal_unit_type() {
        let mut data = vps_nal_unit(false);
        data[0] = 0x42; // SPS_NUT
        assert_eq!(
            VpsNALUnit::parse(&data).unwrap_err(),
            NaluError::invalid("nal_unit_type", 33)
        );
    }
}
