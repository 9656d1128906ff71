use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};
use tracing::warn;

use crate::nal_unit_header::NALUnitHeader;
use crate::rbsp_trailing_bits::rbsp_trailing_bits;
use crate::{NALUnitType, ScalingListData};

mod deblocking_filter_control;
mod tiles;

pub use deblocking_filter_control::*;
pub use tiles::*;

/// Picture parameter set contained in a NAL unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PpsNALUnit {
    /// The NAL unit header.
    pub nal_unit_header: NALUnitHeader,
    /// The PPS RBSP.
    pub rbsp: PpsRbsp,
}

impl PpsNALUnit {
    /// Parses a PPS NAL unit, header included. Emulation prevention bytes may still be present.
    pub fn parse(nal_unit: &[u8]) -> Result<Self> {
        let mut reader = NaluBitReader::new(nal_unit)?;

        let nal_unit_header = NALUnitHeader::parse(&mut reader)?;
        if nal_unit_header.nal_unit_type != NALUnitType::PpsNut {
            return Err(NaluError::invalid("nal_unit_type", nal_unit_header.nal_unit_type as u8));
        }

        let rbsp = PpsRbsp::parse(&mut reader)?;

        Ok(Self { nal_unit_header, rbsp })
    }
}

/// Picture parameter set RBSP.
///
/// `pic_parameter_set_rbsp()`
///
/// Elements whose range depends on the referenced SPS are checked against the widest range any SPS allows.
///
/// - ISO/IEC 23008-2 - 7.3.2.3
/// - ISO/IEC 23008-2 - 7.4.3.3
#[derive(Debug, Clone, PartialEq)]
pub struct PpsRbsp {
    /// Identifies the PPS for reference by other syntax elements, in range \[0, 63\].
    pub pps_pic_parameter_set_id: u8,
    /// `sps_seq_parameter_set_id` of the active SPS, in range \[0, 15\].
    pub pps_seq_parameter_set_id: u8,
    /// `dependent_slice_segments_enabled_flag`
    pub dependent_slice_segments_enabled_flag: bool,
    /// `true` when `pic_output_flag` is present in slice headers.
    pub output_flag_present_flag: bool,
    /// Number of extra slice header bits.
    pub num_extra_slice_header_bits: u8,
    /// `sign_data_hiding_enabled_flag`
    pub sign_data_hiding_enabled_flag: bool,
    /// `cabac_init_present_flag`
    pub cabac_init_present_flag: bool,
    /// Inferred value of `num_ref_idx_l0_active_minus1`, in range \[0, 14\].
    pub num_ref_idx_l0_default_active_minus1: u8,
    /// Inferred value of `num_ref_idx_l1_active_minus1`, in range \[0, 14\].
    pub num_ref_idx_l1_default_active_minus1: u8,
    /// This value plus 26 specifies the initial `SliceQpY` of each slice.
    pub init_qp_minus26: i8,
    /// `constrained_intra_pred_flag`
    pub constrained_intra_pred_flag: bool,
    /// `transform_skip_enabled_flag`
    pub transform_skip_enabled_flag: bool,
    /// `diff_cu_qp_delta_depth`, present when `cu_qp_delta_enabled_flag` is `true`.
    pub diff_cu_qp_delta_depth: Option<u8>,
    /// Offset to the luma QP for deriving `Qp′Cb`, in range \[-12, 12\].
    pub pps_cb_qp_offset: i8,
    /// Offset to the luma QP for deriving `Qp′Cr`, in range \[-12, 12\].
    pub pps_cr_qp_offset: i8,
    /// `pps_slice_chroma_qp_offsets_present_flag`
    pub pps_slice_chroma_qp_offsets_present_flag: bool,
    /// `weighted_pred_flag`
    pub weighted_pred_flag: bool,
    /// `weighted_bipred_flag`
    pub weighted_bipred_flag: bool,
    /// `transquant_bypass_enabled_flag`
    pub transquant_bypass_enabled_flag: bool,
    /// Tile layout, present when `tiles_enabled_flag` is `true`.
    pub tiles: Option<Tiles>,
    /// `entropy_coding_sync_enabled_flag`
    pub entropy_coding_sync_enabled_flag: bool,
    /// `pps_loop_filter_across_slices_enabled_flag`
    pub pps_loop_filter_across_slices_enabled_flag: bool,
    /// Present when `deblocking_filter_control_present_flag` is `true`.
    pub deblocking_filter_control: Option<DeblockingFilterControl>,
    /// Present when `pps_scaling_list_data_present_flag` is `true`.
    pub scaling_list_data: Option<ScalingListData>,
    /// `lists_modification_present_flag`
    pub lists_modification_present_flag: bool,
    /// `log2_parallel_merge_level_minus2`
    pub log2_parallel_merge_level_minus2: u8,
    /// `slice_segment_header_extension_present_flag`
    pub slice_segment_header_extension_present_flag: bool,
    /// `pps_extension_4bits`, the extension data itself is skipped.
    pub pps_extension_4bits: u8,
}

impl PpsRbsp {
    /// Parses the RBSP following the NAL unit header.
    ///
    /// The range, multilayer, 3D and screen content coding extensions are not supported and fail with
    /// [`NaluError::Unimplemented`].
    pub fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let pps_pic_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(pps_pic_parameter_set_id, 0, 63)?;
        let pps_seq_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(pps_seq_parameter_set_id, 0, 15)?;

        let dependent_slice_segments_enabled_flag = reader.read_bit()?;
        let output_flag_present_flag = reader.read_bit()?;
        let num_extra_slice_header_bits = reader.read_bits(3)? as u8;
        let sign_data_hiding_enabled_flag = reader.read_bit()?;
        let cabac_init_present_flag = reader.read_bit()?;

        let num_ref_idx_l0_default_active_minus1 = reader.read_exp_golomb()?;
        range_check!(num_ref_idx_l0_default_active_minus1, 0, 14)?;
        let num_ref_idx_l1_default_active_minus1 = reader.read_exp_golomb()?;
        range_check!(num_ref_idx_l1_default_active_minus1, 0, 14)?;

        // -(26 + QpBdOffsetY) with a bit depth of at most 16
        let init_qp_minus26 = reader.read_signed_exp_golomb()?;
        range_check!(init_qp_minus26, -(26 + 6 * 8), 25)?;

        let constrained_intra_pred_flag = reader.read_bit()?;
        let transform_skip_enabled_flag = reader.read_bit()?;

        let cu_qp_delta_enabled_flag = reader.read_bit()?;
        let diff_cu_qp_delta_depth = if cu_qp_delta_enabled_flag {
            // log2_diff_max_min_luma_coding_block_size is at most 3
            let diff_cu_qp_delta_depth = reader.read_exp_golomb()?;
            range_check!(diff_cu_qp_delta_depth, 0, 3)?;
            Some(diff_cu_qp_delta_depth as u8)
        } else {
            None
        };

        let pps_cb_qp_offset = reader.read_signed_exp_golomb()?;
        range_check!(pps_cb_qp_offset, -12, 12)?;
        let pps_cr_qp_offset = reader.read_signed_exp_golomb()?;
        range_check!(pps_cr_qp_offset, -12, 12)?;

        let pps_slice_chroma_qp_offsets_present_flag = reader.read_bit()?;
        let weighted_pred_flag = reader.read_bit()?;
        let weighted_bipred_flag = reader.read_bit()?;
        let transquant_bypass_enabled_flag = reader.read_bit()?;
        let tiles_enabled_flag = reader.read_bit()?;
        let entropy_coding_sync_enabled_flag = reader.read_bit()?;

        let tiles = if tiles_enabled_flag {
            Some(Tiles::parse(reader)?)
        } else {
            None
        };

        let pps_loop_filter_across_slices_enabled_flag = reader.read_bit()?;

        let deblocking_filter_control_present_flag = reader.read_bit()?;
        let deblocking_filter_control = if deblocking_filter_control_present_flag {
            Some(DeblockingFilterControl::parse(reader)?)
        } else {
            None
        };

        let pps_scaling_list_data_present_flag = reader.read_bit()?;
        let scaling_list_data = if pps_scaling_list_data_present_flag {
            Some(ScalingListData::parse(reader)?)
        } else {
            None
        };

        let lists_modification_present_flag = reader.read_bit()?;

        // CtbLog2SizeY - 2 with CTBs of at most 64
        let log2_parallel_merge_level_minus2 = reader.read_exp_golomb()?;
        range_check!(log2_parallel_merge_level_minus2, 0, 4)?;

        let slice_segment_header_extension_present_flag = reader.read_bit()?;

        let mut pps_extension_4bits = 0;
        let pps_extension_present_flag = reader.read_bit()?;
        if pps_extension_present_flag {
            let pps_range_extension_flag = reader.read_bit()?;
            let pps_multilayer_extension_flag = reader.read_bit()?;
            let pps_3d_extension_flag = reader.read_bit()?;
            let pps_scc_extension_flag = reader.read_bit()?;
            pps_extension_4bits = reader.read_bits(4)? as u8;

            for (present, name) in [
                (pps_range_extension_flag, "pps_range_extension"),
                (pps_multilayer_extension_flag, "pps_multilayer_extension"),
                (pps_3d_extension_flag, "pps_3d_extension"),
                (pps_scc_extension_flag, "pps_scc_extension"),
            ] {
                if present {
                    warn!("{name} is not supported");
                    return Err(NaluError::Unimplemented(name));
                }
            }

            if pps_extension_4bits != 0 {
                // pps_extension_data_flag
                while !reader.ended() {
                    reader.read_bit()?;
                }
            }
        }

        rbsp_trailing_bits(reader)?;

        Ok(Self {
            pps_pic_parameter_set_id: pps_pic_parameter_set_id as u8,
            pps_seq_parameter_set_id: pps_seq_parameter_set_id as u8,
            dependent_slice_segments_enabled_flag,
            output_flag_present_flag,
            num_extra_slice_header_bits,
            sign_data_hiding_enabled_flag,
            cabac_init_present_flag,
            num_ref_idx_l0_default_active_minus1: num_ref_idx_l0_default_active_minus1 as u8,
            num_ref_idx_l1_default_active_minus1: num_ref_idx_l1_default_active_minus1 as u8,
            init_qp_minus26: init_qp_minus26 as i8,
            constrained_intra_pred_flag,
            transform_skip_enabled_flag,
            diff_cu_qp_delta_depth,
            pps_cb_qp_offset: pps_cb_qp_offset as i8,
            pps_cr_qp_offset: pps_cr_qp_offset as i8,
            pps_slice_chroma_qp_offsets_present_flag,
            weighted_pred_flag,
            weighted_bipred_flag,
            transquant_bypass_enabled_flag,
            tiles,
            entropy_coding_sync_enabled_flag,
            pps_loop_filter_across_slices_enabled_flag,
            deblocking_filter_control,
            scaling_list_data,
            lists_modification_present_flag,
            log2_parallel_merge_level_minus2: log2_parallel_merge_level_minus2 as u8,
            slice_segment_header_extension_present_flag,
            pps_extension_4bits,
        })
    }

    /// `Log2ParMrgLevel = log2_parallel_merge_level_minus2 + 2` (7-37)
    pub fn log2_par_mrg_level(&self) -> u8 {
        self.log2_parallel_merge_level_minus2 + 2
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
pub(crate) mod tests {
    use expgolomb::BitWriterExpGolombExt;
    use nalu::{BitWriter, NaluError};

    use super::PpsNALUnit;

    fn write_header(writer: &mut BitWriter<Vec<u8>>) {
        writer.write_bits(0x4401, 16).unwrap(); // PPS_NUT, layer 0, temporal id 0
    }

    /// A single-slice PPS without tiles, deblocking control or scaling lists.
    pub(crate) fn pps_nal_unit() -> Vec<u8> {
        let mut writer = BitWriter::default();
        write_header(&mut writer);
        writer.write_exp_golomb(0).unwrap(); // pps_pic_parameter_set_id
        writer.write_exp_golomb(0).unwrap(); // pps_seq_parameter_set_id
        writer.write_bits(0, 2).unwrap();
        writer.write_bits(0, 3).unwrap(); // num_extra_slice_header_bits
        writer.write_bit(true).unwrap(); // sign_data_hiding_enabled_flag
        writer.write_bit(false).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_signed_exp_golomb(0).unwrap(); // init_qp_minus26
        writer.write_bit(false).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap(); // cu_qp_delta_enabled_flag
        writer.write_exp_golomb(1).unwrap(); // diff_cu_qp_delta_depth
        writer.write_signed_exp_golomb(0).unwrap();
        writer.write_signed_exp_golomb(0).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap(); // weighted_pred_flag
        writer.write_bits(0, 4).unwrap(); // bipred, transquant bypass, tiles, entropy sync
        writer.write_bit(true).unwrap(); // pps_loop_filter_across_slices_enabled_flag
        writer.write_bit(false).unwrap(); // deblocking_filter_control_present_flag
        writer.write_bit(false).unwrap(); // pps_scaling_list_data_present_flag
        writer.write_bit(false).unwrap();
        writer.write_exp_golomb(0).unwrap(); // log2_parallel_merge_level_minus2
        writer.write_bit(false).unwrap();
        writer.write_bit(false).unwrap(); // pps_extension_present_flag
        writer.write_rbsp_trailing_bits().unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_default_pps() {
        let pps = PpsNALUnit::parse(&pps_nal_unit()).unwrap();

        insta::assert_debug_snapshot!(pps, @r"
        PpsNALUnit {
            nal_unit_header: NALUnitHeader {
                nal_unit_type: PpsNut,
                nuh_layer_id: 0,
                nuh_temporal_id_plus1: 1,
            },
            rbsp: PpsRbsp {
                pps_pic_parameter_set_id: 0,
                pps_seq_parameter_set_id: 0,
                dependent_slice_segments_enabled_flag: false,
                output_flag_present_flag: false,
                num_extra_slice_header_bits: 0,
                sign_data_hiding_enabled_flag: true,
                cabac_init_present_flag: false,
                num_ref_idx_l0_default_active_minus1: 0,
                num_ref_idx_l1_default_active_minus1: 0,
                init_qp_minus26: 0,
                constrained_intra_pred_flag: false,
                transform_skip_enabled_flag: false,
                diff_cu_qp_delta_depth: Some(
                    1,
                ),
                pps_cb_qp_offset: 0,
                pps_cr_qp_offset: 0,
                pps_slice_chroma_qp_offsets_present_flag: false,
                weighted_pred_flag: true,
                weighted_bipred_flag: false,
                transquant_bypass_enabled_flag: false,
                tiles: None,
                entropy_coding_sync_enabled_flag: false,
                pps_loop_filter_across_slices_enabled_flag: true,
                deblocking_filter_control: None,
                scaling_list_data: None,
                lists_modification_present_flag: false,
                log2_parallel_merge_level_minus2: 0,
                slice_segment_header_extension_present_flag: false,
                pps_extension_4bits: 0,
            },
        }
        ");
        assert_eq!(pps.rbsp.log2_par_mrg_level(), 2);
    }

    #[test]
    fn test_tiles_deblocking_and_extension_data() {
        let mut writer = BitWriter::default();
        write_header(&mut writer);
        writer.write_exp_golomb(5).unwrap(); // pps_pic_parameter_set_id
        writer.write_exp_golomb(2).unwrap(); // pps_seq_parameter_set_id
        writer.write_bits(0b11, 2).unwrap();
        writer.write_bits(2, 3).unwrap(); // num_extra_slice_header_bits
        writer.write_bits(0, 2).unwrap();
        writer.write_exp_golomb(3).unwrap();
        writer.write_exp_golomb(1).unwrap();
        writer.write_signed_exp_golomb(-4).unwrap(); // init_qp_minus26
        writer.write_bits(0, 3).unwrap(); // constrained intra, transform skip, cu qp delta
        writer.write_signed_exp_golomb(-2).unwrap(); // pps_cb_qp_offset
        writer.write_signed_exp_golomb(3).unwrap(); // pps_cr_qp_offset
        writer.write_bits(0, 4).unwrap();
        writer.write_bit(true).unwrap(); // tiles_enabled_flag
        writer.write_bit(false).unwrap();

        writer.write_exp_golomb(2).unwrap(); // num_tile_columns_minus1
        writer.write_exp_golomb(1).unwrap(); // num_tile_rows_minus1
        writer.write_bit(false).unwrap(); // uniform_spacing_flag
        writer.write_exp_golomb(4).unwrap();
        writer.write_exp_golomb(5).unwrap();
        writer.write_exp_golomb(7).unwrap();
        writer.write_bit(false).unwrap(); // loop_filter_across_tiles_enabled_flag

        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap(); // deblocking_filter_control_present_flag
        writer.write_bit(true).unwrap(); // deblocking_filter_override_enabled_flag
        writer.write_bit(false).unwrap(); // pps_deblocking_filter_disabled_flag
        writer.write_signed_exp_golomb(-3).unwrap();
        writer.write_signed_exp_golomb(6).unwrap();

        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap(); // lists_modification_present_flag
        writer.write_exp_golomb(2).unwrap(); // log2_parallel_merge_level_minus2
        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap(); // pps_extension_present_flag
        writer.write_bits(0, 4).unwrap();
        writer.write_bits(0b1000, 4).unwrap(); // pps_extension_4bits
        writer.write_bits(0b1011_0110, 8).unwrap(); // pps_extension_data_flag
        writer.write_rbsp_trailing_bits().unwrap();
        let data = writer.finish().unwrap();

        let pps = PpsNALUnit::parse(&data).unwrap().rbsp;
        assert_eq!(pps.pps_pic_parameter_set_id, 5);
        assert_eq!(pps.num_extra_slice_header_bits, 2);
        assert_eq!(pps.init_qp_minus26, -4);
        assert_eq!(pps.diff_cu_qp_delta_depth, None);
        assert_eq!((pps.pps_cb_qp_offset, pps.pps_cr_qp_offset), (-2, 3));
        assert_eq!(pps.pps_extension_4bits, 8);
        assert_eq!(pps.log2_par_mrg_level(), 4);

        let tiles = pps.tiles.unwrap();
        assert_eq!(tiles.num_tiles(), 6);
        assert_eq!(tiles.column_width_minus1, vec![4, 5]);
        assert_eq!(tiles.row_height_minus1, vec![7]);
        assert!(!tiles.loop_filter_across_tiles_enabled_flag);

        let deblocking = pps.deblocking_filter_control.unwrap();
        assert!(deblocking.deblocking_filter_override_enabled_flag);
        assert_eq!((deblocking.pps_beta_offset_div2, deblocking.pps_tc_offset_div2), (-3, 6));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut writer = BitWriter::default();
        write_header(&mut writer);
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_bits(0, 7).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_signed_exp_golomb(0).unwrap();
        writer.write_bits(0, 3).unwrap();
        writer.write_signed_exp_golomb(0).unwrap();
        writer.write_signed_exp_golomb(0).unwrap();
        writer.write_bits(0, 9).unwrap(); // flags up to the scaling list
        writer.write_bit(false).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap(); // pps_extension_present_flag
        writer.write_bit(true).unwrap(); // pps_range_extension_flag
        writer.write_bits(0, 7).unwrap();
        writer.write_rbsp_trailing_bits().unwrap();
        let data = writer.finish().unwrap();

        assert_eq!(
            PpsNALUnit::parse(&data).unwrap_err(),
            NaluError::Unimplemented("pps_range_extension")
        );
    }

    #[test]
    fn test_out_of_range() {
        let mut writer = BitWriter::default();
        write_header(&mut writer);
        writer.write_exp_golomb(64).unwrap(); // pps_pic_parameter_set_id
        writer.write_rbsp_trailing_bits().unwrap();
        let data = writer.finish().unwrap();

        assert_eq!(
            PpsNALUnit::parse(&data).unwrap_err(),
            NaluError::OutOfRange {
                element: "pps_pic_parameter_set_id",
                value: 64,
                lower: 0,
                upper: 63,
            }
        );
    }

    #[test]
    fn test_single_tile_rejected() {
        let mut writer = BitWriter::default();
        write_header(&mut writer);
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_bits(0, 7).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_signed_exp_golomb(0).unwrap();
        writer.write_bits(0, 3).unwrap();
        writer.write_signed_exp_golomb(0).unwrap();
        writer.write_signed_exp_golomb(0).unwrap();
        writer.write_bits(0, 4).unwrap();
        writer.write_bit(true).unwrap(); // tiles_enabled_flag
        writer.write_bit(false).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_rbsp_trailing_bits().unwrap();
        let data = writer.finish().unwrap();

        assert_eq!(
            PpsNALUnit::parse(&data).unwrap_err(),
            NaluError::invalid("num_tile_rows_minus1", 0)
        );
    }
}
