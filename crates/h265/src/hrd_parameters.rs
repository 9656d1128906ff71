use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};

/// HRD parameters.
///
/// `hrd_parameters(commonInfPresentFlag, maxNumSubLayersMinus1)`
///
/// - ISO/IEC 23008-2 - E.2.2
/// - ISO/IEC 23008-2 - E.3.2
#[derive(Debug, Clone, PartialEq)]
pub struct HrdParameters {
    /// HRD parameters information unrelated to sub-layers.
    pub common_inf: CommonInf,
    /// One entry per sub-layer, `maxNumSubLayersMinus1 + 1` in total.
    pub sub_layers: Vec<HrdParametersSubLayer>,
}

impl HrdParameters {
    /// Parses the structure. When `common_inf_present_flag` is `false` the defaults of [`CommonInf`] apply,
    /// see [`HrdParameters::parse_with_common_inf`] for VPS entries that inherit it instead.
    pub fn parse(
        reader: &mut NaluBitReader,
        common_inf_present_flag: bool,
        max_num_sub_layers_minus1: u8,
    ) -> Result<Self> {
        let common_inf = if common_inf_present_flag {
            CommonInf::parse(reader)?
        } else {
            CommonInf::default()
        };

        Self::parse_with_common_inf(reader, common_inf, max_num_sub_layers_minus1)
    }

    /// Parses the sub-layer loop only, the common information is taken from a previous
    /// `hrd_parameters()` (`cprms_present_flag[i]` equal to 0 in the VPS).
    pub fn parse_with_common_inf(
        reader: &mut NaluBitReader,
        common_inf: CommonInf,
        max_num_sub_layers_minus1: u8,
    ) -> Result<Self> {
        let sub_layers = (0..=max_num_sub_layers_minus1)
            .map(|sub_layer_id| HrdParametersSubLayer::parse(reader, &common_inf, sub_layer_id))
            .collect::<Result<Vec<_>>>()?;

        Ok(HrdParameters { common_inf, sub_layers })
    }
}

impl CommonInf {
    fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let mut common_inf = CommonInf::default();

        common_inf.nal_hrd_parameters_present_flag = reader.read_bit()?;
        common_inf.vcl_hrd_parameters_present_flag = reader.read_bit()?;

        if common_inf.nal_hrd_parameters_present_flag || common_inf.vcl_hrd_parameters_present_flag {
            let sub_pic_hrd_params_present_flag = reader.read_bit()?;
            if sub_pic_hrd_params_present_flag {
                let tick_divisor_minus2 = reader.read_u8()?;
                let du_cpb_removal_delay_increment_length_minus1 = reader.read_bits(5)? as u8;
                let sub_pic_cpb_params_in_pic_timing_sei_flag = reader.read_bit()?;
                let dpb_output_delay_du_length_minus1 = reader.read_bits(5)? as u8;

                common_inf.sub_pic_hrd_params = Some(SubPicHrdParams {
                    tick_divisor_minus2,
                    du_cpb_removal_delay_increment_length_minus1,
                    sub_pic_cpb_params_in_pic_timing_sei_flag,
                    dpb_output_delay_du_length_minus1,
                    cpb_size_du_scale: 0, // replaced below
                });
            }

            common_inf.bit_rate_scale = Some(reader.read_bits(4)? as u8);
            common_inf.cpb_size_scale = Some(reader.read_bits(4)? as u8);

            if let Some(sub_pic_hrd_params) = &mut common_inf.sub_pic_hrd_params {
                sub_pic_hrd_params.cpb_size_du_scale = reader.read_bits(4)? as u8;
            }

            common_inf.initial_cpb_removal_delay_length_minus1 = reader.read_bits(5)? as u8;
            common_inf.au_cpb_removal_delay_length_minus1 = reader.read_bits(5)? as u8;
            common_inf.dpb_output_delay_length_minus1 = reader.read_bits(5)? as u8;
        }

        Ok(common_inf)
    }
}

/// Directly part of [`HrdParameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct CommonInf {
    /// Equal to `true` specifies that NAL HRD parameters (pertaining to type II bitstream conformance)
    /// are present.
    pub nal_hrd_parameters_present_flag: bool,
    /// Equal to `true` specifies that VCL HRD parameters (pertaining to type I bitstream conformance)
    /// are present.
    pub vcl_hrd_parameters_present_flag: bool,
    /// Sub-picture HRD parameters, if `sub_pic_hrd_params_present_flag` is `true`.
    pub sub_pic_hrd_params: Option<SubPicHrdParams>,
    /// Specifies (together with [`bit_rate_value_minus1[i]`](SubLayerHrdParameters::bit_rate_value_minus1)) the maximum
    /// input bit rate of the i-th CPB.
    pub bit_rate_scale: Option<u8>,
    /// Specifies (together with [`cpb_size_value_minus1[i]`](SubLayerHrdParameters::cpb_size_value_minus1)) the CPB size
    /// of the i-th CPB when the CPB operates at the access unit level.
    pub cpb_size_scale: Option<u8>,
    /// This value plus 1 specifies the length, in bits, of the
    /// `nal_initial_cpb_removal_delay[i]`, `nal_initial_cpb_removal_offset[i]`, `vcl_initial_cpb_removal_delay[i]`,
    /// and `vcl_initial_cpb_removal_offset[i]` syntax elements of the buffering period SEI message.
    pub initial_cpb_removal_delay_length_minus1: u8,
    /// This value plus 1 specifies the length, in bits, of the `cpb_delay_offset` syntax
    /// element in the buffering period SEI message and the `au_cpb_removal_delay_minus1` syntax element in
    /// the picture timing SEI message.
    pub au_cpb_removal_delay_length_minus1: u8,
    /// This value plus 1 specifies the length, in bits, of the `dpb_delay_offset` syntax
    /// element in the buffering period SEI message and the `pic_dpb_output_delay` syntax element in the picture
    /// timing SEI message.
    pub dpb_output_delay_length_minus1: u8,
}

impl Default for CommonInf {
    fn default() -> Self {
        Self {
            nal_hrd_parameters_present_flag: false,
            vcl_hrd_parameters_present_flag: false,
            sub_pic_hrd_params: None,
            bit_rate_scale: None,
            cpb_size_scale: None,
            initial_cpb_removal_delay_length_minus1: 23,
            au_cpb_removal_delay_length_minus1: 23,
            dpb_output_delay_length_minus1: 23,
        }
    }
}

/// Directly part of [`HrdParameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubPicHrdParams {
    /// Used to specify the clock sub-tick. A clock sub-tick is the minimum interval of
    /// time that can be represented in the coded data.
    pub tick_divisor_minus2: u8,
    /// This value plus 1 specifies the length, in bits, of the
    /// `du_cpb_removal_delay_increment_minus1[i]` and `du_common_cpb_removal_delay_increment_minus1`
    /// syntax elements of the picture timing SEI message and the `du_spt_cpb_removal_delay_increment` syntax
    /// element in the decoding unit information SEI message.
    pub du_cpb_removal_delay_increment_length_minus1: u8,
    /// Equal to `true` specifies that sub-picture level CPB removal
    /// delay parameters are present in picture timing SEI messages and no decoding unit information SEI
    /// message is available.
    pub sub_pic_cpb_params_in_pic_timing_sei_flag: bool,
    /// This value plus 1 specifies the length, in bits, of
    /// `pic_dpb_output_du_delay` syntax element in the picture timing SEI message and
    /// `pic_spt_dpb_output_du_delay` syntax element in the decoding unit information SEI message.
    pub dpb_output_delay_du_length_minus1: u8,
    /// Specifies (together with [`cpb_size_du_value_minus1[i]`](SubLayerHrdParameters::cpb_size_du_value_minus1))
    /// the CPB size of the i-th CPB when the CPB operates at sub-picture level.
    pub cpb_size_du_scale: u8,
}

/// Directly part of [`HrdParameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct HrdParametersSubLayer {
    /// Equal to `true` indicates that, when `HighestTid` is equal to `i`, the temporal
    /// distance between the HRD output times of consecutive pictures in output order is constrained as specified.
    pub fixed_pic_rate_general_flag: bool,
    /// Same constraint as [`fixed_pic_rate_general_flag`](Self::fixed_pic_rate_general_flag), within a CVS.
    ///
    /// Inferred to be `true` when `fixed_pic_rate_general_flag` is `true`.
    pub fixed_pic_rate_within_cvs_flag: bool,
    /// This value plus 1 (when present) specifies, when `HighestTid` is equal to `i`,
    /// the temporal distance, in clock ticks, between the elemental units that specify the HRD output times of
    /// consecutive pictures in output order as specified.
    ///
    /// The value is in range \[0, 2047\].
    pub elemental_duration_in_tc_minus1: Option<u32>,
    /// Specifies the HRD operational mode, when `HighestTid` is equal to `i`, as specified in
    /// ISO/IEC 23008-2 Annex C or ISO/IEC 23008-2 F.13.
    pub low_delay_hrd_flag: bool,
    /// This value plus 1 specifies the number of alternative CPB specifications in the bitstream of the
    /// CVS when `HighestTid` is equal to `i`.
    ///
    /// The value is in range \[0, 31\].
    pub cpb_cnt_minus1: u32,
    /// `sub_layer_hrd_parameters(i)` for the NAL HRD, one entry per CPB.
    pub nal_hrd_parameters: Vec<SubLayerHrdParameters>,
    /// `sub_layer_hrd_parameters(i)` for the VCL HRD, one entry per CPB.
    pub vcl_hrd_parameters: Vec<SubLayerHrdParameters>,
}

impl HrdParametersSubLayer {
    fn parse(reader: &mut NaluBitReader, common_inf: &CommonInf, sub_layer_id: u8) -> Result<Self> {
        let fixed_pic_rate_general_flag = reader.read_bit()?;
        let fixed_pic_rate_within_cvs_flag = if fixed_pic_rate_general_flag {
            true
        } else {
            reader.read_bit()?
        };

        let mut elemental_duration_in_tc_minus1_value = None;
        let mut low_delay_hrd_flag = false;
        if fixed_pic_rate_within_cvs_flag {
            let elemental_duration_in_tc_minus1 = reader.read_exp_golomb()?;
            range_check!(elemental_duration_in_tc_minus1, 0, 2047)?;
            elemental_duration_in_tc_minus1_value = Some(elemental_duration_in_tc_minus1);
        } else {
            low_delay_hrd_flag = reader.read_bit()?;
        }

        let mut cpb_cnt_minus1 = 0;
        if !low_delay_hrd_flag {
            cpb_cnt_minus1 = reader.read_exp_golomb()?;
            range_check!(cpb_cnt_minus1, 0, 31)?;
        }

        let sub_pic_hrd_params_present_flag = common_inf.sub_pic_hrd_params.is_some();

        let nal_hrd_parameters = if common_inf.nal_hrd_parameters_present_flag {
            SubLayerHrdParameters::parse(reader, sub_layer_id, cpb_cnt_minus1 + 1, sub_pic_hrd_params_present_flag)?
        } else {
            Vec::new()
        };

        let vcl_hrd_parameters = if common_inf.vcl_hrd_parameters_present_flag {
            SubLayerHrdParameters::parse(reader, sub_layer_id, cpb_cnt_minus1 + 1, sub_pic_hrd_params_present_flag)?
        } else {
            Vec::new()
        };

        Ok(Self {
            fixed_pic_rate_general_flag,
            fixed_pic_rate_within_cvs_flag,
            elemental_duration_in_tc_minus1: elemental_duration_in_tc_minus1_value,
            low_delay_hrd_flag,
            cpb_cnt_minus1,
            nal_hrd_parameters,
            vcl_hrd_parameters,
        })
    }
}

/// Sub-layer HRD parameters.
///
/// `sub_layer_hrd_parameters(subLayerId)`
///
/// - ISO/IEC 23008-2 - E.2.3
/// - ISO/IEC 23008-2 - E.3.3
#[derive(Debug, Clone, PartialEq)]
pub struct SubLayerHrdParameters {
    /// Specifies (together with [`bit_rate_scale`](CommonInf::bit_rate_scale)) the maximum input bit rate
    /// for the i-th CPB when the CPB operates at the access unit level.
    ///
    /// For any `i > 0`, `bit_rate_value_minus1[i]` is greater than `bit_rate_value_minus1[i − 1]`.
    pub bit_rate_value_minus1: u32,
    /// Used together with [`cpb_size_scale`](CommonInf::cpb_size_scale) to specify
    /// the i-th CPB size when the CPB operates at the access unit level.
    ///
    /// For any `i > 0`, `cpb_size_value_minus1[i]` is less than or equal to `cpb_size_value_minus1[i − 1]`.
    pub cpb_size_value_minus1: u32,
    /// Used together with [`cpb_size_du_scale`](SubPicHrdParams::cpb_size_du_scale) to specify
    /// the i-th CPB size when the CPB operates at sub-picture level.
    pub cpb_size_du_value_minus1: Option<u32>,
    /// Specifies (together with [`bit_rate_scale`](CommonInf::bit_rate_scale)) the maximum input bit rate for
    /// the i-th CPB when the CPB operates at the sub-picture level.
    pub bit_rate_du_value_minus1: Option<u32>,
    /// Equal to `false` specifies that the hypothetical stream scheduler (HSS) operates in an intermittent
    /// bit rate mode for the i-th CPB. Equal to `true` specifies a constant bit rate (CBR) mode.
    ///
    /// Only coded for sub-layers above the first, `None` for sub-layer 0.
    pub cbr_flag: Option<bool>,
}

impl SubLayerHrdParameters {
    fn parse(
        reader: &mut NaluBitReader,
        sub_layer_id: u8,
        cpb_cnt: u32,
        sub_pic_hrd_params_present_flag: bool,
    ) -> Result<Vec<Self>> {
        let mut parameters: Vec<Self> = Vec::with_capacity(cpb_cnt as usize);

        for _ in 0..cpb_cnt {
            let bit_rate_value_minus1 = reader.read_exp_golomb()?;
            let cpb_size_value_minus1 = reader.read_exp_golomb()?;

            if let Some(previous) = parameters.last() {
                if bit_rate_value_minus1 <= previous.bit_rate_value_minus1 {
                    return Err(NaluError::invalid("bit_rate_value_minus1", bit_rate_value_minus1));
                }
                if cpb_size_value_minus1 > previous.cpb_size_value_minus1 {
                    return Err(NaluError::invalid("cpb_size_value_minus1", cpb_size_value_minus1));
                }
            }

            let (cpb_size_du_value_minus1, bit_rate_du_value_minus1) = if sub_pic_hrd_params_present_flag {
                (Some(reader.read_exp_golomb()?), Some(reader.read_exp_golomb()?))
            } else {
                (None, None)
            };

            let cbr_flag = if sub_layer_id > 0 { Some(reader.read_bit()?) } else { None };

            parameters.push(Self {
                bit_rate_value_minus1,
                cpb_size_value_minus1,
                cpb_size_du_value_minus1,
                bit_rate_du_value_minus1,
                cbr_flag,
            });
        }

        Ok(parameters)
    }

    /// The bit rate in bits per second when the CPB operates at the access unit level.
    ///
    /// `BitRate[i] = (bit_rate_value_minus1[i] + 1) * 2^(6 + bit_rate_scale)` (E-77)
    pub fn bit_rate(&self, bit_rate_scale: u8) -> u64 {
        (u64::from(self.bit_rate_value_minus1) + 1) << (6 + u32::from(bit_rate_scale & 0xf))
    }

    /// The CPB size in bits when the CPB operates at the access unit level.
    ///
    /// `CpbSize[i] = (cpb_size_value_minus1[i] + 1) * 2^(4 + cpb_size_scale)` (E-78)
    pub fn cpb_size(&self, cpb_size_scale: u8) -> u64 {
        (u64::from(self.cpb_size_value_minus1) + 1) << (4 + u32::from(cpb_size_scale & 0xf))
    }

    /// The bit rate in bits per second at sub-picture level, when signalled.
    ///
    /// `BitRate[i] = (bit_rate_du_value_minus1[i] + 1) * 2^(6 + bit_rate_scale)` (E-80)
    pub fn bit_rate_du(&self, bit_rate_scale: u8) -> Option<u64> {
        let value = self.bit_rate_du_value_minus1?;
        Some((u64::from(value) + 1) << (6 + u32::from(bit_rate_scale & 0xf)))
    }

    /// The CPB size in bits at sub-picture level, when signalled.
    ///
    /// `CpbSize[i] = (cpb_size_du_value_minus1[i] + 1) * 2^(4 + cpb_size_du_scale)` (E-79)
    pub fn cpb_size_du(&self, cpb_size_du_scale: u8) -> Option<u64> {
        let value = self.cpb_size_du_value_minus1?;
        Some((u64::from(value) + 1) << (4 + u32::from(cpb_size_du_scale & 0xf)))
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use expgolomb::BitWriterExpGolombExt;
    use nalu::{BitWriter, NaluBitReader, NaluError};

    use super::HrdParameters;

    #[test]
    fn test_nal_hrd_with_sub_pic_params() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bit(true).unwrap(); // nal_hrd_parameters_present_flag
        writer.write_bit(false).unwrap(); // vcl_hrd_parameters_present_flag
        writer.write_bit(true).unwrap(); // sub_pic_hrd_params_present_flag
        writer.write_bits(23, 8).unwrap(); // tick_divisor_minus2
        writer.write_bits(4, 5).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_bits(6, 5).unwrap();
        writer.write_bits(2, 4).unwrap(); // bit_rate_scale
        writer.write_bits(3, 4).unwrap(); // cpb_size_scale
        writer.write_bits(1, 4).unwrap(); // cpb_size_du_scale
        writer.write_bits(15, 5).unwrap();
        writer.write_bits(16, 5).unwrap();
        writer.write_bits(17, 5).unwrap();

        // sub-layer 0
        writer.write_bit(true).unwrap(); // fixed_pic_rate_general_flag
        writer.write_exp_golomb(0).unwrap(); // elemental_duration_in_tc_minus1
        writer.write_exp_golomb(1).unwrap(); // cpb_cnt_minus1
        for (bit_rate, cpb_size) in [(999, 4999), (1999, 3999)] {
            writer.write_exp_golomb(bit_rate).unwrap();
            writer.write_exp_golomb(cpb_size).unwrap();
            writer.write_exp_golomb(7).unwrap(); // cpb_size_du_value_minus1
            writer.write_exp_golomb(9).unwrap(); // bit_rate_du_value_minus1
        }
        writer.write_rbsp_trailing_bits().unwrap();
        let data = writer.finish().unwrap();

        let mut reader = NaluBitReader::new(&data).unwrap();
        let hrd = HrdParameters::parse(&mut reader, true, 0).unwrap();
        assert!(reader.ended());

        let common_inf = &hrd.common_inf;
        assert_eq!(common_inf.bit_rate_scale, Some(2));
        assert_eq!(common_inf.cpb_size_scale, Some(3));
        assert_eq!(common_inf.sub_pic_hrd_params.as_ref().map(|p| p.cpb_size_du_scale), Some(1));
        assert_eq!(common_inf.dpb_output_delay_length_minus1, 17);

        let sub_layer = &hrd.sub_layers[0];
        assert!(sub_layer.fixed_pic_rate_within_cvs_flag);
        assert_eq!(sub_layer.elemental_duration_in_tc_minus1, Some(0));
        assert_eq!(sub_layer.nal_hrd_parameters.len(), 2);
        assert!(sub_layer.vcl_hrd_parameters.is_empty());

        let second = &sub_layer.nal_hrd_parameters[1];
        assert_eq!(second.cbr_flag, None);
        assert_eq!(second.bit_rate(2), 2000 * 256);
        assert_eq!(second.cpb_size(3), 4000 * 128);
        assert_eq!(second.bit_rate_du(2), Some(10 * 256));
        assert_eq!(second.cpb_size_du(1), Some(8 * 32));
    }

    #[test]
    fn test_without_common_inf() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        for _ in 0..2 {
            writer.write_bit(false).unwrap(); // fixed_pic_rate_general_flag
            writer.write_bit(false).unwrap(); // fixed_pic_rate_within_cvs_flag
            writer.write_bit(true).unwrap(); // low_delay_hrd_flag
        }
        writer.write_rbsp_trailing_bits().unwrap();
        let data = writer.finish().unwrap();

        let mut reader = NaluBitReader::new(&data).unwrap();
        let hrd = HrdParameters::parse(&mut reader, false, 1).unwrap();
        assert!(reader.ended());

        assert_eq!(hrd.common_inf.initial_cpb_removal_delay_length_minus1, 23);
        insta::assert_debug_snapshot!(hrd.sub_layers[1], @r"
        HrdParametersSubLayer {
            fixed_pic_rate_general_flag: false,
            fixed_pic_rate_within_cvs_flag: false,
            elemental_duration_in_tc_minus1: None,
            low_delay_hrd_flag: true,
            cpb_cnt_minus1: 0,
            nal_hrd_parameters: [],
            vcl_hrd_parameters: [],
        }
        ");
    }

    #[test]
    fn test_bit_rate_must_increase() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap(); // vcl_hrd_parameters_present_flag
        writer.write_bit(false).unwrap();
        writer.write_bits(0, 8 + 15).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(1).unwrap(); // cpb_cnt_minus1
        for _ in 0..2 {
            writer.write_exp_golomb(100).unwrap();
            writer.write_exp_golomb(100).unwrap();
        }
        writer.write_rbsp_trailing_bits().unwrap();
        let data = writer.finish().unwrap();

        let mut reader = NaluBitReader::new(&data).unwrap();
        assert_eq!(
            HrdParameters::parse(&mut reader, true, 0).unwrap_err(),
            NaluError::invalid("bit_rate_value_minus1", 100)
        );
    }

    #[test]
    fn test_cbr_flag_only_above_first_sub_layer() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bit(true).unwrap(); // nal_hrd_parameters_present_flag
        writer.write_bit(false).unwrap(); // vcl_hrd_parameters_present_flag
        writer.write_bit(false).unwrap(); // sub_pic_hrd_params_present_flag
        writer.write_bits(0, 4).unwrap(); // bit_rate_scale
        writer.write_bits(0, 4).unwrap(); // cpb_size_scale
        writer.write_bits(23, 5).unwrap();
        writer.write_bits(23, 5).unwrap();
        writer.write_bits(23, 5).unwrap();

        for sub_layer_id in 0..2 {
            writer.write_bit(true).unwrap(); // fixed_pic_rate_general_flag
            writer.write_exp_golomb(0).unwrap(); // elemental_duration_in_tc_minus1
            writer.write_exp_golomb(1).unwrap(); // cpb_cnt_minus1
            for (bit_rate, cpb_size) in [(10, 30), (20, 30)] {
                writer.write_exp_golomb(bit_rate).unwrap();
                writer.write_exp_golomb(cpb_size).unwrap();
                if sub_layer_id > 0 {
                    writer.write_bit(true).unwrap(); // cbr_flag
                }
            }
        }
        writer.write_rbsp_trailing_bits().unwrap();
        let data = writer.finish().unwrap();

        let mut reader = NaluBitReader::new(&data).unwrap();
        let hrd = HrdParameters::parse(&mut reader, true, 1).unwrap();
        assert!(reader.ended());

        let cbr_flags: Vec<Vec<Option<bool>>> = hrd
            .sub_layers
            .iter()
            .map(|sub_layer| sub_layer.nal_hrd_parameters.iter().map(|p| p.cbr_flag).collect())
            .collect();
        assert_eq!(cbr_flags, vec![vec![None, None], vec![Some(true), Some(true)]]);
        assert_eq!(hrd.sub_layers[1].nal_hrd_parameters[1].bit_rate_value_minus1, 20);
    }
}
