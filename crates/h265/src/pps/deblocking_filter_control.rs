use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, Result, range_check};

/// Deblocking filter defaults of the PPS, present when `deblocking_filter_control_present_flag` is `true`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeblockingFilterControl {
    /// `true` when slice headers may override the deblocking filter settings.
    pub deblocking_filter_override_enabled_flag: bool,
    /// `pps_deblocking_filter_disabled_flag`
    pub pps_deblocking_filter_disabled_flag: bool,
    /// Default deblocking parameter offset for β divided by 2, in range \[-6, 6\].
    pub pps_beta_offset_div2: i8,
    /// Default deblocking parameter offset for tC divided by 2, in range \[-6, 6\].
    pub pps_tc_offset_div2: i8,
}

impl DeblockingFilterControl {
    pub(crate) fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let deblocking_filter_override_enabled_flag = reader.read_bit()?;
        let pps_deblocking_filter_disabled_flag = reader.read_bit()?;

        let mut pps_beta_offset_div2 = 0;
        let mut pps_tc_offset_div2 = 0;
        if !pps_deblocking_filter_disabled_flag {
            pps_beta_offset_div2 = reader.read_signed_exp_golomb()?;
            range_check!(pps_beta_offset_div2, -6, 6)?;
            pps_tc_offset_div2 = reader.read_signed_exp_golomb()?;
            range_check!(pps_tc_offset_div2, -6, 6)?;
        }

        Ok(Self {
            deblocking_filter_override_enabled_flag,
            pps_deblocking_filter_disabled_flag,
            pps_beta_offset_div2: pps_beta_offset_div2 as i8,
            pps_tc_offset_div2: pps_tc_offset_div2 as i8,
        })
    }
}
