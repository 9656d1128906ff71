use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};

/// Fields the high profiles add to the SPS.
/// ISO/IEC-14496-10-2022 - 7.3.2.1.1
#[derive(Debug, Clone, PartialEq)]
pub struct SpsExtended {
    /// The `chroma_format_idc`, the chroma sampling relative to the luma sampling (6.2).
    ///
    /// The value of this ranges from \[0, 3\].
    pub chroma_format_idc: u8,

    /// The `separate_colour_plane_flag`, only present when `chroma_format_idc == 3`.
    ///
    /// 1 means the three colour components of 4:4:4 are coded separately and `ChromaArrayType` is 0.
    pub separate_colour_plane_flag: Option<bool>,

    /// The `bit_depth_luma_minus8`.
    ///
    /// The value of this ranges from \[0, 6\].
    pub bit_depth_luma_minus8: u8,

    /// The `bit_depth_chroma_minus8`.
    ///
    /// The value of this ranges from \[0, 6\].
    pub bit_depth_chroma_minus8: u8,

    /// The `qpprime_y_zero_transform_bypass_flag`.
    pub qpprime_y_zero_transform_bypass_flag: bool,

    /// The `seq_scaling_matrix_present_flag`.
    pub seq_scaling_matrix_present_flag: bool,

    /// One entry per `seq_scaling_list_present_flag[i]`, `None` where the flag is 0.
    ///
    /// Empty when `seq_scaling_matrix_present_flag` is 0, otherwise 8 entries (12 for 4:4:4).
    /// The first six are 4x4 lists and the rest are 8x8 lists.
    pub seq_scaling_lists: Vec<Option<ScalingList>>,
}

/// A decoded `scaling_list()`.
/// ISO/IEC-14496-10-2022 - 7.3.2.1.1.1
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingList {
    /// Every `delta_scale` read, in order. Reading stops once `nextScale` reaches 0.
    pub delta_scale: Vec<i32>,
    /// The resulting list, 16 or 64 entries.
    pub scaling_list: Vec<u8>,
    /// Set when the first `delta_scale` selects the default matrix.
    pub use_default_scaling_matrix_flag: bool,
}

impl SpsExtended {
    /// Parses the high profile fields, starting at `chroma_format_idc`.
    pub fn parse(reader: &mut NaluBitReader<'_>) -> Result<Self> {
        let chroma_format_idc = reader.read_exp_golomb()?;
        range_check!(chroma_format_idc, 0, 3)?;

        let separate_colour_plane_flag = if chroma_format_idc == 3 {
            Some(reader.read_bit()?)
        } else {
            None
        };

        let bit_depth_luma_minus8 = reader.read_exp_golomb()?;
        range_check!(bit_depth_luma_minus8, 0, 6)?;
        let bit_depth_chroma_minus8 = reader.read_exp_golomb()?;
        range_check!(bit_depth_chroma_minus8, 0, 6)?;

        let qpprime_y_zero_transform_bypass_flag = reader.read_bit()?;
        let seq_scaling_matrix_present_flag = reader.read_bit()?;

        let mut seq_scaling_lists = Vec::new();
        if seq_scaling_matrix_present_flag {
            let count = if chroma_format_idc != 3 { 8 } else { 12 };
            for i in 0..count {
                let seq_scaling_list_present_flag = reader.read_bit()?;
                let list = if seq_scaling_list_present_flag {
                    let size = if i < 6 { 16 } else { 64 };
                    Some(ScalingList::parse(reader, size)?)
                } else {
                    None
                };
                seq_scaling_lists.push(list);
            }
        }

        Ok(SpsExtended {
            chroma_format_idc: chroma_format_idc as u8,
            separate_colour_plane_flag,
            bit_depth_luma_minus8: bit_depth_luma_minus8 as u8,
            bit_depth_chroma_minus8: bit_depth_chroma_minus8 as u8,
            qpprime_y_zero_transform_bypass_flag,
            seq_scaling_matrix_present_flag,
            seq_scaling_lists,
        })
    }
}

impl ScalingList {
    fn parse(reader: &mut NaluBitReader<'_>, size: usize) -> Result<Self> {
        let mut delta_scale = Vec::new();
        let mut scaling_list = Vec::with_capacity(size);
        let mut use_default_scaling_matrix_flag = false;
        let mut last_scale = 8i32;
        let mut next_scale = 8i32;

        for j in 0..size {
            if next_scale != 0 {
                let delta = reader.read_signed_exp_golomb()?;
                range_check!(delta, -128, 127)?;
                delta_scale.push(delta);
                next_scale = (last_scale + delta).rem_euclid(256);
                use_default_scaling_matrix_flag = j == 0 && next_scale == 0;
            }

            let value = if next_scale == 0 { last_scale } else { next_scale };
            let value = u8::try_from(value).map_err(|_| NaluError::invalid("scaling_list", value))?;
            scaling_list.push(value);
            last_scale = i32::from(value);
        }

        Ok(ScalingList {
            delta_scale,
            scaling_list,
            use_default_scaling_matrix_flag,
        })
    }
}
