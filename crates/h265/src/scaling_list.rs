use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, Result, range_check};

/// `ScalingList[0][0..5][i]`
///
/// ISO/IEC 23008-2 - Table 7-5
const TABLE_7_5: [u8; 16] = [16; 16];

/// `ScalingList[1..3][0..2][i]`
///
/// ISO/IEC 23008-2 - Table 7-6
#[rustfmt::skip]
const TABLE_7_6_INTRA: [u8; 64] = [
    //0  1   2   3   4   5   6   7   8   9  10  11  12  13  14  15
    16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 17, 16, 17, 16, 17, 18,
    17, 18, 18, 17, 18, 21, 19, 20, 21, 20, 19, 21, 24, 22, 22, 24,
    24, 22, 22, 24, 25, 25, 27, 30, 27, 25, 25, 29, 31, 35, 35, 31,
    29, 36, 41, 44, 41, 36, 47, 54, 54, 47, 65, 70, 65, 88, 88, 115,
];

/// `ScalingList[1..3][3..5][i]`
///
/// ISO/IEC 23008-2 - Table 7-6
#[rustfmt::skip]
const TABLE_7_6_INTER: [u8; 64] = [
    //0  1   2   3   4   5   6   7   8   9  10  11  12  13  14  15
    16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 17, 17, 17, 17, 17, 18,
    18, 18, 18, 18, 18, 20, 20, 20, 20, 20, 20, 20, 24, 24, 24, 24,
    24, 24, 24, 24, 25, 25, 25, 25, 25, 25, 25, 28, 28, 28, 28, 28,
    28, 33, 33, 33, 33, 33, 41, 41, 41, 41, 54, 54, 54, 71, 71, 91,
];

/// Value of `scaling_list_dc_coef_minus8 + 8` when a list is inferred from the defaults.
const DEFAULT_DC_COEF: u8 = 16;

/// Scaling list data.
///
/// `scaling_list_data()`
///
/// - ISO/IEC 23008-2 - 7.3.4
/// - ISO/IEC 23008-2 - 7.4.5
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingListData {
    /// The resulting scaling list, in up-right diagonal scan order.
    ///
    /// `ScalingList[0..3][0..5][0..63]`
    ///
    /// 4x4 lists (`sizeId` 0) only use the first 16 entries. Only matrices 0 and 3 are
    /// signalled for 32x32 (`sizeId` 3), the other four stay zero.
    pub scaling_list: [[[u8; 64]; 6]; 4],
    /// `scaling_list_dc_coef_minus8[sizeId - 2][matrixId] + 8` for 16x16 and 32x32 lists.
    pub scaling_list_dc_coef: [[u8; 6]; 2],
}

impl Default for ScalingListData {
    /// The lists inferred when scaling lists are enabled but not signalled.
    fn default() -> Self {
        let mut scaling_list = [[[0; 64]; 6]; 4];
        for (size_id, matrices) in scaling_list.iter_mut().enumerate() {
            let step = if size_id == 3 { 3 } else { 1 };
            for (matrix_id, list) in matrices.iter_mut().enumerate().step_by(step) {
                *list = default_list(size_id, matrix_id);
            }
        }

        Self {
            scaling_list,
            scaling_list_dc_coef: [[DEFAULT_DC_COEF; 6]; 2],
        }
    }
}

fn default_list(size_id: usize, matrix_id: usize) -> [u8; 64] {
    let mut list = [0; 64];
    match (size_id, matrix_id) {
        (0, _) => list[..16].copy_from_slice(&TABLE_7_5),
        (_, 0..3) => list = TABLE_7_6_INTRA,
        _ => list = TABLE_7_6_INTER,
    }
    list
}

impl ScalingListData {
    /// Parses `scaling_list_data()` from the SPS or PPS.
    pub fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let mut data = Self {
            scaling_list: [[[0; 64]; 6]; 4],
            scaling_list_dc_coef: [[DEFAULT_DC_COEF; 6]; 2],
        };

        for size_id in 0..4 {
            let step = if size_id == 3 { 3 } else { 1 };
            let coef_num = usize::min(64, 1 << (4 + (size_id << 1)));

            for matrix_id in (0..6).step_by(step) {
                let scaling_list_pred_mode_flag = reader.read_bit()?;

                if !scaling_list_pred_mode_flag {
                    let scaling_list_pred_matrix_id_delta = reader.read_exp_golomb()? as usize;
                    range_check!(scaling_list_pred_matrix_id_delta, 0, matrix_id / step)?;

                    if scaling_list_pred_matrix_id_delta == 0 {
                        data.scaling_list[size_id][matrix_id] = default_list(size_id, matrix_id);
                        if size_id > 1 {
                            data.scaling_list_dc_coef[size_id - 2][matrix_id] = DEFAULT_DC_COEF;
                        }
                    } else {
                        let ref_matrix_id = matrix_id - scaling_list_pred_matrix_id_delta * step;
                        data.scaling_list[size_id][matrix_id] = data.scaling_list[size_id][ref_matrix_id];
                        if size_id > 1 {
                            data.scaling_list_dc_coef[size_id - 2][matrix_id] =
                                data.scaling_list_dc_coef[size_id - 2][ref_matrix_id];
                        }
                    }
                } else {
                    let mut next_coef = 8i32;

                    if size_id > 1 {
                        let scaling_list_dc_coef_minus8 = reader.read_signed_exp_golomb()?;
                        range_check!(scaling_list_dc_coef_minus8, -7, 247)?;
                        next_coef = scaling_list_dc_coef_minus8 + 8;
                        data.scaling_list_dc_coef[size_id - 2][matrix_id] = next_coef as u8;
                    }

                    for coef in data.scaling_list[size_id][matrix_id].iter_mut().take(coef_num) {
                        let scaling_list_delta_coef = reader.read_signed_exp_golomb()?;
                        range_check!(scaling_list_delta_coef, -128, 127)?;
                        next_coef = (next_coef + scaling_list_delta_coef + 256) % 256;
                        *coef = next_coef as u8;
                    }
                }
            }
        }

        Ok(data)
    }
}
