use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, Result, range_check};

/// The SPS fields present when `pic_order_cnt_type == 1`.
/// ISO/IEC-14496-10-2022 - 7.3.2.1.1
#[derive(Debug, Clone, PartialEq)]
pub struct PicOrderCountType1 {
    /// The `delta_pic_order_always_zero_flag`.
    ///
    /// 1 means `delta_pic_order_cnt[0]` and `delta_pic_order_cnt[1]` are absent from the
    /// slice headers and inferred to be 0.
    pub delta_pic_order_always_zero_flag: bool,

    /// The `offset_for_non_ref_pic`, signed.
    pub offset_for_non_ref_pic: i32,

    /// The `offset_for_top_to_bottom_field`, signed.
    pub offset_for_top_to_bottom_field: i32,

    /// The `num_ref_frames_in_pic_order_cnt_cycle`.
    ///
    /// The value of this ranges from \[0, 255\].
    pub num_ref_frames_in_pic_order_cnt_cycle: u32,

    /// The `offset_for_ref_frame` list, one signed entry per frame in the cycle.
    pub offset_for_ref_frame: Vec<i32>,
}

impl PicOrderCountType1 {
    /// Parses the fields of `PicOrderCountType1` from the reader.
    pub fn parse(reader: &mut NaluBitReader<'_>) -> Result<Self> {
        let delta_pic_order_always_zero_flag = reader.read_bit()?;
        let offset_for_non_ref_pic = reader.read_signed_exp_golomb()?;
        let offset_for_top_to_bottom_field = reader.read_signed_exp_golomb()?;
        let num_ref_frames_in_pic_order_cnt_cycle = reader.read_exp_golomb()?;
        range_check!(num_ref_frames_in_pic_order_cnt_cycle, 0, 255)?;

        let offset_for_ref_frame = (0..num_ref_frames_in_pic_order_cnt_cycle)
            .map(|_| reader.read_signed_exp_golomb())
            .collect::<Result<Vec<_>>>()?;

        Ok(PicOrderCountType1 {
            delta_pic_order_always_zero_flag,
            offset_for_non_ref_pic,
            offset_for_top_to_bottom_field,
            num_ref_frames_in_pic_order_cnt_cycle,
            offset_for_ref_frame,
        })
    }
}
