use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};

/// DPB size, reorder and latency limits for each sub-layer.
///
/// Part of the [VPS](crate::VpsRbsp) and the [SPS](crate::SpsRbsp). Each vector has one slot per
/// sub-layer. When `sub_layer_ordering_info_present_flag` is `false` only the last slot is signalled,
/// the others are `None` and inferred from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubLayerOrderingInfo {
    /// `max_dec_pic_buffering_minus1[i]` plus 1 specifies the maximum required size of the decoded
    /// picture buffer for the CVS in units of picture storage buffers when `HighestTid` is equal to `i`.
    pub max_dec_pic_buffering_minus1: Vec<Option<u32>>,
    /// `max_num_reorder_pics[i]` indicates the maximum allowed number of pictures with `PicOutputFlag`
    /// equal to 1 that can precede any picture with `PicOutputFlag` equal to 1 in the CVS in decoding order and
    /// follow that picture with `PicOutputFlag` equal to 1 in output order when `HighestTid` is equal to i.
    pub max_num_reorder_pics: Vec<Option<u32>>,
    /// `max_latency_increase_plus1[i]` not equal to 0 is used to compute the value of
    /// [`SpsMaxLatencyPictures[i]`](SubLayerOrderingInfo::max_latency_pictures).
    pub max_latency_increase_plus1: Vec<Option<u32>>,
}

impl SubLayerOrderingInfo {
    /// Parses the loop `for (i = (present_flag ? 0 : max_sub_layers_minus1); i <= max_sub_layers_minus1; i++)`.
    pub fn parse(
        reader: &mut NaluBitReader,
        sub_layer_ordering_info_present_flag: bool,
        max_sub_layers_minus1: u8,
    ) -> Result<Self> {
        let len = max_sub_layers_minus1 as usize + 1;
        let mut info = Self {
            max_dec_pic_buffering_minus1: vec![None; len],
            max_num_reorder_pics: vec![None; len],
            max_latency_increase_plus1: vec![None; len],
        };

        let first = if sub_layer_ordering_info_present_flag { 0 } else { len - 1 };
        let mut previous: Option<(u32, u32)> = None;

        for i in first..len {
            let max_dec_pic_buffering_minus1 = reader.read_exp_golomb()?;
            // (A-2) defines MaxDpbSize which is always at most 16
            range_check!(max_dec_pic_buffering_minus1, 0, 15)?;

            let max_num_reorder_pics = reader.read_exp_golomb()?;
            range_check!(max_num_reorder_pics, 0, max_dec_pic_buffering_minus1)?;

            if let Some((previous_buffering, previous_reorder)) = previous {
                if max_dec_pic_buffering_minus1 < previous_buffering {
                    return Err(NaluError::invalid("max_dec_pic_buffering_minus1", max_dec_pic_buffering_minus1));
                }
                if max_num_reorder_pics < previous_reorder {
                    return Err(NaluError::invalid("max_num_reorder_pics", max_num_reorder_pics));
                }
            }
            previous = Some((max_dec_pic_buffering_minus1, max_num_reorder_pics));

            info.max_dec_pic_buffering_minus1[i] = Some(max_dec_pic_buffering_minus1);
            info.max_num_reorder_pics[i] = Some(max_num_reorder_pics);
            info.max_latency_increase_plus1[i] = Some(reader.read_exp_golomb()?);
        }

        Ok(info)
    }

    fn inferred(values: &[Option<u32>], i: usize) -> Option<u32> {
        values.get(i)?.or(*values.last()?)
    }

    /// `max_dec_pic_buffering_minus1[i]`, inferred from the highest sub-layer when absent.
    pub fn max_dec_pic_buffering_minus1_at(&self, i: usize) -> Option<u32> {
        Self::inferred(&self.max_dec_pic_buffering_minus1, i)
    }

    /// `max_num_reorder_pics[i]`, inferred from the highest sub-layer when absent.
    pub fn max_num_reorder_pics_at(&self, i: usize) -> Option<u32> {
        Self::inferred(&self.max_num_reorder_pics, i)
    }

    /// Calculates `SpsMaxLatencyPictures[i]`.
    ///
    /// `SpsMaxLatencyPictures[i] = sps_max_num_reorder_pics[i] + sps_max_latency_increase_plus1[i] − 1` (7-9)
    ///
    /// `None` when there is no latency limit, that is `max_latency_increase_plus1[i]` is 0.
    ///
    /// ISO/IEC 23008-2 - 7.4.3.2
    pub fn max_latency_pictures(&self, i: usize) -> Option<u64> {
        let reorder = self.max_num_reorder_pics_at(i)?;
        let latency = Self::inferred(&self.max_latency_increase_plus1, i)?;
        Some(u64::from(reorder) + u64::from(latency.checked_sub(1)?))
    }
}
