use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};

/// Upper bound of `NumNegativePics` and `NumPositivePics`, the largest `MaxDpbSize - 1` of Annex A.
const MAX_PICS: usize = 16;

/// Short-term reference picture set syntax.
///
/// `st_ref_pic_set(stRpsIdx)`
///
/// - ISO/IEC 23008-2 - 7.3.7
/// - ISO/IEC 23008-2 - 7.4.8
///
/// The coded syntax sits in exactly one of [`explicit`](Self::explicit) and
/// [`inter_ref_pic_set_prediction`](Self::inter_ref_pic_set_prediction). The derived arrays are
/// stored for every set.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortTermRefPicSet {
    /// Present when `inter_ref_pic_set_prediction_flag` is `false`.
    pub explicit: Option<ExplicitRefPicSet>,
    /// Present when `inter_ref_pic_set_prediction_flag` is `true`.
    pub inter_ref_pic_set_prediction: Option<InterRefPicSetPrediction>,
    /// `DeltaPocS0[stRpsIdx][i]`, the POC distances of the pictures before the current one, closest first.
    ///
    /// For an explicit set `DeltaPocS0[i] = DeltaPocS0[i - 1] - (delta_poc_s0_minus1[i] + 1)`,
    /// starting from 0 (7-67, 7-69).
    pub delta_poc_s0: Vec<i32>,
    /// `UsedByCurrPicS0[stRpsIdx][i]`
    pub used_by_curr_pic_s0: Vec<bool>,
    /// `DeltaPocS1[stRpsIdx][i]`, the POC distances of the pictures after the current one, closest first.
    ///
    /// For an explicit set `DeltaPocS1[i] = DeltaPocS1[i - 1] + (delta_poc_s1_minus1[i] + 1)`,
    /// starting from 0 (7-68, 7-70).
    pub delta_poc_s1: Vec<i32>,
    /// `UsedByCurrPicS1[stRpsIdx][i]`
    pub used_by_curr_pic_s1: Vec<bool>,
}

/// The syntax elements of an explicitly coded [`ShortTermRefPicSet`].
///
/// The `used_by_curr_pic_s0_flag` and `used_by_curr_pic_s1_flag` values are kept on the set itself,
/// they equal `UsedByCurrPicS0` and `UsedByCurrPicS1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitRefPicSet {
    /// `num_negative_pics`
    pub num_negative_pics: u32,
    /// `num_positive_pics`
    pub num_positive_pics: u32,
    /// `delta_poc_s0_minus1[i]`, each in range \[0, 2^15 - 1\].
    pub delta_poc_s0_minus1: Vec<u32>,
    /// `delta_poc_s1_minus1[i]`, each in range \[0, 2^15 - 1\].
    pub delta_poc_s1_minus1: Vec<u32>,
}

/// The syntax elements of a predicted [`ShortTermRefPicSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct InterRefPicSetPrediction {
    /// Only coded in slice headers, 0 otherwise.
    pub delta_idx_minus1: u32,
    /// `delta_rps_sign`
    pub delta_rps_sign: bool,
    /// `abs_delta_rps_minus1`, in range \[0, 2^15 - 1\].
    pub abs_delta_rps_minus1: u32,
    /// `used_by_curr_pic_flag[j]`, one per entry of the reference set plus one.
    pub used_by_curr_pic_flag: Vec<bool>,
    /// `use_delta_flag[j]`, inferred `true` where not coded.
    pub use_delta_flag: Vec<bool>,
}

impl InterRefPicSetPrediction {
    /// `deltaRps = (1 − 2 * delta_rps_sign) * (abs_delta_rps_minus1 + 1)` (7-60)
    pub fn delta_rps(&self) -> i32 {
        let magnitude = self.abs_delta_rps_minus1 as i32 + 1;
        if self.delta_rps_sign { -magnitude } else { magnitude }
    }
}

impl ShortTermRefPicSet {
    /// Parses set `st_rps_idx`.
    ///
    /// `history` holds the sets `0..st_rps_idx` parsed before, a predicted set refers to one of them.
    /// In a slice header `st_rps_idx` is equal to `num_short_term_ref_pic_sets`.
    pub fn parse(
        reader: &mut NaluBitReader,
        st_rps_idx: usize,
        num_short_term_ref_pic_sets: usize,
        history: &[ShortTermRefPicSet],
    ) -> Result<Self> {
        let inter_ref_pic_set_prediction_flag = if st_rps_idx != 0 { reader.read_bit()? } else { false };

        if inter_ref_pic_set_prediction_flag {
            Self::parse_predicted(reader, st_rps_idx, num_short_term_ref_pic_sets, history)
        } else {
            Self::parse_explicit(reader)
        }
    }

    fn parse_explicit(reader: &mut NaluBitReader) -> Result<Self> {
        let num_negative_pics = reader.read_exp_golomb()?;
        range_check!(num_negative_pics, 0, MAX_PICS as u32)?;
        let num_positive_pics = reader.read_exp_golomb()?;
        range_check!(num_positive_pics, 0, MAX_PICS as u32 - num_negative_pics)?;

        let mut explicit = ExplicitRefPicSet {
            num_negative_pics,
            num_positive_pics,
            delta_poc_s0_minus1: Vec::with_capacity(num_negative_pics as usize),
            delta_poc_s1_minus1: Vec::with_capacity(num_positive_pics as usize),
        };

        let mut delta_poc_s0 = Vec::with_capacity(num_negative_pics as usize);
        let mut used_by_curr_pic_s0 = Vec::with_capacity(num_negative_pics as usize);
        let mut poc = 0;
        for _ in 0..num_negative_pics {
            let delta_poc_s0_minus1 = reader.read_exp_golomb()?;
            range_check!(delta_poc_s0_minus1, 0, 2u32.pow(15) - 1)?;
            // (7-67) and (7-69)
            poc -= delta_poc_s0_minus1 as i32 + 1;
            explicit.delta_poc_s0_minus1.push(delta_poc_s0_minus1);
            delta_poc_s0.push(poc);
            used_by_curr_pic_s0.push(reader.read_bit()?);
        }

        let mut delta_poc_s1 = Vec::with_capacity(num_positive_pics as usize);
        let mut used_by_curr_pic_s1 = Vec::with_capacity(num_positive_pics as usize);
        let mut poc = 0;
        for _ in 0..num_positive_pics {
            let delta_poc_s1_minus1 = reader.read_exp_golomb()?;
            range_check!(delta_poc_s1_minus1, 0, 2u32.pow(15) - 1)?;
            // (7-68) and (7-70)
            poc += delta_poc_s1_minus1 as i32 + 1;
            explicit.delta_poc_s1_minus1.push(delta_poc_s1_minus1);
            delta_poc_s1.push(poc);
            used_by_curr_pic_s1.push(reader.read_bit()?);
        }

        Ok(Self {
            explicit: Some(explicit),
            inter_ref_pic_set_prediction: None,
            delta_poc_s0,
            used_by_curr_pic_s0,
            delta_poc_s1,
            used_by_curr_pic_s1,
        })
    }

    fn parse_predicted(
        reader: &mut NaluBitReader,
        st_rps_idx: usize,
        num_short_term_ref_pic_sets: usize,
        history: &[ShortTermRefPicSet],
    ) -> Result<Self> {
        let mut delta_idx_minus1 = 0;
        if st_rps_idx == num_short_term_ref_pic_sets {
            delta_idx_minus1 = reader.read_exp_golomb()?;
            range_check!(delta_idx_minus1, 0, (st_rps_idx - 1) as u32)?;
        }

        // (7-59)
        let ref_rps_idx = st_rps_idx
            .checked_sub(delta_idx_minus1 as usize + 1)
            .ok_or(NaluError::invalid("delta_idx_minus1", delta_idx_minus1))?;
        let reference = history
            .get(ref_rps_idx)
            .ok_or(NaluError::invalid("RefRpsIdx", ref_rps_idx as i64))?;

        let delta_rps_sign = reader.read_bit()?;
        let abs_delta_rps_minus1 = reader.read_exp_golomb()?;
        range_check!(abs_delta_rps_minus1, 0, 2u32.pow(15) - 1)?;

        let num_delta_pocs = reference.num_delta_pocs();
        let mut used_by_curr_pic_flag = Vec::with_capacity(num_delta_pocs + 1);
        let mut use_delta_flag = Vec::with_capacity(num_delta_pocs + 1);
        for _ in 0..=num_delta_pocs {
            let used = reader.read_bit()?;
            used_by_curr_pic_flag.push(used);
            use_delta_flag.push(if used { true } else { reader.read_bit()? });
        }

        let prediction = InterRefPicSetPrediction {
            delta_idx_minus1,
            delta_rps_sign,
            abs_delta_rps_minus1,
            used_by_curr_pic_flag,
            use_delta_flag,
        };
        let delta_rps = prediction.delta_rps();

        // entry j of the flags covers DeltaPocS0[j], then DeltaPocS1[j - NumNegativePics], then deltaRps itself
        let num_negative = reference.num_negative_pics();
        let flags = |j: usize| (prediction.use_delta_flag[j], prediction.used_by_curr_pic_flag[j]);

        let mut delta_poc_s0 = Vec::new();
        let mut used_by_curr_pic_s0 = Vec::new();
        let mut delta_poc_s1 = Vec::new();
        let mut used_by_curr_pic_s1 = Vec::new();

        // (7-61)
        for (j, d_poc) in reference.delta_poc_s1.iter().enumerate().rev() {
            let d_poc = d_poc + delta_rps;
            let (use_delta, used) = flags(num_negative + j);
            if d_poc < 0 && use_delta {
                delta_poc_s0.push(d_poc);
                used_by_curr_pic_s0.push(used);
            }
        }
        let (use_delta, used) = flags(num_delta_pocs);
        if delta_rps < 0 && use_delta {
            delta_poc_s0.push(delta_rps);
            used_by_curr_pic_s0.push(used);
        }
        for (j, d_poc) in reference.delta_poc_s0.iter().enumerate() {
            let d_poc = d_poc + delta_rps;
            let (use_delta, used) = flags(j);
            if d_poc < 0 && use_delta {
                delta_poc_s0.push(d_poc);
                used_by_curr_pic_s0.push(used);
            }
        }

        // (7-62)
        for (j, d_poc) in reference.delta_poc_s0.iter().enumerate().rev() {
            let d_poc = d_poc + delta_rps;
            let (use_delta, used) = flags(j);
            if d_poc > 0 && use_delta {
                delta_poc_s1.push(d_poc);
                used_by_curr_pic_s1.push(used);
            }
        }
        let (use_delta, used) = flags(num_delta_pocs);
        if delta_rps > 0 && use_delta {
            delta_poc_s1.push(delta_rps);
            used_by_curr_pic_s1.push(used);
        }
        for (j, d_poc) in reference.delta_poc_s1.iter().enumerate() {
            let d_poc = d_poc + delta_rps;
            let (use_delta, used) = flags(num_negative + j);
            if d_poc > 0 && use_delta {
                delta_poc_s1.push(d_poc);
                used_by_curr_pic_s1.push(used);
            }
        }

        let num_negative_pics = delta_poc_s0.len();
        range_check!(num_negative_pics, 0, MAX_PICS)?;
        let num_positive_pics = delta_poc_s1.len();
        range_check!(num_positive_pics, 0, MAX_PICS - num_negative_pics)?;

        Ok(Self {
            explicit: None,
            inter_ref_pic_set_prediction: Some(prediction),
            delta_poc_s0,
            used_by_curr_pic_s0,
            delta_poc_s1,
            used_by_curr_pic_s1,
        })
    }

    /// `NumNegativePics[stRpsIdx]`
    pub fn num_negative_pics(&self) -> usize {
        self.delta_poc_s0.len()
    }

    /// `NumPositivePics[stRpsIdx]`
    pub fn num_positive_pics(&self) -> usize {
        self.delta_poc_s1.len()
    }

    /// `NumDeltaPocs[stRpsIdx] = NumNegativePics[stRpsIdx] + NumPositivePics[stRpsIdx]` (7-71)
    pub fn num_delta_pocs(&self) -> usize {
        self.num_negative_pics() + self.num_positive_pics()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use expgolomb::BitWriterExpGolombExt;
    use nalu::{BitWriter, NaluBitReader, NaluError};

    use super::ShortTermRefPicSet;

    fn finish(mut writer: BitWriter<Vec<u8>>) -> Vec<u8> {
        writer.write_rbsp_trailing_bits().unwrap();
        writer.finish().unwrap()
    }

    /// Writes set 0: `DeltaPocS0 = [-1, -3]`, `DeltaPocS1 = [2]`.
    fn write_explicit_set(writer: &mut BitWriter<Vec<u8>>) {
        writer.write_exp_golomb(2).unwrap(); // num_negative_pics
        writer.write_exp_golomb(1).unwrap(); // num_positive_pics
        writer.write_exp_golomb(0).unwrap(); // delta_poc_s0_minus1
        writer.write_bit(true).unwrap();
        writer.write_exp_golomb(1).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_exp_golomb(1).unwrap(); // delta_poc_s1_minus1
        writer.write_bit(true).unwrap();
    }

    #[test]
    fn test_explicit() {
        let mut writer = BitWriter::default();
        write_explicit_set(&mut writer);
        let data = finish(writer);

        let mut reader = NaluBitReader::new(&data).unwrap();
        let set = ShortTermRefPicSet::parse(&mut reader, 0, 1, &[]).unwrap();
        assert!(reader.ended());

        insta::assert_debug_snapshot!(set, @r"
        ShortTermRefPicSet {
            explicit: Some(
                ExplicitRefPicSet {
                    num_negative_pics: 2,
                    num_positive_pics: 1,
                    delta_poc_s0_minus1: [
                        0,
                        1,
                    ],
                    delta_poc_s1_minus1: [
                        1,
                    ],
                },
            ),
            inter_ref_pic_set_prediction: None,
            delta_poc_s0: [
                -1,
                -3,
            ],
            used_by_curr_pic_s0: [
                true,
                false,
            ],
            delta_poc_s1: [
                2,
            ],
            used_by_curr_pic_s1: [
                true,
            ],
        }
        ");
        assert_eq!(set.num_delta_pocs(), 3);
    }

    #[test]
    fn test_predicted() {
        let mut writer = BitWriter::default();
        write_explicit_set(&mut writer);
        writer.write_bit(true).unwrap(); // inter_ref_pic_set_prediction_flag
        writer.write_bit(true).unwrap(); // delta_rps_sign
        writer.write_exp_golomb(0).unwrap(); // abs_delta_rps_minus1, deltaRps = -1
        for used in [true, true, true] {
            writer.write_bit(used).unwrap();
        }
        writer.write_bit(false).unwrap(); // used_by_curr_pic_flag for deltaRps itself
        writer.write_bit(true).unwrap(); // use_delta_flag
        let data = finish(writer);

        let mut reader = NaluBitReader::new(&data).unwrap();
        let mut history = Vec::new();
        for st_rps_idx in 0..2 {
            let set = ShortTermRefPicSet::parse(&mut reader, st_rps_idx, 2, &history).unwrap();
            history.push(set);
        }
        assert!(reader.ended());

        let predicted = &history[1];
        assert_eq!(predicted.explicit, None);
        assert_eq!(predicted.delta_poc_s0, vec![-1, -2, -4]);
        assert_eq!(predicted.used_by_curr_pic_s0, vec![false, true, true]);
        assert_eq!(predicted.delta_poc_s1, vec![1]);
        assert_eq!(predicted.used_by_curr_pic_s1, vec![true]);

        let prediction = predicted.inter_ref_pic_set_prediction.as_ref().unwrap();
        assert_eq!(prediction.delta_rps(), -1);
        assert_eq!(prediction.use_delta_flag, vec![true; 4]);
    }

    #[test]
    fn test_predicted_in_slice_header() {
        let mut writer = BitWriter::default();
        writer.write_bit(true).unwrap(); // inter_ref_pic_set_prediction_flag
        writer.write_exp_golomb(0).unwrap(); // delta_idx_minus1
        writer.write_bit(false).unwrap(); // delta_rps_sign
        writer.write_exp_golomb(1).unwrap(); // deltaRps = 2
        for _ in 0..4 {
            writer.write_bit(false).unwrap(); // used_by_curr_pic_flag
            writer.write_bit(false).unwrap(); // use_delta_flag
        }
        let data = finish(writer);

        let mut explicit = BitWriter::default();
        write_explicit_set(&mut explicit);
        let explicit = finish(explicit);
        let history = vec![ShortTermRefPicSet::parse(&mut NaluBitReader::new(&explicit).unwrap(), 0, 1, &[]).unwrap()];

        let mut reader = NaluBitReader::new(&data).unwrap();
        let set = ShortTermRefPicSet::parse(&mut reader, 1, 1, &history).unwrap();
        assert!(reader.ended());
        assert_eq!(set.num_delta_pocs(), 0);
        assert_eq!(set.inter_ref_pic_set_prediction.unwrap().delta_idx_minus1, 0);
    }

    #[test]
    fn test_too_many_pictures() {
        let mut writer = BitWriter::default();
        writer.write_exp_golomb(10).unwrap();
        writer.write_exp_golomb(7).unwrap();
        let data = finish(writer);

        let mut reader = NaluBitReader::new(&data).unwrap();
        assert_eq!(
            ShortTermRefPicSet::parse(&mut reader, 0, 1, &[]).unwrap_err(),
            NaluError::OutOfRange {
                element: "num_positive_pics",
                value: 7,
                lower: 0,
                upper: 6,
            }
        );
    }

    #[test]
    fn test_missing_reference() {
        let mut writer = BitWriter::default();
        writer.write_bit(true).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_exp_golomb(0).unwrap();
        let data = finish(writer);

        let mut reader = NaluBitReader::new(&data).unwrap();
        assert_eq!(
            ShortTermRefPicSet::parse(&mut reader, 1, 2, &[]).unwrap_err(),
            NaluError::invalid("RefRpsIdx", 0)
        );
    }
}
