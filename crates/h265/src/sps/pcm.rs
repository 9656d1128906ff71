use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};

/// PCM sample coding parameters.
///
/// Directly part of [SPS RBSP](crate::SpsRbsp), present when `pcm_enabled_flag` is `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pcm {
    /// Defines [`PcmBitDepth_Y`](Pcm::pcm_bit_depth_y).
    pub pcm_sample_bit_depth_luma_minus1: u8,
    /// Defines [`PcmBitDepth_C`](Pcm::pcm_bit_depth_c).
    pub pcm_sample_bit_depth_chroma_minus1: u8,
    /// This value plus 3 specifies the minimum size of coding blocks with `pcm_flag` equal to `true`.
    pub log2_min_pcm_luma_coding_block_size_minus3: u32,
    /// Specifies the difference between the maximum and minimum size of coding blocks with `pcm_flag` equal to `true`.
    pub log2_diff_max_min_pcm_luma_coding_block_size: u32,
    /// Specifies whether the loop filter process is disabled on reconstructed
    /// samples in a coding unit with `pcm_flag` equal to `true`.
    pub pcm_loop_filter_disabled_flag: bool,
}

impl Pcm {
    pub(crate) fn parse(
        reader: &mut NaluBitReader,
        bit_depth_y: u8,
        bit_depth_c: u8,
        min_cb_log2_size_y: u32,
        ctb_log2_size_y: u32,
    ) -> Result<Self> {
        let pcm_sample_bit_depth_luma_minus1 = reader.read_bits(4)? as u8;
        if pcm_sample_bit_depth_luma_minus1 + 1 > bit_depth_y {
            return Err(NaluError::invalid(
                "pcm_sample_bit_depth_luma_minus1",
                pcm_sample_bit_depth_luma_minus1,
            ));
        }

        let pcm_sample_bit_depth_chroma_minus1 = reader.read_bits(4)? as u8;
        if pcm_sample_bit_depth_chroma_minus1 + 1 > bit_depth_c {
            return Err(NaluError::invalid(
                "pcm_sample_bit_depth_chroma_minus1",
                pcm_sample_bit_depth_chroma_minus1,
            ));
        }

        let log2_min_pcm_luma_coding_block_size_minus3 = reader.read_exp_golomb()?;
        let log2_min_ipcm_cb_size_y = u64::from(log2_min_pcm_luma_coding_block_size_minus3) + 3;
        range_check!(
            log2_min_ipcm_cb_size_y,
            u64::from(min_cb_log2_size_y.min(5)),
            u64::from(ctb_log2_size_y.min(5))
        )?;

        let log2_diff_max_min_pcm_luma_coding_block_size = reader.read_exp_golomb()?;
        let log2_max_ipcm_cb_size_y = u64::from(log2_diff_max_min_pcm_luma_coding_block_size) + log2_min_ipcm_cb_size_y;
        range_check!(log2_max_ipcm_cb_size_y, 0, u64::from(ctb_log2_size_y.min(5)))?;

        Ok(Self {
            pcm_sample_bit_depth_luma_minus1,
            pcm_sample_bit_depth_chroma_minus1,
            log2_min_pcm_luma_coding_block_size_minus3,
            log2_diff_max_min_pcm_luma_coding_block_size,
            pcm_loop_filter_disabled_flag: reader.read_bit()?,
        })
    }

    /// `PcmBitDepthY = pcm_sample_bit_depth_luma_minus1 + 1` (7-25)
    ///
    /// At most [`BitDepthY`](crate::SpsRbsp::bit_depth_y).
    pub fn pcm_bit_depth_y(&self) -> u8 {
        self.pcm_sample_bit_depth_luma_minus1 + 1
    }

    /// `PcmBitDepthC = pcm_sample_bit_depth_chroma_minus1 + 1` (7-26)
    ///
    /// At most [`BitDepthC`](crate::SpsRbsp::bit_depth_c).
    pub fn pcm_bit_depth_c(&self) -> u8 {
        self.pcm_sample_bit_depth_chroma_minus1 + 1
    }

    /// `Log2MinIpcmCbSizeY = log2_min_pcm_luma_coding_block_size_minus3 + 3`
    pub fn log2_min_ipcm_cb_size_y(&self) -> u32 {
        self.log2_min_pcm_luma_coding_block_size_minus3 + 3
    }

    /// `Log2MaxIpcmCbSizeY = log2_diff_max_min_pcm_luma_coding_block_size + Log2MinIpcmCbSizeY`
    pub fn log2_max_ipcm_cb_size_y(&self) -> u32 {
        self.log2_diff_max_min_pcm_luma_coding_block_size + self.log2_min_ipcm_cb_size_y()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use expgolomb::BitWriterExpGolombExt;
    use nalu::{BitWriter, NaluBitReader, NaluError};

    use super::Pcm;

    fn data(luma: u64, chroma: u64, min: u64, diff: u64) -> Vec<u8> {
        let mut writer = BitWriter::default();
        writer.write_bits(luma, 4).unwrap();
        writer.write_bits(chroma, 4).unwrap();
        writer.write_exp_golomb(min).unwrap();
        writer.write_exp_golomb(diff).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_rbsp_trailing_bits().unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_parse() {
        let data = data(7, 7, 0, 2);
        let mut reader = NaluBitReader::new(&data).unwrap();
        let pcm = Pcm::parse(&mut reader, 8, 8, 3, 5).unwrap();
        assert!(reader.ended());

        assert_eq!(pcm.pcm_bit_depth_y(), 8);
        assert_eq!(pcm.log2_min_ipcm_cb_size_y(), 3);
        assert_eq!(pcm.log2_max_ipcm_cb_size_y(), 5);
        assert!(pcm.pcm_loop_filter_disabled_flag);
    }

    #[test]
    fn test_bit_depth_too_large() {
        let data = data(9, 7, 0, 0);
        let mut reader = NaluBitReader::new(&data).unwrap();
        assert_eq!(
            Pcm::parse(&mut reader, 8, 8, 3, 5).unwrap_err(),
            NaluError::invalid("pcm_sample_bit_depth_luma_minus1", 9)
        );
    }

    #[test]
    fn test_block_size_too_large() {
        let data = data(7, 7, 1, 2);
        let mut reader = NaluBitReader::new(&data).unwrap();
        assert_eq!(
            Pcm::parse(&mut reader, 8, 8, 3, 5).unwrap_err(),
            NaluError::OutOfRange {
                element: "log2_max_ipcm_cb_size_y",
                value: 6,
                lower: 0,
                upper: 5,
            }
        );
    }
}
