use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, NaluError, Result, range_check};

/// Tile layout of a picture, present when `tiles_enabled_flag` is `true`.
///
/// Without the SPS the picture size in CTBs is unknown, so column widths and row heights are only
/// available when they are explicitly signalled.
#[derive(Debug, Clone, PartialEq)]
pub struct Tiles {
    /// This value plus 1 specifies the number of tile columns partitioning the picture.
    pub num_tile_columns_minus1: u32,
    /// This value plus 1 specifies the number of tile rows partitioning the picture.
    pub num_tile_rows_minus1: u32,
    /// `true` when tile boundaries are distributed uniformly across the picture.
    pub uniform_spacing_flag: bool,
    /// `column_width_minus1[i]` in units of CTBs, empty when `uniform_spacing_flag` is `true`.
    pub column_width_minus1: Vec<u32>,
    /// `row_height_minus1[i]` in units of CTBs, empty when `uniform_spacing_flag` is `true`.
    pub row_height_minus1: Vec<u32>,
    /// `loop_filter_across_tiles_enabled_flag`, inferred `true` when not present.
    pub loop_filter_across_tiles_enabled_flag: bool,
}

// A picture is at most 8192 luma samples wide and 4320 high (Table A.8) with CTBs of at least 16.
const MAX_TILE_COLUMNS_MINUS1: u32 = 8192 / 16 - 1;
const MAX_TILE_ROWS_MINUS1: u32 = 4320 / 16 - 1;

impl Tiles {
    pub(crate) fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let num_tile_columns_minus1 = reader.read_exp_golomb()?;
        range_check!(num_tile_columns_minus1, 0, MAX_TILE_COLUMNS_MINUS1)?;
        let num_tile_rows_minus1 = reader.read_exp_golomb()?;
        range_check!(num_tile_rows_minus1, 0, MAX_TILE_ROWS_MINUS1)?;

        if num_tile_columns_minus1 == 0 && num_tile_rows_minus1 == 0 {
            return Err(NaluError::invalid("num_tile_rows_minus1", 0));
        }

        let uniform_spacing_flag = reader.read_bit()?;

        let mut column_width_minus1 = Vec::new();
        let mut row_height_minus1 = Vec::new();
        if !uniform_spacing_flag {
            column_width_minus1 = (0..num_tile_columns_minus1)
                .map(|_| reader.read_exp_golomb())
                .collect::<Result<_>>()?;
            row_height_minus1 = (0..num_tile_rows_minus1)
                .map(|_| reader.read_exp_golomb())
                .collect::<Result<_>>()?;
        }

        let loop_filter_across_tiles_enabled_flag = reader.read_bit()?;

        Ok(Self {
            num_tile_columns_minus1,
            num_tile_rows_minus1,
            uniform_spacing_flag,
            column_width_minus1,
            row_height_minus1,
            loop_filter_across_tiles_enabled_flag,
        })
    }

    /// Number of tiles in the picture.
    pub fn num_tiles(&self) -> u64 {
        (u64::from(self.num_tile_columns_minus1) + 1) * (u64::from(self.num_tile_rows_minus1) + 1)
    }
}
