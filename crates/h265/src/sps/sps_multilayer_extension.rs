use nalu::{NaluBitReader, Result};

/// `sps_multilayer_extension()`, present when `sps_multilayer_extension_flag` is set.
///
/// ISO/IEC 23008-2 - F.7.3.2.2.4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpsMultilayerExtension {
    /// Caps the vertical component of inter-layer motion vectors at 56 luma samples when set,
    /// signals nothing when clear (F.7.4.3.2.4).
    pub inter_view_mv_vert_constraint_flag: bool,
}

impl SpsMultilayerExtension {
    /// Reads the extension's one flag.
    pub fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let inter_view_mv_vert_constraint_flag = reader.read_bit()?;
        Ok(Self {
            inter_view_mv_vert_constraint_flag,
        })
    }
}
