use expgolomb::BitReaderExpGolombExt;
use nalu::{NaluBitReader, Result, range_check};

/// Sequence parameter set 3D extension.
///
/// `sps_3d_extension()`
///
/// - ISO/IEC 23008-2 - I.7.3.2.2.5
/// - ISO/IEC 23008-2 - I.7.4.3.2.5
///
/// The syntax loops over `d` in `0..=1`, where `d` is the `DepthFlag` of the layers the values apply to.
#[derive(Debug, Clone, PartialEq)]
pub struct Sps3dExtension {
    /// Values for texture layers, `d = 0`.
    pub d0: Sps3dExtensionD0,
    /// Values for depth layers, `d = 1`.
    pub d1: Sps3dExtensionD1,
}

/// Directly part of [SPS 3D extension](Sps3dExtension).
#[derive(Debug, Clone, PartialEq)]
pub struct Sps3dExtensionD0 {
    /// Inter-view predicted and disparity information merging candidates may be used.
    pub iv_di_mc_enabled_flag: bool,
    /// Motion vectors used for inter-view prediction may be scaled based on `view_id_val`.
    pub iv_mv_scal_enabled_flag: bool,
    /// Derives the minimum sub-block partition size for inter-layer predicted merging candidates.
    ///
    /// The value is in range
    /// \[[`MinCbLog2SizeY`](crate::SpsRbsp::min_cb_log2_size_y) - 3, [`CtbLog2SizeY`](crate::SpsRbsp::ctb_log2_size_y) - 3\].
    pub log2_ivmc_sub_pb_size_minus3: u32,
    /// `iv_res_pred_weight_idx` may be present in coding units.
    pub iv_res_pred_enabled_flag: bool,
    /// Depth pictures may be used to derive disparity vectors for texture layers.
    pub depth_ref_enabled_flag: bool,
    /// View synthesis prediction merging candidates may be used.
    pub vsp_mc_enabled_flag: bool,
    /// `dbbp_flag` may be present in coding units.
    pub dbbp_enabled_flag: bool,
}

/// Directly part of [SPS 3D extension](Sps3dExtension).
#[derive(Debug, Clone, PartialEq)]
pub struct Sps3dExtensionD1 {
    /// Inter-view predicted and disparity information merging candidates may be used.
    pub iv_di_mc_enabled_flag: bool,
    /// Motion vectors used for inter-view prediction may be scaled based on `view_id_val`.
    pub iv_mv_scal_enabled_flag: bool,
    /// The texture merge candidate may be used.
    pub tex_mc_enabled_flag: bool,
    /// Derives the minimum sub-block partition size for texture merge candidates.
    ///
    /// Same range as [`log2_ivmc_sub_pb_size_minus3`](Sps3dExtensionD0::log2_ivmc_sub_pb_size_minus3).
    pub log2_texmc_sub_pb_size_minus3: u32,
    /// The `INTRA_CONTOUR` intra prediction mode may be used.
    pub intra_contour_enabled_flag: bool,
    /// `dc_only_flag` may be present in intra coding units and `INTRA_WEDGE` may be used.
    pub intra_dc_only_wedge_enabled_flag: bool,
    /// Coding quadtree and coding unit partitioning may be inter-component predicted.
    pub cqt_cu_part_pred_enabled_flag: bool,
    /// `dc_only_flag` may be present in inter coding units.
    pub inter_dc_only_enabled_flag: bool,
    /// `skip_intra_flag` may be present in coding units.
    pub skip_intra_enabled_flag: bool,
}

impl Sps3dExtension {
    /// Parses both iterations of the `d` loop.
    pub fn parse(reader: &mut NaluBitReader, min_cb_log2_size_y: u32, ctb_log2_size_y: u32) -> Result<Self> {
        let lower = min_cb_log2_size_y.saturating_sub(3);
        let upper = ctb_log2_size_y.saturating_sub(3);

        let iv_di_mc_enabled_flag = reader.read_bit()?;
        let iv_mv_scal_enabled_flag = reader.read_bit()?;
        let log2_ivmc_sub_pb_size_minus3 = reader.read_exp_golomb()?;
        range_check!(log2_ivmc_sub_pb_size_minus3, lower, upper)?;

        let d0 = Sps3dExtensionD0 {
            iv_di_mc_enabled_flag,
            iv_mv_scal_enabled_flag,
            log2_ivmc_sub_pb_size_minus3,
            iv_res_pred_enabled_flag: reader.read_bit()?,
            depth_ref_enabled_flag: reader.read_bit()?,
            vsp_mc_enabled_flag: reader.read_bit()?,
            dbbp_enabled_flag: reader.read_bit()?,
        };

        let iv_di_mc_enabled_flag = reader.read_bit()?;
        let iv_mv_scal_enabled_flag = reader.read_bit()?;
        let tex_mc_enabled_flag = reader.read_bit()?;
        let log2_texmc_sub_pb_size_minus3 = reader.read_exp_golomb()?;
        range_check!(log2_texmc_sub_pb_size_minus3, lower, upper)?;

        let d1 = Sps3dExtensionD1 {
            iv_di_mc_enabled_flag,
            iv_mv_scal_enabled_flag,
            tex_mc_enabled_flag,
            log2_texmc_sub_pb_size_minus3,
            intra_contour_enabled_flag: reader.read_bit()?,
            intra_dc_only_wedge_enabled_flag: reader.read_bit()?,
            cqt_cu_part_pred_enabled_flag: reader.read_bit()?,
            inter_dc_only_enabled_flag: reader.read_bit()?,
            skip_intra_enabled_flag: reader.read_bit()?,
        };

        Ok(Sps3dExtension { d0, d1 })
    }
}
