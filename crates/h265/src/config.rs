use nalu::{NaluError, Result, annexb_split};
use tracing::{debug, trace};

use crate::{NALUnitHeader, NALUnitType, ProfileCompatibilityFlags, SpsNALUnit, SpsRbsp, VpsNALUnit, VpsRbsp};

/// The first VPS, SPS and PPS found in an Annex B stream.
///
/// All three are views into the searched buffer, NAL unit header included and
/// emulation prevention bytes intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct H265ParameterSets<'a> {
    /// The video parameter set NAL unit.
    pub vps: &'a [u8],
    /// The sequence parameter set NAL unit.
    pub sps: &'a [u8],
    /// The picture parameter set NAL unit.
    pub pps: &'a [u8],
}

/// The decoder configuration derived from the parameter sets of an H.265 stream.
///
/// Profile, tier and level come from the VPS, the picture geometry from the SPS.
/// Crop values are in luma samples.
#[derive(Debug, Clone, PartialEq)]
pub struct H265Configuration<'a> {
    /// The raw VPS NAL unit.
    pub video_parameter_set: &'a [u8],
    /// The raw SPS NAL unit.
    pub sequence_parameter_set: &'a [u8],
    /// The raw PPS NAL unit.
    pub picture_parameter_set: &'a [u8],
    /// The parsed VPS.
    pub vps: VpsRbsp,
    /// The parsed SPS.
    pub sps: SpsRbsp,
    /// `general_profile_space` of the VPS.
    pub general_profile_space: u8,
    /// `general_tier_flag` of the VPS.
    pub general_tier_flag: bool,
    /// `general_profile_idc` of the VPS.
    pub general_profile_idc: u8,
    /// `general_profile_compatibility_flag[j]` of the VPS.
    pub general_profile_compatibility_flags: ProfileCompatibilityFlags,
    /// The 48 bits following the compatibility flags in the VPS, starting with `general_progressive_source_flag`.
    pub general_constraint_indicator_flags: [u8; 6],
    /// `general_level_idc` of the VPS.
    pub general_level_idc: u8,
    /// `chroma_format_idc` of the SPS.
    pub chroma_format_idc: u8,
    /// `pic_width_in_luma_samples`
    pub encoded_width: u64,
    /// `pic_height_in_luma_samples`
    pub encoded_height: u64,
    /// Luma samples cropped from the left edge.
    pub crop_left: u64,
    /// Luma samples cropped from the right edge.
    pub crop_right: u64,
    /// Luma samples cropped from the top edge.
    pub crop_top: u64,
    /// Luma samples cropped from the bottom edge.
    pub crop_bottom: u64,
    /// Width in luma samples after cropping.
    pub cropped_width: u64,
    /// Height in luma samples after cropping.
    pub cropped_height: u64,
}

/// Walks the NAL units of `data` and returns once a VPS, an SPS and a PPS were seen.
///
/// The first unit of each type wins, later duplicates are ignored.
pub fn search_configuration(data: &[u8]) -> Result<H265ParameterSets<'_>> {
    let mut vps = None;
    let mut sps = None;
    let mut pps = None;

    for nal_unit in annexb_split(data) {
        let nal_unit = nal_unit?;
        let nal_unit_type = NALUnitHeader::peek_type(nal_unit);
        trace!(?nal_unit_type, len = nal_unit.len(), "visiting nal unit");

        let slot = match nal_unit_type {
            Some(NALUnitType::VpsNut) => &mut vps,
            Some(NALUnitType::SpsNut) => &mut sps,
            Some(NALUnitType::PpsNut) => &mut pps,
            _ => continue,
        };
        slot.get_or_insert(nal_unit);

        if let (Some(vps), Some(sps), Some(pps)) = (vps, sps, pps) {
            debug!(
                vps_len = vps.len(),
                sps_len = sps.len(),
                pps_len = pps.len(),
                "found h265 parameter sets"
            );
            return Ok(H265ParameterSets { vps, sps, pps });
        }
    }

    Err(NaluError::NotFound(match (vps.is_some(), sps.is_some(), pps.is_some()) {
        (false, false, false) => "vps, sps and pps",
        (false, false, true) => "vps and sps",
        (false, true, false) => "vps and pps",
        (true, false, false) => "sps and pps",
        (false, true, true) => "vps",
        (true, false, true) => "sps",
        _ => "pps",
    }))
}

/// Searches `data` for its parameter sets and combines the VPS profile, tier and level with
/// the SPS picture geometry.
pub fn parse_configuration(data: &[u8]) -> Result<H265Configuration<'_>> {
    let H265ParameterSets {
        vps: raw_vps,
        sps: raw_sps,
        pps: raw_pps,
    } = search_configuration(data)?;

    let vps = VpsNALUnit::parse(raw_vps)?.rbsp;
    let sps = SpsNALUnit::parse(raw_sps)?.rbsp;

    // the VPS always signals the general profile
    let profile = vps
        .profile_tier_level
        .general_profile
        .as_ref()
        .ok_or(NaluError::invalid("profile_present_flag", 0))?;

    let sub_width_c = u64::from(sps.sub_width_c()?);
    let sub_height_c = u64::from(sps.sub_height_c()?);
    let window = &sps.conformance_window;
    let crop_left = sub_width_c * u64::from(window.conf_win_left_offset);
    let crop_right = sub_width_c * u64::from(window.conf_win_right_offset);
    let crop_top = sub_height_c * u64::from(window.conf_win_top_offset);
    let crop_bottom = sub_height_c * u64::from(window.conf_win_bottom_offset);

    let encoded_width = u64::from(sps.pic_width_in_luma_samples.get());
    let encoded_height = u64::from(sps.pic_height_in_luma_samples.get());
    let cropped_width = sps.cropped_width()?;
    let cropped_height = sps.cropped_height()?;

    debug!(
        profile_idc = profile.profile_idc,
        level_idc = vps.profile_tier_level.general_level_idc,
        tier_flag = profile.tier_flag,
        chroma_format_idc = sps.chroma_format_idc,
        encoded_width,
        encoded_height,
        cropped_width,
        cropped_height,
        "parsed h265 configuration"
    );

    Ok(H265Configuration {
        video_parameter_set: raw_vps,
        sequence_parameter_set: raw_sps,
        picture_parameter_set: raw_pps,
        general_profile_space: profile.profile_space,
        general_tier_flag: profile.tier_flag,
        general_profile_idc: profile.profile_idc,
        general_profile_compatibility_flags: profile.profile_compatibility_flag,
        general_constraint_indicator_flags: profile.constraint_indicator_flags,
        general_level_idc: vps.profile_tier_level.general_level_idc,
        chroma_format_idc: sps.chroma_format_idc,
        encoded_width,
        encoded_height,
        crop_left,
        crop_right,
        crop_top,
        crop_bottom,
        cropped_width,
        cropped_height,
        vps,
        sps,
    })
}
