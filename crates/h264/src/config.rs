use nalu::{NaluError, Result, annexb_split};
use tracing::{debug, trace};

use crate::{NALUnitHeader, NALUnitType, Sps};

/// The most recent SPS and PPS found in an Annex B stream.
///
/// Both are views into the searched buffer, header byte included and emulation
/// prevention bytes intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct H264ParameterSets<'a> {
    /// The sequence parameter set NAL unit.
    pub sps: &'a [u8],
    /// The picture parameter set NAL unit.
    pub pps: &'a [u8],
}

/// The decoder configuration derived from the parameter sets of an H.264 stream.
#[derive(Debug, Clone, PartialEq)]
pub struct H264Configuration<'a> {
    /// The raw SPS NAL unit the configuration was derived from.
    pub sequence_parameter_set: &'a [u8],
    /// The raw PPS NAL unit found alongside it.
    pub picture_parameter_set: &'a [u8],
    /// The parsed SPS.
    pub sps: Sps,
    /// `profile_idc` of the SPS.
    pub profile_idc: u8,
    /// The constraint set flags byte of the SPS.
    pub constraint_set: u8,
    /// `level_idc` of the SPS.
    pub level_idc: u8,
    /// Width in luma samples before cropping.
    pub encoded_width: u64,
    /// Height in luma samples before cropping.
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

/// Walks the NAL units of `data` and returns once both an SPS and a PPS were seen.
///
/// When a type repeats before the other shows up, the later unit replaces the earlier one.
pub fn search_configuration(data: &[u8]) -> Result<H264ParameterSets<'_>> {
    let mut sps = None;
    let mut pps = None;

    for nal_unit in annexb_split(data) {
        let nal_unit = nal_unit?;
        let nal_unit_type = NALUnitHeader::peek_type(nal_unit);
        trace!(?nal_unit_type, len = nal_unit.len(), "visiting nal unit");

        match nal_unit_type {
            Some(NALUnitType::SPS) => sps = Some(nal_unit),
            Some(NALUnitType::PPS) => pps = Some(nal_unit),
            _ => continue,
        }

        if let (Some(sps), Some(pps)) = (sps, pps) {
            debug!(sps_len = sps.len(), pps_len = pps.len(), "found h264 parameter sets");
            return Ok(H264ParameterSets { sps, pps });
        }
    }

    Err(match (sps, pps) {
        (None, None) => NaluError::NotFound("sps and pps"),
        (None, Some(_)) => NaluError::NotFound("sps"),
        _ => NaluError::NotFound("pps"),
    })
}

/// Searches `data` for its parameter sets and derives the picture geometry from the SPS.
pub fn parse_configuration(data: &[u8]) -> Result<H264Configuration<'_>> {
    let H264ParameterSets { sps: raw_sps, pps: raw_pps } = search_configuration(data)?;
    let sps = Sps::parse(raw_sps)?;

    let encoded_width = sps.encoded_width();
    let encoded_height = sps.encoded_height();

    let crop = sps.frame_crop_info.unwrap_or_default();
    let crop_left = u64::from(crop.frame_crop_left_offset) * 2;
    let crop_right = u64::from(crop.frame_crop_right_offset) * 2;
    let crop_top = u64::from(crop.frame_crop_top_offset) * 2;
    let crop_bottom = u64::from(crop.frame_crop_bottom_offset) * 2;

    let cropped_width = encoded_width
        .checked_sub(crop_left + crop_right)
        .ok_or(NaluError::invalid("frame_crop_right_offset", crop.frame_crop_right_offset))?;
    let cropped_height = encoded_height
        .checked_sub(crop_top + crop_bottom)
        .ok_or(NaluError::invalid("frame_crop_bottom_offset", crop.frame_crop_bottom_offset))?;

    debug!(
        profile_idc = sps.profile_idc,
        level_idc = sps.level_idc,
        encoded_width,
        encoded_height,
        cropped_width,
        cropped_height,
        "parsed h264 configuration"
    );

    Ok(H264Configuration {
        sequence_parameter_set: raw_sps,
        picture_parameter_set: raw_pps,
        profile_idc: sps.profile_idc,
        constraint_set: sps.constraint_set,
        level_idc: sps.level_idc,
        sps,
        encoded_width,
        encoded_height,
        crop_left,
        crop_right,
        crop_top,
        crop_bottom,
        cropped_width,
        cropped_height,
    })
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use nalu::{ErrorKind, NaluError};

    use super::*;

    const SPS_640X480: &[u8] = b"\x67\x42\xc0\x1e\xda\x02\x80\xf6\x40";
    const SPS_480X852: &[u8] =
        b"\x67\x64\x00\x1F\xAC\xD9\x41\xE0\x6D\xF9\xE6\xA0\x20\x20\x28\x00\x00\x00\x08\x00\x00\x01\xE0\x01";
    const PPS: &[u8] = b"\x68\xce\x3c\x80";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    fn stream(units: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for unit in units {
            out.extend_from_slice(b"\x00\x00\x00\x01");
            out.extend_from_slice(unit);
        }
        out
    }

    #[test]
    fn test_parse_baseline_without_cropping() {
        init_tracing();
        let data = stream(&[SPS_640X480, PPS]);
        let config = parse_configuration(&data).unwrap();

        assert_eq!(config.sequence_parameter_set, SPS_640X480);
        assert_eq!(config.picture_parameter_set, PPS);
        assert_eq!(config.profile_idc, 66);
        assert_eq!(config.constraint_set, 0xc0);
        assert_eq!(config.level_idc, 30);
        assert_eq!(config.encoded_width, 640);
        assert_eq!(config.encoded_height, 480);
        assert_eq!(
            (config.crop_left, config.crop_right, config.crop_top, config.crop_bottom),
            (0, 0, 0, 0)
        );
        assert_eq!(config.cropped_width, 640);
        assert_eq!(config.cropped_height, 480);
    }

    #[test]
    fn test_parse_with_cropping() {
        init_tracing();
        // pps first, then an access unit delimiter, then the sps
        let data = stream(&[PPS, b"\x09\xf0", SPS_480X852]);
        let config = parse_configuration(&data).unwrap();

        assert_eq!(config.profile_idc, 100);
        assert_eq!(config.level_idc, 31);
        assert_eq!(config.encoded_width, 480);
        assert_eq!(config.encoded_height, 864);
        assert_eq!(config.crop_bottom, 12);
        assert_eq!(config.cropped_width, 480);
        assert_eq!(config.cropped_height, 852);
        assert_eq!(config.sps.frame_rate(), Some(30.0));
    }

    #[test]
    fn test_search_keeps_latest() {
        init_tracing();
        let data = stream(&[SPS_480X852, SPS_640X480, PPS, SPS_480X852]);
        let sets = search_configuration(&data).unwrap();
        assert_eq!(sets.sps, SPS_640X480);
        assert_eq!(sets.pps, PPS);
    }

    #[test]
    fn test_search_missing_pps() {
        init_tracing();
        let data = stream(&[SPS_640X480, b"\x65\x88\x80"]);
        let err = search_configuration(&data).unwrap_err();
        assert_eq!(err, NaluError::NotFound("pps"));
        assert_eq!(err.kind(), ErrorKind::SearchExhausted);

        let data = stream(&[PPS]);
        assert_eq!(search_configuration(&data).unwrap_err(), NaluError::NotFound("sps"));
        assert_eq!(search_configuration(&[]).unwrap_err(), NaluError::MissingStartCode);
    }

    #[test]
    fn test_search_propagates_framing_errors() {
        init_tracing();
        let data = b"\x00\x00\x01\x67\x42\x00\x00\x02\x00\x00\x01\x68\xce\x3c\x80";
        let err = search_configuration(data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Framing);
    }

    #[test]
    fn test_crop_larger_than_picture() {
        init_tracing();
        // 16x16 baseline picture cropping 18 luma samples from the right
        let sps = b"\x67\x42\x00\x0a\xda\x7e\x2b\x40";
        let data = stream(&[sps, PPS]);
        let err = parse_configuration(&data).unwrap_err();
        assert_eq!(err, NaluError::invalid("frame_crop_right_offset", 9));
    }
}
