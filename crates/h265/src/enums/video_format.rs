/// `video_format`, how the pictures were represented before coding.
///
/// ISO/IEC 23008-2 - Table E.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    /// 0
    Component,
    /// 1
    PAL,
    /// 2
    NTSC,
    /// 3
    SECAM,
    /// 4
    MAC,
    /// 5, also inferred when `video_signal_type_present_flag` is 0.
    Unspecified,
    /// 6 or 7.
    Reserved(u8),
}

impl From<u8> for VideoFormat {
    /// Only the low three bits are meaningful, `video_format` is a `u(3)`.
    fn from(value: u8) -> Self {
        match value & 0b111 {
            0 => VideoFormat::Component,
            1 => VideoFormat::PAL,
            2 => VideoFormat::NTSC,
            3 => VideoFormat::SECAM,
            4 => VideoFormat::MAC,
            5 => VideoFormat::Unspecified,
            code => VideoFormat::Reserved(code),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::VideoFormat;

    #[test]
    fn test_from_code() {
        let formats: Vec<_> = (0..8).map(VideoFormat::from).collect();
        assert_eq!(
            formats,
            vec![
                VideoFormat::Component,
                VideoFormat::PAL,
                VideoFormat::NTSC,
                VideoFormat::SECAM,
                VideoFormat::MAC,
                VideoFormat::Unspecified,
                VideoFormat::Reserved(6),
                VideoFormat::Reserved(7),
            ]
        );
    }
}
