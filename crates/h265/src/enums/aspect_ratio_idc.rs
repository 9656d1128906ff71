/// `aspect_ratio_idc` of the VUI, the sample aspect ratio of the luma samples.
///
/// ISO/IEC 23008-2 - Table E.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatioIdc {
    /// 0, no aspect ratio signalled.
    Unspecified,
    /// 1:1 (square), code 1.
    Square,
    /// 12:11
    Aspect12_11,
    /// 10:11
    Aspect10_11,
    /// 16:11
    Aspect16_11,
    /// 40:33
    Aspect40_33,
    /// 24:11
    Aspect24_11,
    /// 20:11
    Aspect20_11,
    /// 32:11
    Aspect32_11,
    /// 80:33
    Aspect80_33,
    /// 18:11
    Aspect18_11,
    /// 15:11
    Aspect15_11,
    /// 64:33
    Aspect64_33,
    /// 160:99
    Aspect160_99,
    /// 4:3
    Aspect4_3,
    /// 3:2
    Aspect3_2,
    /// 2:1, code 16.
    Aspect2_1,
    /// A reserved code in 17..=254, kept as read.
    Reserved(u8),
    /// 255, the ratio follows as `sar_width` and `sar_height`.
    ExtendedSar,
}

/// Table E.1, indexed by `aspect_ratio_idc - 1`.
const PREDEFINED_SAR: [(u16, u16); 16] = [
    (1, 1),
    (12, 11),
    (10, 11),
    (16, 11),
    (40, 33),
    (24, 11),
    (20, 11),
    (32, 11),
    (80, 33),
    (18, 11),
    (15, 11),
    (64, 33),
    (160, 99),
    (4, 3),
    (3, 2),
    (2, 1),
];

impl AspectRatioIdc {
    /// The `sar_width:sar_height` pair a predefined code stands for.
    ///
    /// `None` for [`Unspecified`](Self::Unspecified), reserved codes and [`ExtendedSar`](Self::ExtendedSar),
    /// whose ratio is carried in the bitstream.
    pub fn sample_aspect_ratio(self) -> Option<(u16, u16)> {
        match u8::from(self) {
            code @ 1..=16 => Some(PREDEFINED_SAR[usize::from(code) - 1]),
            _ => None,
        }
    }
}

impl From<u8> for AspectRatioIdc {
    fn from(value: u8) -> Self {
        match value {
            0 => AspectRatioIdc::Unspecified,
            1 => AspectRatioIdc::Square,
            2 => AspectRatioIdc::Aspect12_11,
            3 => AspectRatioIdc::Aspect10_11,
            4 => AspectRatioIdc::Aspect16_11,
            5 => AspectRatioIdc::Aspect40_33,
            6 => AspectRatioIdc::Aspect24_11,
            7 => AspectRatioIdc::Aspect20_11,
            8 => AspectRatioIdc::Aspect32_11,
            9 => AspectRatioIdc::Aspect80_33,
            10 => AspectRatioIdc::Aspect18_11,
            11 => AspectRatioIdc::Aspect15_11,
            12 => AspectRatioIdc::Aspect64_33,
            13 => AspectRatioIdc::Aspect160_99,
            14 => AspectRatioIdc::Aspect4_3,
            15 => AspectRatioIdc::Aspect3_2,
            16 => AspectRatioIdc::Aspect2_1,
            255 => AspectRatioIdc::ExtendedSar,
            code => AspectRatioIdc::Reserved(code),
        }
    }
}

impl From<AspectRatioIdc> for u8 {
    fn from(value: AspectRatioIdc) -> Self {
        match value {
            AspectRatioIdc::Unspecified => 0,
            AspectRatioIdc::Square => 1,
            AspectRatioIdc::Aspect12_11 => 2,
            AspectRatioIdc::Aspect10_11 => 3,
            AspectRatioIdc::Aspect16_11 => 4,
            AspectRatioIdc::Aspect40_33 => 5,
            AspectRatioIdc::Aspect24_11 => 6,
            AspectRatioIdc::Aspect20_11 => 7,
            AspectRatioIdc::Aspect32_11 => 8,
            AspectRatioIdc::Aspect80_33 => 9,
            AspectRatioIdc::Aspect18_11 => 10,
            AspectRatioIdc::Aspect15_11 => 11,
            AspectRatioIdc::Aspect64_33 => 12,
            AspectRatioIdc::Aspect160_99 => 13,
            AspectRatioIdc::Aspect4_3 => 14,
            AspectRatioIdc::Aspect3_2 => 15,
            AspectRatioIdc::Aspect2_1 => 16,
            AspectRatioIdc::Reserved(code) => code,
            AspectRatioIdc::ExtendedSar => 255,
        }
    }
}
