use nalu::{NaluBitReader, Result, range_check};

use crate::ProfileCompatibilityFlags;

/// Profile, tier and level.
///
/// `profile_tier_level(profilePresentFlag, maxNumSubLayersMinus1)`
///
/// - ISO/IEC 23008-2 - 7.3.3
/// - ISO/IEC 23008-2 - 7.4.4
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTierLevel {
    /// `general_profile_space`, `general_tier_flag`, `general_profile_idc`, `general_profile_compatibility_flag[j]`,
    /// the general source and constraint flags and `general_inbld_flag`.
    ///
    /// Only present when `profilePresentFlag` is set, which is always the case in a VPS or SPS.
    pub general_profile: Option<Profile>,
    /// Indicates a level to which the CVS conforms as specified in ISO/IEC 23008-2 - Annex A.
    ///
    /// The level number times 30, so level 4.1 is 123.
    pub general_level_idc: u8,
    /// `sub_layer_profile_*[i]` and `sub_layer_level_idc[i]`, one entry for each of the
    /// `maxNumSubLayersMinus1` lower sub-layers.
    pub sub_layers: Vec<SubLayerProfileLevel>,
}

/// The profile and level signalled for one sub-layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SubLayerProfileLevel {
    /// Present when `sub_layer_profile_present_flag[i]` is set.
    pub profile: Option<Profile>,
    /// `sub_layer_level_idc[i]`, present when `sub_layer_level_present_flag[i]` is set.
    pub level_idc: Option<u8>,
}

impl ProfileTierLevel {
    /// Parses the structure, `max_num_sub_layers_minus1` is at most 6.
    pub fn parse(reader: &mut NaluBitReader, profile_present_flag: bool, max_num_sub_layers_minus1: u8) -> Result<Self> {
        range_check!(max_num_sub_layers_minus1, 0, 6)?;

        let general_profile = if profile_present_flag {
            Some(Profile::parse(reader)?)
        } else {
            None
        };

        let general_level_idc = reader.read_u8()?;

        let mut present_flags = Vec::with_capacity(max_num_sub_layers_minus1 as usize);
        for _ in 0..max_num_sub_layers_minus1 {
            let sub_layer_profile_present_flag = reader.read_bit()?;
            let sub_layer_level_present_flag = reader.read_bit()?;
            present_flags.push((sub_layer_profile_present_flag, sub_layer_level_present_flag));
        }

        // reserved_zero_2bits
        if max_num_sub_layers_minus1 > 0 {
            reader.skip_bits(2 * (8 - u32::from(max_num_sub_layers_minus1)))?;
        }

        let mut sub_layers = Vec::with_capacity(present_flags.len());
        for (profile_present, level_present) in present_flags {
            let profile = if profile_present {
                Some(Profile::parse(reader)?)
            } else {
                None
            };
            let level_idc = if level_present { Some(reader.read_u8()?) } else { None };

            sub_layers.push(SubLayerProfileLevel { profile, level_idc });
        }

        Ok(Self {
            general_profile,
            general_level_idc,
            sub_layers,
        })
    }

    /// Returns the level of sub-layer `i`, inferring absent values from the next higher sub-layer
    /// and finally from [`general_level_idc`](Self::general_level_idc).
    pub fn sub_layer_level_idc(&self, i: usize) -> Option<u8> {
        let tail = self.sub_layers.get(i..)?;
        Some(
            tail.iter()
                .find_map(|sub_layer| sub_layer.level_idc)
                .unwrap_or(self.general_level_idc),
        )
    }
}

/// Profile part of the Profile, tier and level structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Decoders shall ignore the CVS when `general_profile_space` is not equal to 0.
    pub profile_space: u8,
    /// Specifies the tier context for the interpretation of `general_level_idc` as specified in ISO/IEC 23008-2 - Annex A.
    pub tier_flag: bool,
    /// When `general_profile_space` is equal to 0, indicates a profile to which the CVS
    /// conforms as specified in ISO/IEC 23008-2 - Annex A.
    pub profile_idc: u8,
    /// `profile_compatibility_flag[j]` equal to `true`, when `general_profile_space` is equal to 0, indicates
    /// that the CVS conforms to the profile indicated by `general_profile_idc` equal to `j`
    /// as specified in ISO/IEC 23008-2 - Annex A.
    pub profile_compatibility_flag: ProfileCompatibilityFlags,
    /// The 48 bits starting at `progressive_source_flag`, as they appear in the bitstream.
    ///
    /// Decoder configuration strings carry these bytes verbatim.
    pub constraint_indicator_flags: [u8; 6],
    /// - If `general_progressive_source_flag` is equal to `true` and
    ///   [`general_interlaced_source_flag`](Profile::interlaced_source_flag) is equal to `false`, the
    ///   source scan type of the pictures in the CVS should be interpreted as progressive only.
    /// - Otherwise, if `general_progressive_source_flag` is equal to `false` and
    ///   [`general_interlaced_source_flag`](Profile::interlaced_source_flag) is equal to `true`, the
    ///   source scan type of the pictures in the CVS should be interpreted as interlaced only.
    /// - Otherwise, if both are `false` the source scan type is unknown or unspecified.
    /// - Otherwise the source scan type of each picture is indicated by `source_scan_type`
    ///   in a picture timing SEI message.
    pub progressive_source_flag: bool,
    /// See [`progressive_source_flag`](Profile::progressive_source_flag).
    pub interlaced_source_flag: bool,
    /// Equal to `true` specifies that there are no frame packing arrangement SEI messages,
    /// segmented rectangular frame packing arrangement SEI messages, equirectangular
    /// projection SEI messages, or cubemap projection SEI messages present in the CVS.
    pub non_packed_constraint_flag: bool,
    /// Equal to `true` specifies that `field_seq_flag` is equal to 0.
    pub frame_only_constraint_flag: bool,
    /// Any additional flags that may be present in the profile.
    pub additional_flags: ProfileAdditionalFlags,
    /// Equal to `true` specifies that the INBLD capability as specified in ISO/IEC 23008-2 - Annex F is required for
    /// decoding of the layer to which the `profile_tier_level( )` syntax structure applies.
    ///
    /// `None` when the bit is `reserved_zero_bit` for this profile.
    pub inbld_flag: Option<bool>,
}

impl Profile {
    fn parse(reader: &mut NaluBitReader) -> Result<Self> {
        let profile_space = reader.read_bits(2)? as u8;
        let tier_flag = reader.read_bit()?;
        let profile_idc = reader.read_bits(5)? as u8;

        let profile_compatibility_flag = ProfileCompatibilityFlags::from_bits_retain(reader.read_bits(32)?);

        // profile_idc == j || general_profile_compatibility_flag[j] for any j in `profiles`
        let check_profile_idcs = |profiles: ProfileCompatibilityFlags| {
            profiles.intersects(ProfileCompatibilityFlags::for_profile_idc(profile_idc))
                || profile_compatibility_flag.intersects(profiles)
        };

        let constraint_indicator_flags = reader.peek_array::<6>()?;

        let progressive_source_flag = reader.read_bit()?;
        let interlaced_source_flag = reader.read_bit()?;
        let non_packed_constraint_flag = reader.read_bit()?;
        let frame_only_constraint_flag = reader.read_bit()?;

        let additional_flags = if check_profile_idcs(
            ProfileCompatibilityFlags::FormatRangeExtensionsProfile
                | ProfileCompatibilityFlags::HighThroughputProfile
                | ProfileCompatibilityFlags::Profile6
                | ProfileCompatibilityFlags::Profile7
                | ProfileCompatibilityFlags::Profile8
                | ProfileCompatibilityFlags::ScreenContentCodingExtensionsProfile
                | ProfileCompatibilityFlags::Profile10
                | ProfileCompatibilityFlags::HighThroughputScreenContentCodingExtensionsProfile,
        ) {
            let max_12bit_constraint_flag = reader.read_bit()?;
            let max_10bit_constraint_flag = reader.read_bit()?;
            let max_8bit_constraint_flag = reader.read_bit()?;
            let max_422chroma_constraint_flag = reader.read_bit()?;
            let max_420chroma_constraint_flag = reader.read_bit()?;
            let max_monochrome_constraint_flag = reader.read_bit()?;
            let intra_constraint_flag = reader.read_bit()?;
            let one_picture_only_constraint_flag = reader.read_bit()?;
            let lower_bit_rate_constraint_flag = reader.read_bit()?;

            let max_14bit_constraint_flag = if check_profile_idcs(
                ProfileCompatibilityFlags::HighThroughputProfile
                    | ProfileCompatibilityFlags::ScreenContentCodingExtensionsProfile
                    | ProfileCompatibilityFlags::Profile10
                    | ProfileCompatibilityFlags::HighThroughputScreenContentCodingExtensionsProfile,
            ) {
                let max_14bit_constraint_flag = reader.read_bit()?;
                reader.skip_bits(33)?; // reserved_zero_33bits
                Some(max_14bit_constraint_flag)
            } else {
                reader.skip_bits(34)?; // reserved_zero_34bits
                None
            };

            ProfileAdditionalFlags::Full {
                max_12bit_constraint_flag,
                max_10bit_constraint_flag,
                max_8bit_constraint_flag,
                max_422chroma_constraint_flag,
                max_420chroma_constraint_flag,
                max_monochrome_constraint_flag,
                intra_constraint_flag,
                one_picture_only_constraint_flag,
                lower_bit_rate_constraint_flag,
                max_14bit_constraint_flag,
            }
        } else if check_profile_idcs(ProfileCompatibilityFlags::Main10Profile) {
            reader.skip_bits(7)?; // reserved_zero_7bits
            let one_picture_only_constraint_flag = reader.read_bit()?;
            reader.skip_bits(35)?; // reserved_zero_35bits
            ProfileAdditionalFlags::Main10Profile {
                one_picture_only_constraint_flag,
            }
        } else {
            reader.skip_bits(43)?; // reserved_zero_43bits
            ProfileAdditionalFlags::None
        };

        let inbld_flag = if check_profile_idcs(
            ProfileCompatibilityFlags::MainProfile
                | ProfileCompatibilityFlags::Main10Profile
                | ProfileCompatibilityFlags::MainStillPictureProfile
                | ProfileCompatibilityFlags::FormatRangeExtensionsProfile
                | ProfileCompatibilityFlags::HighThroughputProfile
                | ProfileCompatibilityFlags::ScreenContentCodingExtensionsProfile
                | ProfileCompatibilityFlags::HighThroughputScreenContentCodingExtensionsProfile,
        ) {
            Some(reader.read_bit()?)
        } else {
            reader.skip_bits(1)?; // reserved_zero_bit
            None
        };

        Ok(Profile {
            profile_space,
            tier_flag,
            profile_idc,
            profile_compatibility_flag,
            constraint_indicator_flags,
            progressive_source_flag,
            interlaced_source_flag,
            non_packed_constraint_flag,
            frame_only_constraint_flag,
            additional_flags,
            inbld_flag,
        })
    }
}

/// Additional profile flags that can be present in the [profile](Profile).
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileAdditionalFlags {
    /// All additional flags are present.
    Full {
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        max_12bit_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        max_10bit_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        max_8bit_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        max_422chroma_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        max_420chroma_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        max_monochrome_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        intra_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        one_picture_only_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        lower_bit_rate_constraint_flag: bool,
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        max_14bit_constraint_flag: Option<bool>,
    },
    /// Only the `one_picture_only_constraint_flag` is present because `profile_idc` is 2 or `general_profile_compatibility_flag[2]` is `true`.
    Main10Profile {
        /// Semantics specified in ISO/IEC 23008-2 - Annex A.
        one_picture_only_constraint_flag: bool,
    },
    /// No additional flags are present.
    None,
}
