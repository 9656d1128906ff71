//! A pure Rust implementation of the H.265 (header only) parser.
//!
//! This crate parses the video, sequence and picture parameter sets of an
//! Annex B H.265 elementary stream, and derives the profile, tier, level and
//! picture geometry needed to configure a decoder.
//!
//! Parsers take a NAL unit with its header and emulation prevention bytes still in place.
//! Syntax structures that are not supported (VUI HRD parameters, range and screen content
//! coding extensions) fail with [`NaluError::Unimplemented`](nalu::NaluError::Unimplemented).
//!
//! ## Examples
//!
//! ```rust
//! use h265::SpsNALUnit;
//!
//! # fn test() -> nalu::Result<()> {
//! // main still picture profile, level 4, 1920x1080
//! let data = b"\x42\x01\x01\x03\x70\x00\x00\x03\x00\x00\x03\x00\x00\x03\x00\x00\x03\x00\x78\xA0\x03\xC0\x80\x10\xE7\xF9\x7E\x49\x1B\x65\xB2";
//!
//! let sps = SpsNALUnit::parse(data)?.rbsp;
//! assert_eq!(sps.cropped_width()?, 1920);
//! assert_eq!(sps.cropped_height()?, 1080);
//!
//! // a stream needs a VPS and a PPS next to the SPS to yield a configuration
//! let stream = [b"\x00\x00\x00\x01".as_slice(), data].concat();
//! let err = h265::parse_configuration(&stream).unwrap_err();
//! assert_eq!(err, nalu::NaluError::NotFound("vps and pps"));
//! # Ok(())
//! # }
//! # test().expect("failed to run test");
//! ```
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or [Apache-2.0](./LICENSE.Apache-2.0) license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

mod config;
mod enums;
mod hrd_parameters;
mod nal_unit_header;
mod pps;
mod profile_tier_level;
mod rbsp_trailing_bits;
mod scaling_list;
mod sps;
mod sub_layer_ordering_info;
mod vps;

pub use enums::*;
pub use hrd_parameters::*;
pub use nal_unit_header::NALUnitHeader;
pub use pps::*;
pub use profile_tier_level::*;
pub use scaling_list::ScalingListData;
pub use sps::*;
pub use sub_layer_ordering_info::SubLayerOrderingInfo;
pub use vps::{VpsHrdParameters, VpsNALUnit, VpsRbsp, VpsTimingInfo};

pub use self::config::{H265Configuration, H265ParameterSets, parse_configuration, search_configuration};
