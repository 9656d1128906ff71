//! A pure Rust implementation of the H.264 (header only) parser.
//!
//! This crate finds the parameter sets of an Annex B H.264 elementary stream
//! and parses the sequence parameter set to recover the profile, level and
//! picture geometry needed to configure a decoder.
//!
//! ## Examples
//!
//! ```rust
//! # fn test() -> nalu::Result<()> {
//! // baseline profile, 640x480, followed by a PPS
//! let stream = b"\x00\x00\x00\x01\x67\x42\xc0\x1e\xda\x02\x80\xf6\x40\
//!                \x00\x00\x00\x01\x68\xce\x3c\x80";
//!
//! let config = h264::parse_configuration(stream)?;
//! assert_eq!(config.profile_idc, 66);
//! assert_eq!(config.encoded_width, 640);
//! assert_eq!(config.cropped_height, 480);
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

mod config;
mod enums;
mod nal_unit_header;
mod sps;

pub use enums::*;
pub use nal_unit_header::NALUnitHeader;
pub use sps::*;

pub use self::config::{H264Configuration, H264ParameterSets, parse_configuration, search_configuration};
