//! Byte-level building blocks for H.264 and H.265 elementary streams.
//!
//! This crate splits Annex B byte streams into NAL units, removes or inserts
//! emulation prevention bytes and provides a bit cursor that reads RBSP
//! syntax elements straight from an escaped NAL unit.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or [Apache-2.0](./LICENSE.Apache-2.0) license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod annexb;
mod bit_reader;
mod bit_writer;
mod emulation;
mod error;
mod range_check;

pub use annexb::{AnnexBRanges, AnnexBSplitter, annexb_split};
pub use bit_reader::{CursorState, NaluBitReader};
pub use bit_writer::BitWriter;
pub use emulation::{EmulationPreventionWriter, insert_emulation_prevention, remove_emulation_prevention};
pub use error::{ErrorKind, NaluError, Result};
