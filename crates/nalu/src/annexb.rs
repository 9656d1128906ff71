//! Annex B byte stream segmentation.
//!
//! ISO/IEC 14496-10 / ISO/IEC 23008-2 - Annex B

use std::iter::FusedIterator;
use std::ops::Range;

use crate::{NaluError, Result};

/// Splits an Annex B byte stream into NAL units.
///
/// Shorthand for [`AnnexBSplitter::new`].
pub fn annexb_split(data: &[u8]) -> AnnexBSplitter<'_> {
    AnnexBSplitter::new(data)
}

/// A lazy iterator over the NAL units of an Annex B byte stream.
///
/// Each item borrows from the input and still contains its emulation
/// prevention bytes. Start codes and the zero bytes leading up to them are
/// not part of any unit, the last unit runs to the end of the input.
///
/// The stream is validated while it is scanned, so an error is only reported
/// once the scan reaches the offending byte. After the first error the
/// iterator is exhausted.
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct AnnexBSplitter<'a> {
    data: &'a [u8],
    position: usize,
    unit_start: Option<usize>,
    zero_count: usize,
    in_emulation: bool,
    finished: bool,
}

impl<'a> AnnexBSplitter<'a> {
    /// Creates a new splitter over `data`.
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            unit_start: None,
            zero_count: 0,
            in_emulation: false,
            finished: false,
        }
    }

    /// Turns this splitter into an iterator over byte ranges of the input
    /// instead of slices.
    pub fn ranges(self) -> AnnexBRanges<'a> {
        AnnexBRanges { inner: self }
    }

    fn next_range(&mut self) -> Option<Result<Range<usize>>> {
        if self.finished {
            return None;
        }

        match self.scan() {
            Ok(range) => range.map(Ok),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }

    /// Consumes the leading zero bytes and the first start code, returning
    /// the offset of the first unit.
    fn find_first_start_code(&mut self) -> Result<usize> {
        let mut zero_count = 0;
        for (i, &byte) in self.data.iter().enumerate() {
            match byte {
                0x00 => zero_count += 1,
                0x01 if zero_count >= 2 => return Ok(i + 1),
                _ => break,
            }
        }

        Err(NaluError::MissingStartCode)
    }

    fn scan(&mut self) -> Result<Option<Range<usize>>> {
        let start = match self.unit_start {
            Some(start) => start,
            None => {
                let start = self.find_first_start_code()?;
                self.unit_start = Some(start);
                self.position = start;
                start
            }
        };

        let data = self.data;
        let mut i = self.position;
        while i < data.len() {
            if self.zero_count == 0 && !self.in_emulation {
                // nothing can happen until the next zero byte
                match memchr::memchr(0x00, &data[i..]) {
                    Some(offset) => i += offset,
                    None => break,
                }
            }

            let byte = data[i];

            if self.in_emulation {
                if byte > 0x03 {
                    return Err(NaluError::InvalidEmulation { offset: i, byte });
                }
                self.in_emulation = false;
                self.zero_count = usize::from(byte == 0x00);
                i += 1;
                continue;
            }

            if byte == 0x00 {
                self.zero_count += 1;
                i += 1;
                continue;
            }

            match (self.zero_count, byte) {
                (2.., 0x01) => {
                    let end = i - self.zero_count;
                    self.unit_start = Some(i + 1);
                    self.position = i + 1;
                    self.zero_count = 0;
                    return Ok(Some(start..end));
                }
                (3.., _) => return Err(NaluError::TooManyZeros { offset: i }),
                (2, 0x02) => return Err(NaluError::ForbiddenSequence { offset: i }),
                (2, 0x03) => self.in_emulation = true,
                _ => {}
            }

            self.zero_count = 0;
            i += 1;
        }

        if self.in_emulation {
            return Err(NaluError::TruncatedEmulation);
        }

        self.finished = true;
        Ok(Some(start..data.len()))
    }
}

impl<'a> Iterator for AnnexBSplitter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data;
        self.next_range().map(|range| range.map(|range| &data[range]))
    }
}

impl FusedIterator for AnnexBSplitter<'_> {}

/// An iterator over the byte ranges of the NAL units in an Annex B stream.
///
/// Created by [`AnnexBSplitter::ranges`].
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct AnnexBRanges<'a> {
    inner: AnnexBSplitter<'a>,
}

impl Iterator for AnnexBRanges<'_> {
    type Item = Result<Range<usize>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_range()
    }
}

impl FusedIterator for AnnexBRanges<'_> {}
