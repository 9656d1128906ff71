//! Emulation prevention byte handling.
//!
//! ISO/IEC 14496-10 - 7.4.1 / ISO/IEC 23008-2 - 7.4.2

use std::borrow::Cow;
use std::io;

use crate::{NaluError, Result};

/// Removes the emulation prevention bytes from a NAL unit, returning its RBSP.
///
/// When the unit contains no `0x000003` sequence the input is returned as is,
/// otherwise a new buffer is allocated. The `0x00` following a removed
/// `0x03` starts a new zero run, so consecutive escapes compose.
///
/// Start codes, `0x000002` and runs of more than two zero bytes followed by
/// a non-zero byte are rejected, as is a byte larger than `0x03` right after
/// an emulation prevention byte.
pub fn remove_emulation_prevention(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    let mut output: Option<Vec<u8>> = None;
    let mut zero_count = 0usize;
    let mut in_emulation = false;

    for (i, &byte) in data.iter().enumerate() {
        if in_emulation {
            if byte > 0x03 {
                return Err(NaluError::InvalidEmulation { offset: i, byte });
            }
            in_emulation = false;
            zero_count = usize::from(byte == 0x00);
        } else if byte == 0x00 {
            zero_count += 1;
        } else {
            match (zero_count, byte) {
                (2.., 0x01) => return Err(NaluError::UnexpectedStartCode { offset: i }),
                (3.., _) => return Err(NaluError::TooManyZeros { offset: i }),
                (2, 0x02) => return Err(NaluError::ForbiddenSequence { offset: i }),
                (2, 0x03) => {
                    in_emulation = true;
                    zero_count = 0;
                    output.get_or_insert_with(|| {
                        let mut output = Vec::with_capacity(data.len());
                        output.extend_from_slice(&data[..i]);
                        output
                    });
                    continue;
                }
                _ => {}
            }
            zero_count = 0;
        }

        if let Some(output) = output.as_mut() {
            output.push(byte);
        }
    }

    Ok(output.map_or(Cow::Borrowed(data), Cow::Owned))
}

/// Inserts emulation prevention bytes into an RBSP.
///
/// A `0x03` is inserted after every two zero bytes that are followed by a
/// byte in `0x00..=0x03`.
pub fn insert_emulation_prevention(rbsp: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(rbsp.len() + rbsp.len() / 2);
    let mut zero_count = 0u8;
    for &byte in rbsp {
        push_escaped(&mut output, &mut zero_count, byte);
    }

    output
}

fn push_escaped(output: &mut Vec<u8>, zero_count: &mut u8, byte: u8) {
    if *zero_count >= 2 && byte <= 0x03 {
        output.push(0x03);
        *zero_count = 0;
    }

    output.push(byte);
    if byte == 0x00 {
        *zero_count += 1;
    } else {
        *zero_count = 0;
    }
}

/// A wrapper around a [`std::io::Write`] that inserts emulation prevention
/// bytes into everything written through it.
///
/// Bytes are forwarded one at a time, so the inner writer should be buffered.
#[derive(Debug)]
pub struct EmulationPreventionWriter<W> {
    inner: W,
    zero_count: u8,
    scratch: Vec<u8>,
}

impl<W> EmulationPreventionWriter<W> {
    /// Creates a new writer around `inner`.
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            zero_count: 0,
            scratch: Vec::new(),
        }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> io::Write for EmulationPreventionWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.scratch.clear();
        for &byte in buf {
            push_escaped(&mut self.scratch, &mut self.zero_count, byte);
        }

        self.inner.write_all(&self.scratch)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_remove_without_escape_borrows() {
        let data = [0x67, 0x42, 0x00, 0x00, 0x1e, 0x00, 0x80];
        let rbsp = remove_emulation_prevention(&data).unwrap();
        assert!(matches!(rbsp, Cow::Borrowed(_)));
        assert_eq!(&*rbsp, &data);
    }

    #[test]
    fn test_remove_single_escape() {
        let data = [0x65, 0x00, 0x00, 0x03, 0x01, 0x10];
        let rbsp = remove_emulation_prevention(&data).unwrap();
        assert!(matches!(rbsp, Cow::Owned(_)));
        assert_eq!(&*rbsp, &[0x65, 0x00, 0x00, 0x01, 0x10]);
    }

    #[test]
    fn test_remove_consecutive_escapes() {
        let data = [0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x01];
        let rbsp = remove_emulation_prevention(&data).unwrap();
        assert_eq!(&*rbsp, &[0x00, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_remove_trailing_escape() {
        let data = [0x41, 0x80, 0x00, 0x00, 0x03];
        let rbsp = remove_emulation_prevention(&data).unwrap();
        assert_eq!(&*rbsp, &[0x41, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn test_remove_errors() {
        assert_eq!(
            remove_emulation_prevention(&[0x41, 0x00, 0x00, 0x01]).unwrap_err(),
            NaluError::UnexpectedStartCode { offset: 3 }
        );
        assert_eq!(
            remove_emulation_prevention(&[0x41, 0x00, 0x00, 0x02]).unwrap_err(),
            NaluError::ForbiddenSequence { offset: 3 }
        );
        assert_eq!(
            remove_emulation_prevention(&[0x41, 0x00, 0x00, 0x00, 0x03]).unwrap_err(),
            NaluError::TooManyZeros { offset: 4 }
        );
        assert_eq!(
            remove_emulation_prevention(&[0x41, 0x00, 0x00, 0x03, 0x80]).unwrap_err(),
            NaluError::InvalidEmulation { offset: 4, byte: 0x80 }
        );
    }

    #[test]
    fn test_insert() {
        assert_eq!(insert_emulation_prevention(&[0x00, 0x00, 0x01]), vec![0x00, 0x00, 0x03, 0x01]);
        assert_eq!(
            insert_emulation_prevention(&[0x00, 0x00, 0x00, 0x00, 0x01]),
            vec![0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x01]
        );
        assert_eq!(insert_emulation_prevention(&[0x00, 0x00, 0x04]), vec![0x00, 0x00, 0x04]);
    }

    #[test]
    fn test_writer() {
        let mut writer = EmulationPreventionWriter::new(Vec::new());
        writer.write_all(&[0x00, 0x00]).unwrap();
        writer.write_all(&[0x02, 0x00, 0x00, 0x03]).unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.into_inner(), vec![0x00, 0x00, 0x03, 0x02, 0x00, 0x00, 0x03, 0x03]);
    }

    #[test]
    fn test_roundtrip() {
        const ALPHABET: [u8; 8] = [0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0xff];

        let mut seed = 0x2545_f491_u32;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed
        };

        for _ in 0..512 {
            let len = (next() % 48) as usize + 1;
            let mut rbsp: Vec<u8> = (0..len).map(|_| ALPHABET[(next() % 8) as usize]).collect();
            if rbsp.ends_with(&[0x00, 0x00]) {
                rbsp.push(0x80);
            }

            let escaped = insert_emulation_prevention(&rbsp);
            let restored = remove_emulation_prevention(&escaped).unwrap();
            assert_eq!(&*restored, &rbsp[..], "escaped: {escaped:02x?}");
        }
    }
}
