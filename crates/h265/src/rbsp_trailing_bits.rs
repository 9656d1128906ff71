use nalu::{NaluBitReader, NaluError, Result};

/// Described by ISO/IEC 23008-2 - 7.3.2.11
///
/// The cursor never hands out the last set bit of the NAL unit, so a fully consumed RBSP has already `ended`.
/// Otherwise the next bit must be the `rbsp_stop_one_bit`, followed by zero bits up to the byte boundary.
/// Anything after that boundary is left unread.
pub(crate) fn rbsp_trailing_bits(reader: &mut NaluBitReader) -> Result<()> {
    if reader.ended() {
        return Ok(());
    }

    let rbsp_stop_one_bit = reader.read_bit()?;
    if !rbsp_stop_one_bit {
        return Err(NaluError::invalid("rbsp_stop_one_bit", 0));
    }

    while reader.state().bit_position() != 7 {
        let rbsp_alignment_zero_bit = reader.read_bit()?;
        if rbsp_alignment_zero_bit {
            return Err(NaluError::invalid("rbsp_alignment_zero_bit", 1));
        }
    }

    Ok(())
}
