//! The error type shared by the parsing crates.

/// Result type used across the NAL unit parsing crates.
pub type Result<T, E = NaluError> = std::result::Result<T, E>;

/// Errors that can occur while splitting, unescaping or parsing NAL units.
///
/// Every error is terminal for the parse call that produced it. Use
/// [`NaluError::kind`] to tell the broad failure classes apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NaluError {
    /// The byte stream does not start with a start code.
    #[error("missing start code at the beginning of the stream")]
    MissingStartCode,
    /// The forbidden `0x000002` sequence was found.
    #[error("forbidden sequence 0x000002 at offset {offset}")]
    ForbiddenSequence {
        /// Offset of the offending `0x02` byte.
        offset: usize,
    },
    /// More than two zero bytes were followed by a byte that is not a start code.
    #[error("too many zero bytes before offset {offset}")]
    TooManyZeros {
        /// Offset of the byte following the zero run.
        offset: usize,
    },
    /// The byte following an emulation prevention byte is larger than `0x03`.
    #[error("invalid byte 0x{byte:02x} after emulation prevention byte at offset {offset}")]
    InvalidEmulation {
        /// Offset of the offending byte.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },
    /// The stream ended right after an emulation prevention byte.
    #[error("stream ends inside an emulation prevention sequence")]
    TruncatedEmulation,
    /// A start code was found inside a single NAL unit.
    #[error("unexpected start code inside NAL unit at offset {offset}")]
    UnexpectedStartCode {
        /// Offset of the `0x01` byte that completes the start code.
        offset: usize,
    },
    /// The NAL unit has no set bit, so the RBSP stop bit cannot be located.
    #[error("end bit not found")]
    StopBitNotFound,
    /// A read went past the RBSP stop bit.
    #[error("no more data: read past the rbsp stop bit")]
    EndOfData,
    /// More than 32 bits were requested in a single read.
    #[error("cannot read {bits} bits at once, at most 32 are supported")]
    ReadTooLarge {
        /// The number of bits requested.
        bits: u32,
    },
    /// An exp-golomb code does not fit in 32 bits.
    #[error("exp-golomb code does not fit in 32 bits")]
    ExpGolombOverflow,
    /// A syntax element carries a value the grammar does not allow.
    #[error("invalid data: {element} = {value}")]
    InvalidValue {
        /// Name of the syntax element.
        element: &'static str,
        /// The value that was read or derived.
        value: i64,
    },
    /// A syntax element is outside of its allowed range.
    #[error("{element} is out of range [{lower}, {upper}]: {value}")]
    OutOfRange {
        /// Name of the syntax element.
        element: &'static str,
        /// The value that was read.
        value: i64,
        /// Inclusive lower bound.
        lower: i64,
        /// Inclusive upper bound.
        upper: i64,
    },
    /// The bitstream uses a syntax structure this crate does not decode.
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
    /// The stream ended before the required parameter sets were found.
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Broad classes of [`NaluError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed start codes or emulation prevention sequences.
    Framing,
    /// The bit cursor could not serve a read.
    CursorExhausted,
    /// A syntax element violates the codec grammar.
    Grammar,
    /// The bitstream signals a structure that is not decoded.
    Unimplemented,
    /// Required parameter sets are missing from the stream.
    SearchExhausted,
}

impl NaluError {
    /// Returns the class of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingStartCode
            | Self::ForbiddenSequence { .. }
            | Self::TooManyZeros { .. }
            | Self::InvalidEmulation { .. }
            | Self::TruncatedEmulation
            | Self::UnexpectedStartCode { .. } => ErrorKind::Framing,
            Self::StopBitNotFound | Self::EndOfData | Self::ReadTooLarge { .. } | Self::ExpGolombOverflow => {
                ErrorKind::CursorExhausted
            }
            Self::InvalidValue { .. } | Self::OutOfRange { .. } => ErrorKind::Grammar,
            Self::Unimplemented(_) => ErrorKind::Unimplemented,
            Self::NotFound(_) => ErrorKind::SearchExhausted,
        }
    }

    /// Shorthand for [`NaluError::InvalidValue`].
    pub fn invalid(element: &'static str, value: impl Into<i64>) -> Self {
        Self::InvalidValue {
            element,
            value: value.into(),
        }
    }
}
