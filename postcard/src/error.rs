/*!
The single error type shared by the encoder and the decoder.

Every failure is terminal for the call that produced it: composite values
propagate the first error from any nested element, and there is no partial
result.
*/

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The input ended before a value was fully read.
    #[error("Not enough data for encoded value")]
    UnexpectedEnd,

    /// A varint did not terminate within its maximum length, overflows its
    /// target width, or is not in its minimal-length form.
    #[error("Non-canonical or overflowing varint")]
    BadVarint,

    #[error("Invalid bool value {0}")]
    BadBool(u8),

    #[error("Invalid Option discriminant {0}")]
    BadOption(u8),

    /// A `char` payload is longer than 4 bytes or is not exactly one code point.
    #[error("Invalid unicode char")]
    BadChar,

    #[error("Invalid UTF-8 in string")]
    BadUtf8,

    #[error("Invalid enum discriminant {0}")]
    BadEnum(u32),

    /// Structurally inconsistent input, e.g. a natural-width integer that
    /// does not fit the host's `usize`/`isize`.
    #[error("Badly encoded data")]
    BadEncoding,

    /// Reserved for checksum framing layered on top of the codec.
    #[error("Bad CRC")]
    BadCrc,

    #[error("{0} bytes of additional data after end of value")]
    AdditionalData(usize),

    #[error("Output buffer is full")]
    BufferFull,

    #[error("The length of a sequence must be known")]
    SeqLengthUnknown,

    /// The value has no wire representation in the requested shape.
    #[error("Unsupported shape: {0}")]
    Unsupported(&'static str),
}
