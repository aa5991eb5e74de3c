/*!
Zigzag mapping of signed integers onto unsigned integers of the same width,
so that small magnitudes (of either sign) become small varints:
`0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...`
*/

macro_rules! impl_zigzag {
    ($(($signed:ty, $unsigned:ty, $encode:ident, $decode:ident)),*) => {
        $(
            #[inline]
            pub const fn $encode(value: $signed) -> $unsigned {
                ((value << 1) ^ (value >> (<$signed>::BITS - 1))) as $unsigned
            }

            #[inline]
            pub const fn $decode(value: $unsigned) -> $signed {
                ((value >> 1) as $signed) ^ -((value & 1) as $signed)
            }
        )*
    };
}

impl_zigzag!(
    (i16, u16, encode_i16, decode_u16),
    (i32, u32, encode_i32, decode_u32),
    (i64, u64, encode_i64, decode_u64)
);

/// The natural width always uses the 64-bit mapping.
#[inline]
pub const fn encode_isize(value: isize) -> u64 {
    encode_i64(value as i64)
}

/// Inverse of [`encode_isize`], returning the 64-bit result; narrowing to
/// `isize` is left to the caller.
#[inline]
pub const fn decode_isize(value: u64) -> i64 {
    decode_u64(value)
}
