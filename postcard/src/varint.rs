/*!
LEB128-style variable length unsigned integers.

Each byte carries 7 bits of the value, least significant group first, with the
high bit set on every byte except the last. Decoding only accepts the
canonical form: at most `ceil(bits / 7)` bytes, no bits beyond the target
width in the final byte, and no redundant all-zero high group.
*/

use super::Error;
use tracing::trace;

const fn max_len(bytes: usize) -> usize {
    (bytes * 8).div_ceil(7)
}

/// Mask of the bits the last byte of a maximum-length varint may use.
const fn max_of_last_byte(bytes: usize) -> u8 {
    ((1u16 << ((bytes * 8) % 7)) - 1) as u8
}

pub const MAX_U16_LEN: usize = max_len(size_of::<u16>());
pub const MAX_U32_LEN: usize = max_len(size_of::<u32>());
pub const MAX_U64_LEN: usize = max_len(size_of::<u64>());

macro_rules! impl_varint {
    ($(($ty:ty, $max:ident, $encode:ident, $decode:ident)),*) => {
        $(
            /// Writes `value` into `buf`, returning the used prefix.
            pub fn $encode(mut value: $ty, buf: &mut [u8; $max]) -> &[u8] {
                let mut i = 0;
                while value >= 0x80 {
                    buf[i] = (value as u8) | 0x80;
                    value >>= 7;
                    i += 1;
                }
                buf[i] = value as u8;
                &buf[..=i]
            }

            /// Reads a varint from `data` starting at `*offset`, advancing
            /// `*offset` past every byte consumed.
            pub fn $decode(data: &[u8], offset: &mut usize) -> Result<$ty, Error> {
                let mut value: $ty = 0;
                for i in 0..$max {
                    let Some(&byte) = data.get(*offset) else {
                        return Err(Error::UnexpectedEnd);
                    };
                    *offset += 1;

                    value |= <$ty>::from(byte & 0x7F) << (7 * i);
                    if byte & 0x80 == 0 {
                        if i == $max - 1 && byte > max_of_last_byte(size_of::<$ty>()) {
                            trace!("Varint overflows {} at offset {}", stringify!($ty), *offset - 1);
                            return Err(Error::BadVarint);
                        }
                        if i > 0 && byte == 0 {
                            trace!("Non-minimal varint at offset {}", *offset - 1);
                            return Err(Error::BadVarint);
                        }
                        return Ok(value);
                    }
                }
                trace!("Unterminated {} varint at offset {}", stringify!($ty), *offset);
                Err(Error::BadVarint)
            }
        )*
    };
}

impl_varint!(
    (u16, MAX_U16_LEN, encode_u16, decode_u16),
    (u32, MAX_U32_LEN, encode_u32, decode_u32),
    (u64, MAX_U64_LEN, encode_u64, decode_u64)
);

/// The natural width is pinned to 64 bits on the wire, whatever the host's
/// pointer width.
pub fn encode_usize(value: usize, buf: &mut [u8; MAX_U64_LEN]) -> &[u8] {
    encode_u64(value as u64, buf)
}

pub fn decode_usize(data: &[u8], offset: &mut usize) -> Result<usize, Error> {
    usize::try_from(decode_u64(data, offset)?).map_err(|_| Error::BadEncoding)
}

/// An unsigned 64-bit integer that is always written as a bare varint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Varint(pub u64);

impl Varint {
    pub fn encode(self, buf: &mut [u8; MAX_U64_LEN]) -> &[u8] {
        encode_u64(self.0, buf)
    }

    pub fn decode(data: &[u8], offset: &mut usize) -> Result<Self, Error> {
        decode_u64(data, offset).map(Self)
    }
}

impl From<u64> for Varint {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Varint> for u64 {
    fn from(value: Varint) -> Self {
        value.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    fn u32_bytes(value: u32) -> ([u8; MAX_U32_LEN], usize) {
        let mut buf = [0; MAX_U32_LEN];
        let len = encode_u32(value, &mut buf).len();
        (buf, len)
    }

    #[test]
    fn max_lengths() {
        assert_eq!(MAX_U16_LEN, 3);
        assert_eq!(MAX_U32_LEN, 5);
        assert_eq!(MAX_U64_LEN, 10);
        assert_eq!(max_of_last_byte(2), 0x03);
        assert_eq!(max_of_last_byte(4), 0x0F);
        assert_eq!(max_of_last_byte(8), 0x01);
    }

    #[test]
    fn u32_boundaries() {
        for (value, expected) in [
            (0, &hex!("00")[..]),
            (127, &hex!("7f")[..]),
            (128, &hex!("8001")[..]),
            (16383, &hex!("ff7f")[..]),
            (16384, &hex!("808001")[..]),
            (u32::MAX, &hex!("ffffffff0f")[..]),
        ] {
            let (buf, len) = u32_bytes(value);
            assert_eq!(&buf[..len], expected, "encoding {value}");

            let mut offset = 0;
            assert_eq!(decode_u32(expected, &mut offset), Ok(value));
            assert_eq!(offset, expected.len());
        }
    }

    #[test]
    fn u16_boundaries() {
        let mut buf = [0; MAX_U16_LEN];
        assert_eq!(encode_u16(0, &mut buf), hex!("00"));
        assert_eq!(encode_u16(16383, &mut buf), hex!("ff7f"));
        assert_eq!(encode_u16(16384, &mut buf), hex!("808001"));
        assert_eq!(encode_u16(u16::MAX, &mut buf), hex!("ffff03"));

        let mut offset = 0;
        assert_eq!(decode_u16(&hex!("ffff03"), &mut offset), Ok(u16::MAX));
        assert_eq!(
            decode_u16(&hex!("ffff04"), &mut 0),
            Err(Error::BadVarint)
        );
    }

    #[test]
    fn u64_boundaries() {
        let mut buf = [0; MAX_U64_LEN];
        assert_eq!(
            encode_u64(u64::MAX, &mut buf),
            hex!("ffffffffffffffffff01")
        );
        assert_eq!(
            decode_u64(&hex!("ffffffffffffffffff01"), &mut 0),
            Ok(u64::MAX)
        );
        assert_eq!(
            decode_u64(&hex!("ffffffffffffffffff02"), &mut 0),
            Err(Error::BadVarint)
        );
    }

    #[test]
    fn rejects_overflowing_last_byte() {
        // Fits in 35 bits, but not in 32
        assert_eq!(
            decode_u32(&hex!("ffffffff1f"), &mut 0),
            Err(Error::BadVarint)
        );
    }

    #[test]
    fn rejects_unterminated() {
        assert_eq!(
            decode_u32(&hex!("ffffffff8f01"), &mut 0),
            Err(Error::BadVarint)
        );
        assert_eq!(decode_u16(&hex!("808080"), &mut 0), Err(Error::BadVarint));
    }

    #[test]
    fn rejects_non_minimal() {
        assert_eq!(decode_u32(&hex!("8000"), &mut 0), Err(Error::BadVarint));
        assert_eq!(decode_u64(&hex!("ff8000"), &mut 0), Err(Error::BadVarint));
        // A lone zero is the canonical encoding of 0
        assert_eq!(decode_u64(&hex!("00"), &mut 0), Ok(0));
    }

    #[test]
    fn truncated() {
        assert_eq!(decode_u32(&[], &mut 0), Err(Error::UnexpectedEnd));
        assert_eq!(decode_u32(&hex!("8080"), &mut 0), Err(Error::UnexpectedEnd));

        let mut offset = 2;
        assert_eq!(
            decode_u64(&hex!("0000ff"), &mut offset),
            Err(Error::UnexpectedEnd)
        );
    }

    #[test]
    fn offsets_track_concatenated_values() {
        let data = hex!("01 8001 ffff03");
        let mut offset = 0;
        assert_eq!(decode_u16(&data, &mut offset), Ok(1));
        assert_eq!(offset, 1);
        assert_eq!(decode_u16(&data, &mut offset), Ok(128));
        assert_eq!(offset, 3);
        assert_eq!(decode_u16(&data, &mut offset), Ok(u16::MAX));
        assert_eq!(offset, data.len());
    }

    #[test]
    fn raw_varint() {
        let mut buf = [0; MAX_U64_LEN];
        assert_eq!(Varint(300).encode(&mut buf), hex!("ac02"));
        assert_eq!(Varint::decode(&hex!("ac02"), &mut 0), Ok(Varint(300)));
        assert_eq!(decode_usize(&hex!("ac02"), &mut 0), Ok(300));
    }
}
