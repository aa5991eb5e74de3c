use super::*;
use alloc::{
    boxed::Box,
    collections::{BTreeMap, BTreeSet, VecDeque},
    string::String,
    vec::Vec,
};
use tracing::debug;

/// The most elements a sequence or map may claim when its elements encode to
/// no bytes, since those are read without consuming any input.
pub const MAX_EMPTY_ELEMENTS: usize = 1 << 16;

pub trait FromPostcard: Sized {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error>;

    /// Reads a dynamic sequence of `Self` into `values`, replacing its
    /// contents. `u8` overrides this to read the raw bytes form.
    #[doc(hidden)]
    fn parse_seq_into(decoder: &mut Decoder<'_>, values: &mut Vec<Self>) -> Result<(), Error> {
        let count = decoder.parse_usize()?;
        values.clear();
        // Every element takes at least one byte, except zero-sized ones
        values.reserve(count.min(decoder.remaining()));
        for _ in 0..count {
            let start = decoder.offset();
            values.push(Self::from_postcard(decoder)?);
            decoder.check_element(start, count)?;
        }
        Ok(())
    }
}

/// A read cursor over one complete input buffer.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// The number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Rejects a count of more than [`MAX_EMPTY_ELEMENTS`] once an element
    /// read from `start` turns out to take no input.
    pub fn check_element(&self, start: usize, count: usize) -> Result<(), Error> {
        if self.offset == start && count > MAX_EMPTY_ELEMENTS {
            debug!("Sequence of {count} empty elements at offset {start}");
            return Err(Error::BadEncoding);
        }
        Ok(())
    }

    /// Consumes exactly `len` raw bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let data = self
            .offset
            .checked_add(len)
            .and_then(|end| self.data.get(self.offset..end))
            .ok_or(Error::UnexpectedEnd)?;
        self.offset += len;
        Ok(data)
    }

    pub fn parse_u8(&mut self) -> Result<u8, Error> {
        let byte = *self.data.get(self.offset).ok_or(Error::UnexpectedEnd)?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn parse_i8(&mut self) -> Result<i8, Error> {
        self.parse_u8().map(|b| b as i8)
    }

    pub fn parse_bool(&mut self) -> Result<bool, Error> {
        match self.parse_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(Error::BadBool(b)),
        }
    }

    pub fn parse_u16(&mut self) -> Result<u16, Error> {
        varint::decode_u16(self.data, &mut self.offset)
    }

    pub fn parse_u32(&mut self) -> Result<u32, Error> {
        varint::decode_u32(self.data, &mut self.offset)
    }

    pub fn parse_u64(&mut self) -> Result<u64, Error> {
        varint::decode_u64(self.data, &mut self.offset)
    }

    pub fn parse_usize(&mut self) -> Result<usize, Error> {
        varint::decode_usize(self.data, &mut self.offset)
    }

    pub fn parse_varint(&mut self) -> Result<Varint, Error> {
        Varint::decode(self.data, &mut self.offset)
    }

    pub fn parse_i16(&mut self) -> Result<i16, Error> {
        self.parse_u16().map(zigzag::decode_u16)
    }

    pub fn parse_i32(&mut self) -> Result<i32, Error> {
        self.parse_u32().map(zigzag::decode_u32)
    }

    pub fn parse_i64(&mut self) -> Result<i64, Error> {
        self.parse_u64().map(zigzag::decode_u64)
    }

    pub fn parse_isize(&mut self) -> Result<isize, Error> {
        isize::try_from(zigzag::decode_isize(self.parse_u64()?)).map_err(|_| Error::BadEncoding)
    }

    pub fn parse_f32(&mut self) -> Result<f32, Error> {
        fixed::decode_f32(self.data, &mut self.offset)
    }

    pub fn parse_f64(&mut self) -> Result<f64, Error> {
        fixed::decode_f64(self.data, &mut self.offset)
    }

    /// Borrows a length-prefixed byte string from the input.
    pub fn parse_bytes(&mut self) -> Result<&'a [u8], Error> {
        let len = self.parse_usize()?;
        self.take(len)
    }

    /// Borrows a length-prefixed UTF-8 string from the input.
    pub fn parse_str(&mut self) -> Result<&'a str, Error> {
        core::str::from_utf8(self.parse_bytes()?).map_err(|_| Error::BadUtf8)
    }

    pub fn parse_string(&mut self) -> Result<String, Error> {
        self.parse_str().map(String::from)
    }

    pub fn parse_char(&mut self) -> Result<char, Error> {
        let len = self.parse_usize()?;
        if len > 4 {
            return Err(Error::BadChar);
        }
        let mut chars = core::str::from_utf8(self.take(len)?)
            .map_err(|_| Error::BadChar)?
            .chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::BadChar),
        }
    }

    pub fn parse<T: FromPostcard>(&mut self) -> Result<T, Error> {
        T::from_postcard(self)
    }

    /// Reads the option tag byte, returning whether a payload follows.
    pub fn parse_option_tag(&mut self) -> Result<bool, Error> {
        match self.parse_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(Error::BadOption(b)),
        }
    }

    pub fn parse_option<T: FromPostcard>(&mut self) -> Result<Option<T>, Error> {
        if self.parse_option_tag()? {
            self.parse().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Decodes an optional into an existing target, resetting it to its
    /// default when absent. Returns whether a payload was present.
    pub fn parse_option_into<T>(&mut self, target: &mut T) -> Result<bool, Error>
    where
        T: FromPostcard + Default,
    {
        let present = self.parse_option_tag()?;
        *target = if present { self.parse()? } else { T::default() };
        Ok(present)
    }

    /// Reads a sum type discriminant; any associated value follows it.
    pub fn parse_variant(&mut self) -> Result<u32, Error> {
        self.parse_u32()
    }

    pub fn parse_seq<T: FromPostcard>(&mut self) -> Result<Vec<T>, Error> {
        let mut values = Vec::new();
        T::parse_seq_into(self, &mut values)?;
        Ok(values)
    }

    /// Decodes a dynamic sequence into `values`, reusing its allocation.
    pub fn parse_seq_into<T: FromPostcard>(&mut self, values: &mut Vec<T>) -> Result<(), Error> {
        T::parse_seq_into(self, values)
    }

    /// Decodes a fixed-length array, which carries no count on the wire.
    pub fn parse_array<T: FromPostcard, const N: usize>(&mut self) -> Result<[T; N], Error> {
        let mut values = Vec::with_capacity(N);
        for _ in 0..N {
            values.push(self.parse()?);
        }
        values.try_into().map_err(|_| Error::BadEncoding)
    }
}

macro_rules! impl_from_postcard {
    ($(($ty:ty, $method:ident)),*) => {
        $(
            impl FromPostcard for $ty {
                fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
                    decoder.$method()
                }
            }
        )*
    };
}

impl_from_postcard!(
    (bool, parse_bool),
    (i8, parse_i8),
    (u16, parse_u16),
    (u32, parse_u32),
    (u64, parse_u64),
    (usize, parse_usize),
    (i16, parse_i16),
    (i32, parse_i32),
    (i64, parse_i64),
    (isize, parse_isize),
    (Varint, parse_varint),
    (f32, parse_f32),
    (f64, parse_f64),
    (char, parse_char),
    (String, parse_string)
);

impl FromPostcard for u8 {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        decoder.parse_u8()
    }

    fn parse_seq_into(decoder: &mut Decoder<'_>, values: &mut Vec<Self>) -> Result<(), Error> {
        let data = decoder.parse_bytes()?;
        values.clear();
        values.extend_from_slice(data);
        Ok(())
    }
}

impl FromPostcard for () {
    fn from_postcard(_decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        Ok(())
    }
}

impl<T: FromPostcard> FromPostcard for Box<T> {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        T::from_postcard(decoder).map(Box::new)
    }
}

impl<T: FromPostcard> FromPostcard for Option<T> {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        decoder.parse_option()
    }
}

impl<T: FromPostcard, E: FromPostcard> FromPostcard for Result<T, E> {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        match decoder.parse_variant()? {
            0 => decoder.parse().map(Ok),
            1 => decoder.parse().map(Err),
            d => Err(Error::BadEnum(d)),
        }
    }
}

impl<T: FromPostcard> FromPostcard for Vec<T> {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        decoder.parse_seq()
    }
}

impl<T: FromPostcard, const N: usize> FromPostcard for [T; N] {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        decoder.parse_array()
    }
}

impl<T: FromPostcard> FromPostcard for VecDeque<T> {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        decoder.parse_seq().map(VecDeque::from)
    }
}

impl<T: FromPostcard + Ord> FromPostcard for BTreeSet<T> {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        let count = decoder.parse_usize()?;
        let mut set = Self::new();
        for _ in 0..count {
            let start = decoder.offset();
            set.insert(decoder.parse()?);
            decoder.check_element(start, count)?;
        }
        Ok(set)
    }
}

impl<K: FromPostcard + Ord, V: FromPostcard> FromPostcard for BTreeMap<K, V> {
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        let count = decoder.parse_usize()?;
        let mut map = Self::new();
        for _ in 0..count {
            let start = decoder.offset();
            let key = decoder.parse()?;
            map.insert(key, decoder.parse()?);
            decoder.check_element(start, count)?;
        }
        Ok(map)
    }
}

#[cfg(feature = "std")]
impl<T, S> FromPostcard for std::collections::HashSet<T, S>
where
    T: FromPostcard + Eq + core::hash::Hash,
    S: core::hash::BuildHasher + Default,
{
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        let count = decoder.parse_usize()?;
        let mut set =
            Self::with_capacity_and_hasher(count.min(decoder.remaining()), S::default());
        for _ in 0..count {
            let start = decoder.offset();
            set.insert(decoder.parse()?);
            decoder.check_element(start, count)?;
        }
        Ok(set)
    }
}

#[cfg(feature = "std")]
impl<K, V, S> FromPostcard for std::collections::HashMap<K, V, S>
where
    K: FromPostcard + Eq + core::hash::Hash,
    V: FromPostcard,
    S: core::hash::BuildHasher + Default,
{
    fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        let count = decoder.parse_usize()?;
        let mut map =
            Self::with_capacity_and_hasher(count.min(decoder.remaining()), S::default());
        for _ in 0..count {
            let start = decoder.offset();
            let key = decoder.parse()?;
            map.insert(key, decoder.parse()?);
            decoder.check_element(start, count)?;
        }
        Ok(map)
    }
}

macro_rules! impl_tuple_from_postcard {
    ($(($($name:ident),+)),*) => {
        $(
            impl<$($name: FromPostcard),+> FromPostcard for ($($name,)+) {
                fn from_postcard(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
                    Ok(($($name::from_postcard(decoder)?,)+))
                }
            }
        )*
    };
}

impl_tuple_from_postcard!(
    (A),
    (A, B),
    (A, B, C),
    (A, B, C, D),
    (A, B, C, D, E),
    (A, B, C, D, E, F),
    (A, B, C, D, E, F, G),
    (A, B, C, D, E, F, G, H)
);

/// Decodes a `T` from the start of `data`, returning it with the number of
/// bytes consumed. Trailing bytes are left for the caller.
#[cfg_attr(feature = "instrument", tracing::instrument(skip_all))]
pub fn parse_detail<T: FromPostcard>(data: &[u8]) -> Result<(T, usize), Error> {
    let mut decoder = Decoder::new(data);
    T::from_postcard(&mut decoder)
        .inspect_err(|e| {
            debug!(
                "Failed to decode {} at offset {}: {e}",
                core::any::type_name::<T>(),
                decoder.offset()
            )
        })
        .map(|value| (value, decoder.offset()))
}

pub fn parse<T: FromPostcard>(data: &[u8]) -> Result<T, Error> {
    parse_detail(data).map(|(value, _)| value)
}

/// Decodes a `T` that must occupy all of `data`.
pub fn parse_exact<T: FromPostcard>(data: &[u8]) -> Result<T, Error> {
    let (value, len) = parse_detail(data)?;
    if len < data.len() {
        debug!("{} trailing bytes after {}", data.len() - len, core::any::type_name::<T>());
        return Err(Error::AdditionalData(data.len() - len));
    }
    Ok(value)
}

pub fn parse_str(data: &[u8]) -> Result<&str, Error> {
    Decoder::new(data).parse_str()
}

pub fn parse_bytes(data: &[u8]) -> Result<&[u8], Error> {
    Decoder::new(data).parse_bytes()
}

pub fn parse_char(data: &[u8]) -> Result<char, Error> {
    Decoder::new(data).parse_char()
}
