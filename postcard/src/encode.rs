use super::*;
use alloc::{
    boxed::Box,
    collections::{BTreeMap, BTreeSet, VecDeque},
    string::String,
    vec::Vec,
};

/// Somewhere for an [`Encoder`] to put its bytes.
pub trait Output {
    fn push_byte(&mut self, byte: u8) -> Result<(), Error>;

    fn push_slice(&mut self, data: &[u8]) -> Result<(), Error>;

    /// The number of bytes written so far.
    fn written(&self) -> usize;
}

impl Output for Vec<u8> {
    fn push_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.push(byte);
        Ok(())
    }

    fn push_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        self.extend_from_slice(data);
        Ok(())
    }

    fn written(&self) -> usize {
        self.len()
    }
}

/// A fixed capacity output over a caller-supplied buffer.
pub struct SliceOutput<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> SliceOutput<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, written: 0 }
    }

    /// The written prefix of the buffer.
    pub fn into_written(self) -> &'a mut [u8] {
        let Self { buf, written } = self;
        &mut buf[..written]
    }
}

impl Output for SliceOutput<'_> {
    fn push_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.push_slice(&[byte])
    }

    fn push_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        let end = self.written + data.len();
        let Some(dest) = self.buf.get_mut(self.written..end) else {
            return Err(Error::BufferFull);
        };
        dest.copy_from_slice(data);
        self.written = end;
        Ok(())
    }

    fn written(&self) -> usize {
        self.written
    }
}

pub trait ToPostcard {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error>;

    /// Writes a dynamic sequence of `Self`: the count, then each element.
    /// `u8` overrides this to write the raw bytes form.
    #[doc(hidden)]
    fn slice_to_postcard<O: Output>(values: &[Self], encoder: &mut Encoder<O>) -> Result<(), Error>
    where
        Self: Sized,
    {
        encoder.emit_usize(values.len())?;
        values.iter().try_for_each(|value| value.to_postcard(encoder))
    }
}

pub struct Encoder<O = Vec<u8>> {
    output: O,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
        }
    }
}

impl<O: Output> Encoder<O> {
    pub fn with_output(output: O) -> Self {
        Self { output }
    }

    pub fn build(self) -> O {
        self.output
    }

    pub fn offset(&self) -> usize {
        self.output.written()
    }

    pub fn emit_raw_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        self.output.push_slice(data)
    }

    pub fn emit_u8(&mut self, value: u8) -> Result<(), Error> {
        self.output.push_byte(value)
    }

    pub fn emit_i8(&mut self, value: i8) -> Result<(), Error> {
        self.output.push_byte(value as u8)
    }

    pub fn emit_bool(&mut self, value: bool) -> Result<(), Error> {
        self.output.push_byte(value as u8)
    }

    pub fn emit_u16(&mut self, value: u16) -> Result<(), Error> {
        let mut buf = [0; varint::MAX_U16_LEN];
        self.output.push_slice(varint::encode_u16(value, &mut buf))
    }

    pub fn emit_u32(&mut self, value: u32) -> Result<(), Error> {
        let mut buf = [0; varint::MAX_U32_LEN];
        self.output.push_slice(varint::encode_u32(value, &mut buf))
    }

    pub fn emit_u64(&mut self, value: u64) -> Result<(), Error> {
        let mut buf = [0; varint::MAX_U64_LEN];
        self.output.push_slice(varint::encode_u64(value, &mut buf))
    }

    pub fn emit_usize(&mut self, value: usize) -> Result<(), Error> {
        let mut buf = [0; varint::MAX_U64_LEN];
        self.output.push_slice(varint::encode_usize(value, &mut buf))
    }

    pub fn emit_varint(&mut self, value: Varint) -> Result<(), Error> {
        let mut buf = [0; varint::MAX_U64_LEN];
        self.output.push_slice(value.encode(&mut buf))
    }

    pub fn emit_i16(&mut self, value: i16) -> Result<(), Error> {
        self.emit_u16(zigzag::encode_i16(value))
    }

    pub fn emit_i32(&mut self, value: i32) -> Result<(), Error> {
        self.emit_u32(zigzag::encode_i32(value))
    }

    pub fn emit_i64(&mut self, value: i64) -> Result<(), Error> {
        self.emit_u64(zigzag::encode_i64(value))
    }

    pub fn emit_isize(&mut self, value: isize) -> Result<(), Error> {
        self.emit_u64(zigzag::encode_isize(value))
    }

    pub fn emit_f32(&mut self, value: f32) -> Result<(), Error> {
        self.output.push_slice(&fixed::encode_f32(value))
    }

    pub fn emit_f64(&mut self, value: f64) -> Result<(), Error> {
        self.output.push_slice(&fixed::encode_f64(value))
    }

    /// The caller's `str` is already valid UTF-8, so it is written as-is.
    pub fn emit_str(&mut self, value: &str) -> Result<(), Error> {
        self.emit_bytes(value.as_bytes())
    }

    pub fn emit_bytes(&mut self, value: &[u8]) -> Result<(), Error> {
        self.emit_usize(value.len())?;
        self.output.push_slice(value)
    }

    /// A `char` is written as a string holding its UTF-8 encoding.
    pub fn emit_char(&mut self, value: char) -> Result<(), Error> {
        let mut buf = [0; 4];
        self.emit_str(value.encode_utf8(&mut buf))
    }

    pub fn emit<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ToPostcard + ?Sized,
    {
        value.to_postcard(self)
    }

    pub fn emit_option<T>(&mut self, value: Option<&T>) -> Result<(), Error>
    where
        T: ToPostcard + ?Sized,
    {
        match value {
            Some(value) => {
                self.output.push_byte(1)?;
                self.emit(value)
            }
            None => self.output.push_byte(0),
        }
    }

    /// Writes a dynamic sequence, count first.
    pub fn emit_seq<T>(&mut self, values: &[T]) -> Result<(), Error>
    where
        T: ToPostcard,
    {
        T::slice_to_postcard(values, self)
    }

    /// Writes a dynamic sequence from an iterator, which must know its exact
    /// length up front.
    pub fn emit_iter<I>(&mut self, values: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: ToPostcard,
    {
        let values = values.into_iter();
        let count = exact_len(&values)?;
        self.emit_usize(count)?;

        let mut emitted = 0;
        for value in values {
            value.to_postcard(self)?;
            emitted += 1;
        }
        if emitted != count {
            return Err(Error::SeqLengthUnknown);
        }
        Ok(())
    }

    /// Writes a map: the entry count, then each key followed by its value,
    /// in iteration order.
    pub fn emit_map<I, K, V>(&mut self, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToPostcard,
        V: ToPostcard,
    {
        let entries = entries.into_iter();
        let count = exact_len(&entries)?;
        self.emit_usize(count)?;

        let mut emitted = 0;
        for (key, value) in entries {
            key.to_postcard(self)?;
            value.to_postcard(self)?;
            emitted += 1;
        }
        if emitted != count {
            return Err(Error::SeqLengthUnknown);
        }
        Ok(())
    }

    /// Writes a fixed-length array: the elements only, no count.
    pub fn emit_array<T>(&mut self, values: &[T]) -> Result<(), Error>
    where
        T: ToPostcard,
    {
        values.iter().try_for_each(|value| value.to_postcard(self))
    }

    /// Writes a sum type discriminant; any associated value follows it.
    pub fn emit_variant(&mut self, discriminant: u32) -> Result<(), Error> {
        self.emit_u32(discriminant)
    }
}

fn exact_len<I: Iterator>(iter: &I) -> Result<usize, Error> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => Ok(lower),
        _ => Err(Error::SeqLengthUnknown),
    }
}

macro_rules! impl_to_postcard {
    ($(($ty:ty, $method:ident)),*) => {
        $(
            impl ToPostcard for $ty {
                fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
                    encoder.$method(*self)
                }
            }
        )*
    };
}

impl_to_postcard!(
    (bool, emit_bool),
    (i8, emit_i8),
    (u16, emit_u16),
    (u32, emit_u32),
    (u64, emit_u64),
    (usize, emit_usize),
    (i16, emit_i16),
    (i32, emit_i32),
    (i64, emit_i64),
    (isize, emit_isize),
    (Varint, emit_varint),
    (f32, emit_f32),
    (f64, emit_f64),
    (char, emit_char)
);

impl ToPostcard for u8 {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_u8(*self)
    }

    fn slice_to_postcard<O: Output>(values: &[Self], encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_bytes(values)
    }
}

impl ToPostcard for () {
    fn to_postcard<O: Output>(&self, _encoder: &mut Encoder<O>) -> Result<(), Error> {
        Ok(())
    }
}

impl ToPostcard for str {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_str(self)
    }
}

impl ToPostcard for String {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_str(self)
    }
}

impl<T: ToPostcard + ?Sized> ToPostcard for &T {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        (**self).to_postcard(encoder)
    }
}

impl<T: ToPostcard + ?Sized> ToPostcard for Box<T> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        (**self).to_postcard(encoder)
    }
}

impl<T: ToPostcard> ToPostcard for Option<T> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_option(self.as_ref())
    }
}

impl<T: ToPostcard, E: ToPostcard> ToPostcard for Result<T, E> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        match self {
            Ok(value) => {
                encoder.emit_variant(0)?;
                encoder.emit(value)
            }
            Err(err) => {
                encoder.emit_variant(1)?;
                encoder.emit(err)
            }
        }
    }
}

impl<T: ToPostcard> ToPostcard for [T] {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_seq(self)
    }
}

impl<T: ToPostcard> ToPostcard for Vec<T> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_seq(self)
    }
}

impl<T: ToPostcard, const N: usize> ToPostcard for [T; N] {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_array(self)
    }
}

impl<T: ToPostcard> ToPostcard for VecDeque<T> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        match self.as_slices() {
            (front, []) => encoder.emit_seq(front),
            _ => encoder.emit_iter(self),
        }
    }
}

impl<T: ToPostcard> ToPostcard for BTreeSet<T> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_iter(self)
    }
}

impl<K: ToPostcard, V: ToPostcard> ToPostcard for BTreeMap<K, V> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_map(self)
    }
}

#[cfg(feature = "std")]
impl<T: ToPostcard, S> ToPostcard for std::collections::HashSet<T, S> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_iter(self)
    }
}

#[cfg(feature = "std")]
impl<K: ToPostcard, V: ToPostcard, S> ToPostcard for std::collections::HashMap<K, V, S> {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        encoder.emit_map(self)
    }
}

macro_rules! impl_tuple_to_postcard {
    ($(($($name:ident $idx:tt),+)),*) => {
        $(
            impl<$($name: ToPostcard),+> ToPostcard for ($($name,)+) {
                fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
                    $(self.$idx.to_postcard(encoder)?;)+
                    Ok(())
                }
            }
        )*
    };
}

impl_tuple_to_postcard!(
    (A 0),
    (A 0, B 1),
    (A 0, B 1, C 2),
    (A 0, B 1, C 2, D 3),
    (A 0, B 1, C 2, D 3, E 4),
    (A 0, B 1, C 2, D 3, E 4, F 5),
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6),
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7)
);

#[cfg_attr(feature = "instrument", tracing::instrument(skip_all))]
pub fn emit<T>(value: &T) -> Result<Vec<u8>, Error>
where
    T: ToPostcard + ?Sized,
{
    emit_into(value, Vec::new())
}

/// Encodes into `buf`, discarding its contents but reusing its capacity.
pub fn emit_into<T>(value: &T, mut buf: Vec<u8>) -> Result<Vec<u8>, Error>
where
    T: ToPostcard + ?Sized,
{
    buf.clear();
    let mut e = Encoder::with_output(buf);
    e.emit(value)?;
    Ok(e.build())
}

/// Encodes into a fixed-size buffer, returning the written prefix.
#[cfg_attr(feature = "instrument", tracing::instrument(skip_all))]
pub fn emit_to_slice<'a, T>(value: &T, buf: &'a mut [u8]) -> Result<&'a mut [u8], Error>
where
    T: ToPostcard + ?Sized,
{
    let mut e = Encoder::with_output(SliceOutput::new(buf));
    e.emit(value)?;
    Ok(e.build().into_written())
}

pub fn emit_str(value: &str) -> Result<Vec<u8>, Error> {
    let mut e = Encoder::new();
    e.emit_str(value)?;
    Ok(e.build())
}

pub fn emit_bytes(value: &[u8]) -> Result<Vec<u8>, Error> {
    let mut e = Encoder::new();
    e.emit_bytes(value)?;
    Ok(e.build())
}

pub fn emit_char(value: char) -> Result<Vec<u8>, Error> {
    let mut e = Encoder::new();
    e.emit_char(value)?;
    Ok(e.build())
}
