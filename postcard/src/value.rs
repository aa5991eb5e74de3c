/*!
Values whose type is only known at runtime.

A [`Shape`] describes the wire layout of a value; a [`Value`] is the matching
data. Since the format carries no type information, decoding always needs a
shape, while a value can be encoded on its own.
*/

use super::{
    decode::Decoder,
    encode::{Encoder, Output, ToPostcard},
    *,
};
use alloc::{boxed::Box, string::String, vec::Vec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    Varint,
    F32,
    F64,
    Char,
    String,
    Bytes,
    Option(Box<Shape>),
    Seq(Box<Shape>),
    Array(Box<Shape>, usize),
    Map(Box<Shape>, Box<Shape>),
    Struct(Vec<FieldShape>),
    /// One entry per variant, in discriminant order, with the shape of the
    /// variant's associated value, if any.
    Enum(Vec<Option<Shape>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    pub name: String,
    pub shape: Shape,
    /// Skipped fields are never on the wire, and decode to their zero value.
    pub skip: bool,
}

impl FieldShape {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            skip: false,
        }
    }

    pub fn skipped(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            skip: true,
            ..Self::new(name, shape)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    Varint(Varint),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Option(Option<Box<Value>>),
    Seq(Vec<Value>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(Vec<Field>),
    Enum(u32, Option<Box<Value>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
    pub skip: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            skip: false,
        }
    }

    pub fn skipped(name: impl Into<String>, value: Value) -> Self {
        Self {
            skip: true,
            ..Self::new(name, value)
        }
    }
}

impl Shape {
    fn kind(&self) -> &'static str {
        match self {
            Shape::Bool => "bool",
            Shape::I8 => "i8",
            Shape::I16 => "i16",
            Shape::I32 => "i32",
            Shape::I64 => "i64",
            Shape::Isize => "isize",
            Shape::U8 => "u8",
            Shape::U16 => "u16",
            Shape::U32 => "u32",
            Shape::U64 => "u64",
            Shape::Usize => "usize",
            Shape::Varint => "varint",
            Shape::F32 => "f32",
            Shape::F64 => "f64",
            Shape::Char => "char",
            Shape::String => "string",
            Shape::Bytes => "bytes",
            Shape::Option(_) => "option",
            Shape::Seq(_) => "sequence",
            Shape::Array(..) => "array",
            Shape::Map(..) => "map",
            Shape::Struct(_) => "struct",
            Shape::Enum(_) => "enum",
        }
    }

    fn is_bytes(&self) -> bool {
        matches!(self, Shape::Bytes) || matches!(self, Shape::Seq(s) if **s == Shape::U8)
    }

    /// The default value of this shape: false, zero, empty, absent, or the
    /// first variant of an enum.
    pub fn zero_value(&self) -> Value {
        match self {
            Shape::Bool => Value::Bool(false),
            Shape::I8 => Value::I8(0),
            Shape::I16 => Value::I16(0),
            Shape::I32 => Value::I32(0),
            Shape::I64 => Value::I64(0),
            Shape::Isize => Value::Isize(0),
            Shape::U8 => Value::U8(0),
            Shape::U16 => Value::U16(0),
            Shape::U32 => Value::U32(0),
            Shape::U64 => Value::U64(0),
            Shape::Usize => Value::Usize(0),
            Shape::Varint => Value::Varint(Varint(0)),
            Shape::F32 => Value::F32(0.0),
            Shape::F64 => Value::F64(0.0),
            Shape::Char => Value::Char('\0'),
            Shape::String => Value::String(String::new()),
            Shape::Bytes => Value::Bytes(Vec::new()),
            Shape::Seq(s) if **s == Shape::U8 => Value::Bytes(Vec::new()),
            Shape::Option(_) => Value::Option(None),
            Shape::Seq(_) => Value::Seq(Vec::new()),
            Shape::Array(s, len) => Value::Array((0..*len).map(|_| s.zero_value()).collect()),
            Shape::Map(..) => Value::Map(Vec::new()),
            Shape::Struct(fields) => Value::Struct(
                fields
                    .iter()
                    .map(|f| Field {
                        name: f.name.clone(),
                        value: f.shape.zero_value(),
                        skip: f.skip,
                    })
                    .collect(),
            ),
            Shape::Enum(variants) => Value::Enum(
                0,
                variants
                    .first()
                    .and_then(Option::as_ref)
                    .map(|s| Box::new(s.zero_value())),
            ),
        }
    }

    /// Decodes a value of this shape from `decoder`.
    pub fn parse(&self, decoder: &mut Decoder<'_>) -> Result<Value, Error> {
        Ok(match self {
            Shape::Bool => Value::Bool(decoder.parse_bool()?),
            Shape::I8 => Value::I8(decoder.parse_i8()?),
            Shape::I16 => Value::I16(decoder.parse_i16()?),
            Shape::I32 => Value::I32(decoder.parse_i32()?),
            Shape::I64 => Value::I64(decoder.parse_i64()?),
            Shape::Isize => Value::Isize(decoder.parse_isize()?),
            Shape::U8 => Value::U8(decoder.parse_u8()?),
            Shape::U16 => Value::U16(decoder.parse_u16()?),
            Shape::U32 => Value::U32(decoder.parse_u32()?),
            Shape::U64 => Value::U64(decoder.parse_u64()?),
            Shape::Usize => Value::Usize(decoder.parse_usize()?),
            Shape::Varint => Value::Varint(decoder.parse_varint()?),
            Shape::F32 => Value::F32(decoder.parse_f32()?),
            Shape::F64 => Value::F64(decoder.parse_f64()?),
            Shape::Char => Value::Char(decoder.parse_char()?),
            Shape::String => Value::String(decoder.parse_string()?),
            Shape::Bytes => Value::Bytes(decoder.parse_bytes()?.to_vec()),
            Shape::Seq(s) if **s == Shape::U8 => Value::Bytes(decoder.parse_bytes()?.to_vec()),
            Shape::Option(s) => Value::Option(if decoder.parse_option_tag()? {
                Some(Box::new(s.parse(decoder)?))
            } else {
                None
            }),
            Shape::Seq(s) => {
                let count = decoder.parse_usize()?;
                let mut values = Vec::with_capacity(count.min(decoder.remaining()));
                for _ in 0..count {
                    let start = decoder.offset();
                    values.push(s.parse(decoder)?);
                    decoder.check_element(start, count)?;
                }
                Value::Seq(values)
            }
            Shape::Array(s, len) => Value::Array(
                (0..*len)
                    .map(|_| s.parse(decoder))
                    .collect::<Result<_, _>>()?,
            ),
            Shape::Map(k, v) => {
                let count = decoder.parse_usize()?;
                let mut entries = Vec::with_capacity(count.min(decoder.remaining()));
                for _ in 0..count {
                    let start = decoder.offset();
                    let key = k.parse(decoder)?;
                    entries.push((key, v.parse(decoder)?));
                    decoder.check_element(start, count)?;
                }
                Value::Map(entries)
            }
            Shape::Struct(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for f in fields {
                    values.push(Field {
                        name: f.name.clone(),
                        value: if f.skip {
                            f.shape.zero_value()
                        } else {
                            f.shape.parse(decoder)?
                        },
                        skip: f.skip,
                    });
                }
                Value::Struct(values)
            }
            Shape::Enum(variants) => {
                let d = decoder.parse_variant()?;
                let Some(variant) = variants.get(d as usize) else {
                    return Err(Error::BadEnum(d));
                };
                Value::Enum(
                    d,
                    match variant {
                        Some(s) => Some(Box::new(s.parse(decoder)?)),
                        None => None,
                    },
                )
            }
        })
    }

    /// Encodes `value` laid out as this shape, taking skipped fields from the
    /// shape rather than the value.
    pub fn emit<O: Output>(&self, value: &Value, encoder: &mut Encoder<O>) -> Result<(), Error> {
        match (self, value) {
            (Shape::Bool, Value::Bool(v)) => encoder.emit_bool(*v),
            (Shape::I8, Value::I8(v)) => encoder.emit_i8(*v),
            (Shape::I16, Value::I16(v)) => encoder.emit_i16(*v),
            (Shape::I32, Value::I32(v)) => encoder.emit_i32(*v),
            (Shape::I64, Value::I64(v)) => encoder.emit_i64(*v),
            (Shape::Isize, Value::Isize(v)) => encoder.emit_isize(*v),
            (Shape::U8, Value::U8(v)) => encoder.emit_u8(*v),
            (Shape::U16, Value::U16(v)) => encoder.emit_u16(*v),
            (Shape::U32, Value::U32(v)) => encoder.emit_u32(*v),
            (Shape::U64, Value::U64(v)) => encoder.emit_u64(*v),
            (Shape::Usize, Value::Usize(v)) => encoder.emit_usize(*v),
            (Shape::Varint, Value::Varint(v)) => encoder.emit_varint(*v),
            (Shape::F32, Value::F32(v)) => encoder.emit_f32(*v),
            (Shape::F64, Value::F64(v)) => encoder.emit_f64(*v),
            (Shape::Char, Value::Char(v)) => encoder.emit_char(*v),
            (Shape::String, Value::String(v)) => encoder.emit_str(v),
            (s, Value::Bytes(v)) if s.is_bytes() => encoder.emit_bytes(v),
            (Shape::Bytes, Value::Seq(values)) => {
                encoder.emit_usize(values.len())?;
                values.iter().try_for_each(|v| Shape::U8.emit(v, encoder))
            }
            (Shape::Option(s), Value::Option(v)) => match v {
                Some(v) => {
                    encoder.emit_u8(1)?;
                    s.emit(v, encoder)
                }
                None => encoder.emit_u8(0),
            },
            (Shape::Seq(s), Value::Seq(values)) => {
                encoder.emit_usize(values.len())?;
                values.iter().try_for_each(|v| s.emit(v, encoder))
            }
            (Shape::Array(s, len), Value::Array(values)) if values.len() == *len => {
                values.iter().try_for_each(|v| s.emit(v, encoder))
            }
            (Shape::Map(k, v), Value::Map(entries)) => {
                encoder.emit_usize(entries.len())?;
                entries.iter().try_for_each(|(key, value)| {
                    k.emit(key, encoder)?;
                    v.emit(value, encoder)
                })
            }
            (Shape::Struct(shapes), Value::Struct(fields))
                if shapes.len() == fields.len()
                    && shapes.iter().zip(fields).all(|(s, f)| s.name == f.name) =>
            {
                shapes
                    .iter()
                    .zip(fields)
                    .filter(|(s, _)| !s.skip)
                    .try_for_each(|(s, f)| s.shape.emit(&f.value, encoder))
            }
            (Shape::Enum(variants), Value::Enum(d, payload)) => {
                match (variants.get(*d as usize), payload) {
                    (Some(None), None) => encoder.emit_variant(*d),
                    (Some(Some(s)), Some(payload)) => {
                        encoder.emit_variant(*d)?;
                        s.emit(payload, encoder)
                    }
                    _ => Err(Error::Unsupported(self.kind())),
                }
            }
            _ => Err(Error::Unsupported(self.kind())),
        }
    }
}

impl Value {
    /// Whether this value has a representation in `shape`.
    pub fn conforms_to(&self, shape: &Shape) -> bool {
        match (shape, self) {
            (Shape::Bool, Value::Bool(_))
            | (Shape::I8, Value::I8(_))
            | (Shape::I16, Value::I16(_))
            | (Shape::I32, Value::I32(_))
            | (Shape::I64, Value::I64(_))
            | (Shape::Isize, Value::Isize(_))
            | (Shape::U8, Value::U8(_))
            | (Shape::U16, Value::U16(_))
            | (Shape::U32, Value::U32(_))
            | (Shape::U64, Value::U64(_))
            | (Shape::Usize, Value::Usize(_))
            | (Shape::Varint, Value::Varint(_))
            | (Shape::F32, Value::F32(_))
            | (Shape::F64, Value::F64(_))
            | (Shape::Char, Value::Char(_))
            | (Shape::String, Value::String(_)) => true,
            (s, Value::Bytes(_)) => s.is_bytes(),
            (Shape::Bytes, Value::Seq(values)) => values.iter().all(|v| v.conforms_to(&Shape::U8)),
            (Shape::Option(s), Value::Option(v)) => v.as_ref().is_none_or(|v| v.conforms_to(s)),
            (Shape::Seq(s), Value::Seq(values)) => values.iter().all(|v| v.conforms_to(s)),
            (Shape::Array(s, len), Value::Array(values)) => {
                values.len() == *len && values.iter().all(|v| v.conforms_to(s))
            }
            (Shape::Map(k, v), Value::Map(entries)) => entries
                .iter()
                .all(|(key, value)| key.conforms_to(k) && value.conforms_to(v)),
            (Shape::Struct(shapes), Value::Struct(fields)) => {
                shapes.len() == fields.len()
                    && shapes.iter().zip(fields).all(|(s, f)| {
                        s.name == f.name && (s.skip || f.value.conforms_to(&s.shape))
                    })
            }
            (Shape::Enum(variants), Value::Enum(d, payload)) => {
                match (variants.get(*d as usize), payload) {
                    (Some(None), None) => true,
                    (Some(Some(s)), Some(payload)) => payload.conforms_to(s),
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl ToPostcard for Value {
    fn to_postcard<O: Output>(&self, encoder: &mut Encoder<O>) -> Result<(), Error> {
        match self {
            Value::Bool(v) => encoder.emit_bool(*v),
            Value::I8(v) => encoder.emit_i8(*v),
            Value::I16(v) => encoder.emit_i16(*v),
            Value::I32(v) => encoder.emit_i32(*v),
            Value::I64(v) => encoder.emit_i64(*v),
            Value::Isize(v) => encoder.emit_isize(*v),
            Value::U8(v) => encoder.emit_u8(*v),
            Value::U16(v) => encoder.emit_u16(*v),
            Value::U32(v) => encoder.emit_u32(*v),
            Value::U64(v) => encoder.emit_u64(*v),
            Value::Usize(v) => encoder.emit_usize(*v),
            Value::Varint(v) => encoder.emit_varint(*v),
            Value::F32(v) => encoder.emit_f32(*v),
            Value::F64(v) => encoder.emit_f64(*v),
            Value::Char(v) => encoder.emit_char(*v),
            Value::String(v) => encoder.emit_str(v),
            Value::Bytes(v) => encoder.emit_bytes(v),
            Value::Option(v) => encoder.emit_option(v.as_deref()),
            Value::Seq(values) => encoder.emit_seq(values),
            Value::Array(values) => encoder.emit_array(values),
            Value::Map(entries) => encoder.emit_map(entries.iter().map(|(k, v)| (k, v))),
            Value::Struct(fields) => fields
                .iter()
                .filter(|f| !f.skip)
                .try_for_each(|f| f.value.to_postcard(encoder)),
            Value::Enum(d, payload) => {
                encoder.emit_variant(*d)?;
                match payload {
                    Some(payload) => payload.to_postcard(encoder),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Decodes a value of `shape` that must occupy all of `data`.
#[cfg_attr(feature = "instrument", tracing::instrument(skip_all))]
pub fn parse(data: &[u8], shape: &Shape) -> Result<Value, Error> {
    let mut decoder = Decoder::new(data);
    let value = shape.parse(&mut decoder).inspect_err(|e| {
        tracing::debug!(
            "Failed to decode {} at offset {}: {e}",
            shape.kind(),
            decoder.offset()
        )
    })?;
    match decoder.remaining() {
        0 => Ok(value),
        n => Err(Error::AdditionalData(n)),
    }
}

/// Encodes `value` laid out as `shape`, failing if it has no representation
/// in that shape.
#[cfg_attr(feature = "instrument", tracing::instrument(skip_all))]
pub fn emit_shaped(value: &Value, shape: &Shape) -> Result<Vec<u8>, Error> {
    let mut e = Encoder::new();
    shape.emit(value, &mut e)?;
    Ok(e.build())
}
