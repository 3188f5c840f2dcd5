//! Schema-directed dynamic values.
//!
//! When no Rust type is at hand (tooling, debugging), a [`Shape`] describes
//! the wire layout explicitly and [`decode_value`] / [`encode_value`] walk it
//! to produce or consume a dynamic [`Value`]. The wire form is identical to
//! the one produced by the typed `Encode` / `Decode` implementations.

use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{CodecError, CodecResult};

/// Shapes that have no wire representation and read or write zero bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    /// A channel.
    Channel,
    /// A function or closure.
    Function,
    /// A map.
    Map,
}

impl OpaqueKind {
    fn name(self) -> &'static str {
        match self {
            Self::Channel => "chan",
            Self::Function => "func",
            Self::Map => "map",
        }
    }
}

/// An explicit description of an encoded layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// `bool`, one byte.
    Bool,
    /// `i8`.
    I8,
    /// `i16`.
    I16,
    /// `i32`.
    I32,
    /// `i64`.
    I64,
    /// `i128`.
    I128,
    /// `u8`.
    U8,
    /// `u16`.
    U16,
    /// `u32`.
    U32,
    /// `u64`.
    U64,
    /// `u128`.
    U128,
    /// `isize`, host pointer width.
    Isize,
    /// `usize`, host pointer width.
    Usize,
    /// `f32`.
    F32,
    /// `f64`.
    F64,
    /// Complex number with `f32` parts.
    Complex64,
    /// Complex number with `f64` parts.
    Complex128,
    /// Length-prefixed text.
    Text,
    /// Length-prefixed sequence of any length.
    Seq(Box<Shape>),
    /// Length-prefixed sequence whose length must match.
    Array(Box<Shape>, usize),
    /// Presence flag followed by the value when present.
    Optional(Box<Shape>),
    /// Named fields in order.
    Record(Vec<(String, Shape)>),
    /// A shape with no wire representation.
    Opaque(OpaqueKind),
}

impl Shape {
    /// Parses a shape expression such as `{id: u64, tags: [str], parent: ?u64}`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsupportedType`] for an unknown type name and
    /// [`CodecError::InvalidShape`] for malformed syntax.
    pub fn parse(input: &str) -> CodecResult<Self> {
        let mut parser = ShapeParser { input, pos: 0 };
        let shape = parser.shape()?;
        parser.skip_ws();
        if parser.pos != input.len() {
            return Err(CodecError::invalid_shape(parser.pos, "unexpected trailing input"));
        }
        Ok(shape)
    }

    fn primitive(name: &str) -> Option<Self> {
        let shape = match name {
            "bool" => Self::Bool,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "isize" => Self::Isize,
            "usize" => Self::Usize,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "c64" => Self::Complex64,
            "c128" => Self::Complex128,
            "str" => Self::Text,
            "chan" => Self::Opaque(OpaqueKind::Channel),
            "func" => Self::Opaque(OpaqueKind::Function),
            "map" => Self::Opaque(OpaqueKind::Map),
            _ => return None,
        };
        Some(shape)
    }
}

impl FromStr for Shape {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::I8 => f.write_str("i8"),
            Self::I16 => f.write_str("i16"),
            Self::I32 => f.write_str("i32"),
            Self::I64 => f.write_str("i64"),
            Self::I128 => f.write_str("i128"),
            Self::U8 => f.write_str("u8"),
            Self::U16 => f.write_str("u16"),
            Self::U32 => f.write_str("u32"),
            Self::U64 => f.write_str("u64"),
            Self::U128 => f.write_str("u128"),
            Self::Isize => f.write_str("isize"),
            Self::Usize => f.write_str("usize"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::Complex64 => f.write_str("c64"),
            Self::Complex128 => f.write_str("c128"),
            Self::Text => f.write_str("str"),
            Self::Seq(inner) => write!(f, "[{inner}]"),
            Self::Array(inner, len) => write!(f, "[{inner}; {len}]"),
            Self::Optional(inner) => write!(f, "?{inner}"),
            Self::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, shape)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {shape}")?;
                }
                f.write_str("}")
            }
            Self::Opaque(kind) => f.write_str(kind.name()),
        }
    }
}

struct ShapeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl ShapeParser<'_> {
    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.input[self.pos..].chars().next()
    }

    fn expect(&mut self, expected: char) -> CodecResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(CodecError::invalid_shape(
                self.pos,
                format!("expected '{expected}', found '{c}'"),
            )),
            None => Err(CodecError::invalid_shape(
                self.pos,
                format!("expected '{expected}', found end of input"),
            )),
        }
    }

    fn ident(&mut self) -> CodecResult<&str> {
        self.skip_ws();
        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest
            .char_indices()
            .find(|&(i, c)| !(c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return Err(CodecError::invalid_shape(start, "expected a type name"));
        }
        self.pos += len;
        Ok(&self.input[start..start + len])
    }

    fn number(&mut self) -> CodecResult<usize> {
        self.skip_ws();
        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len]
            .parse()
            .map_err(|_| CodecError::invalid_shape(start, "expected an array length"))
    }

    fn shape(&mut self) -> CodecResult<Shape> {
        match self.peek() {
            Some('?') => {
                self.pos += 1;
                Ok(Shape::Optional(Box::new(self.shape()?)))
            }
            Some('[') => {
                self.pos += 1;
                let inner = Box::new(self.shape()?);
                if self.peek() == Some(';') {
                    self.pos += 1;
                    let len = self.number()?;
                    self.expect(']')?;
                    Ok(Shape::Array(inner, len))
                } else {
                    self.expect(']')?;
                    Ok(Shape::Seq(inner))
                }
            }
            Some('{') => {
                self.pos += 1;
                let mut fields = Vec::new();
                while self.peek() != Some('}') {
                    let name = self.ident()?.to_string();
                    self.expect(':')?;
                    let shape = self.shape()?;
                    fields.push((name, shape));
                    if self.peek() == Some(',') {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                self.expect('}')?;
                Ok(Shape::Record(fields))
            }
            _ => {
                let name = self.ident()?;
                Shape::primitive(name).ok_or_else(|| CodecError::unsupported_type(name))
            }
        }
    }
}

/// A dynamically shaped value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The value of an opaque shape; occupies no bytes.
    Unit,
    /// An absent optional value.
    Null,
    /// A boolean.
    Bool(bool),
    /// Any signed integer.
    Int(i128),
    /// Any unsigned integer.
    Uint(u128),
    /// Any float.
    Float(f64),
    /// A complex number.
    Complex {
        /// Real part.
        re: f64,
        /// Imaginary part.
        im: f64,
    },
    /// Text.
    Text(String),
    /// A sequence or fixed-size array.
    Seq(Vec<Value>),
    /// Named fields in order.
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Short name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Complex { .. } => "complex",
            Self::Text(_) => "text",
            Self::Seq(_) => "seq",
            Self::Record(_) => "record",
        }
    }

    /// Get this value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unit | Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i128(*n),
            Self::Uint(n) => serializer.serialize_u128(*n),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Complex { re, im } => {
                let mut s = serializer.serialize_struct("Complex", 2)?;
                s.serialize_field("re", re)?;
                s.serialize_field("im", im)?;
                s.end()
            }
            Self::Text(s) => serializer.serialize_str(s),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

/// Decode one value laid out as `shape`.
pub fn decode_value(shape: &Shape, decoder: &mut Decoder<'_>) -> CodecResult<Value> {
    let value = match shape {
        Shape::Bool => Value::Bool(decoder.get_bool()?),
        Shape::I8 => Value::Int(decoder.get_i8()?.into()),
        Shape::I16 => Value::Int(decoder.get_i16()?.into()),
        Shape::I32 => Value::Int(decoder.get_i32()?.into()),
        Shape::I64 => Value::Int(decoder.get_i64()?.into()),
        Shape::I128 => Value::Int(decoder.get_i128()?),
        Shape::Isize => Value::Int(decoder.get_isize()? as i128),
        Shape::U8 => Value::Uint(decoder.get_u8()?.into()),
        Shape::U16 => Value::Uint(decoder.get_u16()?.into()),
        Shape::U32 => Value::Uint(decoder.get_u32()?.into()),
        Shape::U64 => Value::Uint(decoder.get_u64()?.into()),
        Shape::U128 => Value::Uint(decoder.get_u128()?),
        Shape::Usize => Value::Uint(decoder.get_usize()? as u128),
        Shape::F32 => Value::Float(decoder.get_f32()?.into()),
        Shape::F64 => Value::Float(decoder.get_f64()?),
        Shape::Complex64 => Value::Complex {
            re: decoder.get_f32()?.into(),
            im: decoder.get_f32()?.into(),
        },
        Shape::Complex128 => Value::Complex {
            re: decoder.get_f64()?,
            im: decoder.get_f64()?,
        },
        Shape::Text => Value::Text(decoder.get_str()?.to_string()),
        Shape::Seq(inner) => {
            let len = decoder.get_len()?;
            Value::Seq(decode_items(inner, len, decoder)?)
        }
        Shape::Array(inner, expected) => {
            let len = decoder.get_len()?;
            if len != *expected {
                return Err(CodecError::LengthMismatch {
                    expected: *expected,
                    actual: len,
                });
            }
            Value::Seq(decode_items(inner, len, decoder)?)
        }
        Shape::Optional(inner) => {
            if decoder.get_presence()? {
                decode_value(inner, decoder)?
            } else {
                Value::Null
            }
        }
        Shape::Record(fields) => {
            let mut values = Vec::with_capacity(fields.len());
            for (name, field_shape) in fields {
                values.push((name.clone(), decode_value(field_shape, decoder)?));
            }
            Value::Record(values)
        }
        Shape::Opaque(_) => Value::Unit,
    };
    Ok(value)
}

fn decode_items(shape: &Shape, len: usize, decoder: &mut Decoder<'_>) -> CodecResult<Vec<Value>> {
    decoder.get_items(len, |decoder| decode_value(shape, decoder))
}

/// Encode `value` laid out as `shape`.
///
/// # Errors
///
/// Returns [`CodecError::ShapeMismatch`] when the value does not fit the
/// shape (including integers out of range) and
/// [`CodecError::LengthMismatch`] for arrays of the wrong length.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_value(shape: &Shape, value: &Value, encoder: &mut Encoder) -> CodecResult<()> {
    match (shape, value) {
        (Shape::Opaque(_), _) => {}
        (Shape::Bool, Value::Bool(b)) => encoder.put_bool(*b),
        (Shape::I8, Value::Int(n)) => encoder.put_i8(narrow(shape, *n)?),
        (Shape::I16, Value::Int(n)) => encoder.put_i16(narrow(shape, *n)?),
        (Shape::I32, Value::Int(n)) => encoder.put_i32(narrow(shape, *n)?),
        (Shape::I64, Value::Int(n)) => encoder.put_i64(narrow(shape, *n)?),
        (Shape::I128, Value::Int(n)) => encoder.put_i128(*n),
        (Shape::Isize, Value::Int(n)) => encoder.put_isize(narrow(shape, *n)?),
        (Shape::U8, Value::Uint(n)) => encoder.put_u8(narrow_unsigned(shape, *n)?),
        (Shape::U16, Value::Uint(n)) => encoder.put_u16(narrow_unsigned(shape, *n)?),
        (Shape::U32, Value::Uint(n)) => encoder.put_u32(narrow_unsigned(shape, *n)?),
        (Shape::U64, Value::Uint(n)) => encoder.put_u64(narrow_unsigned(shape, *n)?),
        (Shape::U128, Value::Uint(n)) => encoder.put_u128(*n),
        (Shape::Usize, Value::Uint(n)) => encoder.put_usize(narrow_unsigned(shape, *n)?),
        (Shape::F32, Value::Float(x)) => encoder.put_f32(*x as f32),
        (Shape::F64, Value::Float(x)) => encoder.put_f64(*x),
        (Shape::Complex64, Value::Complex { re, im }) => {
            encoder.put_f32(*re as f32);
            encoder.put_f32(*im as f32);
        }
        (Shape::Complex128, Value::Complex { re, im }) => {
            encoder.put_f64(*re);
            encoder.put_f64(*im);
        }
        (Shape::Text, Value::Text(s)) => encoder.put_str(s)?,
        (Shape::Seq(inner), Value::Seq(items)) => encode_items(inner, items, encoder)?,
        (Shape::Array(inner, expected), Value::Seq(items)) => {
            if items.len() != *expected {
                return Err(CodecError::LengthMismatch {
                    expected: *expected,
                    actual: items.len(),
                });
            }
            encode_items(inner, items, encoder)?;
        }
        (Shape::Optional(_), Value::Null) => encoder.put_presence(false),
        (Shape::Optional(inner), present) => {
            encoder.put_presence(true);
            encode_value(inner, present, encoder)?;
        }
        (Shape::Record(fields), Value::Record(values)) => {
            if fields.len() != values.len() {
                return Err(CodecError::shape_mismatch(
                    shape.to_string(),
                    format!("record with {} fields", values.len()),
                ));
            }
            for ((name, field_shape), (value_name, field_value)) in fields.iter().zip(values) {
                if name != value_name {
                    return Err(CodecError::shape_mismatch(
                        format!("field {name}"),
                        format!("field {value_name}"),
                    ));
                }
                encode_value(field_shape, field_value, encoder)?;
            }
        }
        (shape, value) => {
            return Err(CodecError::shape_mismatch(shape.to_string(), value.kind()));
        }
    }
    Ok(())
}

fn encode_items(shape: &Shape, items: &[Value], encoder: &mut Encoder) -> CodecResult<()> {
    encoder.put_len(items.len())?;
    for item in items {
        encode_value(shape, item, encoder)?;
    }
    Ok(())
}

fn narrow<T: TryFrom<i128>>(shape: &Shape, n: i128) -> CodecResult<T> {
    T::try_from(n).map_err(|_| CodecError::shape_mismatch(shape.to_string(), format!("int {n}")))
}

fn narrow_unsigned<T: TryFrom<u128>>(shape: &Shape, n: u128) -> CodecResult<T> {
    T::try_from(n).map_err(|_| CodecError::shape_mismatch(shape.to_string(), format!("uint {n}")))
}
