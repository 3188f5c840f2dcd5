//! Big-endian encoder.

use bytes::{BufMut, BytesMut};

use crate::error::{CodecError, CodecResult};
use crate::Encode;

/// Encode a value to its canonical bytes.
///
/// Identical values always produce identical bytes: integers and floats are
/// written big-endian at their exact width, text and sequences carry a 4-byte
/// length prefix, and optional values a 1-byte presence flag.
///
/// # Errors
///
/// Returns an error if a text or sequence length does not fit the 4-byte
/// length prefix.
pub fn to_bytes<T: Encode + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut encoder = Encoder::new();
    value.encode(&mut encoder)?;
    Ok(encoder.into_bytes())
}

/// An incremental big-endian encoder.
///
/// `Encode` implementations write their fields through the `put_*` methods;
/// the accumulated bytes are taken with [`Encoder::into_bytes`].
#[derive(Debug, Default)]
pub struct Encoder {
    buffer: BytesMut,
}

impl Encoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Encode a value into this encoder.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        value.encode(self)
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into()
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bytes encoded so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been encoded.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Write a boolean as a single 0/1 byte.
    pub fn put_bool(&mut self, value: bool) {
        self.buffer.put_u8(u8::from(value));
    }

    /// Write a presence flag for an optional value.
    pub fn put_presence(&mut self, present: bool) {
        self.put_bool(present);
    }

    /// Write a 4-byte length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::LengthOverflow`] if `len` exceeds `u32::MAX`.
    pub fn put_len(&mut self, len: usize) -> CodecResult<()> {
        let prefix = u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;
        self.buffer.put_u32(prefix);
        Ok(())
    }

    /// Write raw bytes without a length prefix.
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buffer.put_slice(bytes);
    }

    /// Write length-prefixed text, bytes unchanged.
    pub fn put_str(&mut self, text: &str) -> CodecResult<()> {
        self.put_len(text.len())?;
        self.put_raw(text.as_bytes());
        Ok(())
    }

    /// Write a sequence: length prefix, then every element.
    pub fn put_seq<T: Encode>(&mut self, items: &[T]) -> CodecResult<()> {
        self.put_len(items.len())?;
        for item in items {
            item.encode(self)?;
        }
        Ok(())
    }

    /// Write a `u8`.
    pub fn put_u8(&mut self, value: u8) {
        self.buffer.put_u8(value);
    }

    /// Write an `i8`.
    pub fn put_i8(&mut self, value: i8) {
        self.buffer.put_i8(value);
    }

    /// Write a big-endian `u16`.
    pub fn put_u16(&mut self, value: u16) {
        self.buffer.put_u16(value);
    }

    /// Write a big-endian `i16`.
    pub fn put_i16(&mut self, value: i16) {
        self.buffer.put_i16(value);
    }

    /// Write a big-endian `u32`.
    pub fn put_u32(&mut self, value: u32) {
        self.buffer.put_u32(value);
    }

    /// Write a big-endian `i32`.
    pub fn put_i32(&mut self, value: i32) {
        self.buffer.put_i32(value);
    }

    /// Write a big-endian `u64`.
    pub fn put_u64(&mut self, value: u64) {
        self.buffer.put_u64(value);
    }

    /// Write a big-endian `i64`.
    pub fn put_i64(&mut self, value: i64) {
        self.buffer.put_i64(value);
    }

    /// Write a big-endian `u128`.
    pub fn put_u128(&mut self, value: u128) {
        self.buffer.put_u128(value);
    }

    /// Write a big-endian `i128`.
    pub fn put_i128(&mut self, value: i128) {
        self.buffer.put_i128(value);
    }

    /// Write a `usize` at the host pointer width.
    pub fn put_usize(&mut self, value: usize) {
        self.buffer.put_slice(&value.to_be_bytes());
    }

    /// Write an `isize` at the host pointer width.
    pub fn put_isize(&mut self, value: isize) {
        self.buffer.put_slice(&value.to_be_bytes());
    }

    /// Write the IEEE-754 bits of an `f32`, big-endian.
    pub fn put_f32(&mut self, value: f32) {
        self.buffer.put_u32(value.to_bits());
    }

    /// Write the IEEE-754 bits of an `f64`, big-endian.
    pub fn put_f64(&mut self, value: f64) {
        self.buffer.put_u64(value.to_bits());
    }
}
