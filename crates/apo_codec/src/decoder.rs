//! Big-endian decoder.

use crate::error::{CodecError, CodecResult};
use crate::Decode;

/// Decode a value from bytes, requiring that every byte is consumed.
///
/// # Errors
///
/// Returns an error if the bytes are truncated, malformed for `T`, or
/// followed by trailing bytes.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> CodecResult<T> {
    let mut decoder = Decoder::new(bytes);
    let value = T::decode(&mut decoder)?;
    decoder.finish()?;
    Ok(value)
}

/// Decode bytes over an existing value.
///
/// On error the destination is left unchanged.
pub fn decode_into<T: Decode>(bytes: &[u8], dest: &mut T) -> CodecResult<()> {
    *dest = from_bytes(bytes)?;
    Ok(())
}

/// Most items a decoded sequence may hold when its items take no bytes.
pub const MAX_EMPTY_ITEMS: usize = 1 << 16;

/// A cursor over encoded bytes.
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Decode the next value.
    pub fn decode<T: Decode>(&mut self) -> CodecResult<T> {
        T::decode(self)
    }

    /// Decode a sequence into a pre-allocated slice.
    ///
    /// The stored length must equal `dest.len()`. Elements are overwritten in
    /// order; on error, elements before the failing one have been replaced.
    pub fn decode_slice_into<T: Decode>(&mut self, dest: &mut [T]) -> CodecResult<()> {
        let len = self.get_len()?;
        if len != dest.len() {
            return Err(CodecError::LengthMismatch {
                expected: dest.len(),
                actual: len,
            });
        }
        for slot in dest.iter_mut() {
            *slot = T::decode(self)?;
        }
        Ok(())
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Fail if any bytes are left unconsumed.
    pub fn finish(&self) -> CodecResult<()> {
        let remaining = self.data.len() - self.pos;
        if remaining == 0 {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes { remaining })
        }
    }

    /// Read `len` raw bytes.
    #[inline]
    pub fn get_raw(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let remaining = self.data.len() - self.pos;
        if len > remaining {
            return Err(CodecError::unexpected_eof(len, remaining));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    fn get_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.get_raw(N)?);
        Ok(out)
    }

    /// Read a 0/1 boolean byte.
    pub fn get_bool(&mut self) -> CodecResult<bool> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    /// Read a presence flag.
    pub fn get_presence(&mut self) -> CodecResult<bool> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidPresenceFlag(other)),
        }
    }

    /// Read a 4-byte length prefix.
    pub fn get_len(&mut self) -> CodecResult<usize> {
        let len = self.get_u32()?;
        // u32 always fits a usize on the supported 32/64-bit targets.
        Ok(len as usize)
    }

    /// Read length-prefixed UTF-8 text.
    pub fn get_str(&mut self) -> CodecResult<&'a str> {
        let len = self.get_len()?;
        let bytes = self.get_raw(len)?;
        std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Read a length-prefixed sequence.
    pub fn get_seq<T: Decode>(&mut self) -> CodecResult<Vec<T>> {
        let len = self.get_len()?;
        self.get_items(len, T::decode)
    }

    /// Read `len` items with `item`.
    ///
    /// Items that read input cannot outnumber the bytes left; items that read
    /// nothing are capped at [`MAX_EMPTY_ITEMS`]. Either way a corrupt length
    /// prefix fails after the first item.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TooManyItems`] when `len` breaks that bound, or
    /// the first error from `item`.
    pub fn get_items<T>(
        &mut self,
        len: usize,
        mut item: impl FnMut(&mut Self) -> CodecResult<T>,
    ) -> CodecResult<Vec<T>> {
        let available = self.remaining().len();
        let mut items = Vec::with_capacity(len.min(available));
        for _ in 0..len {
            let start = self.pos;
            items.push(item(self)?);
            if items.len() == 1 {
                let limit = if self.pos == start {
                    MAX_EMPTY_ITEMS
                } else {
                    available
                };
                if len > limit {
                    return Err(CodecError::TooManyItems { len, limit });
                }
            }
        }
        Ok(items)
    }

    /// Read a `u8`.
    pub fn get_u8(&mut self) -> CodecResult<u8> {
        Ok(self.get_array::<1>()?[0])
    }

    /// Read an `i8`.
    pub fn get_i8(&mut self) -> CodecResult<i8> {
        Ok(i8::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `u16`.
    pub fn get_u16(&mut self) -> CodecResult<u16> {
        Ok(u16::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `i16`.
    pub fn get_i16(&mut self) -> CodecResult<i16> {
        Ok(i16::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `u32`.
    pub fn get_u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `i32`.
    pub fn get_i32(&mut self) -> CodecResult<i32> {
        Ok(i32::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `u64`.
    pub fn get_u64(&mut self) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `i64`.
    pub fn get_i64(&mut self) -> CodecResult<i64> {
        Ok(i64::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `u128`.
    pub fn get_u128(&mut self) -> CodecResult<u128> {
        Ok(u128::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `i128`.
    pub fn get_i128(&mut self) -> CodecResult<i128> {
        Ok(i128::from_be_bytes(self.get_array()?))
    }

    /// Read a `usize` at the host pointer width.
    pub fn get_usize(&mut self) -> CodecResult<usize> {
        Ok(usize::from_be_bytes(self.get_array()?))
    }

    /// Read an `isize` at the host pointer width.
    pub fn get_isize(&mut self) -> CodecResult<isize> {
        Ok(isize::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian IEEE-754 `f32`.
    pub fn get_f32(&mut self) -> CodecResult<f32> {
        Ok(f32::from_bits(self.get_u32()?))
    }

    /// Read a big-endian IEEE-754 `f64`.
    pub fn get_f64(&mut self) -> CodecResult<f64> {
        Ok(f64::from_bits(self.get_u64()?))
    }
}
