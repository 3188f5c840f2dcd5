//! Growable in-memory buffer with a read/write cursor.

use std::io::{self, SeekFrom};

use bytes::Bytes;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{CodecError, CodecResult};
use crate::{Decode, Encode};

/// A growable byte region with a single cursor, used for ad hoc framing.
///
/// Writes always make `cursor + written` the new end of the buffer: writing
/// after seeking backwards drops whatever was previously stored past the new
/// bytes. Reads decode at the cursor and advance it by the bytes consumed.
///
/// Not synchronized; share it behind a lock if several threads need it.
///
/// # Example
///
/// ```
/// use apo_codec::Buffer;
/// use std::io::SeekFrom;
///
/// let mut buf = Buffer::new();
/// buf.write(&42u32).unwrap();
/// buf.write("frame").unwrap();
///
/// buf.seek(SeekFrom::Start(0)).unwrap();
/// assert_eq!(buf.read::<u32>().unwrap(), 42);
/// assert_eq!(buf.read::<String>().unwrap(), "frame");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
    pos: usize,
}

impl Buffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Wraps existing bytes with the cursor at the start.
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// Encodes `value` at the cursor and returns the number of bytes written.
    ///
    /// Bytes past the end of the new value are discarded. If encoding fails
    /// the buffer is left unchanged.
    pub fn write<T: Encode + ?Sized>(&mut self, value: &T) -> CodecResult<usize> {
        let mut encoder = Encoder::new();
        value.encode(&mut encoder)?;
        Ok(self.splice(encoder.as_bytes()))
    }

    /// Decodes a `T` at the cursor.
    pub fn read<T: Decode>(&mut self) -> CodecResult<T> {
        let mut decoder = Decoder::new(&self.data[self.pos..]);
        let value = T::decode(&mut decoder)?;
        self.pos += decoder.position();
        Ok(value)
    }

    /// Decodes at the cursor into `dest`, returning the bytes consumed.
    ///
    /// On error neither `dest` nor the cursor change.
    pub fn read_into<T: Decode>(&mut self, dest: &mut T) -> CodecResult<usize> {
        let start = self.pos;
        *dest = self.read()?;
        Ok(self.pos - start)
    }

    /// Moves the cursor and returns its new absolute position.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SeekOutOfBounds`] if the target lies before the
    /// start or past the end of the buffer.
    pub fn seek(&mut self, target: SeekFrom) -> CodecResult<u64> {
        let len = self.data.len();
        let position = match target {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => self.pos as i128 + i128::from(delta),
            SeekFrom::End(delta) => len as i128 + i128::from(delta),
        };
        if position < 0 || position > len as i128 {
            return Err(CodecError::SeekOutOfBounds { position, len });
        }
        self.pos = position as usize;
        Ok(self.pos as u64)
    }

    /// Truncates the buffer to empty and rewinds the cursor.
    pub fn reset(&mut self) {
        self.data.clear();
        self.pos = 0;
    }

    /// The current contents.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Length of the contents.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the buffer, returning its contents.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Consumes the buffer into an immutable, cheaply cloneable [`Bytes`].
    pub fn freeze(self) -> Bytes {
        Bytes::from(self.data)
    }

    fn splice(&mut self, bytes: &[u8]) -> usize {
        self.data.truncate(self.pos);
        self.data.extend_from_slice(bytes);
        self.pos += bytes.len();
        bytes.len()
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.splice(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for Buffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = &self.data[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl io::Seek for Buffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Buffer::seek(self, pos).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
