//! Codec-aware value types that have no standard-library counterpart.

use std::ops::{Deref, DerefMut};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::CodecResult;
use crate::{Decode, Encode};

/// A complex number, encoded as the real part followed by the imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<F> {
    /// Real part.
    pub re: F,
    /// Imaginary part.
    pub im: F,
}

/// Complex number with `f32` parts (8 bytes on the wire).
pub type Complex64 = Complex<f32>;

/// Complex number with `f64` parts (16 bytes on the wire).
pub type Complex128 = Complex<f64>;

impl<F> Complex<F> {
    /// Creates a complex number from its parts.
    pub const fn new(re: F, im: F) -> Self {
        Self { re, im }
    }
}

impl<F: Encode> Encode for Complex<F> {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        self.re.encode(encoder)?;
        self.im.encode(encoder)
    }
}

impl<F: Decode> Decode for Complex<F> {
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        let re = F::decode(decoder)?;
        let im = F::decode(decoder)?;
        Ok(Self { re, im })
    }
}

/// A value that is carried in memory but never persisted.
///
/// Encodes to zero bytes and decodes to `T::default()`. Use it for fields
/// such as caches, handles or callbacks that have no wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Transient<T>(pub T);

impl<T> Transient<T> {
    /// Unwraps the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Transient<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Transient<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> Encode for Transient<T> {
    fn encode(&self, _encoder: &mut Encoder) -> CodecResult<()> {
        Ok(())
    }
}

impl<T: Default> Decode for Transient<T> {
    fn decode(_decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        Ok(Self(T::default()))
    }
}
